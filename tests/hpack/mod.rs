//! Integration tests for the HPACK codec

use std::sync::Once;

use bytes::Bytes;
use hpack_sans_io::{Decoder, HpackError, InputBuffer};

mod encoding;
mod header_list_size;
mod properties;

static INIT_LOGGING: Once = Once::new();

/// Installs a test-writer tracing subscriber once per test binary.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_ansi(false)
            .try_init();
    });
}

/// A decoded header as `(name, value, sensitive)`.
pub type Decoded = (String, String, bool);

/// Feeds `data` to `decoder` in one piece and collects what it emits.
pub fn decode_block(decoder: &mut Decoder, data: &[u8]) -> Result<Vec<Decoded>, HpackError> {
    let mut input = InputBuffer::from(data);
    let mut headers = Vec::new();
    decoder.decode(&mut input, |name, value, sensitive| {
        headers.push((lossy(&name), lossy(&value), sensitive));
    })?;
    assert!(input.is_empty(), "{} bytes left undecoded", input.len());
    Ok(headers)
}

pub fn lossy(bytes: &Bytes) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parses a hex dump, ignoring whitespace.
pub fn hex(s: &str) -> Vec<u8> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).unwrap();
            u8::from_str_radix(pair, 16).unwrap()
        })
        .collect()
}

pub fn header(name: &str, value: &str) -> Decoded {
    (name.to_string(), value.to_string(), false)
}
