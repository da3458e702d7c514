//! String literal representation (RFC 7541 Section 5.2).
//!
//! ```text
//!   0   1   2   3   4   5   6   7
//! +---+---+---+---+---+---+---+---+
//! | H |    String Length (7+)     |
//! +---+---------------------------+
//! |  String Data (Length octets)  |
//! +-------------------------------+
//! ```

use bytes::{BufMut, Bytes};

use crate::config::HuffmanMode;
use crate::error::Result;
use crate::huffman;
use crate::integer::encode_integer;
use crate::source::ByteSource;

/// Huffman flag in the first byte of a string literal.
pub const HUFFMAN_FLAG: u8 = 0x80;

/// Length prefix width of a string literal.
pub const STRING_PREFIX_BITS: u8 = 7;

/// Writes `s` as a string literal.
pub fn encode_string<B: BufMut>(dst: &mut B, s: &[u8], mode: HuffmanMode) {
    let use_huffman = match mode {
        HuffmanMode::Never => false,
        HuffmanMode::Always => true,
        HuffmanMode::Auto => huffman::encoded_len(s) < s.len(),
    };

    if use_huffman {
        encode_integer(dst, HUFFMAN_FLAG, STRING_PREFIX_BITS, huffman::encoded_len(s));
        huffman::encode(s, dst);
    } else {
        encode_integer(dst, 0, STRING_PREFIX_BITS, s.len());
        dst.put_slice(s);
    }
}

/// Reads a `len`-byte payload whose length prefix was already consumed.
///
/// Returns `Ok(None)` with nothing consumed until all `len` bytes are
/// available.
pub fn read_string<S: ByteSource>(src: &mut S, len: usize, huffman: bool) -> Result<Option<Bytes>> {
    let Some(raw) = src.read_bytes(len) else {
        return Ok(None);
    };
    if huffman {
        Ok(Some(Bytes::from(huffman::decode(&raw)?)))
    } else {
        Ok(Some(raw))
    }
}
