//! Prefixed integer representation (RFC 7541 Section 5.1).
//!
//! An integer starts in the low `N` bits of a byte whose high bits carry the
//! representation type. Values that do not fit in the prefix continue as
//! little-endian base-128 groups, high bit set on every byte but the last.

use bytes::BufMut;

use crate::error::{HpackError, Result};
use crate::source::ByteSource;

/// Shift of the fifth continuation byte, the last one accepted.
const MAX_SHIFT: u32 = 28;

/// Largest value representable in an `n`-bit prefix.
fn prefix_max(prefix_bits: u8) -> usize {
    debug_assert!((1..=8).contains(&prefix_bits));
    (0xFFu8 >> (8 - prefix_bits)) as usize
}

/// Writes `value` with an `prefix_bits`-bit prefix, OR-ing `mask` into the
/// first byte.
pub fn encode_integer<B: BufMut>(dst: &mut B, mask: u8, prefix_bits: u8, value: usize) {
    let max = prefix_max(prefix_bits);
    if value < max {
        dst.put_u8(mask | value as u8);
        return;
    }

    dst.put_u8(mask | max as u8);
    let mut rest = value - max;
    while rest >= 0x80 {
        dst.put_u8((rest & 0x7F) as u8 | 0x80);
        rest >>= 7;
    }
    dst.put_u8(rest as u8);
}

/// Decodes a whole prefixed integer, first byte included.
///
/// Returns `Ok(None)` with nothing consumed if the source runs out first.
pub fn decode_integer<S: ByteSource>(src: &mut S, prefix_bits: u8) -> Result<Option<usize>> {
    src.mark();
    let first = match src.read_u8() {
        Some(b) => b,
        None => return Ok(None),
    };

    let max = prefix_max(prefix_bits);
    let prefix = first as usize & max;
    if prefix < max {
        return Ok(Some(prefix));
    }

    match read_continuation(src) {
        Ok(Some(rest)) => Ok(Some(max + rest)),
        Ok(None) => {
            src.reset();
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Decodes the continuation bytes that follow a saturated prefix.
///
/// Returns `Ok(None)` with nothing consumed if the source runs out first.
pub fn decode_continuation<S: ByteSource>(src: &mut S) -> Result<Option<usize>> {
    src.mark();
    let value = read_continuation(src)?;
    if value.is_none() {
        src.reset();
    }
    Ok(value)
}

fn read_continuation<S: ByteSource>(src: &mut S) -> Result<Option<usize>> {
    let mut value = 0usize;
    let mut shift = 0u32;
    loop {
        let b = match src.read_u8() {
            Some(b) => b,
            None => return Ok(None),
        };
        // The fifth byte may only carry the top 3 bits of a 31-bit value.
        if shift == MAX_SHIFT && b & 0xF8 != 0 {
            return Err(HpackError::IntegerOverflow);
        }
        value |= ((b & 0x7F) as usize) << shift;
        if b & 0x80 == 0 {
            return Ok(Some(value));
        }
        shift += 7;
    }
}
