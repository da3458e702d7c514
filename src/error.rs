//! Error types for HPACK decoding.
//!
//! Every error here is fatal for the connection: once the decoder has seen a
//! malformed representation its dynamic table can no longer be trusted to
//! mirror the peer's, so the caller should tear the connection down with a
//! `COMPRESSION_ERROR` (RFC 7540 Section 4.3).
//!
//! Exceeding the header list size is deliberately *not* an error. It is
//! reported by [`Decoder::end_header_block`](crate::Decoder::end_header_block).

use thiserror::Error;

/// HTTP/2 `COMPRESSION_ERROR` code (RFC 7540 Section 7).
pub const COMPRESSION_ERROR: u32 = 0x9;

/// Result type for HPACK operations.
pub type Result<T> = std::result::Result<T, HpackError>;

/// Errors that can occur while decoding a header block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HpackError {
    /// An indexed representation referenced index 0 or an index past the end
    /// of the combined static + dynamic table.
    #[error("illegal index value: {0}")]
    IllegalIndex(usize),

    /// A prefixed integer needed more than 31 bits of continuation.
    #[error("decompression failure: integer overflow")]
    IntegerOverflow,

    /// The trailing bits of a Huffman string were not an EOS prefix of at
    /// most 7 bits.
    #[error("decompression failure: invalid huffman padding")]
    InvalidPadding,

    /// The Huffman EOS symbol appeared inside a string literal.
    #[error("decompression failure: EOS decoded")]
    EosDecoded,

    /// The Huffman input walked into an unassigned code.
    #[error("decompression failure: invalid huffman code")]
    InvalidHuffmanCode,

    /// A literal header name was empty.
    #[error("decompression failure: empty header name")]
    EmptyName,

    /// A dynamic table size update exceeded the size the decoder allows.
    #[error("invalid dynamic table size {requested} (max {max})")]
    InvalidCapacity { requested: usize, max: usize },
}

impl HpackError {
    /// Returns the HTTP/2 error code the connection should be closed with.
    pub fn error_code(&self) -> u32 {
        COMPRESSION_ERROR
    }

    /// Returns true for malformed-input errors (as opposed to bad indexes or
    /// capacities).
    pub fn is_decompression_failure(&self) -> bool {
        matches!(
            self,
            HpackError::IntegerOverflow
                | HpackError::InvalidPadding
                | HpackError::EosDecoded
                | HpackError::InvalidHuffmanCode
                | HpackError::EmptyName
        )
    }
}
