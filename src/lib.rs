//! hpack-sans-io: A stateful, sans-I/O HPACK header compression codec
//!
//! This crate implements HPACK (RFC 7541), the header compression format of
//! HTTP/2, as a pair of synchronous state machines that never touch a socket.
//! You hand the decoder bytes as they arrive and the encoder a list of
//! headers; both keep their per-connection dynamic table in step with the
//! peer's.
//!
//! # Features
//!
//! - **Sans-I/O Design**: No async runtime, no transport; bytes in, bytes out
//! - **Resumable Decoding**: Header blocks may be fed in arbitrary fragments
//! - **RFC 7541 Compliant**: Static and dynamic tables, prefixed integers,
//!   canonical Huffman coding, all five header representations
//! - **Header List Limits**: Oversized header lists are truncated without
//!   desynchronizing the dynamic table
//! - **Sensitive Headers**: Never-indexed literals for credentials and cookies
//!
//! # Quick Start
//!
//! ```rust
//! use hpack_sans_io::{Header, HpackDecoder, HpackEncoder};
//!
//! let mut encoder = HpackEncoder::new();
//! let mut decoder = HpackDecoder::new();
//!
//! let headers = vec![
//!     Header::new(":method", "GET"),
//!     Header::new(":path", "/index.html"),
//!     Header::new("user-agent", "hpack-sans-io"),
//!     Header::sensitive("authorization", "Bearer secret"),
//! ];
//!
//! let block = encoder.encode(&headers);
//! let decoded = decoder.decode(&block).unwrap();
//! let truncated = decoder.end_header_block();
//!
//! assert!(!truncated);
//! assert_eq!(decoded, headers);
//! ```
//!
//! # Streaming
//!
//! The lower-level [`Decoder`] reads from any [`ByteSource`] and reports
//! headers through a callback:
//!
//! ```rust
//! use hpack_sans_io::{Decoder, DecoderConfig, InputBuffer};
//!
//! let mut decoder = Decoder::new(DecoderConfig::default());
//! let mut input = InputBuffer::new();
//! let mut names = Vec::new();
//!
//! for fragment in [&[0x82u8, 0x86][..], &[0x84][..]] {
//!     input.extend_from_slice(fragment);
//!     decoder
//!         .decode(&mut input, |name, _value, _sensitive| names.push(name))
//!         .unwrap();
//! }
//! assert!(!decoder.end_header_block());
//! assert_eq!(names, [":method", ":scheme", ":path"]);
//! ```
//!
//! # Architecture
//!
//! This crate is intentionally minimal. It provides:
//! - Header block decoding (bytes → headers)
//! - Header block encoding (headers → bytes)
//! - The tables and primitive codecs both are built from
//!
//! It does NOT provide:
//! - HTTP/2 framing (HEADERS/CONTINUATION reassembly is your responsibility)
//! - SETTINGS negotiation of the table size (configure both sides yourself)
//!
//! Every error is fatal for the connection and maps to the HTTP/2
//! `COMPRESSION_ERROR` code.

pub mod config;
pub mod decoder;
pub mod dynamic_table;
pub mod encoder;
pub mod error;
pub mod field;
pub mod hpack;
pub mod huffman;
pub mod integer;
pub mod source;
pub mod static_table;
pub mod string;
pub mod table;

pub use config::{
    DecoderConfig, EncoderConfig, HuffmanMode, DEFAULT_HEADER_TABLE_SIZE, DEFAULT_MAX_HEADER_SIZE,
};
pub use decoder::Decoder;
pub use dynamic_table::{DynamicTable, EvictionPolicy};
pub use encoder::Encoder;
pub use error::{HpackError, Result, COMPRESSION_ERROR};
pub use field::{Header, HeaderField, HEADER_ENTRY_OVERHEAD};
pub use hpack::{HpackDecoder, HpackEncoder};
pub use source::{ByteSource, InputBuffer};
pub use table::HeaderTable;
