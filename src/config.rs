//! Encoder and decoder configuration.
//!
//! Both peers must agree on `max_header_table_size` out of band (in HTTP/2,
//! via `SETTINGS_HEADER_TABLE_SIZE`); the codec itself never negotiates it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Initial dynamic table capacity for an HTTP/2 connection.
pub const DEFAULT_HEADER_TABLE_SIZE: usize = 4096;

/// Default cap on the sum of name and value lengths in one header block.
pub const DEFAULT_MAX_HEADER_SIZE: usize = 8192;

/// When string literals are Huffman coded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HuffmanMode {
    /// Use whichever of raw and Huffman is shorter (raw on a tie).
    #[default]
    Auto,
    /// Always Huffman code.
    Always,
    /// Never Huffman code.
    Never,
}

/// Decoder-side settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecoderConfig {
    /// Upper bound for `name.len() + value.len()` summed over a header block.
    /// Exceeding it truncates the block instead of failing it.
    pub max_header_size: usize,
    /// Dynamic table capacity, and the largest size the peer may request
    /// through a dynamic table size update.
    pub max_header_table_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            max_header_table_size: DEFAULT_HEADER_TABLE_SIZE,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_header_size(mut self, max_header_size: usize) -> Self {
        self.max_header_size = max_header_size;
        self
    }

    pub fn with_max_header_table_size(mut self, max_header_table_size: usize) -> Self {
        self.max_header_table_size = max_header_table_size;
        self
    }
}

/// Encoder-side settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncoderConfig {
    /// Dynamic table capacity.
    pub max_header_table_size: usize,
    /// Insert new literals into the dynamic table (incremental indexing).
    /// When off, literals are sent without indexing.
    pub use_indexing: bool,
    pub huffman: HuffmanMode,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_header_table_size: DEFAULT_HEADER_TABLE_SIZE,
            use_indexing: true,
            huffman: HuffmanMode::Auto,
        }
    }
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_header_table_size(mut self, max_header_table_size: usize) -> Self {
        self.max_header_table_size = max_header_table_size;
        self
    }

    pub fn with_indexing(mut self, use_indexing: bool) -> Self {
        self.use_indexing = use_indexing;
        self
    }

    pub fn with_huffman(mut self, huffman: HuffmanMode) -> Self {
        self.huffman = huffman;
        self
    }
}
