//! HPACK: Header Compression for HTTP/2 (RFC 7541)
//!
//! Block-level wrappers over [`Decoder`] and [`Encoder`] for callers that
//! hold whole header blocks (or fragments of them) as byte slices.

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::config::{DecoderConfig, EncoderConfig};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::field::Header;
use crate::source::InputBuffer;

/// HPACK decoder for HTTP/2 header blocks.
///
/// Owns the per-connection dynamic table and buffers any incomplete
/// representation until the next call.
pub struct HpackDecoder {
    decoder: Decoder,
    input: InputBuffer,
}

impl std::fmt::Debug for HpackDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HpackDecoder")
            .field("buffered", &self.input.len())
            .field("table_size", &self.decoder.dynamic_table().size())
            .finish()
    }
}

impl Default for HpackDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackDecoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            decoder: Decoder::new(config),
            input: InputBuffer::new(),
        }
    }

    /// Decode a header block fragment, returning the headers it completed.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<Header>> {
        self.input.extend_from_slice(data);
        let mut headers = Vec::new();
        self.decoder.decode(&mut self.input, |name, value, sensitive| {
            headers.push(Header { name, value, sensitive });
        })?;
        Ok(headers)
    }

    /// Finish the current header block. Returns true if headers were dropped
    /// for exceeding the maximum header list size.
    ///
    /// Bytes of an unfinished representation are discarded; see
    /// [`HpackDecoder::has_partial_representation`].
    pub fn end_header_block(&mut self) -> bool {
        if !self.input.is_empty() {
            debug!(buffered = self.input.len(), "discarding unfinished header block bytes");
        }
        self.input.clear();
        self.decoder.end_header_block()
    }

    /// Whether the block so far stops partway through a representation.
    pub fn has_partial_representation(&self) -> bool {
        !self.input.is_empty() || self.decoder.has_partial_representation()
    }

    /// Number of bytes held back as an incomplete representation.
    pub fn buffered(&self) -> usize {
        self.input.len()
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut Decoder {
        &mut self.decoder
    }
}

/// HPACK encoder for HTTP/2 header blocks.
pub struct HpackEncoder {
    encoder: Encoder,
    /// Smallest and latest capacity requested since the last block.
    pending_size_update: Option<(usize, usize)>,
}

impl std::fmt::Debug for HpackEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HpackEncoder")
            .field("table_size", &self.encoder.dynamic_table().size())
            .field("pending_size_update", &self.pending_size_update)
            .finish()
    }
}

impl Default for HpackEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackEncoder {
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    pub fn with_config(config: EncoderConfig) -> Self {
        Self {
            encoder: Encoder::new(config),
            pending_size_update: None,
        }
    }

    /// Encode headers into an HPACK header block.
    pub fn encode(&mut self, headers: &[Header]) -> Bytes {
        let mut dst = BytesMut::new();
        if let Some((smallest, latest)) = self.pending_size_update.take() {
            // RFC 7541 Section 4.2: signal the smallest size first so the
            // peer evicts what we evicted.
            if smallest < latest {
                self.encoder.set_max_header_table_size(&mut dst, smallest);
            }
            self.encoder.set_max_header_table_size(&mut dst, latest);
        }
        self.encoder.encode(&mut dst, headers);
        dst.freeze()
    }

    /// Change the dynamic table capacity. The size update is sent at the
    /// start of the next encoded block.
    pub fn set_max_header_table_size(&mut self, size: usize) {
        self.pending_size_update = Some(match self.pending_size_update {
            Some((smallest, _)) => (smallest.min(size), size),
            None => (size, size),
        });
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn encoder_mut(&mut self) -> &mut Encoder {
        &mut self.encoder
    }
}

// ============================================================================
// Tests
// ============================================================================
