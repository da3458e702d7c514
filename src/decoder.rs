//! Resumable header block decoder (RFC 7541 Section 6).
//!
//! The decoder is a state machine fed from a [`ByteSource`]. Each call decodes
//! as many representations as the available bytes allow and keeps any partial
//! representation in its own state; a step that needs more bytes than are
//! available consumes nothing. Callers append bytes and call again, then call
//! [`Decoder::end_header_block`] once the whole block has been fed.

use bytes::Bytes;
use tracing::debug;

use crate::config::DecoderConfig;
use crate::dynamic_table::{DynamicTable, EvictionPolicy};
use crate::error::{HpackError, Result};
use crate::field::{HeaderField, HEADER_ENTRY_OVERHEAD};
use crate::integer::decode_continuation;
use crate::source::ByteSource;
use crate::string::read_string;
use crate::table::HeaderTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadHeaderRepresentation,
    ReadMaxDynamicTableSize,
    ReadIndexedHeader,
    ReadIndexedHeaderName,
    ReadLiteralHeaderNameLengthPrefix,
    ReadLiteralHeaderNameLength,
    ReadLiteralHeaderName,
    SkipLiteralHeaderName,
    ReadLiteralHeaderValueLengthPrefix,
    ReadLiteralHeaderValueLength,
    ReadLiteralHeaderValue,
    SkipLiteralHeaderValue,
}

/// How a literal representation interacts with the dynamic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexType {
    Incremental,
    None,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Continue,
    NeedMore,
}

/// Running `name.len() + value.len()` total for the current header block.
///
/// Once the limit is crossed the total is pinned above it, so every later
/// check also fails and the block reports as truncated.
#[derive(Debug)]
struct HeaderListSize {
    max: usize,
    size: usize,
}

impl HeaderListSize {
    fn new(max: usize) -> Self {
        Self { max, size: 0 }
    }

    fn exceeds(&mut self, len: usize) -> bool {
        if self.size.saturating_add(len) <= self.max {
            return false;
        }
        self.size = self.max.saturating_add(1);
        true
    }

    /// Accounts for an emitted header; false if it no longer fits.
    fn add(&mut self, name_len: usize, value_len: usize) -> bool {
        let size = self.size.saturating_add(name_len).saturating_add(value_len);
        if size <= self.max {
            self.size = size;
            true
        } else {
            self.size = self.max.saturating_add(1);
            false
        }
    }

    fn is_truncated(&self) -> bool {
        self.size > self.max
    }

    fn reset(&mut self) {
        self.size = 0;
    }
}

/// A stateful HPACK decoder for one direction of one connection.
#[derive(Debug)]
pub struct Decoder {
    table: HeaderTable,
    list_size: HeaderListSize,
    max_header_table_size: usize,

    state: State,
    index_type: IndexType,
    /// Prefix value of the representation being read.
    index: usize,
    huffman: bool,
    /// Name of the literal being read; empty while its name is skipped.
    name: Bytes,
    name_length: usize,
    value_length: usize,
    skip_length: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            table: HeaderTable::new(config.max_header_table_size),
            list_size: HeaderListSize::new(config.max_header_size),
            max_header_table_size: config.max_header_table_size,
            state: State::ReadHeaderRepresentation,
            index_type: IndexType::None,
            index: 0,
            huffman: false,
            name: Bytes::new(),
            name_length: 0,
            value_length: 0,
            skip_length: 0,
        }
    }

    /// Decodes every complete representation available in `src`.
    ///
    /// `on_header` receives `(name, value, sensitive)` for each header, in
    /// order. Returns `Ok(())` when the source is drained or the next step
    /// needs more bytes. Any error is fatal for the connection.
    pub fn decode<S, F>(&mut self, src: &mut S, mut on_header: F) -> Result<()>
    where
        S: ByteSource,
        F: FnMut(Bytes, Bytes, bool),
    {
        let result = self.run(src, &mut on_header);
        src.mark();
        result
    }

    fn run<S, F>(&mut self, src: &mut S, on_header: &mut F) -> Result<()>
    where
        S: ByteSource,
        F: FnMut(Bytes, Bytes, bool),
    {
        while src.available() > 0 {
            let progress = match self.state {
                State::ReadHeaderRepresentation => self.read_header_representation(src, on_header)?,
                State::ReadMaxDynamicTableSize => self.read_max_dynamic_table_size(src)?,
                State::ReadIndexedHeader => self.read_indexed_header(src, on_header)?,
                State::ReadIndexedHeaderName => self.read_indexed_header_name(src)?,
                State::ReadLiteralHeaderNameLengthPrefix => self.read_name_length_prefix(src)?,
                State::ReadLiteralHeaderNameLength => self.read_name_length(src)?,
                State::ReadLiteralHeaderName => self.read_name(src)?,
                State::SkipLiteralHeaderName => self.skip_name(src),
                State::ReadLiteralHeaderValueLengthPrefix => {
                    self.read_value_length_prefix(src, on_header)?
                }
                State::ReadLiteralHeaderValueLength => self.read_value_length(src, on_header)?,
                State::ReadLiteralHeaderValue => self.read_value(src, on_header)?,
                State::SkipLiteralHeaderValue => self.skip_value(src),
            };
            if progress == Progress::NeedMore {
                break;
            }
        }
        Ok(())
    }

    /// Ends the current header block and reports whether it was truncated
    /// for exceeding the configured maximum header size.
    ///
    /// Truncation is a policy signal, not a protocol error; the dynamic table
    /// is still in sync with the peer.
    ///
    /// A representation still in progress is discarded; check
    /// [`Decoder::has_partial_representation`] first to detect a block that
    /// ended early.
    pub fn end_header_block(&mut self) -> bool {
        let truncated = self.list_size.is_truncated();
        if truncated {
            debug!(max_header_size = self.list_size.max, "header list truncated");
        }
        if self.has_partial_representation() {
            debug!(state = ?self.state, "header block ended inside a representation");
        }
        self.list_size.reset();
        self.state = State::ReadHeaderRepresentation;
        self.index_type = IndexType::None;
        self.name = Bytes::new();
        truncated
    }

    /// Whether a representation has been started but not finished.
    ///
    /// Bytes the source still holds are not counted; a partial integer is
    /// left unread there.
    pub fn has_partial_representation(&self) -> bool {
        self.state != State::ReadHeaderRepresentation
    }

    /// Sets the dynamic table capacity, as a size update from the peer would.
    pub fn set_max_dynamic_table_size(&mut self, size: usize) -> Result<()> {
        if size > self.max_header_table_size {
            return Err(HpackError::InvalidCapacity {
                requested: size,
                max: self.max_header_table_size,
            });
        }
        debug!(size, "dynamic table size update");
        self.table.dynamic_mut().set_capacity(size);
        Ok(())
    }

    /// Changes the largest capacity the peer may select, shrinking the table
    /// now if it is currently larger.
    ///
    /// In HTTP/2 this follows our own `SETTINGS_HEADER_TABLE_SIZE` once the
    /// peer has acknowledged it.
    pub fn set_max_header_table_size(&mut self, max: usize) {
        self.max_header_table_size = max;
        if self.table.dynamic().capacity() > max {
            self.table.dynamic_mut().set_capacity(max);
        }
    }

    pub fn max_header_table_size(&self) -> usize {
        self.max_header_table_size
    }

    pub fn max_header_size(&self) -> usize {
        self.list_size.max
    }

    pub fn dynamic_table(&self) -> &DynamicTable {
        self.table.dynamic()
    }

    pub fn set_eviction_policy(&mut self, policy: EvictionPolicy) {
        self.table.dynamic_mut().set_policy(policy);
    }

    fn read_header_representation<S, F>(&mut self, src: &mut S, on_header: &mut F) -> Result<Progress>
    where
        S: ByteSource,
        F: FnMut(Bytes, Bytes, bool),
    {
        let Some(b) = src.read_u8() else {
            return Ok(Progress::NeedMore);
        };

        if b & 0x80 != 0 {
            // Indexed Header Field
            self.index = (b & 0x7F) as usize;
            match self.index {
                0 => return Err(HpackError::IllegalIndex(0)),
                0x7F => self.state = State::ReadIndexedHeader,
                index => self.indexed_header(index, on_header)?,
            }
        } else if b & 0x40 != 0 {
            // Literal Header Field with Incremental Indexing
            self.index_type = IndexType::Incremental;
            self.index = (b & 0x3F) as usize;
            self.literal_name_index(0x3F)?;
        } else if b & 0x20 != 0 {
            // Dynamic Table Size Update
            self.index = (b & 0x1F) as usize;
            if self.index == 0x1F {
                self.state = State::ReadMaxDynamicTableSize;
            } else {
                self.set_max_dynamic_table_size(self.index)?;
                self.state = State::ReadHeaderRepresentation;
            }
        } else {
            // Literal Header Field Never Indexed / without Indexing
            self.index_type = if b & 0x10 != 0 {
                IndexType::Never
            } else {
                IndexType::None
            };
            self.index = (b & 0x0F) as usize;
            self.literal_name_index(0x0F)?;
        }
        Ok(Progress::Continue)
    }

    fn literal_name_index(&mut self, prefix_max: usize) -> Result<()> {
        if self.index == 0 {
            self.state = State::ReadLiteralHeaderNameLengthPrefix;
        } else if self.index == prefix_max {
            self.state = State::ReadIndexedHeaderName;
        } else {
            self.name = self.table.get(self.index)?.name.clone();
            self.state = State::ReadLiteralHeaderValueLengthPrefix;
        }
        Ok(())
    }

    fn read_max_dynamic_table_size<S: ByteSource>(&mut self, src: &mut S) -> Result<Progress> {
        let Some(rest) = decode_continuation(src)? else {
            return Ok(Progress::NeedMore);
        };
        self.set_max_dynamic_table_size(self.index + rest)?;
        self.state = State::ReadHeaderRepresentation;
        Ok(Progress::Continue)
    }

    fn read_indexed_header<S, F>(&mut self, src: &mut S, on_header: &mut F) -> Result<Progress>
    where
        S: ByteSource,
        F: FnMut(Bytes, Bytes, bool),
    {
        let Some(rest) = decode_continuation(src)? else {
            return Ok(Progress::NeedMore);
        };
        self.indexed_header(self.index + rest, on_header)?;
        Ok(Progress::Continue)
    }

    fn indexed_header<F>(&mut self, index: usize, on_header: &mut F) -> Result<()>
    where
        F: FnMut(Bytes, Bytes, bool),
    {
        let field = self.table.get(index)?;
        if self.list_size.add(field.name.len(), field.value.len()) {
            on_header(field.name.clone(), field.value.clone(), false);
        }
        self.state = State::ReadHeaderRepresentation;
        Ok(())
    }

    fn read_indexed_header_name<S: ByteSource>(&mut self, src: &mut S) -> Result<Progress> {
        let Some(rest) = decode_continuation(src)? else {
            return Ok(Progress::NeedMore);
        };
        self.name = self.table.get(self.index + rest)?.name.clone();
        self.state = State::ReadLiteralHeaderValueLengthPrefix;
        Ok(Progress::Continue)
    }

    fn read_name_length_prefix<S: ByteSource>(&mut self, src: &mut S) -> Result<Progress> {
        let Some(b) = src.read_u8() else {
            return Ok(Progress::NeedMore);
        };
        self.huffman = b & 0x80 != 0;
        self.index = (b & 0x7F) as usize;
        if self.index == 0x7F {
            self.state = State::ReadLiteralHeaderNameLength;
        } else {
            self.name_length = self.index;
            self.name_length_known()?;
        }
        Ok(Progress::Continue)
    }

    fn read_name_length<S: ByteSource>(&mut self, src: &mut S) -> Result<Progress> {
        let Some(rest) = decode_continuation(src)? else {
            return Ok(Progress::NeedMore);
        };
        self.name_length = self.index + rest;
        self.name_length_known()?;
        Ok(Progress::Continue)
    }

    fn name_length_known(&mut self) -> Result<()> {
        if self.name_length == 0 {
            return Err(HpackError::EmptyName);
        }

        // An over-budget name is only needed when the entry may still be
        // inserted into the dynamic table.
        let len = min_decoded_len(self.name_length, self.huffman);
        if self.list_size.exceeds(len) && !self.must_index(len) {
            self.name = Bytes::new();
            self.skip_length = self.name_length;
            self.state = State::SkipLiteralHeaderName;
        } else {
            self.state = State::ReadLiteralHeaderName;
        }
        Ok(())
    }

    fn read_name<S: ByteSource>(&mut self, src: &mut S) -> Result<Progress> {
        let Some(name) = read_string(src, self.name_length, self.huffman)? else {
            return Ok(Progress::NeedMore);
        };
        if name.is_empty() {
            return Err(HpackError::EmptyName);
        }
        self.name = name;
        self.state = State::ReadLiteralHeaderValueLengthPrefix;
        Ok(Progress::Continue)
    }

    fn skip_name<S: ByteSource>(&mut self, src: &mut S) -> Progress {
        self.skip_length -= src.skip(self.skip_length);
        if self.skip_length > 0 {
            return Progress::NeedMore;
        }
        self.state = State::ReadLiteralHeaderValueLengthPrefix;
        Progress::Continue
    }

    fn read_value_length_prefix<S, F>(&mut self, src: &mut S, on_header: &mut F) -> Result<Progress>
    where
        S: ByteSource,
        F: FnMut(Bytes, Bytes, bool),
    {
        let Some(b) = src.read_u8() else {
            return Ok(Progress::NeedMore);
        };
        self.huffman = b & 0x80 != 0;
        self.index = (b & 0x7F) as usize;
        if self.index == 0x7F {
            self.state = State::ReadLiteralHeaderValueLength;
        } else {
            self.value_length = self.index;
            self.value_length_known(on_header)?;
        }
        Ok(Progress::Continue)
    }

    fn read_value_length<S, F>(&mut self, src: &mut S, on_header: &mut F) -> Result<Progress>
    where
        S: ByteSource,
        F: FnMut(Bytes, Bytes, bool),
    {
        let Some(rest) = decode_continuation(src)? else {
            return Ok(Progress::NeedMore);
        };
        self.value_length = self.index + rest;
        self.value_length_known(on_header)?;
        Ok(Progress::Continue)
    }

    fn value_length_known<F>(&mut self, on_header: &mut F) -> Result<()>
    where
        F: FnMut(Bytes, Bytes, bool),
    {
        let skip = if self.name.is_empty() {
            true
        } else {
            let len = self.name.len() + min_decoded_len(self.value_length, self.huffman);
            self.list_size.exceeds(len) && !self.must_index(len)
        };

        if skip {
            self.skip_length = self.value_length;
            self.state = if self.skip_length == 0 {
                State::ReadHeaderRepresentation
            } else {
                State::SkipLiteralHeaderValue
            };
        } else if self.value_length == 0 {
            let name = std::mem::take(&mut self.name);
            self.insert_header(name, Bytes::new(), on_header);
        } else {
            self.state = State::ReadLiteralHeaderValue;
        }
        Ok(())
    }

    fn read_value<S, F>(&mut self, src: &mut S, on_header: &mut F) -> Result<Progress>
    where
        S: ByteSource,
        F: FnMut(Bytes, Bytes, bool),
    {
        let Some(value) = read_string(src, self.value_length, self.huffman)? else {
            return Ok(Progress::NeedMore);
        };
        let name = std::mem::take(&mut self.name);
        self.insert_header(name, value, on_header);
        Ok(Progress::Continue)
    }

    fn skip_value<S: ByteSource>(&mut self, src: &mut S) -> Progress {
        self.skip_length -= src.skip(self.skip_length);
        if self.skip_length > 0 {
            return Progress::NeedMore;
        }
        self.state = State::ReadHeaderRepresentation;
        Progress::Continue
    }

    /// Whether an over-budget literal of at least `len` decoded bytes still
    /// has to be decoded because the peer inserts it into its dynamic table.
    ///
    /// An entry larger than the table empties it on both sides, so the
    /// decoder clears its own table and skips the payload. When `len` is only
    /// a lower bound the payload is decoded, and [`DynamicTable::add`] clears
    /// the table if the real entry turns out too large.
    fn must_index(&mut self, len: usize) -> bool {
        if self.index_type != IndexType::Incremental {
            return false;
        }
        let capacity = self.table.dynamic().capacity();
        if len + HEADER_ENTRY_OVERHEAD > capacity {
            debug!(len, capacity, "oversized literal, clearing dynamic table");
            self.table.dynamic_mut().clear();
            return false;
        }
        true
    }

    fn insert_header<F>(&mut self, name: Bytes, value: Bytes, on_header: &mut F)
    where
        F: FnMut(Bytes, Bytes, bool),
    {
        if self.list_size.add(name.len(), value.len()) {
            on_header(name.clone(), value.clone(), self.index_type == IndexType::Never);
        }
        if self.index_type == IndexType::Incremental {
            self.table.dynamic_mut().add(HeaderField::new(name, value));
        }
        self.state = State::ReadHeaderRepresentation;
    }
}

/// Fewest bytes a string literal of `len` wire bytes can decode to.
///
/// Huffman codes are 5 to 30 bits long, so a coded string may be longer on
/// the wire than decoded.
fn min_decoded_len(len: usize, huffman: bool) -> usize {
    if huffman {
        len.saturating_mul(8) / 30
    } else {
        len
    }
}
