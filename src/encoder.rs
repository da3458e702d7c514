//! Header block encoder (RFC 7541 Section 6).
//!
//! The encoder mirrors the peer decoder's dynamic table: every literal it
//! sends with incremental indexing is inserted locally under the same
//! eviction rules, so indexes it emits later resolve to the same entries on
//! the other side.

use bytes::{BufMut, Bytes};
use tracing::debug;

use crate::config::{EncoderConfig, HuffmanMode};
use crate::dynamic_table::{DynamicTable, EvictionPolicy};
use crate::field::{size_of, Header, HeaderField};
use crate::integer::encode_integer;
use crate::static_table;
use crate::string::encode_string;
use crate::table::HeaderTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Literal {
    Incremental,
    WithoutIndexing,
    NeverIndexed,
}

impl Literal {
    fn mask(self) -> u8 {
        match self {
            Literal::Incremental => 0x40,
            Literal::WithoutIndexing => 0x00,
            Literal::NeverIndexed => 0x10,
        }
    }

    fn prefix_bits(self) -> u8 {
        match self {
            Literal::Incremental => 6,
            Literal::WithoutIndexing | Literal::NeverIndexed => 4,
        }
    }
}

/// A stateful HPACK encoder for one direction of one connection.
#[derive(Debug)]
pub struct Encoder {
    table: HeaderTable,
    use_indexing: bool,
    huffman: HuffmanMode,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default())
    }
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            table: HeaderTable::new(config.max_header_table_size),
            use_indexing: config.use_indexing,
            huffman: config.huffman,
        }
    }

    /// Encodes every header in order.
    pub fn encode<B: BufMut>(&mut self, dst: &mut B, headers: &[Header]) {
        for header in headers {
            self.encode_header(dst, &header.name, &header.value, header.sensitive);
        }
    }

    /// Encodes one header field.
    ///
    /// Sensitive fields are always sent as never-indexed literals and are
    /// never added to the dynamic table.
    ///
    /// `name` must not be empty: decoders reject a zero-length literal name.
    pub fn encode_header<B: BufMut>(&mut self, dst: &mut B, name: &[u8], value: &[u8], sensitive: bool) {
        debug_assert!(!name.is_empty(), "header name must not be empty");

        if sensitive {
            let name_index = self.table.find_name(name);
            self.encode_literal(dst, name, value, Literal::NeverIndexed, name_index);
            return;
        }

        let capacity = self.table.dynamic().capacity();
        if capacity == 0 {
            match static_table::find(name, value) {
                Some(index) => encode_integer(dst, 0x80, 7, index),
                None => {
                    let name_index = static_table::find_name(name);
                    self.encode_literal(dst, name, value, Literal::WithoutIndexing, name_index);
                }
            }
            return;
        }

        if size_of(name, value) > capacity {
            let name_index = self.table.find_name(name);
            self.encode_literal(dst, name, value, Literal::WithoutIndexing, name_index);
            return;
        }

        if let Some(index) = self.table.find(name, value) {
            encode_integer(dst, 0x80, 7, index);
            return;
        }

        let name_index = self.table.find_name(name);
        if self.use_indexing {
            self.encode_literal(dst, name, value, Literal::Incremental, name_index);
            self.table.dynamic_mut().add(HeaderField::new(
                Bytes::copy_from_slice(name),
                Bytes::copy_from_slice(value),
            ));
        } else {
            self.encode_literal(dst, name, value, Literal::WithoutIndexing, name_index);
        }
    }

    /// Changes the dynamic table capacity and signals it to the peer with a
    /// dynamic table size update.
    ///
    /// Must be called between header blocks; the update is written as the
    /// first representation of the next block.
    pub fn set_max_header_table_size<B: BufMut>(&mut self, dst: &mut B, size: usize) {
        debug!(size, "encoder dynamic table size update");
        self.table.dynamic_mut().set_capacity(size);
        encode_integer(dst, 0x20, 5, size);
    }

    pub fn max_header_table_size(&self) -> usize {
        self.table.dynamic().capacity()
    }

    pub fn dynamic_table(&self) -> &DynamicTable {
        self.table.dynamic()
    }

    pub fn set_eviction_policy(&mut self, policy: EvictionPolicy) {
        self.table.dynamic_mut().set_policy(policy);
    }

    fn encode_literal<B: BufMut>(
        &self,
        dst: &mut B,
        name: &[u8],
        value: &[u8],
        literal: Literal,
        name_index: Option<usize>,
    ) {
        encode_integer(dst, literal.mask(), literal.prefix_bits(), name_index.unwrap_or(0));
        if name_index.is_none() {
            encode_string(dst, name, self.huffman);
        }
        encode_string(dst, value, self.huffman);
    }
}
