//! The combined index space over the static and dynamic tables.
//!
//! Indexes `1..=61` address the static table and `62..` the dynamic table,
//! newest entry first.

use crate::dynamic_table::DynamicTable;
use crate::error::{HpackError, Result};
use crate::field::HeaderField;
use crate::static_table::{self, STATIC_TABLE_LEN};

#[derive(Debug)]
pub struct HeaderTable {
    dynamic: DynamicTable,
}

impl HeaderTable {
    pub fn new(capacity: usize) -> Self {
        Self::with_dynamic(DynamicTable::new(capacity))
    }

    pub fn with_dynamic(dynamic: DynamicTable) -> Self {
        Self { dynamic }
    }

    /// Resolves an index from an indexed or literal representation.
    pub fn get(&self, index: usize) -> Result<&HeaderField> {
        let field = if index <= STATIC_TABLE_LEN {
            static_table::get(index)
        } else {
            self.dynamic.get(index - STATIC_TABLE_LEN)
        };
        field.ok_or(HpackError::IllegalIndex(index))
    }

    /// Combined index of an exact match, preferring the dynamic table.
    pub fn find(&self, name: &[u8], value: &[u8]) -> Option<usize> {
        self.dynamic
            .find(name, value)
            .map(|i| i + STATIC_TABLE_LEN)
            .or_else(|| static_table::find(name, value))
    }

    /// Combined index of a name match, preferring the static table.
    pub fn find_name(&self, name: &[u8]) -> Option<usize> {
        static_table::find_name(name)
            .or_else(|| self.dynamic.find_name(name).map(|i| i + STATIC_TABLE_LEN))
    }

    pub fn dynamic(&self) -> &DynamicTable {
        &self.dynamic
    }

    pub fn dynamic_mut(&mut self) -> &mut DynamicTable {
        &mut self.dynamic
    }
}
