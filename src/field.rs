//! Header field types.

use std::fmt;

use bytes::Bytes;

/// Per-entry overhead added to `name.len() + value.len()` when sizing table
/// entries (RFC 7541 Section 4.1).
pub const HEADER_ENTRY_OVERHEAD: usize = 32;

/// Table size of a name/value pair.
pub fn size_of(name: &[u8], value: &[u8]) -> usize {
    name.len() + value.len() + HEADER_ENTRY_OVERHEAD
}

/// An immutable name/value pair as stored in the static and dynamic tables.
///
/// Ordering and equality are byte-wise, name first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeaderField {
    pub name: Bytes,
    pub value: Bytes,
}

impl HeaderField {
    pub fn new(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub(crate) const fn from_static(name: &'static str, value: &'static str) -> Self {
        Self {
            name: Bytes::from_static(name.as_bytes()),
            value: Bytes::from_static(value.as_bytes()),
        }
    }

    /// Size of this entry in a header table.
    pub fn size(&self) -> usize {
        size_of(&self.name, &self.value)
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            String::from_utf8_lossy(&self.name),
            String::from_utf8_lossy(&self.value)
        )
    }
}

/// A header as seen by users of the codec: a field plus its sensitivity.
///
/// Sensitive headers are sent as "never indexed" literals and are never
/// inserted into either peer's dynamic table. Names must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: Bytes,
    pub value: Bytes,
    pub sensitive: bool,
}

impl Header {
    pub fn new(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            sensitive: false,
        }
    }

    /// A header that must never be indexed (e.g. `authorization`, cookies).
    pub fn sensitive(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            sensitive: true,
        }
    }

    /// Name as UTF-8, replacing invalid sequences.
    pub fn name_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Value as UTF-8, replacing invalid sequences.
    pub fn value_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }
}

impl From<HeaderField> for Header {
    fn from(field: HeaderField) -> Self {
        Header::new(field.name, field.value)
    }
}
