//! The predefined static table (RFC 7541 Appendix A).
//!
//! Indexes are 1-based and occupy the start of the combined index space.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::field::HeaderField;

/// Number of static table entries.
pub const STATIC_TABLE_LEN: usize = 61;

static ENTRIES: [HeaderField; STATIC_TABLE_LEN] = [
    HeaderField::from_static(":authority", ""),
    HeaderField::from_static(":method", "GET"),
    HeaderField::from_static(":method", "POST"),
    HeaderField::from_static(":path", "/"),
    HeaderField::from_static(":path", "/index.html"),
    HeaderField::from_static(":scheme", "http"),
    HeaderField::from_static(":scheme", "https"),
    HeaderField::from_static(":status", "200"),
    HeaderField::from_static(":status", "204"),
    HeaderField::from_static(":status", "206"),
    HeaderField::from_static(":status", "304"),
    HeaderField::from_static(":status", "400"),
    HeaderField::from_static(":status", "404"),
    HeaderField::from_static(":status", "500"),
    HeaderField::from_static("accept-charset", ""),
    HeaderField::from_static("accept-encoding", "gzip, deflate"),
    HeaderField::from_static("accept-language", ""),
    HeaderField::from_static("accept-ranges", ""),
    HeaderField::from_static("accept", ""),
    HeaderField::from_static("access-control-allow-origin", ""),
    HeaderField::from_static("age", ""),
    HeaderField::from_static("allow", ""),
    HeaderField::from_static("authorization", ""),
    HeaderField::from_static("cache-control", ""),
    HeaderField::from_static("content-disposition", ""),
    HeaderField::from_static("content-encoding", ""),
    HeaderField::from_static("content-language", ""),
    HeaderField::from_static("content-length", ""),
    HeaderField::from_static("content-location", ""),
    HeaderField::from_static("content-range", ""),
    HeaderField::from_static("content-type", ""),
    HeaderField::from_static("cookie", ""),
    HeaderField::from_static("date", ""),
    HeaderField::from_static("etag", ""),
    HeaderField::from_static("expect", ""),
    HeaderField::from_static("expires", ""),
    HeaderField::from_static("from", ""),
    HeaderField::from_static("host", ""),
    HeaderField::from_static("if-match", ""),
    HeaderField::from_static("if-modified-since", ""),
    HeaderField::from_static("if-none-match", ""),
    HeaderField::from_static("if-range", ""),
    HeaderField::from_static("if-unmodified-since", ""),
    HeaderField::from_static("last-modified", ""),
    HeaderField::from_static("link", ""),
    HeaderField::from_static("location", ""),
    HeaderField::from_static("max-forwards", ""),
    HeaderField::from_static("proxy-authenticate", ""),
    HeaderField::from_static("proxy-authorization", ""),
    HeaderField::from_static("range", ""),
    HeaderField::from_static("referer", ""),
    HeaderField::from_static("refresh", ""),
    HeaderField::from_static("retry-after", ""),
    HeaderField::from_static("server", ""),
    HeaderField::from_static("set-cookie", ""),
    HeaderField::from_static("strict-transport-security", ""),
    HeaderField::from_static("transfer-encoding", ""),
    HeaderField::from_static("user-agent", ""),
    HeaderField::from_static("vary", ""),
    HeaderField::from_static("via", ""),
    HeaderField::from_static("www-authenticate", ""),
];

static INDEX_BY_NAME: OnceLock<HashMap<&'static [u8], usize>> = OnceLock::new();

// Entries sharing a name are contiguous, so the lowest index of a name is
// where a name+value scan starts.
fn index_by_name() -> &'static HashMap<&'static [u8], usize> {
    INDEX_BY_NAME.get_or_init(|| {
        let mut map = HashMap::with_capacity(STATIC_TABLE_LEN);
        for (i, field) in ENTRIES.iter().enumerate() {
            map.entry(&field.name[..]).or_insert(i + 1);
        }
        map
    })
}

/// Entry at 1-based `index`.
pub fn get(index: usize) -> Option<&'static HeaderField> {
    index.checked_sub(1).and_then(|i| ENTRIES.get(i))
}

/// Lowest index whose name is `name`.
pub fn find_name(name: &[u8]) -> Option<usize> {
    index_by_name().get(name).copied()
}

/// Index of the entry matching both `name` and `value`.
pub fn find(name: &[u8], value: &[u8]) -> Option<usize> {
    let first = find_name(name)?;
    ENTRIES[first - 1..]
        .iter()
        .take_while(|field| field.name == name)
        .position(|field| field.value == value)
        .map(|offset| first + offset)
}
