//! Byte sources the decoder reads from.
//!
//! The decoder never blocks. It asks the source how many bytes are available,
//! and when a step needs more than that it returns and waits to be called
//! again with more bytes appended. Multi-byte integers are read speculatively
//! under a [`ByteSource::mark`] and rolled back with [`ByteSource::reset`] if
//! the source runs dry halfway through.

use bytes::{Buf, Bytes, BytesMut};

/// A sequential, non-blocking byte source with a one-level mark.
pub trait ByteSource {
    /// Number of bytes that can be read right now.
    fn available(&self) -> usize;

    /// Reads one byte, or `None` if nothing is available.
    fn read_u8(&mut self) -> Option<u8>;

    /// Reads exactly `len` bytes, or nothing at all if fewer are available.
    fn read_bytes(&mut self, len: usize) -> Option<Bytes>;

    /// Discards up to `len` bytes and returns how many were discarded.
    fn skip(&mut self, len: usize) -> usize;

    /// Remembers the current read position. A later mark replaces it.
    ///
    /// Bytes before the mark are never read again; the decoder marks on every
    /// return so sources may release them.
    fn mark(&mut self);

    /// Rewinds to the last mark.
    fn reset(&mut self);
}

/// Growable in-memory [`ByteSource`].
///
/// Bytes are appended with [`InputBuffer::extend_from_slice`] as they arrive
/// from the transport; consumed bytes up to the mark are dropped on the next
/// append.
#[derive(Debug, Default, Clone)]
pub struct InputBuffer {
    buf: BytesMut,
    pos: usize,
    mark: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes behind any unread ones.
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.compact();
        self.buf.extend_from_slice(data);
    }

    /// Unread bytes.
    pub fn len(&self) -> usize {
        self.available()
    }

    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Drops every unread byte.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.pos = 0;
        self.mark = 0;
    }

    // Bytes behind the mark are kept so a reset still works after an append.
    // The mark never runs ahead of the read position.
    fn compact(&mut self) {
        if self.mark > 0 {
            self.buf.advance(self.mark);
            self.pos -= self.mark;
            self.mark = 0;
        }
    }
}

impl From<&[u8]> for InputBuffer {
    fn from(data: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(data),
            pos: 0,
            mark: 0,
        }
    }
}

impl ByteSource for InputBuffer {
    fn available(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        let b = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn read_bytes(&mut self, len: usize) -> Option<Bytes> {
        if self.available() < len {
            return None;
        }
        let bytes = Bytes::copy_from_slice(&self.buf[self.pos..self.pos + len]);
        self.pos += len;
        Some(bytes)
    }

    fn skip(&mut self, len: usize) -> usize {
        let n = len.min(self.available());
        self.pos += n;
        n
    }

    fn mark(&mut self) {
        self.mark = self.pos;
    }

    fn reset(&mut self) {
        self.pos = self.mark;
    }
}
