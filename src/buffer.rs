//! Owned byte buffer holding unconsumed transport input.
//!
//! [`StreamBuffer`] is the only storage the decoder reads from. Bytes enter
//! at the tail via [`StreamBuffer::append`] and leave the head only through
//! [`StreamBuffer::consume`], once a parse has fully used or explicitly
//! discarded them. Consumed head storage is reclaimed by
//! [`StreamBuffer::compact`], which runs automatically after a consume once
//! enough dead space has accumulated.

use bytes::{Buf, BytesMut};
use thiserror::Error;

/// Default initial capacity (32 KiB, enough for several sensor frames).
pub const DEFAULT_BUFFER_CAPACITY: usize = 32 * 1024;

/// Consumed bytes tolerated before [`StreamBuffer::compact`] reallocates.
const COMPACT_THRESHOLD: usize = 64 * 1024;

/// Errors raised by [`StreamBuffer`] accessors.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// The requested range lies beyond the buffered bytes.
    #[error("range {offset}..{offset}+{len} outside buffer of {available} bytes")]
    OutOfRange {
        /// Requested start offset.
        offset: usize,
        /// Requested length.
        len: usize,
        /// Bytes currently buffered.
        available: usize,
    },
}

/// Growable buffer of unconsumed input bytes.
///
/// # Examples
///
/// ```
/// use radarframe::buffer::StreamBuffer;
///
/// let mut buf = StreamBuffer::new();
/// buf.append(&[1, 2, 3, 4]);
/// assert_eq!(buf.slice(1, 2).expect("in range"), &[2, 3]);
///
/// buf.consume(3).expect("in range");
/// assert_eq!(buf.as_slice(), &[4]);
/// ```
#[derive(Debug)]
pub struct StreamBuffer {
    inner: BytesMut,
    initial_capacity: usize,
    consumed_since_compact: usize,
}

impl Default for StreamBuffer {
    fn default() -> Self { Self::with_capacity(DEFAULT_BUFFER_CAPACITY) }
}

impl StreamBuffer {
    /// Create a buffer with [`DEFAULT_BUFFER_CAPACITY`].
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create a buffer with the given initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: BytesMut::with_capacity(capacity),
            initial_capacity: capacity,
            consumed_since_compact: 0,
        }
    }

    /// Append bytes at the tail.
    pub fn append(&mut self, bytes: &[u8]) { self.inner.extend_from_slice(bytes); }

    /// Drop `n` bytes from the head.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfRange`] if fewer than `n` bytes are
    /// buffered. The buffer is left untouched in that case.
    pub fn consume(&mut self, n: usize) -> Result<(), BufferError> {
        if n > self.inner.len() {
            return Err(BufferError::OutOfRange {
                offset: 0,
                len: n,
                available: self.inner.len(),
            });
        }
        self.inner.advance(n);
        self.consumed_since_compact = self.consumed_since_compact.saturating_add(n);
        if self.consumed_since_compact >= COMPACT_THRESHOLD {
            self.compact();
        }
        Ok(())
    }

    /// Borrow `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfRange`] if the range extends past the
    /// buffered bytes.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8], BufferError> {
        offset
            .checked_add(len)
            .and_then(|end| self.inner.get(offset..end))
            .ok_or(BufferError::OutOfRange {
                offset,
                len,
                available: self.inner.len(),
            })
    }

    /// Reclaim storage left behind by consumed bytes.
    ///
    /// Live bytes are moved into a fresh allocation no smaller than the
    /// initial capacity, so a burst of oversized input does not pin memory
    /// for the rest of the session.
    pub fn compact(&mut self) {
        let mut fresh = BytesMut::with_capacity(self.inner.len().max(self.initial_capacity));
        fresh.extend_from_slice(&self.inner);
        self.inner = fresh;
        self.consumed_since_compact = 0;
    }

    /// Borrow every buffered byte.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { &self.inner }

    /// Number of buffered bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.inner.len() }

    /// Whether no bytes are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.inner.is_empty() }

    /// Current allocation size.
    #[must_use]
    pub fn capacity(&self) -> usize { self.inner.capacity() }

    /// Drop every buffered byte. Used only when a session ends.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.consumed_since_compact = 0;
    }
}
