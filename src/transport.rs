//! Byte source abstraction for acquisition.
//!
//! Anything implementing [`tokio::io::AsyncRead`] is a [`Transport`]: TCP
//! serial bridges, device nodes opened as files, recorded captures, or an
//! in-memory [`tokio::io::duplex`] pipe in tests.

use std::io;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Source of raw sensor bytes.
#[async_trait]
pub trait Transport: Send {
    /// Read up to `max` bytes.
    ///
    /// An empty result means the transport has closed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the read fails.
    async fn read(&mut self, max: usize) -> io::Result<Bytes>;
}

#[async_trait]
impl<T> Transport for T
where
    T: AsyncRead + Unpin + Send,
{
    async fn read(&mut self, max: usize) -> io::Result<Bytes> {
        let mut chunk = BytesMut::zeroed(max.max(1));
        let n = AsyncReadExt::read(self, &mut chunk).await?;
        chunk.truncate(n);
        Ok(chunk.freeze())
    }
}
