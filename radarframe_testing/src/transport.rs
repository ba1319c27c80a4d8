//! Scripted transports.

use std::{collections::VecDeque, io};

use async_trait::async_trait;
use bytes::Bytes;
use radarframe::transport::Transport;

/// What a [`ScriptedTransport`] does once its chunks are exhausted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptEnd {
    /// Report end of stream.
    Eof,
    /// Fail with the given error kind.
    Fail(io::ErrorKind),
    /// Never return, as a quiet link would.
    Hang,
}

/// Transport returning a fixed sequence of reads.
///
/// Each read returns at most the requested size; the rest of a chunk is kept
/// for the next read.
#[derive(Debug)]
pub struct ScriptedTransport {
    chunks: VecDeque<Bytes>,
    end: ScriptEnd,
    reads: usize,
}

impl ScriptedTransport {
    /// Script that yields `chunks` in order, then `end`.
    pub fn new<I, B>(chunks: I, end: ScriptEnd) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            end,
            reads: 0,
        }
    }

    /// Split `bytes` into reads of `chunk` bytes.
    pub fn chunked(bytes: &[u8], chunk: usize, end: ScriptEnd) -> Self {
        let chunk = chunk.max(1);
        Self::new(
            bytes.chunks(chunk).map(Bytes::copy_from_slice).collect::<Vec<_>>(),
            end,
        )
    }

    /// Reads served so far.
    pub fn reads(&self) -> usize { self.reads }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn read(&mut self, max: usize) -> io::Result<Bytes> {
        self.reads += 1;
        let Some(mut chunk) = self.chunks.pop_front() else {
            return match self.end {
                ScriptEnd::Eof => Ok(Bytes::new()),
                ScriptEnd::Fail(kind) => Err(io::Error::from(kind)),
                ScriptEnd::Hang => std::future::pending().await,
            };
        };
        if chunk.len() > max {
            let rest = chunk.split_off(max);
            self.chunks.push_front(rest);
        }
        Ok(chunk)
    }
}
