//! `tokio_util` codec adapter for [`FrameDecoder`].

use std::io;

use bytes::BytesMut;
use log::warn;
use tokio_util::codec::Decoder;

use super::{DecodedFrame, DecoderConfig, DecoderStats, FrameDecoder};
use crate::{buffer::StreamBuffer, frame::DecodeError};

/// Frame decoder usable with [`tokio_util::codec::FramedRead`].
///
/// Recoverable conditions are logged and decoding continues, so the stream
/// yields only complete frames. A partial frame left at end of stream is
/// reported as an [`io::ErrorKind::UnexpectedEof`] error.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use futures::StreamExt;
/// use radarframe::{
///     decoder::{DecoderConfig, RangeProfileCodec},
///     frame::FrameBuilder,
/// };
/// use tokio_util::codec::FramedRead;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bins = NonZeroUsize::new(2).expect("non-zero");
/// let bytes = FrameBuilder::new().frame_number(4).range_profile(&[7, 8]).build();
/// let mut frames = FramedRead::new(&bytes[..], RangeProfileCodec::new(DecoderConfig::new(bins)));
///
/// let frame = frames.next().await.expect("one frame").expect("decodes");
/// assert_eq!(frame.header.frame_number, 4);
/// assert!(frames.next().await.is_none());
/// # }
/// ```
#[derive(Debug)]
pub struct RangeProfileCodec {
    decoder: FrameDecoder,
    buffer: StreamBuffer,
}

impl RangeProfileCodec {
    /// Create a codec with a fresh [`FrameDecoder`].
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            decoder: FrameDecoder::new(config),
            buffer: StreamBuffer::new(),
        }
    }

    /// Counters from the wrapped decoder.
    #[must_use]
    pub fn stats(&self) -> &DecoderStats { self.decoder.stats() }

    fn take_input(&mut self, src: &mut BytesMut) {
        if !src.is_empty() {
            self.buffer.append(&src.split());
        }
    }
}

impl Decoder for RangeProfileCodec {
    type Item = DecodedFrame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.take_input(src);
        loop {
            match self.decoder.decode(&mut self.buffer) {
                Ok(frame) => return Ok(frame),
                Err(err) => warn!("{err}; continuing ({})", err.recovery().as_str()),
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.take_input(src);
        loop {
            match self.decoder.decode_eof(&mut self.buffer) {
                Ok(frame) => return Ok(frame),
                Err(err) if err.is_incomplete() => return Err(err.into()),
                Err(err) => warn!("{err}; continuing ({})", err.recovery().as_str()),
            }
        }
    }
}

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> Self {
        let kind = if err.is_incomplete() {
            io::ErrorKind::UnexpectedEof
        } else {
            io::ErrorKind::InvalidData
        };
        io::Error::new(kind, err)
    }
}
