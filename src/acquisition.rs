//! Acquisition loop.
//!
//! [`Acquisition`] owns the [`StreamBuffer`] and [`FrameDecoder`] for one
//! session. It reads the transport, decodes every complete frame, and
//! publishes each range profile to the shared [`FrameChannel`].
//!
//! The loop ends in one of two ways:
//!
//! - **Cancellation**: intake stops, any partially received frame is dropped
//!   (never force-completed), the archive is flushed to the sink and the
//!   transport is released.
//! - **Transport close or failure**: buffered bytes are decoded once more with
//!   end-of-stream semantics, the archive is flushed, and
//!   [`RadarError::TransportClosed`] is returned.

use std::{io, sync::Arc};

use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{
    buffer::StreamBuffer,
    channel::FrameChannel,
    config::SessionConfig,
    decoder::{DecodedFrame, DecoderState, DecoderStats, FrameDecoder},
    error::{RadarError, Result},
    export::ArchiveSink,
    frame::DecodeError,
    transport::Transport,
};

/// Summary of a session stopped by cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionReport {
    /// Profiles published during the session.
    pub published: u64,
    /// Profiles written to the sink on shutdown.
    pub exported: usize,
    /// Bytes of an unfinished frame dropped on shutdown.
    pub dropped_bytes: usize,
}

/// Single-owner acquisition task state.
#[derive(Debug)]
pub struct Acquisition {
    decoder: FrameDecoder,
    buffer: StreamBuffer,
    channel: Arc<FrameChannel>,
    read_chunk: usize,
    published: u64,
}

impl Acquisition {
    /// Create an acquisition publishing into `channel`.
    #[must_use]
    pub fn new(config: &SessionConfig, channel: Arc<FrameChannel>) -> Self {
        Self {
            decoder: FrameDecoder::new(config.decoder),
            buffer: StreamBuffer::new(),
            channel,
            read_chunk: config.read_chunk,
            published: 0,
        }
    }

    /// The channel profiles are published to.
    #[must_use]
    pub fn channel(&self) -> &Arc<FrameChannel> { &self.channel }

    /// Decoder counters.
    #[must_use]
    pub fn stats(&self) -> &DecoderStats { self.decoder.stats() }

    /// Current decoder state.
    #[must_use]
    pub fn state(&self) -> DecoderState { self.decoder.state() }

    /// Profiles published so far.
    #[must_use]
    pub fn published(&self) -> u64 { self.published }

    /// Append `bytes` and publish every profile they complete.
    ///
    /// Returns the number of profiles published.
    pub fn ingest(&mut self, bytes: &[u8]) -> usize {
        self.buffer.append(bytes);
        let mut published = 0;
        loop {
            match self.decoder.decode(&mut self.buffer) {
                Ok(Some(frame)) => published += self.publish(frame),
                Ok(None) => return published,
                Err(err) => debug!(
                    error = %err,
                    recovery = err.recovery().as_str(),
                    "frame stream recovered"
                ),
            }
        }
    }

    /// Run until `shutdown` is cancelled or the transport closes.
    ///
    /// The archive is flushed to `sink` first; the transport is dropped
    /// after, before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`RadarError::TransportClosed`] when the transport fails or
    /// reaches end of stream, and [`RadarError::Export`] if the final
    /// archive flush fails. A flush failure takes precedence.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use radarframe::{
    ///     acquisition::Acquisition,
    ///     channel::FrameChannel,
    ///     config::SessionConfig,
    ///     export::CsvTableSink,
    /// };
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let config = SessionConfig::default();
    /// let channel = Arc::new(FrameChannel::new(config.archive));
    /// let mut acquisition = Acquisition::new(&config, Arc::clone(&channel));
    /// let (_sensor, transport) = tokio::io::duplex(1024);
    /// let shutdown = CancellationToken::new();
    /// shutdown.cancel();
    ///
    /// let mut sink = CsvTableSink::new(Vec::new(), config.bin_spacing_m);
    /// let report = acquisition
    ///     .run(transport, &shutdown, &mut sink)
    ///     .await
    ///     .expect("cancelled sessions stop cleanly");
    /// assert_eq!(report.published, 0);
    /// # }
    /// ```
    pub async fn run<T, S>(
        &mut self,
        transport: T,
        shutdown: &CancellationToken,
        sink: &mut S,
    ) -> Result<SessionReport>
    where
        T: Transport,
        S: ArchiveSink + ?Sized,
    {
        let span = info_span!("acquisition", read_chunk = self.read_chunk);
        self.run_inner(transport, shutdown, sink).instrument(span).await
    }

    async fn run_inner<T, S>(
        &mut self,
        mut transport: T,
        shutdown: &CancellationToken,
        sink: &mut S,
    ) -> Result<SessionReport>
    where
        T: Transport,
        S: ArchiveSink + ?Sized,
    {
        info!("acquisition started");
        let closed = loop {
            let read = select! {
                biased;
                () = shutdown.cancelled() => break None,
                read = transport.read(self.read_chunk) => read,
            };
            match read {
                Ok(chunk) if chunk.is_empty() => {
                    break Some(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "transport reached end of stream",
                    ));
                }
                Ok(chunk) => {
                    self.ingest(&chunk);
                }
                Err(err) => break Some(err),
            }
        };

        let dropped_bytes = match &closed {
            None => self.drop_pending(),
            Some(err) => {
                warn!(error = %err, "transport closed");
                self.drain_eof()
            }
        };

        let flushed = self.flush(sink);
        drop(transport);
        let exported = flushed?;
        info!(
            published = self.published,
            exported,
            dropped_bytes,
            frames_decoded = self.decoder.stats().frames_decoded,
            frames_discarded = self.decoder.stats().frames_discarded,
            resync_events = self.decoder.stats().resync_events,
            "acquisition stopped"
        );
        match closed {
            Some(err) => Err(RadarError::TransportClosed(err)),
            None => Ok(SessionReport {
                published: self.published,
                exported,
                dropped_bytes,
            }),
        }
    }

    fn publish(&mut self, frame: DecodedFrame) -> usize {
        let Some(profile) = frame.profile else {
            return 0;
        };
        self.channel.publish(profile);
        self.published += 1;
        1
    }

    fn drop_pending(&mut self) -> usize {
        let dropped = self.decoder.reset(&mut self.buffer);
        if dropped > 0 {
            info!(dropped, "discarding partial frame on shutdown");
        }
        dropped
    }

    fn drain_eof(&mut self) -> usize {
        let mut dropped = 0;
        loop {
            match self.decoder.decode_eof(&mut self.buffer) {
                Ok(Some(frame)) => {
                    self.publish(frame);
                }
                Ok(None) => return dropped,
                Err(err) => {
                    if let DecodeError::IncompleteHeader { have, .. }
                    | DecodeError::IncompleteFrame { have, .. } = err
                    {
                        dropped += have;
                    }
                    debug!(error = %err, "end of stream");
                }
            }
        }
    }

    fn flush<S>(&self, sink: &mut S) -> Result<usize>
    where
        S: ArchiveSink + ?Sized,
    {
        self.channel.export(sink).map_err(|err| {
            warn!(error = %err, "archive export failed");
            RadarError::from(err)
        })
    }
}
