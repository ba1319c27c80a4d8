//! Resumable frame decoder.
//!
//! [`FrameDecoder`] turns an unaligned byte stream into [`DecodedFrame`]s.
//! It holds its position between calls, so input may arrive in chunks of
//! any size:
//!
//! ```text
//! Seeking --marker--> HeaderPending --header--> TlvPending --records--> FrameReady --> Seeking
//!                          |                        |
//!                          +------ invalid ---------+--> FrameDiscarded --> Seeking
//! ```
//!
//! A frame is consumed from the [`StreamBuffer`] atomically: nothing is
//! removed until every record and the trailing padding have arrived, and a
//! partially received frame is never surfaced. Discarding a frame removes
//! only its marker, so the search resumes strictly after it.

mod codec;
mod stats;

use std::num::NonZeroUsize;

pub use codec::RangeProfileCodec;
use log::{debug, warn};
pub use stats::DecoderStats;

use crate::{
    buffer::StreamBuffer,
    frame::{
        DEFAULT_MAX_FRAME_LENGTH,
        DecodeError,
        FrameHeader,
        FrameSynchronizer,
        HEADER_LEN,
        MARKER_LEN,
        SyncStep,
        TlvIterator,
    },
    metrics,
    profile::{RangeProfile, RangeProfileExtractor},
};

/// Observable decoder state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecoderState {
    /// Searching for a frame marker.
    #[default]
    Seeking,
    /// Aligned to a marker, waiting for the full header.
    HeaderPending,
    /// Header parsed, waiting for the records and padding.
    TlvPending,
    /// The last call completed a frame.
    FrameReady,
    /// The last call dropped a corrupt frame.
    FrameDiscarded,
}

/// Decoder settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Range bins expected in every range profile.
    pub num_range_bins: NonZeroUsize,
    /// Largest declared frame length accepted.
    pub max_frame_length: usize,
}

impl DecoderConfig {
    /// Configuration for `num_range_bins` with the default maximum frame length.
    #[must_use]
    pub fn new(num_range_bins: NonZeroUsize) -> Self {
        Self {
            num_range_bins,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }

    /// Set the maximum accepted frame length.
    ///
    /// The value is raised to [`HEADER_LEN`] if smaller.
    #[must_use]
    pub fn max_frame_length(mut self, len: usize) -> Self {
        self.max_frame_length = len.max(HEADER_LEN);
        self
    }
}

/// Everything decoded from one complete frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    /// The frame header.
    pub header: FrameHeader,
    /// The range profile, if the frame carried a valid one.
    pub profile: Option<RangeProfile>,
    /// Records skipped without invalidating the frame.
    pub skipped: Vec<DecodeError>,
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Seeking,
    HeaderPending,
    TlvPending { header: FrameHeader, need: usize },
}

enum Walk {
    Ready(DecodedFrame),
    Pending { needed: usize },
    Corrupt(DecodeError),
}

/// Incremental decoder for the sensor frame stream.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use radarframe::{
///     buffer::StreamBuffer,
///     decoder::{DecoderConfig, FrameDecoder},
///     frame::FrameBuilder,
/// };
///
/// let bins = NonZeroUsize::new(4).expect("non-zero");
/// let mut decoder = FrameDecoder::new(DecoderConfig::new(bins));
/// let bytes = FrameBuilder::new().frame_number(1).range_profile(&[5; 4]).build();
/// let mut buf = StreamBuffer::new();
///
/// buf.append(&bytes[..20]);
/// assert!(decoder.decode(&mut buf).expect("no corruption").is_none());
///
/// buf.append(&bytes[20..]);
/// let frame = decoder.decode(&mut buf).expect("no corruption").expect("complete frame");
/// assert_eq!(frame.profile.expect("profile present").samples(), &[5; 4]);
/// ```
#[derive(Debug)]
pub struct FrameDecoder {
    config: DecoderConfig,
    extractor: RangeProfileExtractor,
    sync: FrameSynchronizer,
    phase: Phase,
    state: DecoderState,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// Create a decoder in the [`DecoderState::Seeking`] state.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            extractor: RangeProfileExtractor::new(config.num_range_bins),
            config,
            sync: FrameSynchronizer::new(),
            phase: Phase::Seeking,
            state: DecoderState::Seeking,
            stats: DecoderStats::default(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DecoderState { self.state }

    /// Counters accumulated since construction.
    #[must_use]
    pub fn stats(&self) -> &DecoderStats { &self.stats }

    /// Decoder settings.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig { &self.config }

    /// Advance through `buf` until a frame completes or more input is needed.
    ///
    /// Returns `Ok(Some(frame))` when a frame completed, and `Ok(None)` when
    /// every buffered byte has been examined and the decoder is waiting for
    /// input. Buffered bytes are never dropped while waiting.
    ///
    /// # Errors
    ///
    /// Returns a recoverable [`DecodeError`] describing bytes the decoder
    /// just discarded: [`DecodeError::SyncLost`] after resynchronising, or
    /// [`DecodeError::InvalidHeader`] / [`DecodeError::MalformedTlv`] after
    /// dropping a corrupt frame. Call again to continue decoding.
    pub fn decode(&mut self, buf: &mut StreamBuffer) -> Result<Option<DecodedFrame>, DecodeError> {
        loop {
            match self.phase {
                Phase::Seeking => {
                    self.state = DecoderState::Seeking;
                    let before = buf.len();
                    let step = self.sync.sync(buf);
                    self.record_discarded(before - buf.len());
                    match step {
                        SyncStep::Aligned { discarded } => {
                            self.enter(Phase::HeaderPending);
                            if discarded > 0 {
                                self.stats.resync_events += 1;
                                metrics::inc_resync();
                                debug!("frame marker reacquired after {discarded} bytes");
                                return Err(DecodeError::SyncLost { discarded });
                            }
                        }
                        SyncStep::Seeking { .. } => {
                            metrics::set_buffered_bytes(buf.len());
                            return Ok(None);
                        }
                    }
                }
                Phase::HeaderPending => {
                    match FrameHeader::parse(buf.as_slice(), self.config.max_frame_length) {
                        Ok(header) => self.enter(Phase::TlvPending {
                            header,
                            need: HEADER_LEN,
                        }),
                        Err(err) if err.is_incomplete() => return Ok(None),
                        Err(err) => return Err(self.discard_frame(buf, err)),
                    }
                }
                Phase::TlvPending { header, need } => {
                    if buf.len() < need {
                        return Ok(None);
                    }
                    match self.walk(buf, &header) {
                        Walk::Ready(frame) => return Ok(Some(self.complete(buf, frame))),
                        Walk::Pending { needed } => {
                            self.phase = Phase::TlvPending {
                                header,
                                need: needed,
                            };
                            return Ok(None);
                        }
                        Walk::Corrupt(err) => return Err(self.discard_frame(buf, err)),
                    }
                }
            }
        }
    }

    /// Final decode once the transport has closed.
    ///
    /// Behaves like [`decode`](Self::decode) while complete frames remain.
    /// When only a partial frame is left it is reported as
    /// [`DecodeError::IncompleteHeader`] or [`DecodeError::IncompleteFrame`]
    /// and dropped; it is never emitted. Returns `Ok(None)` once the buffer
    /// is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the same recoverable errors as [`decode`](Self::decode), plus
    /// the incomplete-frame report described above.
    pub fn decode_eof(
        &mut self,
        buf: &mut StreamBuffer,
    ) -> Result<Option<DecodedFrame>, DecodeError> {
        if let Some(frame) = self.decode(buf)? {
            return Ok(Some(frame));
        }
        let pending = match self.phase {
            Phase::Seeking => None,
            Phase::HeaderPending => Some(DecodeError::IncompleteHeader {
                have: buf.len(),
                need: HEADER_LEN,
            }),
            Phase::TlvPending { header, need } => Some(DecodeError::IncompleteFrame {
                frame_number: header.frame_number,
                have: buf.len(),
                declared: header.frame_len(),
                needed: need,
            }),
        };
        self.reset(buf);
        match pending {
            Some(err) => {
                warn!("dropping partial frame at end of stream: {err}");
                Err(err)
            }
            None => Ok(None),
        }
    }

    /// Abandon any partial frame and return to [`DecoderState::Seeking`].
    ///
    /// Returns the number of buffered bytes dropped.
    pub fn reset(&mut self, buf: &mut StreamBuffer) -> usize {
        let dropped = buf.len();
        buf.clear();
        self.sync = FrameSynchronizer::new();
        self.enter(Phase::Seeking);
        metrics::set_buffered_bytes(0);
        dropped
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.state = match phase {
            Phase::Seeking => DecoderState::Seeking,
            Phase::HeaderPending => DecoderState::HeaderPending,
            Phase::TlvPending { .. } => DecoderState::TlvPending,
        };
    }

    fn walk(&self, buf: &StreamBuffer, header: &FrameHeader) -> Walk {
        let frame_number = header.frame_number;
        let mut profile: Option<RangeProfile> = None;
        let mut skipped = Vec::new();

        for record in TlvIterator::new(header, buf.as_slice()) {
            let record = match record {
                Ok(record) => record,
                Err(DecodeError::IncompleteFrame { needed, .. }) => {
                    return Walk::Pending { needed };
                }
                Err(err) => return Walk::Corrupt(err),
            };
            if !self.extractor.matches(&record) {
                continue;
            }
            match self.extractor.extract(frame_number, &record) {
                Ok(decoded) if profile.is_none() => profile = Some(decoded),
                Ok(_) => debug!("frame {frame_number}: ignoring extra range profile record"),
                Err(err) => skipped.push(err),
            }
        }

        Walk::Ready(DecodedFrame {
            header: *header,
            profile,
            skipped,
        })
    }

    fn complete(&mut self, buf: &mut StreamBuffer, frame: DecodedFrame) -> DecodedFrame {
        let frame_len = frame.header.frame_len();
        if let Err(err) = buf.consume(frame_len) {
            debug_assert!(false, "completed frame exceeds buffer: {err}");
        }
        for err in &frame.skipped {
            warn!("{err}; record skipped");
            self.stats.size_mismatches += 1;
            metrics::inc_size_mismatch();
        }
        self.stats.frames_decoded += 1;
        if frame.profile.is_none() {
            self.stats.frames_without_profile += 1;
            debug!("frame {} carried no range profile", frame.header.frame_number);
        }
        metrics::inc_frames_decoded();
        metrics::set_buffered_bytes(buf.len());
        self.enter(Phase::Seeking);
        self.state = DecoderState::FrameReady;
        frame
    }

    fn discard_frame(&mut self, buf: &mut StreamBuffer, err: DecodeError) -> DecodeError {
        warn!("discarding frame: {err}");
        if buf.consume(MARKER_LEN.min(buf.len())).is_err() {
            debug_assert!(false, "marker bytes missing from aligned buffer");
        }
        self.stats.frames_discarded += 1;
        metrics::inc_frames_discarded(err.error_type());
        self.enter(Phase::Seeking);
        self.state = DecoderState::FrameDiscarded;
        err
    }

    fn record_discarded(&mut self, bytes: usize) {
        if bytes == 0 {
            return;
        }
        self.stats.bytes_discarded = self
            .stats
            .bytes_discarded
            .saturating_add(u64::try_from(bytes).unwrap_or(u64::MAX));
        metrics::add_bytes_discarded(bytes);
    }
}

#[cfg(test)]
mod tests;
