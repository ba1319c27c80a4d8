//! Utilities for exercising `radarframe` decoders and acquisition loops in
//! tests.
//!
//! ```rust
//! use std::num::NonZeroUsize;
//!
//! use radarframe::decoder::{DecoderConfig, FrameDecoder};
//! use radarframe_testing::{FIXTURE_BINS, feed_chunked, frame_stream};
//!
//! let bins = NonZeroUsize::new(FIXTURE_BINS).expect("non-zero");
//! let mut decoder = FrameDecoder::new(DecoderConfig::new(bins));
//! let outcome = feed_chunked(&mut decoder, &frame_stream(1, 2, FIXTURE_BINS), &[7]);
//! assert_eq!(outcome.profile_numbers(), vec![1, 2]);
//! ```

pub mod feed;
pub mod frames;
pub mod logging;
pub mod transport;

pub use feed::{FeedOutcome, drain, feed_all, feed_chunked};
pub use frames::{FIXTURE_BINS, frame_stream, profile_frame, ramp, three_frames};
pub use logging::{LoggerHandle, logger};
pub use transport::{ScriptEnd, ScriptedTransport};
