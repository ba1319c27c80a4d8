#![doc(html_root_url = "https://docs.rs/radarframe/latest")]
//! Public API for the `radarframe` library.
//!
//! This crate reconstructs sensor frames from an unaligned radar byte stream,
//! extracts the range profile carried by each frame, and hands profiles to a
//! live viewer and a bounded export archive.

pub mod acquisition;
pub mod buffer;
pub mod byte_order;
pub mod channel;
pub mod config;
pub mod decoder;
pub mod error;
pub mod export;
pub mod frame;
pub mod metrics;
pub mod profile;
pub mod sensor_config;
pub mod transport;
pub mod viewer;

pub use acquisition::{Acquisition, SessionReport};
pub use buffer::StreamBuffer;
pub use channel::{FrameChannel, LatestProfile};
pub use config::SessionConfig;
pub use decoder::{DecodedFrame, DecoderConfig, FrameDecoder, RangeProfileCodec};
pub use error::{RadarError, Result};
pub use frame::{DecodeError, FrameBuilder, FrameHeader, Recovery};
pub use profile::RangeProfile;
pub use transport::Transport;
