//! Wire layout of sensor frames.
//!
//! A frame starts with the 8-byte [`FRAME_MARKER`], followed by the rest of a
//! fixed [`HEADER_LEN`]-byte header and a sequence of TLV records. All
//! integers are little-endian and the header's declared length counts from the
//! first marker byte.
//!
//! ```text
//! offset  field
//!      0  marker            [u8; 8]  02 01 04 03 06 05 08 07
//!      8  version           u32
//!     12  total length      u32
//!     16  platform          u32
//!     20  frame number      u32
//!     24  timing counter    u64
//!     32  detected objects  u32
//!     36  TLV count         u32
//!     40  TLV records       (type u32, length u32, payload)...
//! ```
//!
//! This module parses those pieces in place over a
//! [`StreamBuffer`](crate::buffer::StreamBuffer) without copying: the
//! [`FrameSynchronizer`] aligns the buffer to a marker, [`FrameHeader::parse`]
//! reads the header and [`TlvIterator`] walks the records as borrowed
//! [`TlvRecord`] views.

pub mod encode;
pub mod error;
pub mod header;
pub mod sync;
pub mod tlv;

pub use encode::FrameBuilder;
pub use error::{DecodeError, HeaderFault, Recovery};
pub use header::FrameHeader;
pub use sync::{FrameSynchronizer, SyncOutcome, SyncStep, find_marker};
pub use tlv::{TlvIterator, TlvRecord};

/// Byte sequence opening every frame.
pub const FRAME_MARKER: [u8; 8] = [0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07];

/// Length of [`FRAME_MARKER`].
pub const MARKER_LEN: usize = FRAME_MARKER.len();

/// Fixed header size in bytes, marker included.
pub const HEADER_LEN: usize = 40;

/// Size of a TLV record header (type and length words).
pub const TLV_HEADER_LEN: usize = 8;

/// TLV type carrying range-profile samples.
pub const RANGE_PROFILE_TLV: u32 = 2;

/// Largest frame accepted by default (64 KiB).
///
/// A declared length above the configured maximum is treated as a corrupt
/// header rather than a reason to keep buffering.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 64 * 1024;

/// Frames are padded by the sensor to a multiple of this many bytes.
pub const FRAME_ALIGNMENT: usize = 32;
