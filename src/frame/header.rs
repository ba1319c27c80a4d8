//! Fixed-size frame header.

use super::{DecodeError, FRAME_MARKER, HEADER_LEN, HeaderFault, MARKER_LEN};
use crate::byte_order::{u32_at, u64_at};

const VERSION_OFFSET: usize = MARKER_LEN;
const TOTAL_LEN_OFFSET: usize = 12;
const PLATFORM_OFFSET: usize = 16;
const FRAME_NUMBER_OFFSET: usize = 20;
const TIMESTAMP_OFFSET: usize = 24;
const DETECTED_OBJECTS_OFFSET: usize = 32;
const TLV_COUNT_OFFSET: usize = 36;

/// Parsed frame header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    /// Firmware version word.
    pub version: u32,
    /// Declared frame length in bytes, marker included.
    pub total_len: u32,
    /// Device platform identifier.
    pub platform: u32,
    /// Monotonic frame sequence number.
    pub frame_number: u32,
    /// CPU cycle counter captured when the frame was produced.
    pub timestamp_cycles: u64,
    /// Number of detected objects reported by the sensor.
    pub detected_objects: u32,
    /// Number of TLV records following the header.
    pub tlv_count: u32,
}

impl FrameHeader {
    /// Parse a header from bytes starting exactly at a frame marker.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::IncompleteHeader`] when fewer than
    /// [`HEADER_LEN`] bytes are available; the caller should wait for more
    /// input. Returns [`DecodeError::InvalidHeader`] when the declared length
    /// is shorter than the header or longer than `max_frame_length`.
    ///
    /// # Examples
    ///
    /// ```
    /// use radarframe::frame::{FrameBuilder, FrameHeader};
    ///
    /// let bytes = FrameBuilder::new().frame_number(9).build();
    /// let header = FrameHeader::parse(&bytes, 1024).expect("valid header");
    /// assert_eq!(header.frame_number, 9);
    /// assert_eq!(header.frame_len(), bytes.len());
    /// ```
    pub fn parse(bytes: &[u8], max_frame_length: usize) -> Result<Self, DecodeError> {
        debug_assert!(bytes.len() < MARKER_LEN || bytes.starts_with(&FRAME_MARKER));
        let incomplete = || DecodeError::IncompleteHeader {
            have: bytes.len(),
            need: HEADER_LEN,
        };
        if bytes.len() < HEADER_LEN {
            return Err(incomplete());
        }
        let word = |offset| u32_at(bytes, offset).ok_or_else(incomplete);

        let header = Self {
            version: word(VERSION_OFFSET)?,
            total_len: word(TOTAL_LEN_OFFSET)?,
            platform: word(PLATFORM_OFFSET)?,
            frame_number: word(FRAME_NUMBER_OFFSET)?,
            timestamp_cycles: u64_at(bytes, TIMESTAMP_OFFSET).ok_or_else(incomplete)?,
            detected_objects: word(DETECTED_OBJECTS_OFFSET)?,
            tlv_count: word(TLV_COUNT_OFFSET)?,
        };

        let declared = header.frame_len();
        let fault = if declared < HEADER_LEN {
            Some(HeaderFault::TooShort {
                declared,
                min: HEADER_LEN,
            })
        } else if declared > max_frame_length {
            Some(HeaderFault::TooLong {
                declared,
                max: max_frame_length,
            })
        } else {
            None
        };
        match fault {
            Some(fault) => Err(DecodeError::InvalidHeader {
                frame_number: header.frame_number,
                fault,
            }),
            None => Ok(header),
        }
    }

    /// Declared frame length as a buffer offset.
    #[must_use]
    pub fn frame_len(&self) -> usize { usize::try_from(self.total_len).unwrap_or(usize::MAX) }
}
