//! Bit-exact frame construction.
//!
//! [`FrameBuilder`] emits frames exactly as the sensor lays them out. It is
//! used to replay synthetic captures and to build fixtures, including
//! deliberately inconsistent frames via the override setters.

use super::{FRAME_ALIGNMENT, FRAME_MARKER, HEADER_LEN, RANGE_PROFILE_TLV, TLV_HEADER_LEN};
use crate::byte_order::{write_wire_u16, write_wire_u32, write_wire_u64};

/// Default firmware version word written into built headers.
pub const DEFAULT_VERSION: u32 = 0x0306_0200;

/// Default platform identifier written into built headers.
pub const DEFAULT_PLATFORM: u32 = 0x000A_6843;

#[derive(Clone, Debug)]
struct TlvSpec {
    tlv_type: u32,
    declared_len: Option<u32>,
    payload: Vec<u8>,
}

/// Builder for encoded frames.
///
/// # Examples
///
/// ```
/// use radarframe::frame::{FRAME_MARKER, FrameBuilder, HEADER_LEN};
///
/// let bytes = FrameBuilder::new()
///     .frame_number(1)
///     .range_profile(&[1; 256])
///     .build();
///
/// assert!(bytes.starts_with(&FRAME_MARKER));
/// assert_eq!(bytes.len(), HEADER_LEN + 8 + 512);
/// ```
#[derive(Clone, Debug)]
pub struct FrameBuilder {
    version: u32,
    platform: u32,
    frame_number: u32,
    timestamp_cycles: u64,
    detected_objects: u32,
    tlvs: Vec<TlvSpec>,
    pad: bool,
    declared_len: Option<u32>,
    tlv_count: Option<u32>,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            platform: DEFAULT_PLATFORM,
            frame_number: 0,
            timestamp_cycles: 0,
            detected_objects: 0,
            tlvs: Vec::new(),
            pad: false,
            declared_len: None,
            tlv_count: None,
        }
    }
}

impl FrameBuilder {
    /// Start an empty frame.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Set the frame sequence number.
    #[must_use]
    pub fn frame_number(mut self, frame_number: u32) -> Self {
        self.frame_number = frame_number;
        self
    }

    /// Set the timing counter.
    #[must_use]
    pub fn timestamp_cycles(mut self, cycles: u64) -> Self {
        self.timestamp_cycles = cycles;
        self
    }

    /// Set the detected-object count.
    #[must_use]
    pub fn detected_objects(mut self, count: u32) -> Self {
        self.detected_objects = count;
        self
    }

    /// Set the platform identifier.
    #[must_use]
    pub fn platform(mut self, platform: u32) -> Self {
        self.platform = platform;
        self
    }

    /// Append a TLV record whose length word matches its payload.
    #[must_use]
    pub fn tlv(mut self, tlv_type: u32, payload: Vec<u8>) -> Self {
        self.tlvs.push(TlvSpec {
            tlv_type,
            declared_len: None,
            payload,
        });
        self
    }

    /// Append a TLV record with an arbitrary length word.
    #[must_use]
    pub fn tlv_with_declared_len(mut self, tlv_type: u32, declared_len: u32, payload: Vec<u8>) -> Self {
        self.tlvs.push(TlvSpec {
            tlv_type,
            declared_len: Some(declared_len),
            payload,
        });
        self
    }

    /// Append a range-profile record holding `samples`.
    #[must_use]
    pub fn range_profile(self, samples: &[u16]) -> Self {
        let payload = samples.iter().flat_map(|&s| write_wire_u16(s)).collect();
        self.tlv(RANGE_PROFILE_TLV, payload)
    }

    /// Pad the frame with zeros to a multiple of [`FRAME_ALIGNMENT`] bytes.
    #[must_use]
    pub fn pad_to_alignment(mut self) -> Self {
        self.pad = true;
        self
    }

    /// Override the declared total length.
    #[must_use]
    pub fn declared_len(mut self, len: u32) -> Self {
        self.declared_len = Some(len);
        self
    }

    /// Override the declared TLV count.
    #[must_use]
    pub fn tlv_count(mut self, count: u32) -> Self {
        self.tlv_count = Some(count);
        self
    }

    /// Encode the frame.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for spec in &self.tlvs {
            let len = spec
                .declared_len
                .unwrap_or_else(|| u32::try_from(spec.payload.len()).unwrap_or(u32::MAX));
            body.extend_from_slice(&write_wire_u32(spec.tlv_type));
            body.extend_from_slice(&write_wire_u32(len));
            body.extend_from_slice(&spec.payload);
        }

        let mut total = HEADER_LEN + body.len();
        if self.pad {
            total = total.next_multiple_of(FRAME_ALIGNMENT);
        }
        let tlv_count = self
            .tlv_count
            .unwrap_or_else(|| u32::try_from(self.tlvs.len()).unwrap_or(u32::MAX));
        let declared = self
            .declared_len
            .unwrap_or_else(|| u32::try_from(total).unwrap_or(u32::MAX));

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&FRAME_MARKER);
        out.extend_from_slice(&write_wire_u32(self.version));
        out.extend_from_slice(&write_wire_u32(declared));
        out.extend_from_slice(&write_wire_u32(self.platform));
        out.extend_from_slice(&write_wire_u32(self.frame_number));
        out.extend_from_slice(&write_wire_u64(self.timestamp_cycles));
        out.extend_from_slice(&write_wire_u32(self.detected_objects));
        out.extend_from_slice(&write_wire_u32(tlv_count));
        debug_assert_eq!(out.len(), HEADER_LEN);
        out.extend_from_slice(&body);
        out.resize(total, 0);
        out
    }
}

/// Size in bytes of an unpadded frame with one range profile of `bins` samples.
#[must_use]
pub const fn range_profile_frame_len(bins: usize) -> usize { HEADER_LEN + TLV_HEADER_LEN + 2 * bins }
