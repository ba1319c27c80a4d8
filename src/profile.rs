//! Range profiles and their extraction from TLV records.

use std::num::NonZeroUsize;

use crate::{
    byte_order::read_wire_u16,
    frame::{DecodeError, RANGE_PROFILE_TLV, TlvRecord},
};

/// Per-range-bin magnitudes reported by one frame.
///
/// Immutable once built. Consumers share it as `Arc<RangeProfile>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeProfile {
    frame_number: u32,
    samples: Vec<u16>,
}

impl RangeProfile {
    /// Construct a profile from decoded samples.
    #[must_use]
    pub fn new(frame_number: u32, samples: Vec<u16>) -> Self {
        Self {
            frame_number,
            samples,
        }
    }

    /// Sequence number of the frame the profile came from.
    #[must_use]
    pub const fn frame_number(&self) -> u32 { self.frame_number }

    /// Samples in range-bin order.
    #[must_use]
    pub fn samples(&self) -> &[u16] { &self.samples }

    /// Number of range bins.
    #[must_use]
    pub fn len(&self) -> usize { self.samples.len() }

    /// Whether the profile holds no bins.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    /// Strongest bin as `(index, magnitude)`; the lowest index wins ties.
    #[must_use]
    pub fn peak(&self) -> Option<(usize, u16)> {
        self.samples
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (idx, value)| match best {
                Some((_, top)) if top >= value => best,
                _ => Some((idx, value)),
            })
    }

    /// Samples scaled for display as relative power, `2 * (s / 100) - 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use radarframe::profile::RangeProfile;
    ///
    /// let profile = RangeProfile::new(1, vec![0, 50, 100]);
    /// assert_eq!(profile.relative_power_db(), vec![-1.0, 0.0, 1.0]);
    /// ```
    #[must_use]
    pub fn relative_power_db(&self) -> Vec<f64> {
        self.samples
            .iter()
            .map(|&s| 2.0 * (f64::from(s) / 100.0) - 1.0)
            .collect()
    }
}

/// Decodes range-profile TLV records for a fixed range-bin count.
#[derive(Clone, Copy, Debug)]
pub struct RangeProfileExtractor {
    num_range_bins: NonZeroUsize,
}

impl RangeProfileExtractor {
    /// Create an extractor expecting `num_range_bins` samples per profile.
    #[must_use]
    pub fn new(num_range_bins: NonZeroUsize) -> Self { Self { num_range_bins } }

    /// Configured range-bin count.
    #[must_use]
    pub fn num_range_bins(&self) -> NonZeroUsize { self.num_range_bins }

    /// Payload size a valid range-profile record must have.
    #[must_use]
    pub fn expected_payload_len(&self) -> usize { self.num_range_bins.get().saturating_mul(2) }

    /// Whether `record` carries range-profile samples.
    #[must_use]
    pub fn matches(&self, record: &TlvRecord<'_>) -> bool { record.tlv_type == RANGE_PROFILE_TLV }

    /// Decode a range-profile record.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::SizeMismatch`] if the payload is not exactly
    /// two bytes per configured range bin. The error concerns this record
    /// only; the rest of the frame remains decodable.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::num::NonZeroUsize;
    ///
    /// use radarframe::{frame::TlvRecord, profile::RangeProfileExtractor};
    ///
    /// let extractor = RangeProfileExtractor::new(NonZeroUsize::new(2).expect("non-zero"));
    /// let record = TlvRecord {
    ///     tlv_type: 2,
    ///     offset: 40,
    ///     payload: &[0x01, 0x00, 0x34, 0x12],
    /// };
    /// let profile = extractor.extract(3, &record).expect("sized payload");
    /// assert_eq!(profile.samples(), &[1, 0x1234]);
    /// ```
    pub fn extract(
        &self,
        frame_number: u32,
        record: &TlvRecord<'_>,
    ) -> Result<RangeProfile, DecodeError> {
        let expected = self.expected_payload_len();
        if record.len() != expected {
            return Err(DecodeError::SizeMismatch {
                frame_number,
                expected,
                actual: record.len(),
            });
        }
        let samples = record
            .payload
            .chunks_exact(2)
            .map(|pair| read_wire_u16([pair[0], pair[1]]))
            .collect();
        Ok(RangeProfile::new(frame_number, samples))
    }
}
