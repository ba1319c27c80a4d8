//! Session configuration.
//!
//! [`SessionConfig`] bundles the settings one acquisition session needs.
//! Setters clamp out-of-range values rather than failing.

use std::{num::NonZeroUsize, time::Duration};

use crate::{
    channel::ArchiveConfig,
    decoder::DecoderConfig,
    sensor_config::SensorProfile,
};

/// Default transport read size in bytes.
pub const DEFAULT_READ_CHUNK: usize = 4096;
/// Smallest accepted transport read size.
pub const MIN_READ_CHUNK: usize = 64;
/// Largest accepted transport read size.
pub const MAX_READ_CHUNK: usize = 64 * 1024;

/// Default viewer polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default number of range bins when no sensor profile is available.
pub const DEFAULT_RANGE_BINS: usize = 256;

/// Range-bin spacing in metres when no sensor profile is available.
pub const DEFAULT_BIN_SPACING_M: f64 = 1.0 / 25.0;

/// Settings for one acquisition session.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use radarframe::config::{MAX_READ_CHUNK, SessionConfig};
///
/// let config = SessionConfig::default()
///     .read_chunk(1 << 20)
///     .poll_interval(Duration::from_millis(50));
/// assert_eq!(config.read_chunk, MAX_READ_CHUNK);
/// assert_eq!(config.poll_interval, Duration::from_millis(50));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    /// Decoder settings.
    pub decoder: DecoderConfig,
    /// Archive settings.
    pub archive: ArchiveConfig,
    /// Viewer polling interval.
    pub poll_interval: Duration,
    /// Maximum bytes requested per transport read.
    pub read_chunk: usize,
    /// Distance between range bins in metres, used for export.
    pub bin_spacing_m: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let bins = NonZeroUsize::new(DEFAULT_RANGE_BINS).unwrap_or(NonZeroUsize::MIN);
        Self {
            decoder: DecoderConfig::new(bins),
            archive: ArchiveConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            read_chunk: DEFAULT_READ_CHUNK,
            bin_spacing_m: DEFAULT_BIN_SPACING_M,
        }
    }
}

impl SessionConfig {
    /// Configuration derived from a parsed sensor profile.
    #[must_use]
    pub fn from_sensor(profile: &SensorProfile) -> Self {
        Self::default()
            .num_range_bins(profile.num_range_bins())
            .bin_spacing_m(profile.range_idx_to_m())
    }

    /// Set the number of range bins per profile.
    #[must_use]
    pub fn num_range_bins(mut self, bins: NonZeroUsize) -> Self {
        self.decoder.num_range_bins = bins;
        self
    }

    /// Set the largest accepted frame length.
    #[must_use]
    pub fn max_frame_length(mut self, len: usize) -> Self {
        self.decoder = self.decoder.max_frame_length(len);
        self
    }

    /// Set the archive settings.
    #[must_use]
    pub fn archive(mut self, archive: ArchiveConfig) -> Self {
        self.archive = archive;
        self
    }

    /// Set the viewer polling interval, clamped to 1 ms..=10 s.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL);
        self
    }

    /// Set the transport read size, clamped to
    /// [`MIN_READ_CHUNK`]..=[`MAX_READ_CHUNK`].
    #[must_use]
    pub fn read_chunk(mut self, bytes: usize) -> Self {
        self.read_chunk = bytes.clamp(MIN_READ_CHUNK, MAX_READ_CHUNK);
        self
    }

    /// Set the range-bin spacing used for export. Non-finite or negative
    /// values fall back to [`DEFAULT_BIN_SPACING_M`].
    #[must_use]
    pub fn bin_spacing_m(mut self, spacing: f64) -> Self {
        self.bin_spacing_m = if spacing.is_finite() && spacing >= 0.0 {
            spacing
        } else {
            DEFAULT_BIN_SPACING_M
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::frame::HEADER_LEN;

    #[rstest]
    #[case(Duration::ZERO, MIN_POLL_INTERVAL)]
    #[case(Duration::from_secs(60), MAX_POLL_INTERVAL)]
    #[case(Duration::from_millis(250), Duration::from_millis(250))]
    fn poll_interval_is_clamped(#[case] requested: Duration, #[case] expected: Duration) {
        assert_eq!(
            SessionConfig::default().poll_interval(requested).poll_interval,
            expected
        );
    }

    #[rstest]
    #[case(0, MIN_READ_CHUNK)]
    #[case(usize::MAX, MAX_READ_CHUNK)]
    #[case(1024, 1024)]
    fn read_chunk_is_clamped(#[case] requested: usize, #[case] expected: usize) {
        assert_eq!(SessionConfig::default().read_chunk(requested).read_chunk, expected);
    }

    #[test]
    fn max_frame_length_never_drops_below_header() {
        let config = SessionConfig::default().max_frame_length(0);
        assert_eq!(config.decoder.max_frame_length, HEADER_LEN);
    }

    #[rstest]
    #[case(f64::NAN, DEFAULT_BIN_SPACING_M)]
    #[case(-0.5, DEFAULT_BIN_SPACING_M)]
    #[case(0.5, 0.5)]
    fn bin_spacing_rejects_nonsense(#[case] requested: f64, #[case] expected: f64) {
        let spacing = SessionConfig::default().bin_spacing_m(requested).bin_spacing_m;
        assert!((spacing - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn default_spacing_labels_bins_at_four_centimetres() {
        let config = SessionConfig::default();
        assert!((config.bin_spacing_m - 0.04).abs() < f64::EPSILON);
    }

    #[test]
    fn sensor_profile_sets_bins_and_spacing() {
        let profile = SensorProfile::from_cfg_str("profileCfg 0 60 359 7 57.14 0 0 70 1 200 5209")
            .expect("valid profile");
        let config = SessionConfig::from_sensor(&profile);
        assert_eq!(config.decoder.num_range_bins.get(), 256);
        assert!((config.bin_spacing_m - profile.range_idx_to_m()).abs() < f64::EPSILON);
    }
}
