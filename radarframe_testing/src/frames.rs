//! Frame fixtures.

use radarframe::frame::FrameBuilder;
use rstest::fixture;

/// Range bins used by the shared fixtures.
pub const FIXTURE_BINS: usize = 256;

/// Samples `0, 1, 2, ...` for `bins` range bins.
#[must_use]
pub fn ramp(bins: usize) -> Vec<u16> {
    (0..bins)
        .map(|i| u16::try_from(i % usize::from(u16::MAX)).unwrap_or(u16::MAX))
        .collect()
}

/// A padded frame carrying a range profile of `samples`.
#[must_use]
pub fn profile_frame(frame_number: u32, samples: &[u16]) -> Vec<u8> {
    FrameBuilder::new()
        .frame_number(frame_number)
        .range_profile(samples)
        .pad_to_alignment()
        .build()
}

/// Concatenated frames numbered `first..first + count`, each with a ramp
/// profile offset by its frame number.
#[must_use]
pub fn frame_stream(first: u32, count: u32, bins: usize) -> Vec<u8> {
    (first..first + count)
        .flat_map(|n| {
            let offset = u16::try_from(n % 1000).unwrap_or(0);
            let samples: Vec<u16> = ramp(bins).iter().map(|s| s.wrapping_add(offset)).collect();
            profile_frame(n, &samples)
        })
        .collect()
}

/// Three valid frames with [`FIXTURE_BINS`] bins, numbered 1 to 3.
#[fixture]
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
pub fn three_frames() -> Vec<u8> { frame_stream(1, 3, FIXTURE_BINS) }
