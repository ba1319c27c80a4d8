//! Metric helpers for `radarframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the counter tracking frames decoded to completion.
pub const FRAMES_DECODED: &str = "radarframe_frames_decoded_total";
/// Name of the counter tracking frames dropped as corrupt.
pub const FRAMES_DISCARDED: &str = "radarframe_frames_discarded_total";
/// Name of the counter tracking resynchronisation episodes.
pub const RESYNC_TOTAL: &str = "radarframe_resync_total";
/// Name of the counter tracking bytes dropped while seeking a marker.
pub const BYTES_DISCARDED: &str = "radarframe_bytes_discarded_total";
/// Name of the counter tracking range-profile records with the wrong size.
pub const SIZE_MISMATCH_TOTAL: &str = "radarframe_size_mismatch_total";
/// Name of the counter tracking profiles evicted from the archive.
pub const ARCHIVE_EVICTIONS: &str = "radarframe_archive_evictions_total";
/// Name of the gauge tracking bytes held by the stream buffer.
pub const BUFFERED_BYTES: &str = "radarframe_buffered_bytes";

/// Record a completed frame.
pub fn inc_frames_decoded() {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_DECODED).increment(1);
}

/// Record a discarded frame with the reason reported by
/// [`DecodeError::error_type`](crate::frame::DecodeError::error_type).
pub fn inc_frames_discarded(reason: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_DISCARDED, "reason" => reason).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = reason;
}

/// Record a completed resynchronisation.
pub fn inc_resync() {
    #[cfg(feature = "metrics")]
    counter!(RESYNC_TOTAL).increment(1);
}

/// Record bytes discarded while seeking.
pub fn add_bytes_discarded(bytes: usize) {
    #[cfg(feature = "metrics")]
    counter!(BYTES_DISCARDED).increment(u64::try_from(bytes).unwrap_or(u64::MAX));
    #[cfg(not(feature = "metrics"))]
    let _ = bytes;
}

/// Record a range-profile record skipped for its size.
pub fn inc_size_mismatch() {
    #[cfg(feature = "metrics")]
    counter!(SIZE_MISMATCH_TOTAL).increment(1);
}

/// Record an archive eviction.
pub fn inc_archive_evictions() {
    #[cfg(feature = "metrics")]
    counter!(ARCHIVE_EVICTIONS).increment(1);
}

/// Publish the stream buffer's current fill level.
#[cfg_attr(
    feature = "metrics",
    expect(
        clippy::cast_precision_loss,
        reason = "Gauge values are approximate by nature."
    )
)]
pub fn set_buffered_bytes(bytes: usize) {
    #[cfg(feature = "metrics")]
    gauge!(BUFFERED_BYTES).set(bytes as f64);
    #[cfg(not(feature = "metrics"))]
    let _ = bytes;
}
