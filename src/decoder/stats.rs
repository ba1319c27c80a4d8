//! Decoder counters.

/// Counters accumulated by a [`FrameDecoder`](super::FrameDecoder).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames consumed to completion, with or without a profile.
    pub frames_decoded: u64,
    /// Completed frames that carried no valid range profile.
    pub frames_without_profile: u64,
    /// Frames dropped as `InvalidHeader` or `MalformedTlv`.
    pub frames_discarded: u64,
    /// Resynchronisation episodes reported as `SyncLost`.
    pub resync_events: u64,
    /// Bytes dropped while seeking a marker.
    pub bytes_discarded: u64,
    /// Range-profile records skipped for their size.
    pub size_mismatches: u64,
}

impl DecoderStats {
    /// Frames that produced a range profile.
    #[must_use]
    pub fn profiles_decoded(&self) -> u64 {
        self.frames_decoded.saturating_sub(self.frames_without_profile)
    }
}
