//! Frame marker search and resynchronisation.

use log::trace;

use super::{FRAME_MARKER, MARKER_LEN};
use crate::buffer::StreamBuffer;

/// Result of scanning a byte slice for [`FRAME_MARKER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The marker starts at this offset.
    Found(usize),
    /// No marker; the last `keep` bytes may be the start of a split marker.
    NotFound {
        /// Length of the longest tail that is a proper prefix of the marker.
        keep: usize,
    },
}

/// Locate the first frame marker in `haystack`.
///
/// # Examples
///
/// ```
/// use radarframe::frame::{FRAME_MARKER, SyncOutcome, find_marker};
///
/// let mut bytes = vec![0xAA, 0xBB];
/// bytes.extend_from_slice(&FRAME_MARKER);
/// assert_eq!(find_marker(&bytes), SyncOutcome::Found(2));
///
/// assert_eq!(find_marker(&[0xAA, 0x02, 0x01]), SyncOutcome::NotFound { keep: 2 });
/// ```
#[must_use]
pub fn find_marker(haystack: &[u8]) -> SyncOutcome {
    if let Some(offset) = haystack
        .windows(MARKER_LEN)
        .position(|window| window == FRAME_MARKER)
    {
        return SyncOutcome::Found(offset);
    }
    let keep = (1..MARKER_LEN)
        .rev()
        .find(|&len| FRAME_MARKER.get(..len).is_some_and(|prefix| haystack.ends_with(prefix)))
        .unwrap_or(0);
    SyncOutcome::NotFound { keep }
}

/// Outcome of one [`FrameSynchronizer::sync`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStep {
    /// The buffer now starts at a marker.
    ///
    /// `discarded` totals every byte dropped since the previous alignment,
    /// across however many calls the search took.
    Aligned {
        /// Bytes discarded during this resynchronisation episode.
        discarded: usize,
    },
    /// No marker yet; `discarded` bytes were dropped by this call.
    Seeking {
        /// Bytes dropped by this call.
        discarded: usize,
    },
}

/// Aligns a [`StreamBuffer`] to the next frame marker.
#[derive(Debug, Default)]
pub struct FrameSynchronizer {
    episode_discarded: usize,
}

impl FrameSynchronizer {
    /// Create a synchroniser with no resynchronisation in progress.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Discard bytes until `buf` starts at a marker or no marker is present.
    ///
    /// When no marker is found only the longest tail that could begin a
    /// split marker is retained, so garbage never accumulates.
    pub fn sync(&mut self, buf: &mut StreamBuffer) -> SyncStep {
        match find_marker(buf.as_slice()) {
            SyncOutcome::Found(offset) => {
                self.drop_head(buf, offset);
                SyncStep::Aligned {
                    discarded: std::mem::take(&mut self.episode_discarded),
                }
            }
            SyncOutcome::NotFound { keep } => {
                let discarded = buf.len().saturating_sub(keep);
                self.drop_head(buf, discarded);
                SyncStep::Seeking { discarded }
            }
        }
    }

    /// Bytes discarded so far in an unfinished resynchronisation.
    #[must_use]
    pub fn pending_discarded(&self) -> usize { self.episode_discarded }

    fn drop_head(&mut self, buf: &mut StreamBuffer, n: usize) {
        if n == 0 {
            return;
        }
        if buf.consume(n).is_ok() {
            trace!("discarded {n} bytes while seeking frame marker");
            self.episode_discarded = self.episode_discarded.saturating_add(n);
        }
    }
}
