//! Delivery of decoded profiles to consumers.
//!
//! [`FrameChannel`] fans each profile out to two independent paths:
//!
//! - a single latest-value slot read by visualisation through [`LatestProfile`]. Publishing
//!   overwrites any unread value and never waits for a reader.
//! - a bounded [`ProfileArchive`] that keeps the most recent profiles for export, evicting the
//!   oldest when full.
//!
//! Only the acquisition task publishes. The archive lock is held for O(1)
//! bookkeeping on publish, and for the duration of an export.

mod archive;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use archive::{
    ArchiveConfig,
    ArchiveStats,
    DEFAULT_ARCHIVE_CAPACITY,
    ProfileArchive,
    Retention,
};
use tokio::sync::watch;

use crate::{
    export::{ArchiveSink, ExportError},
    profile::RangeProfile,
};

/// Producer side of the profile handoff.
///
/// # Examples
///
/// ```
/// use radarframe::{
///     channel::{ArchiveConfig, FrameChannel},
///     profile::RangeProfile,
/// };
///
/// let channel = FrameChannel::new(ArchiveConfig::default());
/// let mut latest = channel.subscribe();
///
/// channel.publish(RangeProfile::new(1, vec![3; 8]));
/// channel.publish(RangeProfile::new(2, vec![4; 8]));
///
/// let seen = latest.poll().expect("a profile was published");
/// assert_eq!(seen.frame_number(), 2);
/// assert!(latest.poll().is_none());
/// assert_eq!(channel.archive_stats().len, 2);
/// ```
#[derive(Debug)]
pub struct FrameChannel {
    latest: watch::Sender<Option<Arc<RangeProfile>>>,
    archive: Mutex<ProfileArchive>,
}

impl FrameChannel {
    /// Create a channel with an empty slot and archive.
    #[must_use]
    pub fn new(config: ArchiveConfig) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            latest,
            archive: Mutex::new(ProfileArchive::new(config)),
        }
    }

    /// Publish a profile to both paths.
    pub fn publish(&self, profile: RangeProfile) {
        let profile = Arc::new(profile);
        self.lock_archive().push(Arc::clone(&profile));
        self.latest.send_replace(Some(profile));
    }

    /// Reader for the latest-value slot.
    #[must_use]
    pub fn subscribe(&self) -> LatestProfile {
        LatestProfile {
            rx: self.latest.subscribe(),
        }
    }

    /// Most recently published profile, if any.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<RangeProfile>> { self.latest.borrow().clone() }

    /// Flush the archive to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the sink's [`ExportError`]; archived profiles are kept.
    pub fn export<S>(&self, sink: &mut S) -> Result<usize, ExportError>
    where
        S: ArchiveSink + ?Sized,
    {
        self.lock_archive().export(sink)
    }

    /// Drop every archived profile.
    pub fn clear_archive(&self) { self.lock_archive().clear(); }

    /// Snapshot of the archive, oldest first.
    #[must_use]
    pub fn archived(&self) -> Vec<Arc<RangeProfile>> {
        self.lock_archive().iter().cloned().collect()
    }

    /// Archive counters.
    #[must_use]
    pub fn archive_stats(&self) -> ArchiveStats { self.lock_archive().stats() }

    fn lock_archive(&self) -> MutexGuard<'_, ProfileArchive> {
        self.archive.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Non-blocking reader of the latest published profile.
#[derive(Clone, Debug)]
pub struct LatestProfile {
    rx: watch::Receiver<Option<Arc<RangeProfile>>>,
}

impl LatestProfile {
    /// Take the newest profile if one was published since the last poll.
    ///
    /// Intermediate profiles published between polls are skipped; a poll
    /// never returns a profile older than one it already returned.
    pub fn poll(&mut self) -> Option<Arc<RangeProfile>> {
        let current = self.rx.borrow_and_update();
        if current.has_changed() {
            current.clone()
        } else {
            None
        }
    }

    /// Wait until a newer profile is published.
    ///
    /// Returns `None` once the [`FrameChannel`] has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<RangeProfile>> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }
}

#[cfg(test)]
mod tests;
