//! Bounded archive of recent range profiles.

use std::{collections::VecDeque, num::NonZeroUsize, sync::Arc};

use log::{debug, trace};

use crate::{
    export::{ArchiveSink, ExportError},
    metrics,
    profile::RangeProfile,
};

/// Default number of profiles retained.
pub const DEFAULT_ARCHIVE_CAPACITY: usize = 1024;

/// What happens to archived profiles after a successful export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Retention {
    /// Empty the archive once exported.
    #[default]
    ClearOnExport,
    /// Keep exported profiles until [`ProfileArchive::clear`] is called.
    ///
    /// The capacity bound and drop-oldest eviction still apply.
    RetainUntilCleared,
}

/// Archive settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Maximum number of profiles retained.
    pub capacity: NonZeroUsize,
    /// Behaviour after export.
    pub retention: Retention,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(DEFAULT_ARCHIVE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            retention: Retention::default(),
        }
    }
}

impl ArchiveConfig {
    /// Set the capacity.
    #[must_use]
    pub fn capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the retention behaviour.
    #[must_use]
    pub fn retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }
}

/// Archive counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Profiles currently retained.
    pub len: usize,
    /// Configured capacity.
    pub capacity: usize,
    /// Profiles evicted to make room.
    pub evictions: u64,
    /// Pushes rejected because they repeated the newest frame number.
    pub duplicates: u64,
    /// Successful exports.
    pub exports: u64,
}

/// Ordered, bounded, duplicate-free history of profiles.
///
/// # Examples
///
/// ```
/// use std::{num::NonZeroUsize, sync::Arc};
///
/// use radarframe::{
///     channel::{ArchiveConfig, ProfileArchive},
///     profile::RangeProfile,
/// };
///
/// let capacity = NonZeroUsize::new(2).expect("non-zero");
/// let mut archive = ProfileArchive::new(ArchiveConfig::default().capacity(capacity));
/// for n in 1..=3 {
///     archive.push(Arc::new(RangeProfile::new(n, vec![0; 4])));
/// }
///
/// let kept: Vec<_> = archive.iter().map(|p| p.frame_number()).collect();
/// assert_eq!(kept, vec![2, 3]);
/// assert_eq!(archive.stats().evictions, 1);
/// ```
#[derive(Debug)]
pub struct ProfileArchive {
    config: ArchiveConfig,
    profiles: VecDeque<Arc<RangeProfile>>,
    evictions: u64,
    duplicates: u64,
    exports: u64,
}

impl ProfileArchive {
    /// Create an empty archive.
    #[must_use]
    pub fn new(config: ArchiveConfig) -> Self {
        Self {
            profiles: VecDeque::with_capacity(config.capacity.get()),
            config,
            evictions: 0,
            duplicates: 0,
            exports: 0,
        }
    }

    /// Append a profile, evicting the oldest when full.
    ///
    /// Returns `false` if the profile repeats the newest frame number and was
    /// rejected.
    pub fn push(&mut self, profile: Arc<RangeProfile>) -> bool {
        if self
            .profiles
            .back()
            .is_some_and(|last| last.frame_number() == profile.frame_number())
        {
            debug!(
                "archive rejected duplicate frame {}",
                profile.frame_number()
            );
            self.duplicates += 1;
            return false;
        }
        if self.profiles.len() >= self.config.capacity.get()
            && let Some(evicted) = self.profiles.pop_front()
        {
            trace!("archive evicted frame {}", evicted.frame_number());
            self.evictions += 1;
            metrics::inc_archive_evictions();
        }
        self.profiles.push_back(profile);
        true
    }

    /// Flush the archive to `sink`.
    ///
    /// Returns the number of profiles exported. The archive is emptied
    /// afterwards under [`Retention::ClearOnExport`].
    ///
    /// # Errors
    ///
    /// Returns the sink's [`ExportError`]; the archive is left unchanged.
    pub fn export<S>(&mut self, sink: &mut S) -> Result<usize, ExportError>
    where
        S: ArchiveSink + ?Sized,
    {
        let profiles = self.profiles.make_contiguous();
        sink.export(profiles)?;
        let exported = profiles.len();
        self.exports += 1;
        if self.config.retention == Retention::ClearOnExport {
            self.profiles.clear();
        }
        Ok(exported)
    }

    /// Drop every retained profile.
    pub fn clear(&mut self) { self.profiles.clear(); }

    /// Retained profiles, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RangeProfile>> { self.profiles.iter() }

    /// Number of retained profiles.
    #[must_use]
    pub fn len(&self) -> usize { self.profiles.len() }

    /// Whether no profiles are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.profiles.is_empty() }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> ArchiveStats {
        ArchiveStats {
            len: self.profiles.len(),
            capacity: self.config.capacity.get(),
            evictions: self.evictions,
            duplicates: self.duplicates,
            exports: self.exports,
        }
    }
}
