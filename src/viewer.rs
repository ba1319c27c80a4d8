//! Fixed-cadence consumer of the latest profile.
//!
//! The [`Viewer`] wakes on a [`tokio::time::interval`], takes the newest
//! profile from the latest-value slot without blocking, and forwards it to a
//! [`ProfileView`]. Profiles published between ticks are skipped. A profile
//! whose frame number is lower than the last one rendered is refused.

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{channel::LatestProfile, profile::RangeProfile};

/// Rendering backend for live profiles.
pub trait ProfileView: Send {
    /// Display `profile`.
    fn render(&mut self, profile: &RangeProfile);
}

impl<F> ProfileView for F
where
    F: FnMut(&RangeProfile) + Send,
{
    fn render(&mut self, profile: &RangeProfile) { self(profile); }
}

/// View that logs a one-line summary of each profile.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogView {
    /// Metres per range bin, used to report the peak distance.
    pub bin_spacing_m: f64,
}

impl ProfileView for LogView {
    #[expect(
        clippy::cast_precision_loss,
        reason = "Range-bin indices are far below f64's exact integer range."
    )]
    fn render(&mut self, profile: &RangeProfile) {
        if let Some((bin, value)) = profile.peak() {
            info!(
                frame = profile.frame_number(),
                peak_bin = bin,
                peak_range_m = bin as f64 * self.bin_spacing_m,
                peak_value = value,
                "range profile"
            );
        }
    }
}

/// Polling loop driving a [`ProfileView`].
#[derive(Debug)]
pub struct Viewer<V> {
    view: V,
    latest: LatestProfile,
    interval: Duration,
    last_rendered: Option<u32>,
    rendered: u64,
    refused: u64,
}

impl<V: ProfileView> Viewer<V> {
    /// Create a viewer polling `latest` every `interval`.
    #[must_use]
    pub fn new(view: V, latest: LatestProfile, interval: Duration) -> Self {
        Self {
            view,
            latest,
            interval,
            last_rendered: None,
            rendered: 0,
            refused: 0,
        }
    }

    /// Render the newest profile if one arrived since the last poll.
    ///
    /// Returns `true` if a profile was rendered.
    pub fn poll_once(&mut self) -> bool {
        let Some(profile) = self.latest.poll() else {
            return false;
        };
        let frame = profile.frame_number();
        if let Some(last) = self.last_rendered
            && frame < last
        {
            warn!(frame, last, "refusing to render an older frame");
            self.refused += 1;
            return false;
        }
        self.view.render(&profile);
        self.last_rendered = Some(frame);
        self.rendered += 1;
        true
    }

    /// Poll until `shutdown` is cancelled, then return the view.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use radarframe::{
    ///     channel::{ArchiveConfig, FrameChannel},
    ///     profile::RangeProfile,
    ///     viewer::Viewer,
    /// };
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let channel = FrameChannel::new(ArchiveConfig::default());
    /// channel.publish(RangeProfile::new(4, vec![1, 9, 2]));
    ///
    /// let mut seen = Vec::new();
    /// let viewer = Viewer::new(
    ///     |p: &RangeProfile| seen.push(p.frame_number()),
    ///     channel.subscribe(),
    ///     Duration::from_millis(10),
    /// );
    /// let shutdown = CancellationToken::new();
    /// let stop = shutdown.clone();
    /// tokio::spawn(async move {
    ///     tokio::time::sleep(Duration::from_millis(30)).await;
    ///     stop.cancel();
    /// });
    /// viewer.run(&shutdown).await;
    /// assert_eq!(seen, vec![4]);
    /// # }
    /// ```
    pub async fn run(mut self, shutdown: &CancellationToken) -> V {
        let mut ticks = time::interval(self.interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticks.tick() => {
                    self.poll_once();
                }
            }
        }
        info!(
            rendered = self.rendered,
            refused = self.refused,
            "viewer stopped"
        );
        self.view
    }

    /// Frame number of the last rendered profile.
    #[must_use]
    pub fn last_rendered(&self) -> Option<u32> { self.last_rendered }

    /// Profiles rendered so far.
    #[must_use]
    pub fn rendered(&self) -> u64 { self.rendered }

    /// Profiles refused because they were older than the last rendered one.
    #[must_use]
    pub fn refused(&self) -> u64 { self.refused }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tracing_test::traced_test;

    use super::*;
    use crate::channel::{ArchiveConfig, FrameChannel};

    fn recorder() -> impl FnMut(&RangeProfile) + Send {
        |_: &RangeProfile| {}
    }

    #[traced_test]
    #[test]
    fn older_frame_is_refused() {
        let channel = FrameChannel::new(ArchiveConfig::default());
        let mut viewer = Viewer::new(recorder(), channel.subscribe(), Duration::from_millis(5));

        channel.publish(RangeProfile::new(10, vec![1]));
        assert!(viewer.poll_once());
        channel.publish(RangeProfile::new(3, vec![1]));
        assert!(!viewer.poll_once());

        assert_eq!(viewer.last_rendered(), Some(10));
        assert_eq!(viewer.refused(), 1);
        assert!(logs_contain("refusing to render an older frame"));
    }

    #[test]
    fn nothing_new_renders_nothing() {
        let channel = FrameChannel::new(ArchiveConfig::default());
        let mut viewer = Viewer::new(recorder(), channel.subscribe(), Duration::from_millis(5));
        assert!(!viewer.poll_once());
        channel.publish(RangeProfile::new(1, vec![1]));
        assert!(viewer.poll_once());
        assert!(!viewer.poll_once());
        assert_eq!(viewer.rendered(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn renders_latest_once_per_tick() {
        let channel = Arc::new(FrameChannel::new(ArchiveConfig::default()));
        let shutdown = CancellationToken::new();
        let viewer = Viewer::new(
            Recorder::default(),
            channel.subscribe(),
            Duration::from_millis(100),
        );
        let task = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { viewer.run(&shutdown).await })
        };

        // First tick fires immediately.
        tokio::task::yield_now().await;
        for n in 1..=3 {
            channel.publish(RangeProfile::new(n, vec![0; 2]));
        }
        time::sleep(Duration::from_millis(150)).await;
        channel.publish(RangeProfile::new(4, vec![0; 2]));
        time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();

        let seen = task.await.expect("viewer task");
        assert_eq!(seen.0, vec![3, 4]);
    }

    #[derive(Default)]
    struct Recorder(Vec<u32>);

    impl ProfileView for Recorder {
        fn render(&mut self, profile: &RangeProfile) { self.0.push(profile.frame_number()); }
    }
}
