//! Unit tests for the latest-value slot and the bounded archive.

use std::{num::NonZeroUsize, sync::Arc};

use rstest::rstest;

use super::*;
use crate::export::ArchiveSink;

fn capacity(n: usize) -> NonZeroUsize { NonZeroUsize::new(n).expect("non-zero capacity") }

fn profile(frame_number: u32) -> RangeProfile { RangeProfile::new(frame_number, vec![0; 4]) }

/// Sink that records what it was given, or fails on demand.
#[derive(Default)]
struct RecordingSink {
    batches: Vec<Vec<u32>>,
    fail: bool,
}

impl ArchiveSink for RecordingSink {
    fn export(&mut self, profiles: &[Arc<RangeProfile>]) -> Result<(), ExportError> {
        if self.fail {
            return Err(ExportError::Io(std::io::Error::other("disk full")));
        }
        self.batches
            .push(profiles.iter().map(|p| p.frame_number()).collect());
        Ok(())
    }
}

#[rstest]
#[case(3, 10)]
#[case(1, 2)]
#[case(5, 5)]
fn archive_keeps_most_recent_in_order(#[case] cap: usize, #[case] pushed: u32) {
    let channel = FrameChannel::new(ArchiveConfig::default().capacity(capacity(cap)));
    for n in 1..=pushed {
        channel.publish(profile(n));
    }

    let kept: Vec<_> = channel.archived().iter().map(|p| p.frame_number()).collect();
    let first_kept = pushed - u32::try_from(cap).expect("small") + 1;
    assert_eq!(kept, (first_kept..=pushed).collect::<Vec<_>>());

    let stats = channel.archive_stats();
    assert_eq!(stats.len, cap);
    assert_eq!(
        stats.evictions,
        u64::from(pushed) - u64::try_from(cap).expect("small")
    );
}

#[test]
fn duplicate_frame_numbers_are_rejected() {
    let mut archive = ProfileArchive::new(ArchiveConfig::default());
    assert!(archive.push(Arc::new(profile(1))));
    assert!(!archive.push(Arc::new(profile(1))));
    assert!(archive.push(Arc::new(profile(2))));
    assert_eq!(archive.len(), 2);
    assert_eq!(archive.stats().duplicates, 1);
}

#[test]
fn export_clears_by_default() {
    let channel = FrameChannel::new(ArchiveConfig::default());
    channel.publish(profile(1));
    channel.publish(profile(2));
    let mut sink = RecordingSink::default();

    assert_eq!(channel.export(&mut sink).expect("export succeeds"), 2);
    assert_eq!(sink.batches, vec![vec![1, 2]]);
    assert_eq!(channel.archive_stats().len, 0);
    assert_eq!(channel.archive_stats().exports, 1);
}

#[test]
fn retained_archive_survives_export_until_cleared() {
    let channel = FrameChannel::new(
        ArchiveConfig::default().retention(Retention::RetainUntilCleared),
    );
    channel.publish(profile(1));
    let mut sink = RecordingSink::default();

    channel.export(&mut sink).expect("export succeeds");
    assert_eq!(channel.archive_stats().len, 1);

    channel.clear_archive();
    assert_eq!(channel.archive_stats().len, 0);
}

#[test]
fn failed_export_keeps_profiles() {
    let channel = FrameChannel::new(ArchiveConfig::default());
    channel.publish(profile(1));
    let mut sink = RecordingSink {
        fail: true,
        ..RecordingSink::default()
    };

    assert!(channel.export(&mut sink).is_err());
    assert_eq!(channel.archive_stats().len, 1);
    assert_eq!(channel.archive_stats().exports, 0);
}

#[test]
fn latest_slot_skips_to_newest() {
    let channel = FrameChannel::new(ArchiveConfig::default());
    let mut latest = channel.subscribe();
    assert!(latest.poll().is_none());

    for n in 1..=4 {
        channel.publish(profile(n));
    }
    assert_eq!(latest.poll().map(|p| p.frame_number()), Some(4));
    assert!(latest.poll().is_none());

    channel.publish(profile(5));
    assert_eq!(latest.poll().map(|p| p.frame_number()), Some(5));
    assert_eq!(channel.latest().map(|p| p.frame_number()), Some(5));
}

#[test]
fn last_value_is_readable_after_producer_drops() {
    let channel = FrameChannel::new(ArchiveConfig::default());
    let mut latest = channel.subscribe();
    channel.publish(profile(9));
    drop(channel);

    assert_eq!(latest.poll().map(|p| p.frame_number()), Some(9));
}

#[tokio::test]
async fn changed_wakes_on_publish() {
    let channel = Arc::new(FrameChannel::new(ArchiveConfig::default()));
    let mut latest = channel.subscribe();
    let producer = Arc::clone(&channel);

    let waiter = tokio::spawn(async move { latest.changed().await });
    producer.publish(profile(3));

    let seen = waiter.await.expect("waiter task completes");
    assert_eq!(seen.map(|p| p.frame_number()), Some(3));
}
