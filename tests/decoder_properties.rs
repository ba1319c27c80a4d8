//! Property tests for the resumable decoder.
//!
//! Runners are seeded deterministically so failures reproduce across runs.

use std::num::NonZeroUsize;

use proptest::{
    collection::vec,
    prelude::{Strategy, any},
    strategy::Just,
    test_runner::{Config as ProptestConfig, RngAlgorithm, TestCaseError, TestRng, TestRunner},
};
use radarframe::{
    decoder::{DecoderConfig, FrameDecoder},
    frame::{DecodeError, FRAME_MARKER, MARKER_LEN},
};
use radarframe_testing::{FIXTURE_BINS, feed_all, feed_chunked, frame_stream, profile_frame};

fn deterministic_runner(cases: u32) -> TestRunner {
    let config = ProptestConfig {
        cases,
        ..ProptestConfig::default()
    };
    let rng = TestRng::deterministic_rng(RngAlgorithm::ChaCha);
    TestRunner::new_with_rng(config, rng)
}

fn decoder() -> FrameDecoder { decoder_for(FIXTURE_BINS) }

fn decoder_for(bins: usize) -> FrameDecoder {
    FrameDecoder::new(DecoderConfig::new(
        NonZeroUsize::new(bins).expect("non-zero bins"),
    ))
}

/// A bin count and one to three profiles of that many arbitrary samples.
fn profiles_strategy() -> impl Strategy<Value = (usize, Vec<Vec<u16>>)> {
    (1usize..160).prop_flat_map(|bins| (Just(bins), vec(vec(any::<u16>(), bins), 1..4)))
}

/// Garbage that cannot contain the marker's first byte, so it never starts a
/// partial match.
fn garbage_strategy() -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>().prop_filter("not a marker byte", |b| *b != FRAME_MARKER[0]), 1..300)
}

/// Garbage ending in a proper prefix of the marker.
fn garbage_with_marker_tail() -> impl Strategy<Value = Vec<u8>> {
    (garbage_strategy(), 1..MARKER_LEN).prop_map(|(mut garbage, keep)| {
        garbage.extend_from_slice(&FRAME_MARKER[..keep]);
        garbage
    })
}

#[test]
fn chunking_never_changes_the_decoded_frames() {
    let stream = frame_stream(1, 4, FIXTURE_BINS);
    let reference = feed_all(&mut decoder(), &stream);
    assert_eq!(reference.profile_numbers(), vec![1, 2, 3, 4]);

    let mut runner = deterministic_runner(64);
    runner
        .run(&vec(1usize..700, 1..8), |chunks| {
            let outcome = feed_chunked(&mut decoder(), &stream, &chunks);
            if outcome.frames != reference.frames || !outcome.errors.is_empty() {
                return Err(TestCaseError::fail(format!(
                    "chunks {chunks:?} decoded {:?} with errors {:?}",
                    outcome.profile_numbers(),
                    outcome.errors
                )));
            }
            Ok(())
        })
        .expect("split-feed property holds");
}

#[test]
fn generated_profiles_survive_any_split() {
    let mut runner = deterministic_runner(64);
    runner
        .run(
            &(profiles_strategy(), vec(1usize..700, 1..8)),
            |((bins, profiles), chunks)| {
                let stream: Vec<u8> = profiles
                    .iter()
                    .zip(1u32..)
                    .flat_map(|(samples, n)| profile_frame(n, samples))
                    .collect();
                let outcome = feed_chunked(&mut decoder_for(bins), &stream, &chunks);
                let decoded: Vec<Vec<u16>> = outcome
                    .frames
                    .iter()
                    .filter_map(|f| f.profile.as_ref().map(|p| p.samples().to_vec()))
                    .collect();

                if decoded != profiles || !outcome.errors.is_empty() {
                    return Err(TestCaseError::fail(format!(
                        "{bins} bins split at {chunks:?} decoded {} of {} profiles with errors {:?}",
                        decoded.len(),
                        profiles.len(),
                        outcome.errors
                    )));
                }
                Ok(())
            },
        )
        .expect("generated profiles decode unchanged");
}

#[test]
fn garbage_prefix_is_one_resync_episode() {
    assert_single_resync(garbage_strategy());
}

#[test]
fn garbage_ending_in_partial_marker_is_one_resync_episode() {
    assert_single_resync(garbage_with_marker_tail());
}

fn assert_single_resync(garbage: impl Strategy<Value = Vec<u8>>) {
    let stream = frame_stream(10, 2, FIXTURE_BINS);
    let mut runner = deterministic_runner(64);
    runner
        .run(&(garbage, vec(1usize..200, 1..5)), |(garbage, chunks)| {
            let mut input = garbage.clone();
            input.extend_from_slice(&stream);
            let outcome = feed_chunked(&mut decoder(), &input, &chunks);

            if outcome.errors != vec![DecodeError::SyncLost { discarded: garbage.len() }] {
                return Err(TestCaseError::fail(format!(
                    "unexpected events {:?}",
                    outcome.errors
                )));
            }
            if outcome.profile_numbers() != vec![10, 11] {
                return Err(TestCaseError::fail(format!(
                    "unexpected frames {:?}",
                    outcome.profile_numbers()
                )));
            }
            Ok(())
        })
        .expect("garbage tolerance property holds");
}

#[test]
fn arbitrary_bytes_never_panic() {
    let mut runner = deterministic_runner(128);
    runner
        .run(&(vec(any::<u8>(), 0..2048), vec(1usize..97, 1..6)), |(bytes, chunks)| {
            let mut with_markers = bytes.clone();
            with_markers.extend_from_slice(&FRAME_MARKER);
            with_markers.extend_from_slice(&bytes);
            let outcome = feed_chunked(&mut decoder(), &with_markers, &chunks);
            for frame in &outcome.frames {
                if let Some(profile) = &frame.profile
                    && profile.len() != FIXTURE_BINS
                {
                    return Err(TestCaseError::fail("profile with wrong bin count"));
                }
            }
            Ok(())
        })
        .expect("decoder tolerates arbitrary input");
}
