//! Unit tests for the resumable frame decoder.

use std::num::NonZeroUsize;

use rstest::{fixture, rstest};

use super::*;
use crate::frame::{FRAME_MARKER, FrameBuilder, HeaderFault, RANGE_PROFILE_TLV};

const BINS: usize = 256;

#[fixture]
fn decoder() -> FrameDecoder {
    FrameDecoder::new(DecoderConfig::new(
        NonZeroUsize::new(BINS).expect("non-zero bins"),
    ))
}

fn profile_frame(frame_number: u32, value: u16) -> Vec<u8> {
    FrameBuilder::new()
        .frame_number(frame_number)
        .range_profile(&[value; BINS])
        .pad_to_alignment()
        .build()
}

/// Drain every outcome the decoder reports for the buffered bytes.
fn drain(
    decoder: &mut FrameDecoder,
    buf: &mut StreamBuffer,
) -> (Vec<DecodedFrame>, Vec<DecodeError>) {
    let mut frames = Vec::new();
    let mut errors = Vec::new();
    loop {
        match decoder.decode(buf) {
            Ok(Some(frame)) => frames.push(frame),
            Ok(None) => return (frames, errors),
            Err(err) => errors.push(err),
        }
    }
}

#[rstest]
fn single_frame_yields_profile_of_ones(mut decoder: FrameDecoder) {
    let bytes = FrameBuilder::new()
        .frame_number(1)
        .range_profile(&[1; BINS])
        .build();
    let mut buf = StreamBuffer::new();
    buf.append(&bytes);

    let frame = decoder
        .decode(&mut buf)
        .expect("frame is well formed")
        .expect("frame is complete");
    let profile = frame.profile.expect("range profile present");

    assert_eq!(profile.frame_number(), 1);
    assert_eq!(profile.samples(), &[1; BINS]);
    assert!(frame.skipped.is_empty());
    assert!(buf.is_empty());
    assert_eq!(decoder.state(), DecoderState::FrameReady);
}

#[rstest]
#[case::inside_marker(3)]
#[case::inside_header(21)]
#[case::inside_record_header(44)]
#[case::inside_payload(300)]
#[case::inside_padding(565)]
fn split_feed_matches_single_feed(mut decoder: FrameDecoder, #[case] split: usize) {
    let bytes = profile_frame(6, 0x0102);
    let mut buf = StreamBuffer::new();

    buf.append(&bytes[..split]);
    assert_eq!(decoder.decode(&mut buf), Ok(None));
    assert_eq!(buf.len(), split, "waiting must not drop buffered bytes");

    buf.append(&bytes[split..]);
    let frame = decoder
        .decode(&mut buf)
        .expect("frame is well formed")
        .expect("frame is complete");
    assert_eq!(
        frame.profile,
        Some(RangeProfile::new(6, vec![0x0102; BINS]))
    );
}

#[rstest]
fn header_wait_reports_header_pending(mut decoder: FrameDecoder) {
    let bytes = profile_frame(2, 1);
    let mut buf = StreamBuffer::new();
    buf.append(&bytes[..12]);
    assert_eq!(decoder.decode(&mut buf), Ok(None));
    assert_eq!(decoder.state(), DecoderState::HeaderPending);

    buf.append(&bytes[12..100]);
    assert_eq!(decoder.decode(&mut buf), Ok(None));
    assert_eq!(decoder.state(), DecoderState::TlvPending);
}

#[rstest]
fn garbage_prefix_reports_one_sync_lost(mut decoder: FrameDecoder) {
    let mut buf = StreamBuffer::new();
    buf.append(&[0x55; 37]);
    buf.append(&profile_frame(11, 3));

    let (frames, errors) = drain(&mut decoder, &mut buf);
    assert_eq!(errors, vec![DecodeError::SyncLost { discarded: 37 }]);
    assert_eq!(frames.len(), 1);
    assert_eq!(
        frames[0].profile.as_ref().map(RangeProfile::frame_number),
        Some(11)
    );
    assert_eq!(decoder.stats().resync_events, 1);
    assert_eq!(decoder.stats().bytes_discarded, 37);
}

#[rstest]
fn garbage_across_reads_is_one_episode(mut decoder: FrameDecoder) {
    let mut buf = StreamBuffer::new();
    buf.append(&[0x55; 100]);
    assert_eq!(decoder.decode(&mut buf), Ok(None));
    buf.append(&[0x66; 100]);
    assert_eq!(decoder.decode(&mut buf), Ok(None));
    buf.append(&profile_frame(1, 1));

    let (frames, errors) = drain(&mut decoder, &mut buf);
    assert_eq!(errors, vec![DecodeError::SyncLost { discarded: 200 }]);
    assert_eq!(frames.len(), 1);
}

#[rstest]
fn oversized_record_is_discarded_and_next_frame_decodes(mut decoder: FrameDecoder) {
    let corrupt = FrameBuilder::new()
        .frame_number(20)
        .tlv_with_declared_len(RANGE_PROFILE_TLV, 10_000, vec![0; 64])
        .build();
    let mut buf = StreamBuffer::new();
    buf.append(&corrupt);
    buf.append(&profile_frame(21, 9));

    let first = decoder.decode(&mut buf);
    assert!(matches!(
        first,
        Err(DecodeError::MalformedTlv {
            frame_number: 20,
            ..
        })
    ));
    assert_eq!(decoder.state(), DecoderState::FrameDiscarded);

    let (frames, errors) = drain(&mut decoder, &mut buf);
    assert_eq!(
        errors,
        vec![DecodeError::SyncLost {
            discarded: corrupt.len() - FRAME_MARKER.len()
        }]
    );
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].header.frame_number, 21);
    assert_eq!(decoder.stats().frames_discarded, 1);
}

#[rstest]
fn invalid_header_resumes_past_its_marker(mut decoder: FrameDecoder) {
    let mut bytes = FrameBuilder::new().frame_number(4).declared_len(12).build();
    bytes.extend_from_slice(&profile_frame(5, 2));
    let mut buf = StreamBuffer::new();
    buf.append(&bytes);

    assert_eq!(
        decoder.decode(&mut buf),
        Err(DecodeError::InvalidHeader {
            frame_number: 4,
            fault: HeaderFault::TooShort {
                declared: 12,
                min: HEADER_LEN
            },
        })
    );
    let (frames, _) = drain(&mut decoder, &mut buf);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].header.frame_number, 5);
}

#[rstest]
fn implausible_length_does_not_stall(mut decoder: FrameDecoder) {
    let bogus = FrameBuilder::new().frame_number(1).declared_len(u32::MAX).build();
    let mut buf = StreamBuffer::new();
    buf.append(&bogus);

    assert!(matches!(
        decoder.decode(&mut buf),
        Err(DecodeError::InvalidHeader {
            fault: HeaderFault::TooLong { .. },
            ..
        })
    ));
    assert_eq!(decoder.decode(&mut buf), Ok(None));
}

#[rstest]
#[case::exact(512, true)]
#[case::short(510, false)]
fn range_profile_size_is_checked(
    mut decoder: FrameDecoder,
    #[case] payload_len: usize,
    #[case] accepted: bool,
) {
    let bytes = FrameBuilder::new()
        .frame_number(3)
        .tlv(RANGE_PROFILE_TLV, vec![0; payload_len])
        .build();
    let mut buf = StreamBuffer::new();
    buf.append(&bytes);

    let frame = decoder
        .decode(&mut buf)
        .expect("size mismatch never discards the frame")
        .expect("frame is complete");
    assert_eq!(frame.profile.is_some(), accepted);
    assert_eq!(frame.skipped.is_empty(), accepted);
    if let Some(profile) = frame.profile {
        assert_eq!(profile.len(), BINS);
    }
}

#[rstest]
fn mismatched_record_does_not_hide_later_profile(mut decoder: FrameDecoder) {
    let bytes = FrameBuilder::new()
        .frame_number(8)
        .tlv(RANGE_PROFILE_TLV, vec![0; 510])
        .tlv(1, vec![0xAB; 12])
        .range_profile(&[4; BINS])
        .pad_to_alignment()
        .build();
    let mut buf = StreamBuffer::new();
    buf.append(&bytes);

    let frame = decoder
        .decode(&mut buf)
        .expect("frame is well formed")
        .expect("frame is complete");
    assert_eq!(frame.profile, Some(RangeProfile::new(8, vec![4; BINS])));
    assert_eq!(
        frame.skipped,
        vec![DecodeError::SizeMismatch {
            frame_number: 8,
            expected: 512,
            actual: 510
        }]
    );
    assert_eq!(decoder.stats().size_mismatches, 1);
}

#[rstest]
fn frame_without_profile_is_still_consumed(mut decoder: FrameDecoder) {
    let mut buf = StreamBuffer::new();
    buf.append(&FrameBuilder::new().frame_number(2).tlv(6, vec![1; 8]).build());
    buf.append(&profile_frame(3, 1));

    let (frames, errors) = drain(&mut decoder, &mut buf);
    assert!(errors.is_empty());
    assert_eq!(frames.len(), 2);
    assert!(frames[0].profile.is_none());
    assert_eq!(decoder.stats().frames_without_profile, 1);
    assert_eq!(decoder.stats().profiles_decoded(), 1);
}

#[rstest]
fn eof_with_partial_frame_reports_and_drops(mut decoder: FrameDecoder) {
    let bytes = profile_frame(9, 1);
    let mut buf = StreamBuffer::new();
    buf.append(&bytes[..200]);

    let err = decoder
        .decode_eof(&mut buf)
        .expect_err("partial frame is reported");
    assert!(matches!(
        err,
        DecodeError::IncompleteFrame {
            frame_number: 9,
            have: 200,
            ..
        }
    ));
    assert!(buf.is_empty());
    assert_eq!(decoder.state(), DecoderState::Seeking);
    assert_eq!(decoder.decode_eof(&mut buf), Ok(None));
}

#[rstest]
fn eof_still_returns_complete_frames(mut decoder: FrameDecoder) {
    let mut buf = StreamBuffer::new();
    buf.append(&profile_frame(1, 1));
    buf.append(&FRAME_MARKER);

    assert!(matches!(decoder.decode_eof(&mut buf), Ok(Some(_))));
    assert!(matches!(
        decoder.decode_eof(&mut buf),
        Err(DecodeError::IncompleteHeader { have: 8, .. })
    ));
}

#[rstest]
fn back_to_back_frames_decode_in_order(mut decoder: FrameDecoder) {
    let mut buf = StreamBuffer::new();
    for n in 1..=5 {
        buf.append(&profile_frame(n, u16::try_from(n).expect("small")));
    }
    let (frames, errors) = drain(&mut decoder, &mut buf);
    assert!(errors.is_empty());
    let numbers: Vec<_> = frames.iter().map(|f| f.header.frame_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
}
