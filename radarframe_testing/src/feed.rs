//! Drive a [`FrameDecoder`] with chunked input.

use radarframe::{
    buffer::StreamBuffer,
    decoder::{DecodedFrame, FrameDecoder},
    frame::DecodeError,
};

/// Everything a decoder reported for one input.
#[derive(Debug, Default)]
pub struct FeedOutcome {
    /// Completed frames, in order.
    pub frames: Vec<DecodedFrame>,
    /// Recoverable events, in order.
    pub errors: Vec<DecodeError>,
}

impl FeedOutcome {
    /// Frame numbers of the frames that carried a profile.
    #[must_use]
    pub fn profile_numbers(&self) -> Vec<u32> {
        self.frames
            .iter()
            .filter_map(|f| f.profile.as_ref().map(radarframe::RangeProfile::frame_number))
            .collect()
    }
}

/// Call `decode` until the decoder asks for more input.
pub fn drain(decoder: &mut FrameDecoder, buf: &mut StreamBuffer, out: &mut FeedOutcome) {
    loop {
        match decoder.decode(buf) {
            Ok(Some(frame)) => out.frames.push(frame),
            Ok(None) => return,
            Err(err) => out.errors.push(err),
        }
    }
}

/// Feed `bytes` split at the given chunk lengths, cycling through `chunks`.
///
/// A zero entry is treated as one byte.
pub fn feed_chunked(decoder: &mut FrameDecoder, bytes: &[u8], chunks: &[usize]) -> FeedOutcome {
    let mut buf = StreamBuffer::new();
    let mut out = FeedOutcome::default();
    let mut rest = bytes;
    let mut sizes = chunks.iter().copied().cycle();
    while !rest.is_empty() {
        let size = sizes.next().unwrap_or(rest.len()).max(1).min(rest.len());
        let (head, tail) = rest.split_at(size);
        buf.append(head);
        drain(decoder, &mut buf, &mut out);
        rest = tail;
    }
    out
}

/// Feed `bytes` in a single append.
pub fn feed_all(decoder: &mut FrameDecoder, bytes: &[u8]) -> FeedOutcome {
    feed_chunked(decoder, bytes, &[bytes.len()])
}
