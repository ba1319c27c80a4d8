//! Bounded iteration over a frame's TLV records.

use log::debug;

use super::{DecodeError, FrameHeader, HEADER_LEN, TLV_HEADER_LEN};
use crate::byte_order::u32_at;

/// Borrowed view of one TLV record.
///
/// The payload borrows from the stream buffer, so a record cannot outlive
/// the bytes it describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TlvRecord<'a> {
    /// Record type identifier.
    pub tlv_type: u32,
    /// Offset of the record header from the start of the frame.
    pub offset: usize,
    /// Payload bytes, excluding the 8-byte record header.
    pub payload: &'a [u8],
}

impl TlvRecord<'_> {
    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.payload.len() }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.payload.is_empty() }
}

/// Iterator over the TLV records of one frame.
///
/// `buffered` holds the frame bytes available so far, starting at the
/// marker. Each item is either a complete record or the condition that ended
/// iteration:
///
/// - [`DecodeError::MalformedTlv`] when a record would cross the declared frame end.
/// - [`DecodeError::IncompleteFrame`] when a record, or the trailing padding, has not fully arrived.
///
/// Iteration finishes once the header's record count has been read and the
/// padding up to the declared end is buffered, or once the running offset
/// reaches the declared end.
///
/// # Examples
///
/// ```
/// use radarframe::frame::{FrameBuilder, FrameHeader, TlvIterator};
///
/// let bytes = FrameBuilder::new().tlv(5, vec![1, 2, 3]).pad_to_alignment().build();
/// let header = FrameHeader::parse(&bytes, 1024).expect("valid header");
/// let records: Vec<_> = TlvIterator::new(&header, &bytes)
///     .collect::<Result<_, _>>()
///     .expect("well-formed frame");
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].tlv_type, 5);
/// assert_eq!(records[0].payload, &[1, 2, 3]);
/// ```
#[derive(Debug)]
pub struct TlvIterator<'a> {
    buffered: &'a [u8],
    frame_end: usize,
    frame_number: u32,
    tlv_count: u32,
    index: u32,
    offset: usize,
    done: bool,
}

impl<'a> TlvIterator<'a> {
    /// Start iterating the records of the frame described by `header`.
    #[must_use]
    pub fn new(header: &FrameHeader, buffered: &'a [u8]) -> Self {
        let frame_end = header.frame_len();
        Self {
            buffered: buffered.get(..frame_end).unwrap_or(buffered),
            frame_end,
            frame_number: header.frame_number,
            tlv_count: header.tlv_count,
            index: 0,
            offset: HEADER_LEN,
            done: false,
        }
    }

    fn malformed(&self, record_end: usize) -> DecodeError {
        DecodeError::MalformedTlv {
            frame_number: self.frame_number,
            index: self.index,
            record_end,
            frame_end: self.frame_end,
        }
    }

    fn incomplete(&self, needed: usize) -> DecodeError {
        DecodeError::IncompleteFrame {
            frame_number: self.frame_number,
            have: self.buffered.len(),
            declared: self.frame_end,
            needed,
        }
    }

    /// Finish iteration, requiring the padding up to the frame end.
    fn finish(&mut self) -> Option<Result<TlvRecord<'a>, DecodeError>> {
        self.done = true;
        if self.buffered.len() < self.frame_end {
            return Some(Err(self.incomplete(self.frame_end)));
        }
        None
    }

    fn fail(&mut self, err: DecodeError) -> Option<Result<TlvRecord<'a>, DecodeError>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<'a> Iterator for TlvIterator<'a> {
    type Item = Result<TlvRecord<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.index >= self.tlv_count {
            return self.finish();
        }
        if self.offset >= self.frame_end {
            debug!(
                "frame {} ended after {} of {} declared TLV records",
                self.frame_number, self.index, self.tlv_count
            );
            return self.finish();
        }

        let header_end = self.offset.saturating_add(TLV_HEADER_LEN);
        if header_end > self.frame_end {
            return self.fail(self.malformed(header_end));
        }
        if header_end > self.buffered.len() {
            return self.fail(self.incomplete(header_end));
        }
        let (Some(tlv_type), Some(length)) = (
            u32_at(self.buffered, self.offset),
            u32_at(self.buffered, self.offset + 4),
        ) else {
            return self.fail(self.incomplete(header_end));
        };

        let payload_end = usize::try_from(length)
            .ok()
            .and_then(|len| header_end.checked_add(len))
            .unwrap_or(usize::MAX);
        if payload_end > self.frame_end {
            return self.fail(self.malformed(payload_end));
        }
        let Some(payload) = self.buffered.get(header_end..payload_end) else {
            return self.fail(self.incomplete(payload_end));
        };

        let record = TlvRecord {
            tlv_type,
            offset: self.offset,
            payload,
        };
        self.offset = payload_end;
        self.index += 1;
        Some(Ok(record))
    }
}
