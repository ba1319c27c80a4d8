//! Error types for the frame decoding layer.
//!
//! Every parse-level condition is local and recoverable. Each
//! [`DecodeError`] carries a recommended [`Recovery`] describing what the
//! decode loop does next:
//!
//! - [`Recovery::Wait`]: keep every buffered byte and wait for more input.
//! - [`Recovery::SkipRecord`]: ignore one TLV record, keep scanning the frame.
//! - [`Recovery::Resync`]: drop uninterpretable bytes and keep seeking.
//! - [`Recovery::DiscardFrame`]: drop the frame and resume searching past its marker.
//!
//! Only transport failure is fatal; it is modelled by
//! [`RadarError::TransportClosed`](crate::error::RadarError::TransportClosed).

use thiserror::Error;

/// What the decode loop does after an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Recovery {
    /// Retain all buffered bytes and wait for more input.
    #[default]
    Wait,
    /// Skip the offending TLV record and continue with the same frame.
    SkipRecord,
    /// Discard bytes that cannot start a frame and keep seeking.
    Resync,
    /// Discard the whole frame and restart synchronisation past its marker.
    DiscardFrame,
    /// Stop acquisition and run the shutdown sequence.
    Shutdown,
}

impl Recovery {
    /// Returns the recovery name as a static string for metrics and logging.
    ///
    /// # Examples
    ///
    /// ```
    /// use radarframe::frame::Recovery;
    ///
    /// assert_eq!(Recovery::DiscardFrame.as_str(), "discard_frame");
    /// assert_eq!(Recovery::Shutdown.as_str(), "shutdown");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::SkipRecord => "skip_record",
            Self::Resync => "resync",
            Self::DiscardFrame => "discard_frame",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Reason a header was rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum HeaderFault {
    /// Declared length cannot even hold the header.
    #[error("declared length {declared} is shorter than the {min}-byte header")]
    TooShort {
        /// Length written in the header.
        declared: usize,
        /// Header size.
        min: usize,
    },

    /// Declared length exceeds the configured maximum frame length.
    #[error("declared length {declared} exceeds maximum frame length {max}")]
    TooLong {
        /// Length written in the header.
        declared: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Parse-level decoding conditions.
///
/// # Examples
///
/// ```
/// use radarframe::frame::{DecodeError, Recovery};
///
/// let err = DecodeError::SizeMismatch {
///     frame_number: 7,
///     expected: 512,
///     actual: 510,
/// };
/// assert_eq!(err.recovery(), Recovery::SkipRecord);
/// assert!(!err.is_incomplete());
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Bytes were discarded while searching for a frame marker.
    #[error("frame sync lost: discarded {discarded} bytes before the next marker")]
    SyncLost {
        /// Total bytes discarded during this resynchronisation.
        discarded: usize,
    },

    /// Fewer bytes are buffered than the fixed header needs.
    #[error("incomplete frame header: have {have}, need {need}")]
    IncompleteHeader {
        /// Bytes currently available.
        have: usize,
        /// Bytes required for a complete header.
        need: usize,
    },

    /// The frame's records or padding have not fully arrived.
    #[error("incomplete frame {frame_number}: have {have} of {declared} bytes")]
    IncompleteFrame {
        /// Sequence number from the frame header.
        frame_number: u32,
        /// Bytes of the frame currently buffered.
        have: usize,
        /// Declared total frame length.
        declared: usize,
        /// Buffered length needed before decoding can make progress.
        needed: usize,
    },

    /// The header matched the marker but is internally inconsistent.
    #[error("invalid header for frame {frame_number}: {fault}")]
    InvalidHeader {
        /// Sequence number read from the rejected header.
        frame_number: u32,
        /// What was wrong with it.
        fault: HeaderFault,
    },

    /// A TLV record would extend past the declared frame end.
    #[error(
        "malformed TLV record {index} in frame {frame_number}: spans to byte {record_end}, frame \
         ends at {frame_end}"
    )]
    MalformedTlv {
        /// Sequence number from the frame header.
        frame_number: u32,
        /// Zero-based position of the record within the frame.
        index: u32,
        /// Offset the record would end at, if computable.
        record_end: usize,
        /// Declared frame end.
        frame_end: usize,
    },

    /// A range-profile record carried the wrong number of bytes.
    #[error(
        "range profile size mismatch in frame {frame_number}: expected {expected} bytes, got \
         {actual}"
    )]
    SizeMismatch {
        /// Sequence number from the frame header.
        frame_number: u32,
        /// Payload size implied by the configured range-bin count.
        expected: usize,
        /// Payload size found on the wire.
        actual: usize,
    },
}

impl DecodeError {
    /// Returns the recommended recovery for this condition.
    ///
    /// | Condition | Recovery |
    /// |-----------|----------|
    /// | `SyncLost` | `Resync` |
    /// | `IncompleteHeader`, `IncompleteFrame` | `Wait` |
    /// | `InvalidHeader`, `MalformedTlv` | `DiscardFrame` |
    /// | `SizeMismatch` | `SkipRecord` |
    #[must_use]
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::SyncLost { .. } => Recovery::Resync,
            Self::IncompleteHeader { .. } | Self::IncompleteFrame { .. } => Recovery::Wait,
            Self::InvalidHeader { .. } | Self::MalformedTlv { .. } => Recovery::DiscardFrame,
            Self::SizeMismatch { .. } => Recovery::SkipRecord,
        }
    }

    /// Returns true when the condition only means "more bytes are needed".
    #[must_use]
    pub fn is_incomplete(&self) -> bool { self.recovery() == Recovery::Wait }

    /// Returns the error category as a string for logging and metrics.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::SyncLost { .. } => "sync_lost",
            Self::IncompleteHeader { .. } => "incomplete_header",
            Self::IncompleteFrame { .. } => "incomplete_frame",
            Self::InvalidHeader { .. } => "invalid_header",
            Self::MalformedTlv { .. } => "malformed_tlv",
            Self::SizeMismatch { .. } => "size_mismatch",
        }
    }
}
