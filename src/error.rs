//! Canonical error and result types for the crate.
//!
//! [`RadarError`] is the single public error surface of acquisition. Frame
//! level conditions stay local to the decoder and are wrapped here only when
//! they escape to a caller.

use std::io;

use thiserror::Error;

use crate::{
    buffer::BufferError,
    export::ExportError,
    frame::{DecodeError, Recovery},
    sensor_config::ConfigError,
};

/// Top-level error type exposed by `radarframe`.
#[derive(Debug, Error)]
pub enum RadarError {
    /// A recoverable framing condition surfaced to the caller.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A buffer access fell outside the buffered bytes.
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),

    /// Sensor configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The archive could not be exported.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// The transport failed or reached end of stream.
    #[error("transport closed: {0}")]
    TransportClosed(#[source] io::Error),
}

impl RadarError {
    /// Returns the recommended recovery for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// use radarframe::{error::RadarError, frame::Recovery};
    ///
    /// let err = RadarError::TransportClosed(io::ErrorKind::UnexpectedEof.into());
    /// assert_eq!(err.recovery(), Recovery::Shutdown);
    /// assert!(err.is_fatal());
    /// ```
    #[must_use]
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Decode(err) => err.recovery(),
            Self::Buffer(_) => Recovery::DiscardFrame,
            Self::Config(_) | Self::Export(_) | Self::TransportClosed(_) => Recovery::Shutdown,
        }
    }

    /// Returns true when acquisition cannot continue.
    #[must_use]
    pub fn is_fatal(&self) -> bool { self.recovery() == Recovery::Shutdown }

    /// Returns the error category as a string for logging and metrics.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Decode(err) => err.error_type(),
            Self::Buffer(_) => "buffer",
            Self::Config(_) => "config",
            Self::Export(_) => "export",
            Self::TransportClosed(_) => "transport_closed",
        }
    }
}

/// Canonical result alias used by `radarframe` public APIs.
pub type Result<T> = std::result::Result<T, RadarError>;
