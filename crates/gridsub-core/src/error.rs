//! Error types for gridsub core

use thiserror::Error;

/// Result type alias for compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Compositor error types
#[derive(Error, Debug)]
pub enum Error {
    // Row errors
    #[error("Malformed {kind} row {index}: {reason}")]
    MalformedRow {
        kind: &'static str,
        index: usize,
        reason: String,
    },

    #[error("Row appended to a sealed frame")]
    FrameSealed,

    // Timing errors
    #[error("Failed to parse timing directive: {0}")]
    TimingParse(String),

    // Destination errors
    #[error("No destination selected for output block")]
    NoDestination,

    #[error("Destination unavailable: {destination}")]
    SinkUnavailable {
        destination: String,
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed-row error
    pub fn malformed(kind: &'static str, index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedRow {
            kind,
            index,
            reason: reason.into(),
        }
    }

    /// Create a sink error for the named destination
    pub fn sink(destination: impl Into<String>, source: std::io::Error) -> Self {
        Error::SinkUnavailable {
            destination: destination.into(),
            source,
        }
    }

    /// Returns true if processing can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MalformedRow { .. }
                | Error::FrameSealed
                | Error::TimingParse(_)
                | Error::NoDestination
        )
    }

    /// Returns the error code used in run summaries
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MalformedRow { .. } => "MALFORMED_ROW",
            Error::FrameSealed => "FRAME_SEALED",
            Error::TimingParse(_) => "TIMING_PARSE",
            Error::NoDestination => "NO_DESTINATION",
            Error::SinkUnavailable { .. } => "SINK_UNAVAILABLE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::ConfigParse(_) => "CONFIG_PARSE",
            Error::Io(_) => "IO",
        }
    }
}
