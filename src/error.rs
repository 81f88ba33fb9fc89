//! Error types shared by the producer and consumer sides of a chunk stream.
//!
//! Every variant is terminal for the stream it occurred on: there is no
//! automatic retry inside the core. A caller that wants another attempt
//! issues a fresh stream call.

use std::io;

/// Errors that terminate a chunk stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The requested resource does not exist under the media directory.
    /// Raised before any chunk is emitted.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Reading the source failed after part of the stream was emitted.
    /// Chunks emitted before the failure remain valid.
    #[error("Read failed after {bytes_sent} bytes: {source}")]
    Read {
        bytes_sent: u64,
        #[source]
        source: io::Error,
    },

    /// Writing to the sink failed. Bytes already written are retained.
    #[error("Sink write failed after {bytes_written} bytes: {source}")]
    Write {
        bytes_written: u64,
        #[source]
        source: io::Error,
    },

    /// The transport dropped the stream before a clean end.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The stream was cancelled by either party.
    #[error("Stream cancelled")]
    Cancelled,

    /// The resource name is not a plain file name.
    #[error("Invalid resource name: {0}")]
    InvalidResource(String),
}

impl StreamError {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new Read error recording how many bytes were emitted first.
    pub fn read(bytes_sent: u64, source: io::Error) -> Self {
        Self::Read { bytes_sent, source }
    }

    /// Create a new Write error recording how many bytes reached the sink.
    pub fn write(bytes_written: u64, source: io::Error) -> Self {
        Self::Write {
            bytes_written,
            source,
        }
    }

    /// Create a new Transport error.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new InvalidResource error.
    pub fn invalid_resource<S: Into<String>>(name: S) -> Self {
        Self::InvalidResource(name.into())
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type alias using [`StreamError`].
pub type Result<T> = std::result::Result<T, StreamError>;
