//! Error types and handling for pullstream
//!
//! End-of-sequence is *not* an error anywhere in this crate: providers
//! signal it as `Ok(None)`, so no error value can ever be mistaken for
//! normal completion. Everything that is a genuine failure lives here.

use std::time::Duration;
use thiserror::Error;

/// Main error type for stream operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// I/O related errors
    #[error("io error: {0}")]
    Io(String),
    /// One or more lifecycle elements failed to open
    #[error("failed opening stream: {}", .0.join("; "))]
    Open(Vec<String>),
    /// Error raised inside a filter predicate
    #[error("filter failed for stream: {0}")]
    Predicate(String),
    /// Error raised inside a cluster reducer
    #[error("failed reducing cluster: {0}")]
    Reduce(String),
    /// Element could not be JSON-encoded
    #[error("failed encoding element: {0}")]
    Encode(String),
    /// The bridge consumer fell behind for longer than the allowed delay
    #[error("stream closed, reader too slow for more than {0:?}")]
    ReaderTooSlow(Duration),
    /// The bridge buffer was closed by the producer side
    #[error("stream buffer closed externally")]
    ClosedExternally,
    /// A single expected value was not present
    #[error("value not present")]
    Absent,
    /// Custom error with message
    #[error("stream error: {0}")]
    Custom(String),
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Encode(err.to_string())
    }
}

/// Result type for pullstream operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Collapse the failures collected while opening lifecycle elements.
///
/// A single failure is returned as-is; several are aggregated into one
/// [`StreamError::Open`] so the caller sees every acquisition that failed,
/// not just the first.
pub(crate) fn combine_open_failures(mut failures: Vec<StreamError>) -> StreamResult<()> {
    match failures.len() {
        0 => Ok(()),
        1 => Err(failures.remove(0)),
        _ => Err(StreamError::Open(
            failures.iter().map(|e| e.to_string()).collect(),
        )),
    }
}
