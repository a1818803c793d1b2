//! Error types for the docsieve pipeline
//!
//! One enum per concern. Everything except a failed index fetch is handled
//! per entry and only ever reaches the user as a log line.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking HTTP, for the index page and documents alike
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status that is not worth retrying
    #[error("Server responded with status {0}")]
    Status(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded (last error: {last})")]
    MaxRetriesExceeded { last: String },

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised by the content store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document name cannot be used as a plain file name inside the store
    #[error("Invalid document name: {0:?}")]
    InvalidName(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Per-entry acquisition failure
#[derive(Error, Debug)]
pub enum AcquireError {
    /// Transport failed after retries
    #[error("download failed: {0}")]
    Transport(#[from] FetchError),

    /// Whole download exceeded the per-entry budget
    #[error("download timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Payload could not be written to the store
    #[error("could not store document: {0}")]
    Store(#[from] StoreError),
}

/// Text extraction failure for a stored document
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The binary is not a document the extractor understands
    #[error("unsupported or corrupt document: {0}")]
    Unsupported(String),

    /// The extractor panicked on this input
    #[error("extractor aborted: {0}")]
    Aborted(String),

    /// Stored file could not be read
    #[error("could not read stored document: {0}")]
    Store(#[from] StoreError),
}

/// Bad user input
#[derive(Error, Debug)]
pub enum InputError {
    /// Count prompt answer is not an integer
    #[error("invalid document count {0:?}: expected a whole number")]
    InvalidCount(String),

    /// Prompt could not be read
    #[error("could not read answer: {0}")]
    Prompt(#[from] std::io::Error),
}
