//! Unified error handling for the docsieve crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors from [`crate::utils::error`] into a single `Error`
//! enum, while keeping the domain errors usable on their own.
//!
//! # Architecture
//!
//! - [`DocsieveErrorTrait`] - Common interface implemented by the unified error
//!   and by each domain error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! Only a failed index fetch is fatal for a run. Everything else is caught at
//! entry granularity by the pipeline stages, which log the domain error with
//! its [`ErrorCategory`].

use std::io;
use thiserror::Error;

pub use crate::utils::error::{AcquireError, ExtractError, FetchError, InputError, StoreError};

/// Common trait for docsieve error types
pub trait DocsieveErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Document decoding and extraction errors
    Parsing,
    /// Content store and I/O errors
    Storage,
    /// User input errors
    Input,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short label for log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
            Self::Input => "input",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the docsieve crate
#[derive(Error, Debug)]
pub enum Error {
    /// Index page or document transport errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Per-entry acquisition errors
    #[error("Acquisition error: {0}")]
    Acquire(#[from] AcquireError),

    /// Content store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Text extraction errors
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// User input errors
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Report template errors
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DocsieveErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout | Self::MaxRetriesExceeded { .. } => true,
            Self::Status(status) => matches!(*status, 429 | 500..=504),
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Decode(_) => ErrorCategory::Parsing,
            _ => ErrorCategory::Network,
        }
    }
}

impl DocsieveErrorTrait for StoreError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Storage
    }
}

impl DocsieveErrorTrait for AcquireError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_recoverable(),
            Self::Timeout(_) => true,
            Self::Store(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(e) => e.category(),
            Self::Timeout(_) => ErrorCategory::Network,
            Self::Store(_) => ErrorCategory::Storage,
        }
    }
}

impl DocsieveErrorTrait for ExtractError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Store(_) => ErrorCategory::Storage,
            Self::Unsupported(_) | Self::Aborted(_) => ErrorCategory::Parsing,
        }
    }
}

impl DocsieveErrorTrait for InputError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Input
    }
}

impl DocsieveErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Acquire(e) => e.is_recoverable(),
            Self::Store(e) => e.is_recoverable(),
            Self::Extract(e) => e.is_recoverable(),
            Self::Input(e) => e.is_recoverable(),
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) | Self::Template(_) | Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Acquire(e) => e.category(),
            Self::Store(e) => e.category(),
            Self::Extract(e) => e.category(),
            Self::Input(e) => e.category(),
            Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) | Self::Template(_) => ErrorCategory::Parsing,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
