//! Error types for soundq-bot
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! None of these are fatal to the process: the command entry point turns every
//! error into a status line for the requester.

use crate::resolver::Severity;
use thiserror::Error;

/// Main error type for soundq-bot
#[derive(Error, Debug)]
pub enum Error {
    /// Identifier matched nothing, including the search retry
    #[error("No matches for: {0}")]
    NotFound(String),

    /// Backend reported a load failure
    #[error("Resolution failed ({severity}): {message}")]
    ResolutionFailure { severity: Severity, message: String },

    /// Track is longer than the configured maximum (per track, non-fatal)
    #[error("Track too long: {title} ({duration_ms} ms > {max_duration_ms} ms)")]
    DurationExceeded {
        title: String,
        duration_ms: u64,
        max_duration_ms: u64,
    },

    /// soundq-common error (configuration, catalog files)
    #[error("Common error: {0}")]
    Common(#[from] soundq_common::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using soundq-bot Error
pub type Result<T> = std::result::Result<T, Error>;
