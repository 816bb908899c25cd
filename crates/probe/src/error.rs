//! Probe Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A probe error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for probe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required external program is not installed (or not in `PATH`).
    #[display("{_0} not detected on your system")]
    MissingTool(#[error(not(source))] &'static str),
    /// Probing the file failed; it may be unreadable or not a video at all.
    #[display("failed to probe: {}", _0.display())]
    Probe(#[error(not(source))] PathBuf),
    /// The probe produced output that could not be understood.
    #[display("unrecognised probe output")]
    InvalidOutput,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
