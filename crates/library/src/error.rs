//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A selection is not of the form `Show` or `Show/Season`.
    #[display("invalid selection: {_0:?}")]
    InvalidSelection(#[error(not(source))] String),
    /// The selected show or season does not exist in the library.
    #[display("selection not found in library: {}", _0.display())]
    SelectionNotFound(#[error(not(source))] PathBuf),
    /// Listing a library directory failed.
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// Copying an episode to the target library failed.
    #[display("failed to copy: {}", _0.display())]
    Copy(#[error(not(source))] PathBuf),
    /// The compatibility cache could not be read or persisted.
    #[display("compatibility cache error")]
    Cache,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Copy(_))
    }
}
