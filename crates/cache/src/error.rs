//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// [`UnknownShow`](Self::UnknownShow) and [`MalformedKey`](Self::MalformedKey)
/// are raised while resolving a path, before the cache contents are consulted;
/// a caller iterating over files will usually want to skip the file and move on.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The show segment of the path is not a known show in the library root.
    #[display("unknown show \"{_0}\"")]
    UnknownShow(#[error(not(source))] String),
    /// The path does not resolve to exactly `show/season/episode`.
    #[display("malformed episode path: {}", _0.display())]
    MalformedKey(#[error(not(source))] PathBuf),
    /// No verdict is stored for the episode.
    #[display("no entry for episode: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The cache file exists but could not be parsed.
    #[display("malformed cache file: {}", _0.display())]
    MalformedCacheFile(#[error(not(source))] PathBuf),
    /// Reading or writing the filesystem failed.
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Returns `true` if the error means the path can never be a cache key,
    /// no matter what the cache contains.
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, Self::UnknownShow(_) | Self::MalformedKey(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::UnknownShow("Ssouth Park".to_string()).to_string(), "unknown show \"Ssouth Park\"");
        assert_eq!(
            ErrorKind::MalformedKey(PathBuf::from("South Park/ep.avi")).to_string(),
            "malformed episode path: South Park/ep.avi"
        );
    }

    #[test]
    fn error_kind_classification() {
        assert!(ErrorKind::UnknownShow(String::new()).is_unresolvable());
        assert!(ErrorKind::MalformedKey(PathBuf::new()).is_unresolvable());
        assert!(!ErrorKind::NotFound(String::new()).is_unresolvable());
        assert!(ErrorKind::Io(PathBuf::new()).is_retryable());
        assert!(!ErrorKind::MalformedCacheFile(PathBuf::new()).is_retryable());
    }
}
