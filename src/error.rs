//! Application Error Types

use derive_more::{Display, Error};

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, Error>;

/// Which stage of a run failed.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open compatibility cache")]
    Cache,
    #[display("could not set up compatibility probe")]
    Probe,
    #[display("could not copy episodes")]
    Copy,
}
