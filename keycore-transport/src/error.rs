//! Transport layer error types

use std::fmt;

/// Transport layer result type
pub type Result<T> = std::result::Result<T, Error>;

/// Transport layer errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Send retry budget exhausted while the previous report was in flight
    ///
    /// Recoverable: the host stopped draining IN reports; the caller may
    /// retry the whole request later.
    DeviceBusy,

    /// USB layer I/O failure
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DeviceBusy => write!(f, "Device busy"),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
