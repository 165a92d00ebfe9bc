//! Error types for the sepindex library.
//!
//! All errors are represented by the [`SepIndexError`] enum. Fatal
//! conditions (corrupt streams, unsupported configurations) propagate
//! synchronously to the caller; nothing in this crate retries or recovers
//! from a partial failure.

use std::io;

use thiserror::Error;

/// The main error type for codec operations.
#[derive(Error, Debug)]
pub enum SepIndexError {
    /// I/O errors from the storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Storage-related errors.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stream does not decode the way it was written.
    #[error("Corrupt index: {0}")]
    Corruption(String),

    /// A feature this codec does not implement was requested.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Invalid argument passed to an operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for operations that may fail with [`SepIndexError`].
pub type Result<T> = std::result::Result<T, SepIndexError>;

impl SepIndexError {
    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        SepIndexError::Storage(msg.into())
    }

    /// Create a new corruption error.
    pub fn corruption<S: Into<String>>(msg: S) -> Self {
        SepIndexError::Corruption(msg.into())
    }

    /// Create a new unsupported-feature error.
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        SepIndexError::Unsupported(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SepIndexError::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SepIndexError::corruption("docs out of order");
        assert_eq!(err.to_string(), "Corrupt index: docs out of order");

        let err = SepIndexError::unsupported("offsets");
        assert_eq!(err.to_string(), "Unsupported: offsets");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: SepIndexError = io_err.into();
        assert!(matches!(err, SepIndexError::Io(_)));
    }
}
