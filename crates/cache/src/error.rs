//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Callers of [`MetadataCache`](crate::MetadataCache) are expected to treat
//! every one of these as non-fatal: a failed read is a miss, a failed write is
//! a log line.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Neither the primary nor the fallback root could be prepared.
    #[display("cache storage unavailable: {}", _0.display())]
    Unavailable(#[error(not(source))] PathBuf),
    /// The archive identity has no file name to key a record on.
    #[display("cannot derive a cache key from: {}", _0.display())]
    InvalidKey(#[error(not(source))] PathBuf),
    /// A record could not be serialized or parsed.
    #[display("invalid cache data")]
    InvalidData,
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
