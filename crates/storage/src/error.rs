//! Errors raised while reaching the watched directory.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong at the storage boundary, phrased so callers can decide
/// between "skip", "report not found" and "give up".
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No archive at that path, or it is not a regular file.
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The process may not read or write the path.
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Not a single file name inside the watched directory.
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// The backend itself is misconfigured or broken.
    #[display("backend error: {_0}")]
    BackendError(#[error(not(source))] String),
    /// Hidden by a decorator, such as a non-archive behind `ArchiveOnlyBackend`.
    #[display("filtered path: {}", _0.display())]
    FilteredPath(#[error(not(source))] PathBuf),
    /// An upload ran past its byte limit; nothing was stored.
    #[display("exceeds size limit of {_0} bytes")]
    TooLarge(#[error(not(source))] u64),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::BackendError(_))
    }

    /// Returns `true` if the file simply isn't there.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::NotFound(PathBuf::from("comic1.zip")).to_string(), "file not found: comic1.zip");
        assert_eq!(ErrorKind::TooLarge(1024).to_string(), "exceeds size limit of 1024 bytes");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Io(IoError::other("disk on fire")).is_retryable());
        assert!(!ErrorKind::FilteredPath(PathBuf::from("notes.txt")).is_retryable());
        assert!(!ErrorKind::TooLarge(1).is_retryable());
    }
}
