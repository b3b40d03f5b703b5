//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The container could not be opened or its directory is corrupt. Don't
    /// retry with the same input.
    #[display("archive is unreadable or corrupt")]
    Unreadable,
    /// No entry in the archive has exactly this name.
    #[display("entry not found: {_0}")]
    EntryNotFound(#[error(not(source))] String),
    /// The requested archive format is not supported.
    #[display("unsupported format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// An I/O operation failed while copying entry contents.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }

    /// Returns `true` if the archive was readable but the entry doesn't exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ErrorKind::EntryNotFound(_))
    }
}
