//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Each top-level kind names the
//! operation that failed; the module-level kinds underneath say why.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("failed to catalog archives")]
    Catalog,
    #[display("failed to list archive pages")]
    Pages,
    #[display("failed to read archive entry")]
    Read,
    #[display("failed to import archive")]
    Import,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
