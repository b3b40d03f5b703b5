//! Error types for the [`read`](super) module.

use derive_more::{Display, Error};

/// A read error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for read operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies why an archive or one of its entries could not be read.
///
/// The three "not there / not usable" cases stay distinct so that callers can
/// answer a missing archive, a broken archive and a missing page differently.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No archive by that name in the watched directory.
    #[display("archive not found: {_0}")]
    ArchiveNotFound(#[error(not(source))] String),
    /// The archive exists but can't be parsed.
    #[display("archive unreadable: {_0}")]
    ArchiveUnreadable(#[error(not(source))] String),
    /// The archive is fine but holds no entry with that exact name.
    #[display("entry not found: {_0}")]
    EntryNotFound(#[error(not(source))] String),
    /// Reading the archive or writing the entry out failed part-way; the
    /// archive itself may be fine.
    #[display("I/O error while streaming entry")]
    Io,
    /// Any other storage failure while opening the archive.
    #[display("storage error")]
    Storage,
    /// The blocking read task panicked or was cancelled.
    #[display("read task failed")]
    Blocking,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io | Self::Storage)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ArchiveNotFound(_) | Self::EntryNotFound(_))
    }
}
