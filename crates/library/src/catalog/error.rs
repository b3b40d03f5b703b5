//! Error types for the [`catalog`](super) module.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a catalog failure.
///
/// Only [`Listing`](Self::Listing) is fatal to a catalog run; every other kind
/// concerns a single archive, which is skipped.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The watched directory could not be enumerated.
    #[display("could not list the archive directory")]
    Listing,
    /// The archive could not be opened through the storage backend.
    #[display("could not open archive: {_0}")]
    Storage(#[error(not(source))] String),
    /// The archive opened but is not a readable archive.
    #[display("archive unreadable: {_0}")]
    ArchiveUnreadable(#[error(not(source))] String),
    /// The blocking inspection task panicked or was cancelled.
    #[display("inspection task failed")]
    Blocking,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Listing | Self::Storage(_))
    }

    /// Whether this error ends the catalog run rather than skipping one archive.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Listing)
    }
}
