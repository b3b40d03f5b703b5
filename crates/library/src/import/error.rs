//! Error types for the [`import`](super) module.

use derive_more::{Display, Error};

/// An import error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies why an upload was refused or failed.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The supplied file name has no usable base name.
    #[display("invalid file name: {_0:?}")]
    InvalidName(#[error(not(source))] String),
    /// The file name does not carry a supported archive extension.
    #[display("not an archive: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// The upload exceeded the configured byte limit; nothing was stored.
    #[display("upload exceeds the limit of {_0} bytes")]
    TooLarge(#[error(not(source))] u64),
    /// Writing into the watched directory failed.
    #[display("storage error")]
    Storage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}
