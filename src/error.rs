//! Command-line error types.

use derive_more::{Display, Error};

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI commands.
pub type Result<T> = std::result::Result<T, Error>;

/// Which stage of a command failed. The library error underneath says why.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("metadata cache unavailable")]
    Cache,
    #[display("could not open the archive directory")]
    Storage,
    #[display("command failed")]
    Library,
    #[display("could not read input")]
    Input,
    #[display("could not write output")]
    Output,
}
