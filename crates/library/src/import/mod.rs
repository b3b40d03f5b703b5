//! Uploads into the watched directory.
//!
//! An upload is written to a temporary file beside its destination and renamed
//! into place, so a concurrent catalog run either sees the previous archive or
//! the complete new one.

pub mod error;
mod file;

pub use self::file::{Imported, import_archive};
