//! Image archive inspection with natural page ordering.
//!
//! This crate knows how to look inside an archive and nothing else: no
//! caching, no directory walking. It provides:
//!
//! - **Natural ordering** of names ([`natural::compare`]): digit runs compare by
//!   value, so `page9.jpg` comes before `page10.jpg`
//! - **Inspection** ([`inspect`]): the recognised media entries of an archive,
//!   filtered by a [`MediaFilter`] and in natural order
//! - **Entry extraction** ([`copy_entry`], [`read_entry`]): stream one entry
//!   by exact name, with "not found" distinct from "unreadable"
//! - **Format detection** from file extensions ([`ArchiveFormat::from_path`])
//!   or magic bytes ([`ArchiveFormat::from_magic_bytes`])
//!
//! Everything here is blocking I/O over `Read + Seek`; async callers should
//! run it inside [`spawn_blocking`](https://docs.rs/tokio/latest/tokio/task/fn.spawn_blocking.html).

mod construct;
pub mod error;
mod inspect;
mod media;
mod models;
pub mod natural;
mod resolve;

pub use crate::inspect::{inspect, inspect_path};
pub use crate::media::{DEFAULT_MEDIA_EXTENSIONS, MediaFilter};
pub use crate::models::{ArchiveSummary, format_size};
pub use crate::resolve::{copy_entry, read_entry};

/// A supported archive container format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Zip archive (.zip)
    #[default]
    Zip,
}

#[cfg(test)]
mod tests {
    use crate::ArchiveFormat;

    #[test]
    fn archive_format_default() {
        assert_eq!(ArchiveFormat::default(), ArchiveFormat::Zip);
    }
}
