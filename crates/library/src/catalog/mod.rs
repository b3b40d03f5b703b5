//! Archive catalog.
//!
//! Summarises every archive in the watched directory. Each archive is
//! fingerprinted from its directory listing and looked up in the
//! [metadata cache](coview_cache); only archives whose fingerprint changed (or
//! that were never seen) are opened and inspected.
//!
//! [`list_archives`] returns the finished, name-ordered list. [`catalog`]
//! exposes the same work as a stream of progress events.

pub mod error;
mod file;
mod stream;

pub use self::file::{CatalogEffort, Catalogued, catalog_archive};
pub use self::stream::{CatalogEvent, catalog, list_archives};
