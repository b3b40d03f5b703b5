//! Fingerprint-validated metadata cache for archive summaries.
//!
//! Inspecting a large archive means reading its whole central directory, so
//! the catalog keeps each archive's [`ArchiveSummary`](coview_archive::ArchiveSummary)
//! on disk and reuses it for as long as the archive's [`Fingerprint`]
//! (modification time and size) is unchanged. The cache is never the source
//! of truth: deleting the cache directory only costs a rescan.
//!
//! The cache never inspects archives itself. Callers decide what to do on a
//! miss and write the fresh summary back with [`MetadataCache::set`].

pub mod error;
mod models;
mod store;

pub use crate::models::{CacheStats, Fingerprint};
pub use crate::store::{MetadataCache, SCHEMA_VERSION};
