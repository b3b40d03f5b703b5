//! Persisted cache models.

use coview_archive::ArchiveSummary;
use coview_storage::FileInfo;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifies one on-disk revision of an archive.
///
/// Two fingerprints are equal only if both the modification time (at the
/// filesystem's native precision) and the byte size match exactly.
///
/// This is a heuristic, not a content hash: an archive rewritten in place with
/// the same size inside the same timestamp tick produces the same fingerprint,
/// and its stale summary will be served. That risk is accepted in exchange for
/// never reading archive contents to validate a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    #[serde(with = "time::serde::rfc3339")]
    pub modified: OffsetDateTime,
    pub size: u64,
}
impl Fingerprint {
    pub fn new(modified: OffsetDateTime, size: u64) -> Self {
        Self { modified, size }
    }
}
impl From<&FileInfo> for Fingerprint {
    fn from(info: &FileInfo) -> Self {
        Self::new(info.modified, info.size)
    }
}

/// One persisted document per archive identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CacheRecord {
    /// Layout version of this document. Records written by another version
    /// are never trusted.
    pub(crate) schema: u32,
    pub(crate) fingerprint: Fingerprint,
    pub(crate) summary: ArchiveSummary,
}

/// Approximate size of the cache on disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub records: usize,
    pub total_bytes: u64,
}
