//! Storage models.

use coview_archive::ArchiveFormat;
use std::path::PathBuf;
use time::OffsetDateTime;

/// File metadata returned by storage backends.
///
/// Size and modification time are exactly what the filesystem reports, at its
/// native precision; they make up an archive's fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
    /// Archive format detected from the file extension, if any
    pub format: Option<ArchiveFormat>,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: OffsetDateTime) -> Self {
        let path = path.into();
        let format = ArchiveFormat::from_path(&path);
        Self { path, size, modified, format }
    }

    /// The file name without any directories, used as the display name.
    pub fn name(&self) -> String {
        self.path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
    }
}
