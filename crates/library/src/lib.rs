//! Catalog and read a directory of image archives.
//!
//! - [`catalog`]: ordered, cache-backed summaries of every archive
//! - [`read`]: the page list of one archive and the bytes of one page
//! - [`import`]: uploads into the watched directory

pub mod catalog;
pub mod error;
pub mod import;
pub mod read;

use coview_archive::MediaFilter;
use coview_storage::BackendHandle;
use coview_storage::backend::{ArchiveOnlyBackend, LocalBackend, ReadOnlyBackend};
use std::path::Path;
use std::sync::Arc;

/// Upper bound on archives being inspected at the same time.
pub const MAX_PROCESS_CONCURRENCY: usize = 16;

/// Settings shared by every library operation.
#[derive(Clone, Debug, Default)]
pub struct Context {
    /// Which archive entries count as pages.
    pub filter: MediaFilter,
    /// Byte limit for uploads, `None` for unlimited.
    pub upload_limit: Option<u64>,
}

/// Storage for a watched directory: the local filesystem, restricted to
/// archive files, optionally with writes dropped.
pub fn open_directory(root: impl AsRef<Path>, read_only: bool) -> coview_storage::error::Result<BackendHandle> {
    let root = root.as_ref();
    let local: BackendHandle = Arc::new(LocalBackend::new(root.display().to_string(), root)?);
    let archives: BackendHandle = Arc::new(ArchiveOnlyBackend::new(local));
    Ok(if read_only { Arc::new(ReadOnlyBackend::new(archives)) } else { archives })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use coview_cache::MetadataCache;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    /// Build an in-memory zip archive.
    pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// A watched directory and a cache, each in its own temporary directory.
    pub(crate) struct Fixture {
        pub(crate) dir: tempfile::TempDir,
        pub(crate) _cache_dir: tempfile::TempDir,
        pub(crate) backend: BackendHandle,
        pub(crate) cache: MetadataCache,
        pub(crate) ctx: Context,
    }
    impl Fixture {
        pub(crate) async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let cache_dir = tempfile::tempdir().unwrap();
            let backend = open_directory(dir.path(), false).unwrap();
            let cache = MetadataCache::open(cache_dir.path()).await.unwrap();
            Self { dir, _cache_dir: cache_dir, backend, cache, ctx: Context::default() }
        }

        pub(crate) fn write(&self, name: &str, data: &[u8]) {
            std::fs::write(self.dir.path().join(name), data).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_directory_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let backend = open_directory(dir.path(), true).unwrap();
        let mut source: &[u8] = b"data";
        backend.write_from(Path::new("comic1.zip"), &mut source, None).await.unwrap();
        assert!(!dir.path().join("comic1.zip").exists());
    }

    #[tokio::test]
    async fn test_open_directory_filters_archives() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("comic1.zip"), b"data").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"data").unwrap();
        let backend = open_directory(dir.path(), false).unwrap();
        assert_eq!(backend.list().await.unwrap().len(), 1);
    }
}
