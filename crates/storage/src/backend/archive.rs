//! Archive-filtered storage backend decorator.
//!
//! Wraps another backend and restricts every operation to files whose
//! extension names a supported archive format.

use crate::backend::{BoxArchiveReader, DynAsyncRead, FileInfoStream};
use crate::error::ErrorKind;
use crate::{BackendHandle, FileInfo, StorageBackend, error::Result};
use async_trait::async_trait;
use coview_archive::ArchiveFormat;
use futures::StreamExt;
use std::path::Path;

fn is_archive_path(path: impl AsRef<Path>) -> bool {
    ArchiveFormat::from_path(path).is_some()
}

fn ensure_archive_path(path: &Path) -> Result<()> {
    if !is_archive_path(path) {
        exn::bail!(ErrorKind::FilteredPath(path.to_path_buf()));
    }
    Ok(())
}

/// Archive-filtered storage backend.
///
/// Anything else sitting in the watched directory (notes, images, half-copied
/// downloads) is invisible to listings, and direct access returns
/// [`ErrorKind::FilteredPath`].
#[derive(Clone)]
pub struct ArchiveOnlyBackend {
    inner: BackendHandle,
}
impl ArchiveOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ArchiveOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_read_only(&self) -> bool {
        self.inner.is_read_only()
    }

    fn list_stream(&self) -> FileInfoStream<'_> {
        Box::pin(self.inner.list_stream().filter(|item| {
            std::future::ready(match item {
                Ok(info) => info.format.is_some(),
                Err(_) => true,
            })
        }))
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        ensure_archive_path(path)?;
        self.inner.exists(path).await
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        ensure_archive_path(path)?;
        self.inner.stat(path).await
    }

    async fn reader(&self, path: &Path) -> Result<BoxArchiveReader> {
        ensure_archive_path(path)?;
        self.inner.reader(path).await
    }

    async fn write_from(&self, path: &Path, reader: DynAsyncRead<'_>, limit: Option<u64>) -> Result<u64> {
        ensure_archive_path(path)?;
        self.inner.write_from(path, reader, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use rstest::rstest;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[rstest]
    #[case("comic1.zip", true)]
    #[case("COMIC1.ZIP", true)]
    #[case("Vol.1.zip", true)]
    #[case("notes.txt", false)]
    #[case("cover.jpg", false)]
    #[case("Makefile", false)]
    #[case(".zip", false)]
    fn test_is_archive_path(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_archive_path(path), expected);
    }

    fn setup() -> (tempfile::TempDir, ArchiveOnlyBackend) {
        let temp_dir = tempfile::tempdir().unwrap();
        let local: BackendHandle = Arc::new(LocalBackend::new("test", temp_dir.path()).unwrap());
        (temp_dir, ArchiveOnlyBackend::new(local))
    }

    #[tokio::test]
    async fn test_list_filters_by_extension() {
        let (dir, backend) = setup();
        std::fs::write(dir.path().join("comic1.zip"), b"data").unwrap();
        std::fs::write(dir.path().join("comic2.ZIP"), b"data").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"data").unwrap();
        std::fs::write(dir.path().join("README"), b"data").unwrap();

        let files = backend.list().await.unwrap();
        assert_eq!(files.len(), 2);
        let paths: Vec<_> = files.iter().map(|f| &f.path).collect();
        assert!(paths.contains(&&PathBuf::from("comic1.zip")));
        assert!(paths.contains(&&PathBuf::from("comic2.ZIP")));
    }

    #[tokio::test]
    async fn test_list_propagates_errors() {
        let (dir, backend) = setup();
        std::fs::remove_dir(dir.path()).unwrap();
        assert!(backend.list().await.is_err());
    }

    #[tokio::test]
    async fn test_stat_rejects_non_archive() {
        let (dir, backend) = setup();
        std::fs::write(dir.path().join("notes.txt"), b"data").unwrap();
        let err = backend.stat(Path::new("notes.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::FilteredPath(_)));
    }

    #[tokio::test]
    async fn test_exists_rejects_non_archive() {
        let (_dir, backend) = setup();
        let err = backend.exists(Path::new("notes.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::FilteredPath(_)));
        assert!(!backend.exists(Path::new("comic1.zip")).await.unwrap());
    }

    #[tokio::test]
    async fn test_reader_rejects_non_archive() {
        let (_dir, backend) = setup();
        let Err(err) = backend.reader(Path::new("notes.txt")).await else {
            panic!("expected error");
        };
        assert!(matches!(&*err, ErrorKind::FilteredPath(_)));
    }

    #[tokio::test]
    async fn test_write_from_rejects_non_archive() {
        let (dir, backend) = setup();
        let mut source: &[u8] = b"data";
        let err = backend.write_from(Path::new("notes.txt"), &mut source, None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::FilteredPath(_)));
        assert!(!dir.path().join("notes.txt").exists());

        let mut source: &[u8] = b"data";
        backend.write_from(Path::new("comic1.zip"), &mut source, None).await.unwrap();
        assert!(dir.path().join("comic1.zip").exists());
    }
}
