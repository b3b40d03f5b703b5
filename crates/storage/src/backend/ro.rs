//! Decorator that turns uploads into no-ops.

use async_trait::async_trait;
use std::path::Path;

use crate::backend::{BoxArchiveReader, DynAsyncRead, FileInfoStream};
use crate::{BackendHandle, FileInfo, StorageBackend, error::Result};

/// Serves reads from the wrapped backend. Uploads are logged at info level
/// and dropped without reading the source; they report zero bytes written.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn list_stream(&self) -> FileInfoStream<'_> {
        self.inner.list_stream()
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.inner.stat(path).await
    }

    async fn reader(&self, path: &Path) -> Result<BoxArchiveReader> {
        self.inner.reader(path).await
    }

    async fn write_from(&self, path: &Path, _reader: DynAsyncRead<'_>, _limit: Option<u64>) -> Result<u64> {
        tracing::info!(path = %path.display(), "Read-only mode, dropping upload");
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_writes_are_dropped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let local: BackendHandle = Arc::new(LocalBackend::new("test", temp_dir.path()).unwrap());
        let backend = ReadOnlyBackend::new(local);
        let mut source: &[u8] = b"data";
        assert_eq!(backend.write_from(Path::new("comic1.zip"), &mut source, None).await.unwrap(), 0);
        assert!(!temp_dir.path().join("comic1.zip").exists());
    }

    #[tokio::test]
    async fn test_reads_pass_through() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("comic1.zip"), b"data").unwrap();
        let local: BackendHandle = Arc::new(LocalBackend::new("test", temp_dir.path()).unwrap());
        let backend = ReadOnlyBackend::new(local);
        assert_eq!(backend.name(), "test");
        assert!(backend.is_read_only());
        assert!(backend.exists(Path::new("comic1.zip")).await.unwrap());
        assert_eq!(backend.stat(Path::new("comic1.zip")).await.unwrap().size, 4);
        assert_eq!(backend.list().await.unwrap().len(), 1);
    }
}
