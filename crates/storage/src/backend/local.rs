//! Local filesystem storage backend.
//!
//! Archives live directly inside one configured directory and are accessed via
//! `tokio::fs`. Blocking readers are handed out as plain [`std::fs::File`]s so
//! the zip reader can run on the blocking pool.

use crate::backend::{BoxArchiveReader, DynAsyncRead, FileInfoStream};
use crate::error::ErrorKind;
use crate::{FileInfo, StorageBackend, error::Result, path::validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use std::fs::{Metadata, create_dir_all as sync_create_dir};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Prefix of in-flight upload files. They sit beside the target until renamed.
const PARTIAL_PREFIX: &str = ".upload-";
const PARTIAL_SUFFIX: &str = ".part";

/// Local filesystem storage backend.
///
/// Stores files in a single flat directory on the local filesystem. All paths
/// are file names relative to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use coview_storage::backend::LocalBackend;
///
/// # fn example() -> coview_storage::error::Result<()> {
/// let backend = LocalBackend::new("data", "/srv/comics")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    /// Watched directory
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend, creating the root directory if
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if the path is not
    /// absolute or points at something other than a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    /// The directory this backend serves.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn file_info(relative: PathBuf, metadata: &Metadata) -> Result<FileInfo> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
        Ok(FileInfo::new(relative, metadata.len(), modified))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    fn is_partial_upload(name: &str) -> bool {
        name.starts_with(PARTIAL_PREFIX) && name.ends_with(PARTIAL_SUFFIX)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream(&self) -> FileInfoStream<'_> {
        Box::pin(stream! {
            let mut entries = match fs::read_dir(&self.root).await {
                Ok(entries) => entries,
                Err(e) => {
                    yield Err(exn::Exn::from(Self::map_io_error(e, &self.root)));
                    return;
                },
            };
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(exn::Exn::from(Self::map_io_error(e, &self.root)));
                        break;
                    },
                };
                let name = entry.file_name();
                if Self::is_partial_upload(&name.to_string_lossy()) {
                    continue;
                }
                // Follows symlinks, so a linked archive is listed like any other.
                let metadata = match fs::metadata(entry.path()).await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        tracing::warn!(path = %entry.path().display(), error = %e, "Skipping file that could not be stat'ed");
                        continue;
                    },
                };
                if !metadata.is_file() {
                    continue;
                }
                match Self::file_info(PathBuf::from(name), &metadata) {
                    Ok(info) => yield Ok(info),
                    Err(e) => tracing::warn!(path = %entry.path().display(), error = ?e, "Skipping file without a modification time"),
                }
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let relative = validate_path(path)?;
        let metadata = fs::metadata(self.root.join(&relative)).await.map_err(|e| Self::map_io_error(e, path))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        Self::file_info(relative, &metadata)
    }

    async fn reader(&self, path: &Path) -> Result<BoxArchiveReader> {
        let abs_path = self.absolute_path(path)?;
        let file = fs::File::open(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        Ok(Box::new(BufReader::new(file.into_std().await)))
    }

    async fn write_from(&self, path: &Path, reader: DynAsyncRead<'_>, limit: Option<u64>) -> Result<u64> {
        let abs_path = self.absolute_path(path)?;
        let parent = abs_path.parent().unwrap_or(&self.root);
        let temp = tempfile::Builder::new()
            .prefix(PARTIAL_PREFIX)
            .suffix(PARTIAL_SUFFIX)
            .tempfile_in(parent)
            .map_err(|e| Self::map_io_error(e, path))?;
        // The temp path deletes the partial file when dropped on any early return.
        let (file, temp_path) = temp.into_parts();
        let mut file = fs::File::from_std(file);

        // Read one byte past the limit so an oversized upload is detectable.
        let mut limited = reader.take(limit.map_or(u64::MAX, |limit| limit.saturating_add(1)));
        let written = tokio::io::copy(&mut limited, &mut file).await.map_err(ErrorKind::Io)?;
        if let Some(limit) = limit
            && written > limit
        {
            tracing::debug!(path = %path.display(), limit, "Discarding upload over the size limit");
            exn::bail!(ErrorKind::TooLarge(limit));
        }
        file.flush().await.map_err(ErrorKind::Io)?;
        file.sync_all().await.map_err(ErrorKind::Io)?;
        drop(file);

        temp_path.persist(&abs_path).map_err(|e| Self::map_io_error(e.error, path))?;
        tracing::debug!(path = %path.display(), bytes = written, "Stored file");
        Ok(written)
    }
}
