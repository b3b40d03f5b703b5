//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, the interface the library
//! uses to reach the watched archive directory, plus decorators that narrow
//! what a backend exposes.

mod archive;
mod local;
mod ro;

pub use self::archive::ArchiveOnlyBackend;
pub use self::local::LocalBackend;
pub use self::ro::ReadOnlyBackend;
use crate::FileInfo;
use crate::error::Result;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::io::{Read, Seek};
use std::path::Path;
use std::pin::Pin;
use tokio::io::AsyncRead;

pub(crate) type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// Blocking, seekable reader over a stored file. Zip needs to seek to the
/// central directory at the end of the file before it can read anything.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

pub type BoxArchiveReader = Box<dyn ReadSeek + Send + 'static>;
pub type DynAsyncRead<'a> = &'a mut (dyn AsyncRead + Unpin + Send);

/// Unified interface for storage backends.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation. The root is flat: a path is a single file name.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use coview_storage::{backend::StorageBackend, error::Result};
///
/// async fn size_of_hardcoded_file(backend: &dyn StorageBackend) -> Result<u64> {
///     let path = Path::new("comic1.zip");
///     if backend.exists(path).await? {
///         Ok(backend.stat(path).await?.size)
///     } else {
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend (used for logging only).
    fn name(&self) -> &str;

    /// Whether writes are dropped instead of stored.
    fn is_read_only(&self) -> bool {
        false
    }

    /// List all files directly under the storage root.
    ///
    /// Default implementation of this method is to collect all the results
    /// from [`list_stream()`](Self::list_stream) into a [`Vec`] before
    /// returning.
    async fn list(&self) -> Result<Vec<FileInfo>> {
        self.list_stream().try_collect().await
    }

    /// Stream metadata for every file directly under the storage root.
    ///
    /// Not recursive: subdirectories are neither listed nor descended into.
    /// Files that disappear or can't be stat'ed between being enumerated and
    /// being inspected are skipped. An `Err` item means the root itself
    /// couldn't be enumerated.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::TryStreamExt;
    /// # use coview_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.list_stream();
    /// while let Some(info) = stream.try_next().await? {
    ///     println!("{}: {} bytes", info.path.display(), info.size);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_stream(&self) -> FileInfoStream<'_>;

    /// Check if a file exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get file metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;

    /// Open a file for blocking, seekable reads.
    ///
    /// Returns a `'static` boxed reader suitable for use inside
    /// [`spawn_blocking`](tokio::task::spawn_blocking). The async setup
    /// (opening the file) happens before returning. The file handle is
    /// released when the reader is dropped. Returns
    /// [`NotFound`](crate::error::ErrorKind::NotFound) if the file does not
    /// exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use coview_archive::{MediaFilter, inspect};
    /// # use coview_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let reader = backend.reader(Path::new("comic1.zip")).await?;
    /// let pages = tokio::task::spawn_blocking(move || inspect(reader, &MediaFilter::default()))
    ///     .await
    ///     .unwrap();
    /// # Ok(())
    /// # }
    /// ```
    async fn reader(&self, path: &Path) -> Result<BoxArchiveReader>;

    /// Write a file from an async reader, replacing any existing file.
    ///
    /// Readers of the storage never observe a partially written file: data
    /// lands in a temporary file beside the target, which is renamed into
    /// place once complete. If `limit` is set and the reader yields more
    /// than `limit` bytes, nothing is written and
    /// [`TooLarge`](crate::error::ErrorKind::TooLarge) is returned.
    ///
    /// Returns the number of bytes written.
    async fn write_from(&self, path: &Path, reader: DynAsyncRead<'_>, limit: Option<u64>) -> Result<u64>;
}
