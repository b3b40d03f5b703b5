//! Reading inside a single archive.
//!
//! Every call opens the archive afresh through the storage backend and
//! releases it before returning; nothing here touches the metadata cache.
//! Archives are identified by file name within the watched directory.

mod entry;
pub mod error;
mod pages;

pub use self::entry::{Entry, copy_entry, read_entry};
pub use self::pages::list_entries;
use crate::read::error::{ErrorKind, Result as ReadResult};
use coview_archive::error::{Error as ArchiveError, ErrorKind as ArchiveErrorKind};
use coview_storage::BackendHandle;
use coview_storage::backend::BoxArchiveReader;
use coview_storage::error::ErrorKind as StorageErrorKind;
use exn::ResultExt;
use std::path::Path;

async fn open_archive(backend: &BackendHandle, archive: &str) -> ReadResult<BoxArchiveReader> {
    match backend.reader(Path::new(archive)).await {
        Ok(reader) => Ok(reader),
        Err(err)
            if matches!(
                &*err,
                StorageErrorKind::NotFound(_) | StorageErrorKind::InvalidPath(_) | StorageErrorKind::FilteredPath(_)
            ) =>
        {
            Err(err).or_raise(|| ErrorKind::ArchiveNotFound(archive.to_string()))
        },
        Err(err) => Err(err).or_raise(|| ErrorKind::Storage),
    }
}

/// Keep "no such entry", "broken archive" and "I/O failed" apart.
fn classify<T>(result: Result<T, ArchiveError>, archive: &str, entry: Option<&str>) -> ReadResult<T> {
    match (result, entry) {
        (Ok(value), _) => Ok(value),
        (Err(err), Some(entry)) if err.is_not_found() => Err(err).or_raise(|| ErrorKind::EntryNotFound(entry.to_string())),
        (Err(err), _) if matches!(&*err, ArchiveErrorKind::Io) => Err(err).or_raise(|| ErrorKind::Io),
        (Err(err), _) => Err(err).or_raise(|| ErrorKind::ArchiveUnreadable(archive.to_string())),
    }
}
