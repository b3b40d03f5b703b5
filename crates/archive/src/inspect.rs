use crate::error::{ErrorKind, Result};
use crate::media::MediaFilter;
use crate::natural;
use exn::ResultExt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::instrument;
use zip::ZipArchive;

/// List the recognised media entries of an archive, in natural order.
///
/// Only the central directory is read; no entry is decompressed. Entries are
/// ordered by their full in-archive path, so pages from different folders
/// interleave by that path (`ch2/p10.jpg` before `ch10/p1.jpg`). An archive
/// with no matching entries yields an empty list, not an error.
///
/// The reader is consumed and dropped before returning, on every path.
///
/// # Errors
/// Returns [`ErrorKind::Unreadable`] if the container isn't a readable zip.
pub fn inspect<R: Read + Seek>(reader: R, filter: &MediaFilter) -> Result<Vec<String>> {
    let archive = ZipArchive::new(reader).or_raise(|| ErrorKind::Unreadable)?;
    let mut entries: Vec<String> = archive.file_names().filter(|name| filter.matches(name)).map(str::to_owned).collect();
    natural::sort(&mut entries);
    Ok(entries)
}

/// Convenience wrapper around [`inspect`] for an archive on the local filesystem.
#[instrument(skip(filter), fields(path = %path.as_ref().display()))]
pub fn inspect_path(path: impl AsRef<Path>, filter: &MediaFilter) -> Result<Vec<String>> {
    let file = File::open(path.as_ref()).or_raise(|| ErrorKind::Unreadable)?;
    let entries = inspect(BufReader::new(file), filter)?;
    tracing::debug!(entries = entries.len(), "Inspected archive");
    Ok(entries)
}
