use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{self, Read, Seek, Write};
use zip::ZipArchive;
use zip::result::ZipError;

/// Stream the decompressed contents of a single entry into `writer`.
///
/// The archive is opened fresh from `reader`; nothing is cached. Matching is
/// exact: case-sensitive, against the full in-archive path. The reader (and
/// with it the archive handle) is dropped before returning, on every path.
///
/// Returns the number of bytes written.
///
/// # Errors
/// - [`ErrorKind::EntryNotFound`] if no file entry has exactly this name.
/// - [`ErrorKind::Unreadable`] if the container or the entry's compressed data
///   is corrupt.
/// - [`ErrorKind::Io`] if writing fails.
pub fn copy_entry<R, W>(reader: R, name: &str, writer: &mut W) -> Result<u64>
where
    R: Read + Seek,
    W: Write + ?Sized,
{
    let mut archive = ZipArchive::new(reader).or_raise(|| ErrorKind::Unreadable)?;
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => exn::bail!(ErrorKind::EntryNotFound(name.to_string())),
        Err(err) => return Err(err).or_raise(|| ErrorKind::Unreadable),
    };
    if entry.is_dir() {
        exn::bail!(ErrorKind::EntryNotFound(name.to_string()));
    }
    match io::copy(&mut entry, writer) {
        Ok(written) => Ok(written),
        // Decompression failures (bad deflate stream, CRC mismatch) surface
        // as InvalidData.
        Err(err) if err.kind() == io::ErrorKind::InvalidData => Err(err).or_raise(|| ErrorKind::Unreadable),
        Err(err) => Err(err).or_raise(|| ErrorKind::Io),
    }
}

/// Read a single entry fully into memory. See [`copy_entry`].
pub fn read_entry<R: Read + Seek>(reader: R, name: &str) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    copy_entry(reader, name, &mut buffer)?;
    Ok(buffer)
}
