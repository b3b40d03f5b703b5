use crate::ArchiveFormat;
use crate::error::{Error, ErrorKind};
use std::{fmt, path::Path, str::FromStr};

/// Local file header; every non-empty zip starts with it.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// End of central directory record; an empty zip is nothing but this.
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

impl FromStr for ArchiveFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zip" => Ok(ArchiveFormat::Zip),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(s.to_string())),
        }
    }
}
impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveFormat::Zip => f.write_str("zip"),
        }
    }
}
impl ArchiveFormat {
    /// Detect the archive format from a file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "zip" => Some(ArchiveFormat::Zip),
                _ => None,
            })
    }

    /// Detect the archive format from magic bytes.
    ///
    /// Returns `None` if no magic bytes match or the input is too short.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&ZIP_EMPTY_MAGIC) {
            return Some(ArchiveFormat::Zip);
        }
        None
    }

    /// File extension (without the dot) used for archives of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
        }
    }
}
