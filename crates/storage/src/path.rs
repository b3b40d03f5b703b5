//! Path validation and security utilities.
//!
//! The watched directory is flat: every archive lives directly under the
//! storage root. Paths handed to a backend must therefore resolve to exactly
//! one file name, and must never escape the root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path for security and correctness.
///
/// The path is normalised (`.` and redundant separators dropped, `..` resolved
/// lexically) and must then consist of exactly one file name.
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use coview_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("comic1.zip").is_ok());
/// assert!(validate_path("./comic1.zip").is_ok());
/// assert!(validate_path("nested/../comic1.zip").is_ok()); // (never leaves the root)
/// // Invalid paths
/// assert!(validate_path("../comic1.zip").is_err());
/// assert!(validate_path("nested/comic1.zip").is_err()); // (not flat)
/// assert!(validate_path("comic\0.zip").is_err());
/// // Paths get resolved
/// assert_eq!(validate_path("wrong/.././comic1.zip/").unwrap(), Path::new("comic1.zip"));
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let invalid = || ErrorKind::InvalidPath(path.as_ref().to_path_buf());
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(invalid());
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    match components.as_slice() {
        [name] => Ok(PathBuf::from(name)),
        _ => exn::bail!(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("comic1.zip", "comic1.zip")]
    #[case("./comic1.zip", "comic1.zip")]
    #[case("comic1.zip/", "comic1.zip")]
    #[case("/comic1.zip", "comic1.zip")]
    #[case("sub/../comic1.zip", "comic1.zip")]
    #[case("Vol 1 (2001).zip", "Vol 1 (2001).zip")]
    fn test_valid_paths(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(Path::new(input)).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case("../comic1.zip")]
    #[case("sub/../../comic1.zip")]
    #[case("..")]
    #[case("sub/comic1.zip")]
    #[case("a/b/c.zip")]
    #[case("comic\0.zip")]
    #[case("")]
    #[case(".")]
    #[case("./")]
    #[case("//")]
    fn test_invalid_paths(#[case] input: &str) {
        let err = validate(Path::new(input)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }
}
