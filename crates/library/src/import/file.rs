use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::import::error::{ErrorKind, Result as ImportResult};
use coview_archive::ArchiveFormat;
use coview_cache::MetadataCache;
use coview_storage::backend::DynAsyncRead;
use coview_storage::error::ErrorKind as StorageErrorKind;
use coview_storage::BackendHandle;
use exn::ResultExt;
use std::path::Path;
use tracing::instrument;

/// An archive that landed in the watched directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Imported {
    /// Name the archive was stored under.
    pub name: String,
    pub bytes: u64,
    /// `false` when the directory is read-only and the upload was dropped.
    pub stored: bool,
}

/// Reduce a client-supplied file name to its final path segment.
///
/// Both `/` and `\` count as separators, whatever the platform, so a browser
/// sending `C:\Users\me\comic1.zip` still yields `comic1.zip`.
fn base_name(file_name: &str) -> Option<&str> {
    let name = file_name.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        name if name.contains('\0') => None,
        name => Some(name),
    }
}

/// Store an uploaded archive in the watched directory.
///
/// Only the base name of `file_name` is kept, and it must carry an archive
/// extension. The contents are not validated: a corrupt upload is accepted
/// here and skipped by the catalog later. An existing archive with the same
/// name is replaced, and its cache record dropped. In read-only mode the
/// upload is discarded and the cache left alone.
#[instrument(skip(backend, cache, ctx, reader))]
pub async fn import_archive(
    backend: &BackendHandle,
    cache: &MetadataCache,
    ctx: &Context,
    file_name: &str,
    reader: DynAsyncRead<'_>,
) -> LibraryResult<Imported> {
    import_archive_inner(backend, cache, ctx, file_name, reader).await.or_raise(|| LibraryErrorKind::Import)
}

async fn import_archive_inner(
    backend: &BackendHandle,
    cache: &MetadataCache,
    ctx: &Context,
    file_name: &str,
    reader: DynAsyncRead<'_>,
) -> ImportResult<Imported> {
    let Some(name) = base_name(file_name) else {
        exn::bail!(ErrorKind::InvalidName(file_name.to_string()));
    };
    if ArchiveFormat::from_path(name).is_none() {
        exn::bail!(ErrorKind::UnsupportedFormat(name.to_string()));
    }

    let path = Path::new(name);
    let bytes = match backend.write_from(path, reader, ctx.upload_limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            let kind = match &*err {
                StorageErrorKind::TooLarge(limit) => ErrorKind::TooLarge(*limit),
                StorageErrorKind::InvalidPath(_) => ErrorKind::InvalidName(file_name.to_string()),
                _ => ErrorKind::Storage,
            };
            return Err(err).or_raise(|| kind);
        },
    };

    if backend.is_read_only() {
        tracing::info!(archive = name, "Upload dropped, directory is read-only");
        return Ok(Imported { name: name.to_string(), bytes, stored: false });
    }
    if let Err(err) = cache.invalidate(path).await {
        tracing::warn!(archive = name, error = ?err, "Could not invalidate cache record after upload");
    }
    tracing::info!(archive = name, bytes, "Imported archive");
    Ok(Imported { name: name.to_string(), bytes, stored: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, zip_bytes};
    use coview_archive::ArchiveSummary;
    use coview_cache::Fingerprint;
    use rstest::rstest;

    #[rstest]
    #[case("comic1.zip", Some("comic1.zip"))]
    #[case("some/dir/comic1.zip", Some("comic1.zip"))]
    #[case("../../comic1.zip", Some("comic1.zip"))]
    #[case("C:\\Users\\me\\comic1.zip", Some("comic1.zip"))]
    #[case("dir/", None)]
    #[case("..", None)]
    #[case("", None)]
    fn test_base_name(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(base_name(input), expected);
    }

    #[tokio::test]
    async fn test_import_then_catalog() {
        let fixture = Fixture::new().await;
        let bytes = zip_bytes(&[("p2.jpg", b"2"), ("p1.jpg", b"1")]);
        let mut source = bytes.as_slice();
        let imported = import_archive(&fixture.backend, &fixture.cache, &fixture.ctx, "uploads/comic1.zip", &mut source)
            .await
            .unwrap();
        let expected = Imported { name: "comic1.zip".to_string(), bytes: bytes.len() as u64, stored: true };
        assert_eq!(imported, expected);
        assert_eq!(std::fs::read(fixture.dir.path().join("comic1.zip")).unwrap(), bytes);

        let summaries = crate::catalog::list_archives(&fixture.backend, &fixture.cache, &fixture.ctx).await.unwrap();
        assert_eq!(summaries[0].first_entry.as_deref(), Some("p1.jpg"));
    }

    #[tokio::test]
    async fn test_rejects_non_archive() {
        let fixture = Fixture::new().await;
        let mut source: &[u8] = b"hello";
        let err = import_archive_inner(&fixture.backend, &fixture.cache, &fixture.ctx, "notes.txt", &mut source)
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(name) if name == "notes.txt"));
        assert!(!fixture.dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_rejects_empty_name() {
        let fixture = Fixture::new().await;
        let mut source: &[u8] = b"hello";
        let err =
            import_archive_inner(&fixture.backend, &fixture.cache, &fixture.ctx, "dir/", &mut source).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_size_limit() {
        let mut fixture = Fixture::new().await;
        fixture.ctx.upload_limit = Some(4);
        let mut source: &[u8] = b"too many bytes";
        let err = import_archive_inner(&fixture.backend, &fixture.cache, &fixture.ctx, "big.zip", &mut source)
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::TooLarge(4)));
        assert!(!fixture.dir.path().join("big.zip").exists());
    }

    #[tokio::test]
    async fn test_integrity_not_checked() {
        let fixture = Fixture::new().await;
        let mut source: &[u8] = b"not really a zip";
        import_archive(&fixture.backend, &fixture.cache, &fixture.ctx, "broken.zip", &mut source).await.unwrap();
        assert!(fixture.dir.path().join("broken.zip").exists());
    }

    #[tokio::test]
    async fn test_replacing_invalidates_cache_record() {
        let fixture = Fixture::new().await;
        fixture.write("comic1.zip", &zip_bytes(&[("p1.jpg", b"1")]));
        let stale = ArchiveSummary::new("comic1.zip", 1, &["stale.jpg".to_string()]);
        let fingerprint = Fingerprint::from(&fixture.backend.stat(Path::new("comic1.zip")).await.unwrap());
        fixture.cache.set(Path::new("comic1.zip"), &stale, &fingerprint).await.unwrap();

        let replacement = zip_bytes(&[("new.jpg", b"new")]);
        let mut source = replacement.as_slice();
        import_archive(&fixture.backend, &fixture.cache, &fixture.ctx, "comic1.zip", &mut source).await.unwrap();
        assert_eq!(fixture.cache.stats().await.unwrap().records, 0);
    }

    #[tokio::test]
    async fn test_read_only_keeps_cache_record() {
        let mut fixture = Fixture::new().await;
        fixture.write("comic1.zip", &zip_bytes(&[("p1.jpg", b"1")]));
        fixture.backend = crate::open_directory(fixture.dir.path(), true).unwrap();
        let summaries = crate::catalog::list_archives(&fixture.backend, &fixture.cache, &fixture.ctx).await.unwrap();
        assert_eq!(summaries.len(), 1);

        let replacement = zip_bytes(&[("new.jpg", b"new")]);
        let mut source = replacement.as_slice();
        let imported =
            import_archive(&fixture.backend, &fixture.cache, &fixture.ctx, "comic1.zip", &mut source).await.unwrap();
        assert_eq!(imported, Imported { name: "comic1.zip".to_string(), bytes: 0, stored: false });
        assert_eq!(fixture.cache.stats().await.unwrap().records, 1);
        assert_ne!(std::fs::read(fixture.dir.path().join("comic1.zip")).unwrap(), replacement);
    }
}
