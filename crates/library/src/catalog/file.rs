use crate::Context;
use crate::catalog::error::{ErrorKind, Result as CatalogResult};
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use coview_archive::{ArchiveSummary, inspect};
use coview_cache::{Fingerprint, MetadataCache};
use coview_storage::{BackendHandle, FileInfo};
use exn::ResultExt;

/// Indicates how much work was required to produce a [`Catalogued`] result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogEffort {
    /// The cache held a summary recorded under the archive's current
    /// fingerprint; the archive itself was never opened.
    Cached,
    /// The archive was opened and inspected, and the cache refreshed.
    Processed,
}

/// The summary of a single archive, and where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalogued {
    pub summary: ArchiveSummary,
    pub effort: CatalogEffort,
}

/// Summarise a single archive, from the cache when its fingerprint still
/// matches and by inspecting it otherwise.
///
/// A fresh summary is written back to the cache under the fingerprint taken
/// *before* inspection. If the archive changes mid-inspection the record is
/// stale from the start and the next run simply misses. Failing to write the
/// record is logged, not returned.
pub async fn catalog_archive(
    backend: &BackendHandle,
    cache: &MetadataCache,
    ctx: &Context,
    file: FileInfo,
) -> LibraryResult<Catalogued> {
    catalog_archive_inner(backend, cache, ctx, file).await.or_raise(|| LibraryErrorKind::Catalog)
}

pub(crate) async fn catalog_archive_inner(
    backend: &BackendHandle,
    cache: &MetadataCache,
    ctx: &Context,
    file: FileInfo,
) -> CatalogResult<Catalogued> {
    let fingerprint = Fingerprint::from(&file);
    if let Some(summary) = cache.get(&file.path, &fingerprint).await {
        return Ok(Catalogued { summary, effort: CatalogEffort::Cached });
    }

    let name = file.name();
    let reader = backend.reader(&file.path).await.or_raise(|| ErrorKind::Storage(name.clone()))?;
    let filter = ctx.filter.clone();
    let entries = tokio::task::spawn_blocking(move || inspect(reader, &filter))
        .await
        .or_raise(|| ErrorKind::Blocking)?
        .or_raise(|| ErrorKind::ArchiveUnreadable(name.clone()))?;

    let summary = ArchiveSummary::new(name, file.size, &entries);
    if let Err(err) = cache.set(&file.path, &summary, &fingerprint).await {
        tracing::warn!(archive = %file.path.display(), error = ?err, "Could not write cache record");
    }
    Ok(Catalogued { summary, effort: CatalogEffort::Processed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, zip_bytes};
    use std::path::Path;

    #[tokio::test]
    async fn test_first_run_processes_then_caches() {
        let fixture = Fixture::new().await;
        fixture.write("comic1.zip", &zip_bytes(&[("p2.jpg", b"2"), ("p10.jpg", b"10"), ("p1.jpg", b"1")]));
        let file = fixture.backend.stat(Path::new("comic1.zip")).await.unwrap();

        let first = catalog_archive(&fixture.backend, &fixture.cache, &fixture.ctx, file.clone()).await.unwrap();
        assert_eq!(first.effort, CatalogEffort::Processed);
        assert_eq!(first.summary.name, "comic1.zip");
        assert_eq!(first.summary.entry_count, 3);
        assert_eq!(first.summary.first_entry.as_deref(), Some("p1.jpg"));
        assert_eq!(first.summary.size_bytes, file.size);

        let second = catalog_archive(&fixture.backend, &fixture.cache, &fixture.ctx, file).await.unwrap();
        assert_eq!(second.effort, CatalogEffort::Cached);
        assert_eq!(second.summary, first.summary);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_archive() {
        let fixture = Fixture::new().await;
        fixture.write("comic1.zip", &zip_bytes(&[("p1.jpg", b"1")]));
        let file = fixture.backend.stat(Path::new("comic1.zip")).await.unwrap();
        // A summary the archive could never produce proves the archive wasn't read.
        let seeded = ArchiveSummary::new("comic1.zip", file.size, &["seeded.png".to_string(), "x.png".to_string()]);
        fixture.cache.set(&file.path, &seeded, &Fingerprint::from(&file)).await.unwrap();

        let result = catalog_archive(&fixture.backend, &fixture.cache, &fixture.ctx, file).await.unwrap();
        assert_eq!(result.effort, CatalogEffort::Cached);
        assert_eq!(result.summary, seeded);
    }

    #[tokio::test]
    async fn test_archive_without_media() {
        let fixture = Fixture::new().await;
        fixture.write("notes.zip", &zip_bytes(&[("readme.txt", b"hello")]));
        let file = fixture.backend.stat(Path::new("notes.zip")).await.unwrap();
        let result = catalog_archive(&fixture.backend, &fixture.cache, &fixture.ctx, file).await.unwrap();
        assert_eq!(result.summary.entry_count, 0);
        assert_eq!(result.summary.first_entry, None);
    }

    #[tokio::test]
    async fn test_corrupt_archive_is_unreadable() {
        let fixture = Fixture::new().await;
        fixture.write("broken.zip", b"this is not a zip file");
        let file = fixture.backend.stat(Path::new("broken.zip")).await.unwrap();
        let err = catalog_archive_inner(&fixture.backend, &fixture.cache, &fixture.ctx, file).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ArchiveUnreadable(name) if name == "broken.zip"));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_vanished_archive_is_a_storage_error() {
        let fixture = Fixture::new().await;
        fixture.write("comic1.zip", &zip_bytes(&[("p1.jpg", b"1")]));
        let file = fixture.backend.stat(Path::new("comic1.zip")).await.unwrap();
        std::fs::remove_file(fixture.dir.path().join("comic1.zip")).unwrap();
        let err = catalog_archive_inner(&fixture.backend, &fixture.cache, &fixture.ctx, file).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Storage(_)));
    }
}
