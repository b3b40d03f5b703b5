use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::read::error::{ErrorKind, Result as ReadResult};
use crate::read::{classify, open_archive};
use coview_archive::inspect;
use coview_storage::BackendHandle;
use exn::ResultExt;
use tracing::instrument;

/// The media entries of one archive, in natural (page) order.
///
/// Always reads the archive itself; the metadata cache only ever holds the
/// summary, not the full entry list.
#[instrument(skip(backend, ctx))]
pub async fn list_entries(backend: &BackendHandle, ctx: &Context, archive: &str) -> LibraryResult<Vec<String>> {
    list_entries_inner(backend, ctx, archive).await.or_raise(|| LibraryErrorKind::Pages)
}

pub(crate) async fn list_entries_inner(backend: &BackendHandle, ctx: &Context, archive: &str) -> ReadResult<Vec<String>> {
    let reader = open_archive(backend, archive).await?;
    let filter = ctx.filter.clone();
    let entries = tokio::task::spawn_blocking(move || inspect(reader, &filter)).await.or_raise(|| ErrorKind::Blocking)?;
    classify(entries, archive, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, zip_bytes};
    use coview_archive::MediaFilter;

    #[tokio::test]
    async fn test_entries_in_natural_order() {
        let fixture = Fixture::new().await;
        fixture.write(
            "comic1.zip",
            &zip_bytes(&[("p2.jpg", b"2"), ("p10.jpg", b"10"), ("p1.jpg", b"1"), ("credits.txt", b"")]),
        );
        let entries = list_entries(&fixture.backend, &fixture.ctx, "comic1.zip").await.unwrap();
        assert_eq!(entries, vec!["p1.jpg", "p2.jpg", "p10.jpg"]);
    }

    #[tokio::test]
    async fn test_respects_configured_extensions() {
        let mut fixture = Fixture::new().await;
        fixture.ctx.filter = MediaFilter::new(["png"]);
        fixture.write("comic1.zip", &zip_bytes(&[("p1.jpg", b"1"), ("cover.PNG", b"c")]));
        let entries = list_entries(&fixture.backend, &fixture.ctx, "comic1.zip").await.unwrap();
        assert_eq!(entries, vec!["cover.PNG"]);
    }

    #[tokio::test]
    async fn test_missing_archive() {
        let fixture = Fixture::new().await;
        let err = list_entries_inner(&fixture.backend, &fixture.ctx, "missing.zip").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ArchiveNotFound(name) if name == "missing.zip"));
    }

    #[tokio::test]
    async fn test_not_an_archive_name() {
        let fixture = Fixture::new().await;
        fixture.write("notes.txt", b"hello");
        for name in ["notes.txt", "../comic1.zip", "nested/comic1.zip"] {
            let err = list_entries_inner(&fixture.backend, &fixture.ctx, name).await.unwrap_err();
            assert!(matches!(&*err, ErrorKind::ArchiveNotFound(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn test_corrupt_archive() {
        let fixture = Fixture::new().await;
        fixture.write("broken.zip", b"not a zip");
        let err = list_entries_inner(&fixture.backend, &fixture.ctx, "broken.zip").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ArchiveUnreadable(_)));
    }
}
