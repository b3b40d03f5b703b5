use crate::catalog::error::{ErrorKind as CatalogErrorKind, Result as CatalogResult};
use crate::catalog::file::{Catalogued, catalog_archive_inner};
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::{Context, MAX_PROCESS_CONCURRENCY};
use async_stream::stream;
use coview_archive::{ArchiveSummary, natural};
use coview_cache::MetadataCache;
use coview_storage::BackendHandle;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use std::pin::pin;
use tracing::instrument;

/// Progress events emitted by [`catalog`] as it works through the archives
/// of the watched directory.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    number of archives found.
/// 3. [`Catalogued`](Self::Catalogued): zero or more times, one per archive
///    that could be summarised, in completion order.
/// 4. [`Complete`](Self::Complete): exactly once, signalling the stream is
///    finished.
///
/// If the directory can't be listed, an error follows `Started` and the
/// stream ends without [`Complete`](Self::Complete).
#[derive(Debug)]
pub enum CatalogEvent {
    Started,
    DiscoveryComplete(u64),
    Catalogued(Catalogued),
    Complete,
}

/// Streams [`CatalogEvent`]s for every archive in `backend`.
///
/// Archives are summarised concurrently, up to `MAX_PROCESS_CONCURRENCY` at a
/// time. An archive that can't be opened or inspected is surfaced as an `Err`
/// item without terminating the stream; only failing to list the directory
/// is fatal.
pub fn catalog<'a>(
    backend: &'a BackendHandle,
    cache: &'a MetadataCache,
    ctx: &'a Context,
) -> impl Stream<Item = LibraryResult<CatalogEvent>> + 'a {
    stream! {
        for await event in catalog_inner(backend, cache, ctx) {
            yield event.or_raise(|| LibraryErrorKind::Catalog);
        }
    }
}

fn catalog_inner<'a>(
    backend: &'a BackendHandle,
    cache: &'a MetadataCache,
    ctx: &'a Context,
) -> impl Stream<Item = CatalogResult<CatalogEvent>> + 'a {
    stream! {
        yield Ok(CatalogEvent::Started);

        let files = match backend.list().await.or_raise(|| CatalogErrorKind::Listing) {
            Ok(files) => files,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        yield Ok(CatalogEvent::DiscoveryComplete(u64::try_from(files.len()).unwrap_or(u64::MAX)));

        let mut pending = files.into_iter().map(|file| catalog_archive_inner(backend, cache, ctx, file));
        let mut processing: FuturesUnordered<_> = pending.by_ref().take(MAX_PROCESS_CONCURRENCY).collect();
        while let Some(result) = processing.next().await {
            yield result.map(CatalogEvent::Catalogued);
            if let Some(next) = pending.next() {
                processing.push(next);
            }
        }

        yield Ok(CatalogEvent::Complete);
    }
}

/// Summaries of every readable archive in `backend`, ordered by name.
///
/// Unreadable archives are logged and left out. The order depends only on
/// the archive names: natural order, with names that compare equal (`vol01`
/// and `vol1`) broken by plain string order. Discovery order and which
/// summaries came from the cache never matter.
#[instrument(skip_all, fields(backend = backend.name()))]
pub async fn list_archives(
    backend: &BackendHandle,
    cache: &MetadataCache,
    ctx: &Context,
) -> LibraryResult<Vec<ArchiveSummary>> {
    let mut summaries = Vec::new();
    let mut skipped = 0usize;
    let mut events = pin!(catalog_inner(backend, cache, ctx));
    while let Some(event) = events.next().await {
        match event {
            Ok(CatalogEvent::Catalogued(catalogued)) => summaries.push(catalogued.summary),
            Ok(_) => {},
            Err(err) if err.is_fatal() => return Err(err).or_raise(|| LibraryErrorKind::Catalog),
            Err(err) => {
                skipped += 1;
                tracing::warn!(error = ?err, "Skipping archive");
            },
        }
    }
    summaries.sort_by(|a, b| natural::compare(&a.name, &b.name).then_with(|| a.name.cmp(&b.name)));
    tracing::debug!(archives = summaries.len(), skipped, "Catalog complete");
    Ok(summaries)
}
