use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::read::error::{ErrorKind, Result as ReadResult};
use crate::read::{classify, open_archive};
use coview_storage::BackendHandle;
use exn::ResultExt;
use std::io::Write;
use tracing::instrument;

/// One entry's decompressed bytes, with the name it was requested by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Read a single entry of `archive` into memory.
///
/// `entry` must match the full in-archive path exactly (case-sensitive).
#[instrument(skip(backend))]
pub async fn read_entry(backend: &BackendHandle, archive: &str, entry: &str) -> LibraryResult<Entry> {
    read_entry_inner(backend, archive, entry).await.or_raise(|| LibraryErrorKind::Read)
}

pub(crate) async fn read_entry_inner(backend: &BackendHandle, archive: &str, entry: &str) -> ReadResult<Entry> {
    let reader = open_archive(backend, archive).await?;
    let name = entry.to_string();
    let data = tokio::task::spawn_blocking(move || coview_archive::read_entry(reader, &name))
        .await
        .or_raise(|| ErrorKind::Blocking)?;
    let data = classify(data, archive, Some(entry))?;
    Ok(Entry { name: entry.to_string(), data })
}

/// Stream a single entry of `archive` into `writer` without buffering it
/// whole. The writer is driven on the blocking pool and handed back together
/// with the number of bytes written.
#[instrument(skip(backend, writer))]
pub async fn copy_entry<W>(backend: &BackendHandle, archive: &str, entry: &str, writer: W) -> LibraryResult<(W, u64)>
where
    W: Write + Send + 'static,
{
    copy_entry_inner(backend, archive, entry, writer).await.or_raise(|| LibraryErrorKind::Read)
}

async fn copy_entry_inner<W>(backend: &BackendHandle, archive: &str, entry: &str, mut writer: W) -> ReadResult<(W, u64)>
where
    W: Write + Send + 'static,
{
    let reader = open_archive(backend, archive).await?;
    let name = entry.to_string();
    let (result, writer) = tokio::task::spawn_blocking(move || {
        let result = coview_archive::copy_entry(reader, &name, &mut writer);
        (result, writer)
    })
    .await
    .or_raise(|| ErrorKind::Blocking)?;
    let written = classify(result, archive, Some(entry))?;
    Ok((writer, written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, zip_bytes};

    fn comic() -> Vec<u8> {
        zip_bytes(&[("p1.jpg", b"first page"), ("Chapter 1/p2.jpg", b"second page")])
    }

    #[tokio::test]
    async fn test_read_entry() {
        let fixture = Fixture::new().await;
        fixture.write("comic1.zip", &comic());
        let entry = read_entry(&fixture.backend, "comic1.zip", "p1.jpg").await.unwrap();
        assert_eq!(entry, Entry { name: "p1.jpg".to_string(), data: b"first page".to_vec() });
        let nested = read_entry(&fixture.backend, "comic1.zip", "Chapter 1/p2.jpg").await.unwrap();
        assert_eq!(nested.data, b"second page");
    }

    #[tokio::test]
    async fn test_missing_entry() {
        let fixture = Fixture::new().await;
        fixture.write("comic1.zip", &comic());
        for name in ["missing.jpg", "P1.JPG", "p2.jpg"] {
            let err = read_entry_inner(&fixture.backend, "comic1.zip", name).await.unwrap_err();
            assert!(matches!(&*err, ErrorKind::EntryNotFound(n) if n == name), "{name}");
            assert!(err.is_not_found());
        }
    }

    #[tokio::test]
    async fn test_missing_archive() {
        let fixture = Fixture::new().await;
        let err = read_entry_inner(&fixture.backend, "missing.zip", "p1.jpg").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ArchiveNotFound(_)));
    }

    #[tokio::test]
    async fn test_corrupt_archive_is_not_a_missing_entry() {
        let fixture = Fixture::new().await;
        fixture.write("broken.zip", b"not a zip");
        let err = read_entry_inner(&fixture.backend, "broken.zip", "p1.jpg").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ArchiveUnreadable(_)));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_copy_entry() {
        let fixture = Fixture::new().await;
        fixture.write("comic1.zip", &comic());
        let (buffer, written) = copy_entry(&fixture.backend, "comic1.zip", "p1.jpg", Vec::new()).await.unwrap();
        assert_eq!(written, 10);
        assert_eq!(buffer, b"first page");

        let err = copy_entry_inner(&fixture.backend, "comic1.zip", "missing.jpg", Vec::new()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::EntryNotFound(_)));
    }

    #[derive(Debug)]
    struct ClosedPipe;
    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_writer_is_not_a_broken_archive() {
        let fixture = Fixture::new().await;
        fixture.write("comic1.zip", &comic());
        let err = copy_entry_inner(&fixture.backend, "comic1.zip", "p1.jpg", ClosedPipe).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io));
        assert!(!err.is_not_found());
        assert!(err.is_retryable());
    }
}
