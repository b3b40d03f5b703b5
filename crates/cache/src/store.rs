//! File-backed metadata cache.

use crate::error::{ErrorKind, Result};
use crate::models::{CacheRecord, CacheStats, Fingerprint};
use coview_archive::ArchiveSummary;
use exn::{OptionExt, ResultExt};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::instrument;

/// Bump whenever the record layout changes; older records become misses.
pub const SCHEMA_VERSION: u32 = 1;
const RECORD_SUFFIX: &str = ".cache.json";
const TEMP_SUFFIX: &str = ".cache.json.tmp";
const PROBE_FILE: &str = ".coview-probe";

/// Persists one [`ArchiveSummary`] per archive, validated by [`Fingerprint`].
///
/// Records are pretty-printed JSON documents named after the archive's base
/// file name, so `a/comic1.zip` and `b/comic1.zip` share a record. The catalog
/// only ever watches one flat directory, where names are unique.
///
/// A single reader/writer lock covers the whole cache directory: lookups
/// share it, writes take it exclusively. It is held only around the cache's
/// own file operations, never while an archive is being read.
///
/// Cloning is cheap and every clone shares the same lock.
#[derive(Clone, Debug)]
pub struct MetadataCache {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    root: PathBuf,
    lock: RwLock<()>,
}

impl MetadataCache {
    /// Open a cache rooted at `root`, creating the directory if needed.
    ///
    /// Returns [`Unavailable`](ErrorKind::Unavailable) if the directory can't
    /// be created or written to.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        Self::prepare_root(root).await.or_raise(|| ErrorKind::Unavailable(root.to_path_buf()))?;
        tracing::debug!(root = %root.display(), "Opened metadata cache");
        Ok(Self::at(root))
    }

    /// Open a cache at `primary`, falling over to `fallback` if the primary
    /// root can't be prepared.
    ///
    /// Never fails. If neither root is usable the cache stays pointed at the
    /// fallback in a degraded state: every lookup misses and every write
    /// fails, which callers already treat as a log line.
    #[instrument(skip_all, fields(primary = %primary.as_ref().display()))]
    pub async fn open_with_fallback(primary: impl AsRef<Path>, fallback: impl AsRef<Path>) -> Self {
        let (primary, fallback) = (primary.as_ref(), fallback.as_ref());
        match Self::prepare_root(primary).await {
            Ok(()) => return Self::at(primary),
            Err(err) => tracing::warn!(
                fallback = %fallback.display(),
                error = ?err,
                "Cache directory unusable, falling back to secondary location"
            ),
        }
        match Self::open(fallback).await {
            Ok(cache) => cache,
            Err(err) => {
                tracing::warn!(error = ?err, "No usable cache directory, running without a metadata cache");
                Self::at(fallback)
            },
        }
    }

    fn at(root: &Path) -> Self {
        Self { inner: Arc::new(Inner { root: root.to_path_buf(), lock: RwLock::new(()) }) }
    }

    /// Create the directory and check that files can be written to it.
    async fn prepare_root(root: &Path) -> Result<()> {
        fs::create_dir_all(root).await.map_err(ErrorKind::Io)?;
        let probe = root.join(PROBE_FILE);
        fs::write(&probe, b"").await.map_err(ErrorKind::Io)?;
        fs::remove_file(&probe).await.map_err(ErrorKind::Io)?;
        Ok(())
    }

    /// Directory the records are stored in.
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    fn record_path(&self, identity: &Path) -> Result<PathBuf> {
        let name = identity.file_name().ok_or_raise(|| ErrorKind::InvalidKey(identity.to_path_buf()))?;
        Ok(self.inner.root.join(format!("{}{RECORD_SUFFIX}", name.to_string_lossy())))
    }

    /// Look up the summary for `identity`, trusting it only if it was stored
    /// under the same `fingerprint`.
    ///
    /// Every failure (missing, unreadable, unparseable, other schema, stale)
    /// is reported as a miss.
    #[instrument(level = "debug", skip(self, fingerprint), fields(identity = %identity.display()))]
    pub async fn get(&self, identity: &Path, fingerprint: &Fingerprint) -> Option<ArchiveSummary> {
        let record = match self.read_record(identity).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!("Cache miss");
                return None;
            },
            Err(err) => {
                tracing::debug!(error = ?err, "Cache record unreadable, treating as a miss");
                return None;
            },
        };
        if record.schema != SCHEMA_VERSION {
            tracing::debug!(schema = record.schema, "Cache record written by another schema version");
            return None;
        }
        if record.fingerprint != *fingerprint {
            tracing::debug!("Cache record is stale");
            return None;
        }
        tracing::debug!("Cache hit");
        Some(record.summary)
    }

    async fn read_record(&self, identity: &Path) -> Result<Option<CacheRecord>> {
        let path = self.record_path(identity)?;
        let bytes = {
            let _guard = self.inner.lock.read().await;
            match fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(None),
                Err(err) => exn::bail!(ErrorKind::Io(err)),
            }
        };
        let record = serde_json::from_slice(&bytes).or_raise(|| ErrorKind::InvalidData)?;
        Ok(Some(record))
    }

    /// Store `summary` for `identity` under `fingerprint`, replacing any
    /// previous record.
    ///
    /// The document is written to a temporary file and renamed over the
    /// record, so a concurrent reader sees either the old or the new record.
    #[instrument(level = "debug", skip(self, summary, fingerprint), fields(identity = %identity.display()))]
    pub async fn set(&self, identity: &Path, summary: &ArchiveSummary, fingerprint: &Fingerprint) -> Result<()> {
        let path = self.record_path(identity)?;
        let record = CacheRecord { schema: SCHEMA_VERSION, fingerprint: *fingerprint, summary: summary.clone() };
        let bytes = serde_json::to_vec_pretty(&record).or_raise(|| ErrorKind::InvalidData)?;
        let temp = path.with_file_name(format!(
            "{}{TEMP_SUFFIX}",
            identity.file_name().unwrap_or_default().to_string_lossy()
        ));

        let _guard = self.inner.lock.write().await;
        fs::write(&temp, &bytes).await.map_err(ErrorKind::Io)?;
        if let Err(err) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            exn::bail!(ErrorKind::Io(err));
        }
        tracing::debug!("Cache record written");
        Ok(())
    }

    /// Remove the record for `identity`. A missing record is not an error.
    #[instrument(level = "debug", skip(self), fields(identity = %identity.display()))]
    pub async fn invalidate(&self, identity: &Path) -> Result<()> {
        let path = self.record_path(identity)?;
        let _guard = self.inner.lock.write().await;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Cache record removed");
                Ok(())
            },
            Err(err) if err.kind() == IoErrorKind::NotFound => Ok(()),
            Err(err) => exn::bail!(ErrorKind::Io(err)),
        }
    }

    /// Remove every record, including orphans of archives that no longer
    /// exist. Best-effort: a record that can't be removed is logged and
    /// skipped. Returns how many records were removed.
    #[instrument(skip(self), fields(root = %self.inner.root.display()))]
    pub async fn clear(&self) -> Result<usize> {
        let _guard = self.inner.lock.write().await;
        let mut entries = fs::read_dir(&self.inner.root).await.map_err(ErrorKind::Io)?;
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await.map_err(ErrorKind::Io)? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.ends_with(RECORD_SUFFIX) && !name.ends_with(TEMP_SUFFIX) {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(err) => tracing::warn!(path = %entry.path().display(), error = %err, "Could not remove cache record"),
            }
        }
        tracing::info!(removed, "Cleared metadata cache");
        Ok(removed)
    }

    /// Count records and their size on disk. Approximate: records that vanish
    /// or can't be stat'ed mid-count are left out.
    pub async fn stats(&self) -> Result<CacheStats> {
        let _guard = self.inner.lock.read().await;
        let mut entries = fs::read_dir(&self.inner.root).await.map_err(ErrorKind::Io)?;
        let mut stats = CacheStats::default();
        while let Some(entry) = entries.next_entry().await.map_err(ErrorKind::Io)? {
            if !entry.file_name().to_string_lossy().ends_with(RECORD_SUFFIX) {
                continue;
            }
            if let Ok(metadata) = entry.metadata().await
                && metadata.is_file()
            {
                stats.records += 1;
                stats.total_bytes += metadata.len();
            }
        }
        Ok(stats)
    }
}
