//! Archive summary model.

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Display-ready metadata about one archive's recognised media.
///
/// A summary is a pure function of an archive's contents: any change to the
/// archive produces a new summary, never a mutation of an existing one.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ArchiveSummary {
    /// Archive file name, as displayed.
    pub name: String,
    /// Archive size on disk.
    pub size_bytes: u64,
    /// Number of recognised media entries.
    pub entry_count: usize,
    /// Size in mebibytes, to one decimal place.
    pub size_display: String,
    /// First media entry in natural order (the cover), if there is one.
    pub first_entry: Option<String>,
}
impl ArchiveSummary {
    /// Derive a summary from an archive's ordered media entries.
    ///
    /// `entries` must already be in natural order (as returned by
    /// [`inspect`](crate::inspect)).
    pub fn new(name: impl Into<String>, size_bytes: u64, entries: &[String]) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            entry_count: entries.len(),
            size_display: format_size(size_bytes),
            first_entry: entries.first().cloned(),
        }
    }
}

/// Human-readable size in mebibytes, e.g. `"12.3 MB"`.
pub fn format_size(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / BYTES_PER_MIB)
}
