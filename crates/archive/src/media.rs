//! Recognised media entries.

/// Extensions recognised as images when no other list is configured.
pub const DEFAULT_MEDIA_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Allow-list of entry extensions that count as pages.
///
/// Matching is case-insensitive and only looks at the text after the final
/// `.` of the entry's last path segment, so `Chapter 1/P01.JPG` matches `jpg`
/// but `images.jpg/` (a directory entry) does not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaFilter {
    extensions: Vec<String>,
}
impl Default for MediaFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_EXTENSIONS)
    }
}
impl MediaFilter {
    /// Build a filter from a list of extensions. Leading dots are ignored and
    /// case is normalised, so `".PNG"` and `"png"` are the same entry.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: Vec<String> = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        extensions.sort();
        extensions.dedup();
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether an archive entry name is a recognised media file.
    pub fn matches(&self, name: &str) -> bool {
        let segment = name.rsplit('/').next().unwrap_or(name);
        segment
            .rsplit_once('.')
            .is_some_and(|(_, ext)| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
    }
}
