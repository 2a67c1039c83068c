// SPDX-License-Identifier: MIT
//! # Object Key Normalization
//!
//! Scraped datasets land in buckets with keys that were typed by hand or produced by
//! buggy uploaders: `cat.jpg.jpg`, `batch1\\dog.png.png.png`, mixed separators. This
//! module turns such a key into a flat, single-extension filename suitable as a local
//! path component or destination key.
//!
//! ## Policy
//!
//! - Backslashes and forward slashes are both treated as separators.
//! - Only the final path component survives.
//! - `.jpg` and `.png` are collapsed independently: while a suffix occurs more than once,
//!   the last occurrence and everything after it are dropped. `foo.jpg.png` is left alone.
//!
//! The collapse only ever shortens the name, so normalizing twice is the same as once.

use std::fmt;

/// Suffixes collapsed when duplicated, in the order they are processed.
const DUPLICATED_SUFFIXES: [&str; 2] = [".jpg", ".png"];

/// Extensions accepted as image inputs (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// A key exactly as it appears in a directory or bucket listing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceKey(String);

impl SourceKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the destination name for this key.
    pub fn normalize(&self) -> CleanKey {
        normalize(&self.0)
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized, flat filename. Only constructed through [`normalize`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CleanKey(String);

impl CleanKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased extension without the dot, if the name has one.
    ///
    /// A dotfile such as `.png` has an empty stem and extension `png`.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.0.rsplit_once('.')?;
        (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
    }

    /// Replace the extension (or append one when there is none).
    pub fn with_extension(&self, ext: &str) -> CleanKey {
        let stem = match self.0.rsplit_once('.') {
            Some((stem, _)) => stem,
            None => self.0.as_str(),
        };
        CleanKey(format!("{stem}.{ext}"))
    }
}

impl fmt::Display for CleanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CleanKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize a raw object or file key into a [`CleanKey`].
///
/// Never fails; a key without a recognized extension comes back as its basename.
///
/// ```rust
/// use prep_transform::key::normalize;
///
/// assert_eq!(normalize("a.jpg.jpg.jpg").as_str(), "a.jpg");
/// assert_eq!(normalize("scraped\\b1/a.png.png").as_str(), "a.png");
/// assert_eq!(normalize("notes.txt").as_str(), "notes.txt");
/// ```
pub fn normalize(raw_key: &str) -> CleanKey {
    let unified = raw_key.replace('\\', "/");
    let base = unified
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    let mut name = base.to_string();
    for suffix in DUPLICATED_SUFFIXES {
        while name.matches(suffix).count() > 1 {
            match name.rfind(suffix) {
                Some(idx) => name.truncate(idx),
                None => break,
            }
        }
    }
    CleanKey(name)
}

/// Whether a key names a supported image file, judged by its extension.
pub fn is_supported_image(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_repeated_suffixes() {
        assert_eq!(normalize("a.jpg.jpg").as_str(), "a.jpg");
        assert_eq!(normalize("a.jpg.jpg.jpg").as_str(), "a.jpg");
        assert_eq!(normalize("a.png.png").as_str(), "a.png");
    }

    #[test]
    fn test_unrecognized_extension_unchanged() {
        assert_eq!(normalize("notes.txt").as_str(), "notes.txt");
        assert_eq!(normalize("README").as_str(), "README");
    }

    #[test]
    fn test_mixed_suffixes_not_collapsed() {
        assert_eq!(normalize("foo.jpg.png").as_str(), "foo.jpg.png");
        assert_eq!(normalize("x.jpeg.jpeg").as_str(), "x.jpeg.jpeg");
    }

    #[test]
    fn test_jpg_collapsed_before_png() {
        assert_eq!(normalize("a.jpg.jpg.png.png").as_str(), "a.jpg");
    }

    #[test]
    fn test_directories_discarded() {
        assert_eq!(normalize("scraped/batch1/a.jpg").as_str(), "a.jpg");
        assert_eq!(normalize("scraped\\batch1\\a.png.png").as_str(), "a.png");
        assert_eq!(normalize("mixed\\dir/b.jpg.jpg").as_str(), "b.jpg");
        assert_eq!(normalize("trailing/dir/").as_str(), "dir");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(normalize("").as_str(), "");
        assert_eq!(normalize("///").as_str(), "");
        assert_eq!(normalize(".jpg.jpg").as_str(), ".jpg");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "a.jpg.jpg",
            "a.jpg.jpg.jpg",
            "a.png.png",
            "notes.txt",
            "foo.jpg.png",
            "dir\\sub/c.jpg.jpg.png",
            "a.jpgx.jpg",
            "",
            "trailing/",
        ];
        for raw in samples {
            let once = normalize(raw);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "normalize not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_supported_extension_filter() {
        assert!(is_supported_image("a.png"));
        assert!(is_supported_image("A.JPG"));
        assert!(is_supported_image("photo.Jpeg"));
        assert!(!is_supported_image("notes.txt"));
        assert!(!is_supported_image("archive.png.zip"));
    }

    #[test]
    fn test_extension_helpers() {
        let key = normalize("shot.PNG");
        assert_eq!(key.extension().as_deref(), Some("png"));
        assert_eq!(key.with_extension("jpg").as_str(), "shot.jpg");
        assert_eq!(normalize("plain").extension(), None);
        assert_eq!(normalize("plain").with_extension("jpg").as_str(), "plain.jpg");
    }

    #[test]
    fn test_dotfile_extension_not_duplicated() {
        let key = normalize(".png");
        assert_eq!(key.extension().as_deref(), Some("png"));
        assert_eq!(key.with_extension("jpg").as_str(), ".jpg");
        assert_eq!(normalize(key.with_extension("png").as_str()).as_str(), ".png");
        assert_eq!(normalize(".jpg").with_extension("jpg").as_str(), ".jpg");
    }
}
