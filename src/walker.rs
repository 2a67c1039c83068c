//! # Directory/Bucket Walker
//!
//! Enumerates the image keys of a source. Each call to [`list_images`] lists the
//! source afresh, so a walk can be restarted by simply calling it again; the
//! returned [`Walk`] is the only cursor and lives for one run.

use prep_transform::key::{is_supported_image, SourceKey};
use tracing::debug;

use crate::error::PrepResult;
use crate::storage::{ObjectEntry, Storage};

/// Lazy, finite sequence of image keys from one listing.
#[derive(Debug)]
pub struct Walk {
    entries: std::vec::IntoIter<ObjectEntry>,
    listed: usize,
    filtered: usize,
}

impl Walk {
    fn new(entries: Vec<ObjectEntry>) -> Self {
        Self {
            listed: entries.len(),
            entries: entries.into_iter(),
            filtered: 0,
        }
    }

    /// Number of objects the listing returned, images or not.
    pub fn listed(&self) -> usize {
        self.listed
    }

    /// Number of non-image objects passed over so far.
    pub fn filtered(&self) -> usize {
        self.filtered
    }
}

impl Iterator for Walk {
    type Item = SourceKey;

    fn next(&mut self) -> Option<SourceKey> {
        for entry in self.entries.by_ref() {
            if is_supported_image(entry.key.as_str()) {
                return Some(entry.key);
            }
            debug!(key = %entry.key, "skipping non-image object");
            self.filtered += 1;
        }
        None
    }
}

/// List `source` and yield the keys with a `.png`, `.jpg` or `.jpeg` extension
/// (case-insensitive), in listing order.
pub fn list_images(source: &dyn Storage) -> PrepResult<Walk> {
    Ok(Walk::new(source.list()?))
}
