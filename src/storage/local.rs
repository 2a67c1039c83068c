//! Local filesystem backend.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{resolve_local, ObjectEntry, Storage};
use crate::error::{PrepError, PrepResult};

/// A directory treated as a flat key space. Listing is non-recursive.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        resolve_local(&self.root, key).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("key {key:?} is not a path inside the storage root"),
            )
        })
    }
}

impl Storage for LocalStorage {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn list(&self) -> PrepResult<Vec<ObjectEntry>> {
        let read_dir =
            fs::read_dir(&self.root).map_err(|e| PrepError::storage_list(self.location(), e))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| PrepError::storage_list(self.location(), e))?;
            let metadata = match fs::metadata(entry.path()) {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    debug!(path = %entry.path().display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            match entry.file_name().into_string() {
                Ok(name) => entries.push(ObjectEntry::new(name, metadata.len())),
                Err(name) => debug!(name = ?name, "skipping non UTF-8 file name"),
            }
        }
        entries.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        Ok(entries)
    }

    fn fetch(&self, key: &str) -> PrepResult<Vec<u8>> {
        self.path_for(key)
            .and_then(fs::read)
            .map_err(|e| PrepError::storage_fetch(self.location(), key, e))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> PrepResult<()> {
        let write = || -> io::Result<()> {
            let path = self.path_for(key)?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, bytes)
        };
        write().map_err(|e| PrepError::storage_write(self.location(), key, e))
    }

    fn prepare(&self) -> PrepResult<()> {
        fs::create_dir_all(&self.root)
            .map_err(|e| PrepError::directory_creation(&self.root, e))
    }
}
