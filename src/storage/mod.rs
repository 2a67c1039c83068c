//! # Storage Module
//!
//! A single [`Storage`] capability set (`list`, `fetch`, `put`) behind which the local
//! filesystem and object storage are interchangeable. Every backend is bound to one
//! scope at construction (a directory, or a bucket plus optional key prefix) and
//! addresses objects by keys relative to that scope.
//!
//! ## Backends
//!
//! - [`LocalStorage`]: directory listing, file reads, writes with parent creation
//! - `S3Storage` (feature `s3`): paginated bucket listing, object download, upload

use std::fmt;
use std::path::{Path, PathBuf};

use prep_transform::key::SourceKey;

use crate::config::Credentials;
use crate::error::{PrepError, PrepResult};

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

const BUCKET_SCHEME: &str = "s3://";

/// One entry of a storage listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: SourceKey,
    pub size: u64,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: SourceKey::new(key),
            size,
        }
    }
}

/// How processed images are encoded when written to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    /// Encode in the format named by the destination key's extension.
    MatchExtension,
    /// Always encode JPEG, rewriting the key's extension when needed.
    Jpeg,
}

/// Storage collaborator used by the walker (read side) and the sink (write side).
pub trait Storage {
    /// Human-readable scope, used in logs and errors.
    fn location(&self) -> String;

    /// Enumerate every object in scope, in a stable order.
    fn list(&self) -> PrepResult<Vec<ObjectEntry>>;

    /// Read the full contents of one object.
    fn fetch(&self, key: &str) -> PrepResult<Vec<u8>>;

    /// Create or overwrite one object.
    fn put(&self, key: &str, bytes: &[u8]) -> PrepResult<()>;

    /// Make the scope ready to receive writes. Called once before a run.
    fn prepare(&self) -> PrepResult<()> {
        Ok(())
    }

    fn output_encoding(&self) -> OutputEncoding {
        OutputEncoding::MatchExtension
    }
}

/// Where a run reads from or writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Bucket { bucket: String, prefix: Option<String> },
}

impl Location {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local(path.into())
    }

    pub fn bucket(bucket: impl Into<String>) -> Self {
        Self::Bucket {
            bucket: bucket.into(),
            prefix: None,
        }
    }

    /// Parse `s3://bucket[/prefix]` as a bucket, anything else as a local path.
    pub fn parse(raw: &str) -> PrepResult<Self> {
        let Some(rest) = raw.strip_prefix(BUCKET_SCHEME) else {
            if raw.trim().is_empty() {
                return Err(PrepError::config("location", "empty path"));
            }
            return Ok(Self::local(raw));
        };

        let (bucket, prefix) = match rest.split_once('/') {
            Some((bucket, prefix)) => (bucket.trim(), prefix.trim_matches('/')),
            None => (rest.trim(), ""),
        };
        if bucket.is_empty() {
            return Err(PrepError::config(
                "location",
                format!("invalid bucket url (missing bucket): {raw}"),
            ));
        }
        Ok(Self::Bucket {
            bucket: bucket.to_string(),
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
        })
    }

    pub fn is_bucket(&self) -> bool {
        matches!(self, Self::Bucket { .. })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Bucket {
                bucket,
                prefix: Some(prefix),
            } => write!(f, "{BUCKET_SCHEME}{bucket}/{prefix}"),
            Self::Bucket { bucket, .. } => write!(f, "{BUCKET_SCHEME}{bucket}"),
        }
    }
}

/// Open the backend for a location.
///
/// Bucket locations need credentials; they are loaded once by the caller and
/// shared across every backend it opens.
pub fn open(location: &Location, credentials: Option<&Credentials>) -> PrepResult<Box<dyn Storage>> {
    match location {
        Location::Local(path) => Ok(Box::new(LocalStorage::new(path))),
        Location::Bucket { bucket, prefix } => open_bucket(bucket, prefix.as_deref(), credentials),
    }
}

#[cfg(feature = "s3")]
fn open_bucket(
    bucket: &str,
    prefix: Option<&str>,
    credentials: Option<&Credentials>,
) -> PrepResult<Box<dyn Storage>> {
    let credentials =
        credentials.ok_or_else(|| PrepError::credentials(crate::config::ENV_ACCESS_KEY_ID))?;
    Ok(Box::new(S3Storage::connect(bucket, prefix, credentials)?))
}

#[cfg(not(feature = "s3"))]
fn open_bucket(
    bucket: &str,
    _prefix: Option<&str>,
    _credentials: Option<&Credentials>,
) -> PrepResult<Box<dyn Storage>> {
    Err(PrepError::config(
        "location",
        format!("{BUCKET_SCHEME}{bucket} requires the `s3` feature"),
    ))
}

/// Join a relative key onto a local root, refusing keys that escape it.
pub(crate) fn resolve_local(root: &Path, key: &str) -> Option<PathBuf> {
    let relative = Path::new(key);
    let escapes = relative.components().any(|c| {
        !matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir)
    });
    (!key.is_empty() && !escapes).then(|| root.join(relative))
}
