//! # Error Handling
//!
//! Error taxonomy for the preprocessing pipeline, with classification helpers the
//! driver uses to decide between skipping one item and aborting the whole run.
//!
//! ## Error Classification
//!
//! | Category | Variants | Severity | Driver reaction |
//! |----------|----------|----------|-----------------|
//! | `decode` | `Decode` | Warning | skip item |
//! | `shape` | `Shape` | Warning | skip item |
//! | `encode` | `Encode` | Warning | skip item |
//! | `storage` | `StorageFetch`, `StorageWrite` | Warning | skip item |
//! | `storage` | `StorageList` | Fatal | abort run |
//! | `setup` | `DirectoryCreation`, `Config`, `Credentials` | Fatal | abort run |
//!
//! ## Usage
//!
//! ```rust
//! use ai_image_prep::error::{classify, PrepError};
//!
//! let error = PrepError::storage_fetch("s3://real-images", "cat.jpg", "access denied");
//! assert!(classify::is_item_level(&error));
//! assert_eq!(error.category(), "storage");
//! ```

use std::path::PathBuf;

use prep_transform::TransformError;
use thiserror::Error;

/// Boxed error used for storage backends whose native errors differ.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Affects a single item; the run continues
    Warning,
    /// Prevents the run from starting or continuing
    Fatal,
}

/// Base error type for the preprocessing pipeline
#[derive(Debug, Error)]
pub enum PrepError {
    /// Source bytes are not a decodable image
    #[error("failed to decode {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: image::ImageError,
    },

    /// Decoded buffer has unsupported dimensionality or channel count
    #[error("unsupported image shape for {key}: {source}")]
    Shape {
        key: String,
        #[source]
        source: TransformError,
    },

    /// Processed buffer could not be encoded
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: image::ImageError,
    },

    /// Object or file could not be read
    #[error("failed to fetch {key} from {location}: {source}")]
    StorageFetch {
        location: String,
        key: String,
        #[source]
        source: BoxError,
    },

    /// Object or file could not be written
    #[error("failed to write {key} to {location}: {source}")]
    StorageWrite {
        location: String,
        key: String,
        #[source]
        source: BoxError,
    },

    /// Listing the source failed
    #[error("failed to list {location}: {source}")]
    StorageList {
        location: String,
        #[source]
        source: BoxError,
    },

    /// Destination root cannot be created
    #[error("cannot create destination directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid run configuration
    #[error("invalid configuration {field}: {reason}")]
    Config { field: String, reason: String },

    /// Required credential variable is absent
    #[error("missing credentials: environment variable {var} is not set")]
    Credentials { var: String },
}

impl PrepError {
    pub fn decode(key: impl Into<String>, source: image::ImageError) -> Self {
        Self::Decode {
            key: key.into(),
            source,
        }
    }

    pub fn shape(key: impl Into<String>, source: TransformError) -> Self {
        Self::Shape {
            key: key.into(),
            source,
        }
    }

    pub fn encode(key: impl Into<String>, source: image::ImageError) -> Self {
        Self::Encode {
            key: key.into(),
            source,
        }
    }

    pub fn storage_fetch(
        location: impl Into<String>,
        key: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::StorageFetch {
            location: location.into(),
            key: key.into(),
            source: source.into(),
        }
    }

    pub fn storage_write(
        location: impl Into<String>,
        key: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::StorageWrite {
            location: location.into(),
            key: key.into(),
            source: source.into(),
        }
    }

    pub fn storage_list(location: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::StorageList {
            location: location.into(),
            source: source.into(),
        }
    }

    pub fn directory_creation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreation {
            path: path.into(),
            source,
        }
    }

    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn credentials(var: impl Into<String>) -> Self {
        Self::Credentials { var: var.into() }
    }

    /// Get error category for logging and summaries
    pub fn category(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::Shape { .. } => "shape",
            Self::Encode { .. } => "encode",
            Self::StorageFetch { .. } | Self::StorageWrite { .. } | Self::StorageList { .. } => {
                "storage"
            }
            Self::DirectoryCreation { .. } | Self::Config { .. } | Self::Credentials { .. } => {
                "setup"
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Decode { .. }
            | Self::Shape { .. }
            | Self::Encode { .. }
            | Self::StorageFetch { .. }
            | Self::StorageWrite { .. } => ErrorSeverity::Warning,
            Self::StorageList { .. }
            | Self::DirectoryCreation { .. }
            | Self::Config { .. }
            | Self::Credentials { .. } => ErrorSeverity::Fatal,
        }
    }
}

impl From<TransformError> for PrepError {
    fn from(error: TransformError) -> Self {
        match error {
            TransformError::InvalidConfig { field, reason } => Self::config(field, reason),
            other => Self::shape("<buffer>", other),
        }
    }
}

/// Error classification utilities
pub mod classify {
    use super::*;

    /// Errors confined to one pipeline item; the driver logs and skips.
    pub fn is_item_level(error: &PrepError) -> bool {
        error.severity() == ErrorSeverity::Warning
    }

    /// Errors that stop the run before or during enumeration.
    pub fn is_fatal(error: &PrepError) -> bool {
        error.severity() == ErrorSeverity::Fatal
    }
}

/// Result alias for pipeline operations
pub type PrepResult<T> = Result<T, PrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_errors_are_skippable() {
        let fetch = PrepError::storage_fetch("/data/in", "a.jpg", "permission denied");
        assert_eq!(fetch.category(), "storage");
        assert!(classify::is_item_level(&fetch));
        assert!(!classify::is_fatal(&fetch));

        let shape = PrepError::shape(
            "a.png",
            TransformError::Shape {
                shape: vec![1, 2, 3, 4],
                reason: "too many dimensions".into(),
            },
        );
        assert_eq!(shape.category(), "shape");
        assert!(classify::is_item_level(&shape));
    }

    #[test]
    fn test_setup_errors_are_fatal() {
        let dir = PrepError::directory_creation(
            "/proc/nope",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(dir.category(), "setup");
        assert!(classify::is_fatal(&dir));

        assert!(classify::is_fatal(&PrepError::credentials("aws_access_key_id")));
        assert!(classify::is_fatal(&PrepError::storage_list("s3://b", "timeout")));
    }

    #[test]
    fn test_transform_config_error_maps_to_config() {
        let err: PrepError = TransformError::InvalidConfig {
            field: "scale",
            reason: "zero".into(),
        }
        .into();
        assert!(matches!(err, PrepError::Config { .. }));
    }

    #[test]
    fn test_display_includes_key() {
        let err = PrepError::storage_write("/out", "cat.jpg", "disk full");
        let msg = err.to_string();
        assert!(msg.contains("cat.jpg"));
        assert!(msg.contains("/out"));
    }
}
