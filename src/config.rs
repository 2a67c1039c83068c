//! # Configuration Module
//!
//! Configuration structures built once at startup and passed down to the pipeline.
//! Nothing below `main` reads the environment; credentials and bucket names are
//! resolved here into plain values.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `source` | `Location` | path or `s3://bucket[/prefix]` | Where raw images are listed |
//! | `destination` | `Location` | path or `s3://bucket[/prefix]` | Where processed images go |
//! | `transform` | `TransformConfig` | see `prep_transform::config` | Size, means, scale |
//! | `jpeg_quality` | `u8` | 1-100 | Quality for JPEG outputs |
//!
//! ## Environment Variables
//!
//! | Variable | Used by |
//! |----------|---------|
//! | `aws_access_key_id`, `aws_secret_access_key` | [`Credentials`] (required for buckets) |
//! | `aws_region` | [`Credentials`] (optional, SDK default chain otherwise) |
//! | `real_bucket_name`, `generated_bucket_name` | [`DatasetBuckets`] sources |
//! | `processed_real_bucket_name`, `processed_generated_bucket_name` | [`DatasetBuckets`] destinations |

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use prep_transform::config::TransformConfig;

use crate::error::{PrepError, PrepResult};
use crate::storage::Location;

pub const ENV_ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const ENV_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const ENV_REGION: &str = "aws_region";
pub const ENV_REAL_BUCKET: &str = "real_bucket_name";
pub const ENV_GENERATED_BUCKET: &str = "generated_bucket_name";
pub const ENV_PROCESSED_REAL_BUCKET: &str = "processed_real_bucket_name";
pub const ENV_PROCESSED_GENERATED_BUCKET: &str = "processed_generated_bucket_name";

/// Default JPEG quality for encoded outputs.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Configuration for one source → destination preprocessing run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory or bucket holding raw images.
    pub source: Location,

    /// Directory or bucket receiving processed images. Local directories are
    /// created before processing starts.
    pub destination: Location,

    /// Size and normalization parameters applied to every image.
    pub transform: TransformConfig,

    /// JPEG quality (1-100). PNG outputs ignore it.
    pub jpeg_quality: u8,
}

impl RunConfig {
    pub fn new(source: Location, destination: Location, transform: TransformConfig) -> Self {
        Self {
            source,
            destination,
            transform,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Validates the configuration parameters.
    ///
    /// - `jpeg_quality` must be between 1 and 100 (inclusive)
    /// - `source` and `destination` must not be the same location
    pub fn validate(&self) -> PrepResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PrepError::config(
                "jpeg_quality",
                format!("{} is outside 1-100", self.jpeg_quality),
            ));
        }
        if same_location(&self.source, &self.destination) {
            return Err(PrepError::config(
                "destination",
                format!("{} is also the source", self.destination),
            ));
        }
        Ok(())
    }

    pub fn uses_buckets(&self) -> bool {
        self.source.is_bucket() || self.destination.is_bucket()
    }
}

/// Whether two locations name the same scope. Local paths are compared after
/// resolving `..` and symlinks; a path that does not exist yet compares as written.
fn same_location(a: &Location, b: &Location) -> bool {
    match (a, b) {
        (Location::Local(a), Location::Local(b)) => resolved(a) == resolved(b),
        _ => a == b,
    }
}

fn resolved(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Object storage credentials, read once at process start.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> PrepResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve credentials through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PrepResult<Self> {
        Ok(Self {
            access_key_id: required(&lookup, ENV_ACCESS_KEY_ID, |v| PrepError::credentials(v))?,
            secret_access_key: required(&lookup, ENV_SECRET_ACCESS_KEY, |v| PrepError::credentials(v))?,
            region: optional(&lookup, ENV_REGION),
        })
    }
}

/// The two datasets of the classifier: scraped real photos and generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Real,
    Generated,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Real, Dataset::Generated];

    pub fn name(self) -> &'static str {
        match self {
            Dataset::Real => "real",
            Dataset::Generated => "generated",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bucket names for both datasets. Source buckets are required; processed
/// buckets only when outputs are not redirected to local directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetBuckets {
    pub real: String,
    pub generated: String,
    pub processed_real: Option<String>,
    pub processed_generated: Option<String>,
}

impl DatasetBuckets {
    pub fn from_env() -> PrepResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PrepResult<Self> {
        let missing = |var: &str| PrepError::config(var, "environment variable is not set");
        Ok(Self {
            real: required(&lookup, ENV_REAL_BUCKET, missing)?,
            generated: required(&lookup, ENV_GENERATED_BUCKET, missing)?,
            processed_real: optional(&lookup, ENV_PROCESSED_REAL_BUCKET),
            processed_generated: optional(&lookup, ENV_PROCESSED_GENERATED_BUCKET),
        })
    }

    pub fn source(&self, dataset: Dataset) -> Location {
        let bucket = match dataset {
            Dataset::Real => &self.real,
            Dataset::Generated => &self.generated,
        };
        Location::bucket(bucket.clone())
    }

    pub fn processed(&self, dataset: Dataset) -> PrepResult<Location> {
        let (bucket, var) = match dataset {
            Dataset::Real => (&self.processed_real, ENV_PROCESSED_REAL_BUCKET),
            Dataset::Generated => (&self.processed_generated, ENV_PROCESSED_GENERATED_BUCKET),
        };
        bucket
            .clone()
            .map(Location::bucket)
            .ok_or_else(|| PrepError::config(var, "environment variable is not set"))
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    missing: impl Fn(&str) -> PrepError,
) -> PrepResult<String> {
    optional(lookup, var).ok_or_else(|| missing(var))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_run_config_validation() {
        let mut config = RunConfig::new(
            Location::local("in"),
            Location::local("out"),
            TransformConfig::default(),
        );
        assert_eq!(config.jpeg_quality, DEFAULT_JPEG_QUALITY);
        assert!(config.validate().is_ok());
        assert!(!config.uses_buckets());

        config.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.jpeg_quality = 101;
        assert!(config.validate().is_err());
        config.jpeg_quality = 90;

        config.destination = Location::local("in");
        assert!(config.validate().is_err());

        config.destination = Location::bucket("processed");
        assert!(config.validate().is_ok());
        assert!(config.uses_buckets());
    }

    #[test]
    fn test_aliased_local_paths_are_the_same_location() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().file_name().unwrap();
        let alias = dir.path().join("..").join(name);

        let config = RunConfig::new(
            Location::local(dir.path()),
            Location::local(&alias),
            TransformConfig::default(),
        );
        assert!(matches!(config.validate(), Err(PrepError::Config { .. })));

        let config = RunConfig::new(
            Location::local(dir.path()),
            Location::local(dir.path().join("processed")),
            TransformConfig::default(),
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_credentials_from_lookup() {
        let creds = Credentials::from_lookup(lookup(&[
            (ENV_ACCESS_KEY_ID, "AKIA123"),
            (ENV_SECRET_ACCESS_KEY, "s3cr3t"),
        ]))
        .unwrap();
        assert_eq!(creds.access_key_id, "AKIA123");
        assert_eq!(creds.region, None);
        assert!(!format!("{creds:?}").contains("s3cr3t"));

        let err = Credentials::from_lookup(lookup(&[(ENV_ACCESS_KEY_ID, "AKIA123")])).unwrap_err();
        assert!(matches!(err, PrepError::Credentials { ref var } if var == ENV_SECRET_ACCESS_KEY));
    }

    #[test]
    fn test_blank_variables_count_as_missing() {
        let err = Credentials::from_lookup(lookup(&[
            (ENV_ACCESS_KEY_ID, "  "),
            (ENV_SECRET_ACCESS_KEY, "x"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PrepError::Credentials { .. }));
    }

    #[test]
    fn test_dataset_buckets() {
        let buckets = DatasetBuckets::from_lookup(lookup(&[
            (ENV_REAL_BUCKET, "scraped-real"),
            (ENV_GENERATED_BUCKET, "scraped-ai"),
            (ENV_PROCESSED_REAL_BUCKET, "processed-real"),
        ]))
        .unwrap();
        assert_eq!(buckets.source(Dataset::Real), Location::bucket("scraped-real"));
        assert_eq!(buckets.source(Dataset::Generated), Location::bucket("scraped-ai"));
        assert_eq!(
            buckets.processed(Dataset::Real).unwrap(),
            Location::bucket("processed-real")
        );
        assert!(buckets.processed(Dataset::Generated).is_err());

        assert!(DatasetBuckets::from_lookup(lookup(&[(ENV_REAL_BUCKET, "r")])).is_err());
    }
}
