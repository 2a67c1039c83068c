//! # AI Image Prep Library
//!
//! Preprocessing for the real vs AI-generated image classifier: images are listed
//! from a directory or bucket, resized and mean-normalized into a uniform 8-bit RGB
//! format, and written to a directory or bucket.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `config`: Run configuration, credentials and dataset buckets
//! - `error`: Error taxonomy and skip-vs-abort classification
//! - `storage`: `Storage` trait with local and object-storage backends
//! - `walker`: Image enumeration over a storage listing
//! - `processing`: Decode/encode and the sequential pipeline driver
//!
//! The pure transform and key normalization live in the `prep_transform` crate and
//! are re-exported here.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ai_image_prep::{Location, Pipeline, RunConfig, TransformConfig};
//! use ai_image_prep::storage::LocalStorage;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = LocalStorage::new("scraped_images/real");
//! let sink = LocalStorage::new("preprocessed_images/real");
//!
//! let summary = Pipeline::new(TransformConfig::default()).run(&source, &sink)?;
//! println!("{} processed, {} skipped", summary.processed, summary.skipped_count());
//!
//! // Or from a run configuration, opening the backends by location
//! let config = RunConfig::new(
//!     Location::parse("scraped_images/ai")?,
//!     Location::parse("preprocessed_images/ai")?,
//!     TransformConfig::default(),
//! );
//! ai_image_prep::processing::run(&config, None)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod processing;
pub mod storage;
pub mod walker;

/// Re-export error types for convenience
pub use error::{classify, PrepError, PrepResult};

pub use config::{Credentials, Dataset, DatasetBuckets, RunConfig};
pub use processing::{Pipeline, RunSummary};
pub use storage::{Location, Storage};

/// Re-export the pure preprocessing core
pub use prep_transform::buffer::ImageBuffer;
pub use prep_transform::config::TransformConfig;
pub use prep_transform::key::{normalize, CleanKey, SourceKey};
pub use prep_transform::transform::transform;
