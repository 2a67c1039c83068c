//! # Processing Module
//!
//! Per-item processing: decoding, artifact encoding and the sequential driver.

pub mod artifact;
pub mod driver;

// Re-export commonly used types for convenience
pub use artifact::{decode, ArtifactFormat, ProcessedArtifact};
pub use driver::{run, Pipeline, RunSummary, SkippedItem, WrittenItem};
