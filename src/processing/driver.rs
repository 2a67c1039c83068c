//! # Pipeline Driver
//!
//! Composes walker → fetch → decode → key normalization → transform → encode → put,
//! one item at a time. Items share no state: a failure in one is logged, counted and
//! skipped, and the walk moves on. Only setup failures (destination cannot be
//! prepared, source cannot be listed) end a run early.

use prep_transform::config::TransformConfig;
use prep_transform::key::SourceKey;
use prep_transform::transform::transform;
use tracing::{debug, info, warn};

use super::artifact::{decode, ProcessedArtifact};
use crate::config::{RunConfig, DEFAULT_JPEG_QUALITY};
use crate::error::{classify, PrepError, PrepResult};
use crate::storage::Storage;
use crate::walker::list_images;

/// An item the run passed over, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedItem {
    pub key: SourceKey,
    pub category: &'static str,
    pub reason: String,
}

/// Counts for one completed run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Objects returned by the source listing.
    pub listed: usize,
    /// Listed objects without an image extension.
    pub filtered: usize,
    /// Images written to the destination.
    pub processed: usize,
    /// Images that failed at some step.
    pub skipped: Vec<SkippedItem>,
}

impl RunSummary {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Where one item ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenItem {
    pub destination_key: String,
    pub width: u32,
    pub height: u32,
}

/// Sequential preprocessing pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    transform: TransformConfig,
    jpeg_quality: u8,
}

impl Pipeline {
    pub fn new(transform: TransformConfig) -> Self {
        Self {
            transform,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.transform).with_jpeg_quality(config.jpeg_quality)
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Process every image of `source` into `sink`.
    ///
    /// Returns `Err` only for setup failures; per-item failures are reported in
    /// the summary.
    pub fn run(&self, source: &dyn Storage, sink: &dyn Storage) -> PrepResult<RunSummary> {
        sink.prepare()?;
        let mut walk = list_images(source)?;
        if walk.listed() == 0 {
            info!(source = %source.location(), "no objects found");
        }

        let mut summary = RunSummary::default();
        for key in walk.by_ref() {
            match self.process_item(source, sink, &key) {
                Ok(written) => {
                    summary.processed += 1;
                    info!(
                        source_key = %key,
                        destination = %sink.location(),
                        destination_key = %written.destination_key,
                        width = written.width,
                        height = written.height,
                        "processed image saved"
                    );
                }
                Err(e) if classify::is_item_level(&e) => {
                    warn!(source_key = %key, category = e.category(), error = %e, "skipping image");
                    summary.skipped.push(SkippedItem {
                        key,
                        category: e.category(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        summary.listed = walk.listed();
        summary.filtered = walk.filtered();

        info!(
            source = %source.location(),
            destination = %sink.location(),
            listed = summary.listed,
            processed = summary.processed,
            skipped = summary.skipped_count(),
            "run complete"
        );
        Ok(summary)
    }

    /// Run one item through every step.
    pub fn process_item(
        &self,
        source: &dyn Storage,
        sink: &dyn Storage,
        key: &SourceKey,
    ) -> PrepResult<WrittenItem> {
        let bytes = source.fetch(key.as_str())?;
        debug!(source_key = %key, bytes = bytes.len(), "fetched");

        let buffer = decode(key.as_str(), &bytes)?;
        let clean = key.normalize();
        let processed =
            transform(&buffer, &self.transform).map_err(|e| PrepError::shape(key.as_str(), e))?;
        drop(buffer);

        let artifact = ProcessedArtifact::new(&clean, &processed, sink.output_encoding())?;
        let encoded = artifact.encode(self.jpeg_quality)?;
        sink.put(artifact.key().as_str(), &encoded)?;

        let (width, height) = artifact.dimensions();
        Ok(WrittenItem {
            destination_key: artifact.key().to_string(),
            width,
            height,
        })
    }
}

/// Open both ends of a run configuration and process it.
pub fn run(
    config: &RunConfig,
    credentials: Option<&crate::config::Credentials>,
) -> PrepResult<RunSummary> {
    config.validate()?;
    let source = crate::storage::open(&config.source, credentials)?;
    let sink = crate::storage::open(&config.destination, credentials)?;
    Pipeline::from_config(config).run(source.as_ref(), sink.as_ref())
}
