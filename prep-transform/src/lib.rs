// SPDX-License-Identifier: MIT
//! # prep-transform: Deterministic Image Preprocessing for Classifier Datasets
//!
//! This crate holds the pure, I/O-free core of the preprocessing pipeline that prepares
//! real and AI-generated images for a binary classifier. Everything here is a function of
//! its inputs: no filesystem, no network, no global state.
//!
//! ## Key Components
//!
//! - [`key`]: Object-key normalization (malformed bucket keys → safe local filenames)
//! - [`buffer`]: Floating-point raster type and conversions to/from `image` buffers
//! - [`config`]: Immutable transform parameters (target size, channel means, scale)
//! - [`transform`]: Resize → channel replication → mean subtraction → scale → 8-bit rescale
//!
//! ## Numeric Convention
//!
//! The transform always ends by multiplying by 255, clamping to `[0, 255]` and rounding,
//! so with the default `scale = 1/255` a pixel `p` is stored as `clamp(p - mean, 0, 255)`.
//!
//! ## Usage Example
//!
//! ```rust
//! use prep_transform::{buffer::ImageBuffer, config::TransformConfig, key, transform::transform};
//!
//! let clean = key::normalize("scraped/cat.jpg.jpg");
//! assert_eq!(clean.as_str(), "cat.jpg");
//!
//! let gray = ImageBuffer::from_shape_vec(&[10, 10], vec![100.0; 100])?;
//! let config = TransformConfig::new(10, 10, [0.0, 0.0, 0.0], 1.0 / 255.0)?;
//! let out = transform(&gray, &config)?;
//! assert_eq!(out.channels(), 3);
//! # Ok::<(), prep_transform::TransformError>(())
//! ```

pub mod buffer;
pub mod config;
pub mod key;
pub mod transform;

use thiserror::Error;

/// Errors raised by the pure preprocessing core.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Buffer has unsupported dimensionality or channel count.
    #[error("unsupported buffer shape {shape:?}: {reason}")]
    Shape { shape: Vec<usize>, reason: String },

    /// Transform parameters violate an invariant.
    #[error("invalid transform parameter {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Resizer rejected the source or destination image.
    #[error("resize failed: {0}")]
    Resize(String),
}

impl TransformError {
    pub(crate) fn shape(shape: &[usize], reason: impl Into<String>) -> Self {
        Self::Shape {
            shape: shape.to_vec(),
            reason: reason.into(),
        }
    }
}

impl From<fast_image_resize::ResizeError> for TransformError {
    fn from(e: fast_image_resize::ResizeError) -> Self {
        Self::Resize(e.to_string())
    }
}

impl From<fast_image_resize::ImageBufferError> for TransformError {
    fn from(e: fast_image_resize::ImageBufferError) -> Self {
        Self::Resize(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
