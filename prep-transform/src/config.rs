// SPDX-License-Identifier: MIT
//! # Transform Configuration
//!
//! Immutable parameters for [`crate::transform::transform`]. A value is passed into
//! every call; there is no process-wide default beyond [`TransformConfig::default`],
//! which callers are free to ignore.
//!
//! | Parameter | Default | Constraint |
//! |-----------|---------|------------|
//! | `width` × `height` | 224 × 224 | both > 0 |
//! | `mean` | `[123.68, 116.779, 103.939]` | exactly 3 finite values |
//! | `scale` | `1/255` | finite, nonzero |

use crate::{Result, TransformError};

/// Default output side length used by ImageNet-style classifiers.
pub const DEFAULT_SIDE: u32 = 224;

/// Per-channel RGB means in 0..255 pixel units (ImageNet statistics).
pub const IMAGENET_MEAN: [f32; 3] = [123.68, 116.779, 103.939];

/// Default scale factor mapping 0..255 pixel values to 0..1.
pub const DEFAULT_SCALE: f32 = 1.0 / 255.0;

/// Target size, channel means and scale factor for one preprocessing run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformConfig {
    width: u32,
    height: u32,
    mean: [f32; 3],
    scale: f32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIDE,
            height: DEFAULT_SIDE,
            mean: IMAGENET_MEAN,
            scale: DEFAULT_SCALE,
        }
    }
}

impl TransformConfig {
    /// Build a validated configuration.
    pub fn new(width: u32, height: u32, mean: [f32; 3], scale: f32) -> Result<Self> {
        let config = Self {
            width,
            height,
            mean,
            scale,
        };
        config.validate()?;
        Ok(config)
    }

    /// Like [`TransformConfig::new`], for means that arrive as an untyped list
    /// (CLI input, config files).
    pub fn from_mean_slice(width: u32, height: u32, mean: &[f32], scale: f32) -> Result<Self> {
        let mean: [f32; 3] = mean.try_into().map_err(|_| TransformError::InvalidConfig {
            field: "mean",
            reason: format!("expected 3 channel means, got {}", mean.len()),
        })?;
        Self::new(width, height, mean, scale)
    }

    /// Same parameters with a different output size.
    pub fn with_size(self, width: u32, height: u32) -> Result<Self> {
        Self::new(width, height, self.mean, self.scale)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mean(&self) -> [f32; 3] {
        self.mean
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TransformError::InvalidConfig {
                field: "size",
                reason: format!("output size {}x{} must be nonzero", self.width, self.height),
            });
        }
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err(TransformError::InvalidConfig {
                field: "scale",
                reason: format!("scale factor {} must be finite and nonzero", self.scale),
            });
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(TransformError::InvalidConfig {
                field: "mean",
                reason: format!("channel means {:?} must be finite", self.mean),
            });
        }
        Ok(())
    }
}
