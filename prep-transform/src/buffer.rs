// SPDX-License-Identifier: MIT
//! # Floating-Point Image Buffers
//!
//! [`ImageBuffer`] is a decoded raster stored as an n-dimensional `f32` array in
//! row-major `(height, width)` or `(height, width, channels)` layout. The array is
//! deliberately not restricted to those shapes at construction time: decoders and
//! callers can hand over anything, and [`ImageBuffer::layout`] is the single gate that
//! rejects unsupported dimensionality or channel counts.

use image::{ColorType, DynamicImage, RgbImage};
use ndarray::{ArrayD, IxDyn};

use crate::{Result, TransformError};

/// Decoded raster with floating-point samples.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
    pixels: ArrayD<f32>,
}

impl ImageBuffer {
    /// Wrap row-major samples with the given shape.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f32>) -> Result<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(|pixels| Self { pixels })
            .map_err(|e| TransformError::shape(shape, e.to_string()))
    }

    pub fn from_array(pixels: ArrayD<f32>) -> Self {
        Self { pixels }
    }

    /// Convert a decoded image. Grayscale (with or without alpha) becomes a 2-D
    /// `(h, w)` buffer; every other color type is flattened to 8-bit RGB `(h, w, 3)`.
    pub fn from_dynamic_image(img: &DynamicImage) -> Result<Self> {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let (shape, raw) = match img.color() {
            ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => {
                (vec![h, w], img.to_luma8().into_raw())
            }
            _ => (vec![h, w, 3], img.to_rgb8().into_raw()),
        };
        let data = raw.into_iter().map(f32::from).collect();
        Self::from_shape_vec(&shape, data)
    }

    pub fn shape(&self) -> &[usize] {
        self.pixels.shape()
    }

    pub fn ndim(&self) -> usize {
        self.pixels.ndim()
    }

    pub fn pixels(&self) -> &ArrayD<f32> {
        &self.pixels
    }

    pub fn into_pixels(self) -> ArrayD<f32> {
        self.pixels
    }

    /// Height in rows, 0 for a 0-dimensional buffer.
    pub fn height(&self) -> usize {
        self.shape().first().copied().unwrap_or(0)
    }

    /// Width in columns, 0 when the buffer has fewer than 2 dimensions.
    pub fn width(&self) -> usize {
        self.shape().get(1).copied().unwrap_or(0)
    }

    /// Channel count as implied by the shape (2-D buffers are single-channel).
    pub fn channels(&self) -> usize {
        match self.shape() {
            [_, _] => 1,
            [_, _, c] => *c,
            _ => 0,
        }
    }

    /// Validate the buffer and return `(height, width, channels)`.
    ///
    /// Fails with [`TransformError::Shape`] unless the buffer has 2 or 3 dimensions,
    /// 1 or 3 channels and a nonzero area.
    pub fn layout(&self) -> Result<(usize, usize, usize)> {
        let shape = self.shape();
        let (h, w, c) = match *shape {
            [h, w] => (h, w, 1),
            [h, w, c] => (h, w, c),
            _ => {
                return Err(TransformError::shape(
                    shape,
                    format!("expected 2 or 3 dimensions, got {}", shape.len()),
                ))
            }
        };
        if c != 1 && c != 3 {
            return Err(TransformError::shape(
                shape,
                format!("expected 1 or 3 channels, got {c}"),
            ));
        }
        if h == 0 || w == 0 {
            return Err(TransformError::shape(shape, "buffer has zero area"));
        }
        Ok((h, w, c))
    }

    /// Quantize into an 8-bit RGB image, clamping to `[0, 255]` and rounding.
    /// Single-channel buffers are replicated into all three channels.
    pub fn to_rgb8(&self) -> Result<RgbImage> {
        let (h, w, c) = self.layout()?;
        let mut raw = Vec::with_capacity(h * w * 3);
        for v in self.pixels.iter().copied().map(quantize) {
            if c == 1 {
                raw.extend_from_slice(&[v, v, v]);
            } else {
                raw.push(v);
            }
        }
        RgbImage::from_raw(w as u32, h as u32, raw)
            .ok_or_else(|| TransformError::shape(self.shape(), "sample count does not match shape"))
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(v: f32) -> u8 {
    v.clamp(0.0, 255.0).round() as u8
}
