// SPDX-License-Identifier: MIT
//! # Image Transform
//!
//! Turns a decoded [`ImageBuffer`] into the fixed-size, mean-centred raster the
//! classifier is trained on. Steps run in a fixed order:
//!
//! 1. **Resize** to `config.width × config.height` with bilinear convolution
//!    (fast_image_resize, `f32` samples). Buffers already at the target size are
//!    passed through untouched.
//! 2. **Replicate** single-channel buffers into three identical channels.
//! 3. **Subtract** `config.mean[c]` from every sample of channel `c`.
//! 4. **Multiply** every sample by `config.scale`.
//! 5. **Rescale** to 8-bit range: `round(clamp(v * 255, 0, 255))`.
//!
//! The output is always `(height, width, 3)` with integral values in `[0, 255]`.

use fast_image_resize as fir;
use fir::images::Image;
use fir::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use ndarray::{Array3, Axis};

use crate::buffer::ImageBuffer;
use crate::config::TransformConfig;
use crate::{Result, TransformError};

/// Resampling filter used for every resize; fixed so outputs are reproducible.
pub const RESIZE_FILTER: FilterType = FilterType::Bilinear;

/// Apply the preprocessing transform. Pure: no I/O, same input → same output.
pub fn transform(buffer: &ImageBuffer, config: &TransformConfig) -> Result<ImageBuffer> {
    let (h, w, c) = buffer.layout()?;
    let (out_w, out_h) = (config.width() as usize, config.height() as usize);

    let resized = resize(buffer, (h, w, c), (out_h, out_w))?;
    let mut rgb = replicate_channels(resized, c, (out_h, out_w))?;

    subtract_mean(&mut rgb, config.mean());
    rgb *= config.scale();
    rescale_to_8bit(&mut rgb);

    Ok(ImageBuffer::from_array(rgb.into_dyn()))
}

/// Step 1. Returns row-major samples of `out_h × out_w × c`.
fn resize(
    buffer: &ImageBuffer,
    (h, w, c): (usize, usize, usize),
    (out_h, out_w): (usize, usize),
) -> Result<Vec<f32>> {
    let samples = buffer.pixels().iter().copied();
    if (h, w) == (out_h, out_w) {
        return Ok(samples.collect());
    }

    let pixel_type = if c == 1 {
        PixelType::F32
    } else {
        PixelType::F32x3
    };
    let src_bytes: Vec<u8> = samples.flat_map(f32::to_ne_bytes).collect();
    let src = Image::from_vec_u8(w as u32, h as u32, src_bytes, pixel_type)?;
    let mut dst = Image::new(out_w as u32, out_h as u32, pixel_type);

    let opts = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(RESIZE_FILTER));
    Resizer::new().resize(&src, &mut dst, &opts)?;

    Ok(dst
        .buffer()
        .chunks_exact(4)
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Step 2. Grayscale samples are copied into R, G and B.
fn replicate_channels(
    samples: Vec<f32>,
    channels: usize,
    (h, w): (usize, usize),
) -> Result<Array3<f32>> {
    let rgb = if channels == 1 {
        samples.into_iter().flat_map(|v| [v, v, v]).collect()
    } else {
        samples
    };
    Array3::from_shape_vec((h, w, 3), rgb)
        .map_err(|e| TransformError::shape(&[h, w, channels], e.to_string()))
}

/// Step 3. Raw float subtraction, no clamping.
fn subtract_mean(rgb: &mut Array3<f32>, mean: [f32; 3]) {
    for (mut plane, m) in rgb.axis_iter_mut(Axis(2)).zip(mean) {
        plane -= m;
    }
}

/// Step 5.
fn rescale_to_8bit(rgb: &mut Array3<f32>) {
    rgb.mapv_inplace(|v| (v * 255.0).clamp(0.0, 255.0).round());
}
