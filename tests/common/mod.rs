//! Common test utilities and helpers for the pipeline tests
//!
//! Provides an in-memory storage backend and small image fixtures.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;

use ai_image_prep::error::{PrepError, PrepResult};
use ai_image_prep::storage::{ObjectEntry, OutputEncoding, Storage};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};

/// Mock storage keeping objects in memory, in key order.
pub struct MemoryStorage {
    name: String,
    objects: RefCell<BTreeMap<String, Vec<u8>>>,
    failing_fetches: BTreeSet<String>,
    failing_puts: BTreeSet<String>,
    encoding: OutputEncoding,
}

impl MemoryStorage {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            objects: RefCell::new(BTreeMap::new()),
            failing_fetches: BTreeSet::new(),
            failing_puts: BTreeSet::new(),
            encoding: OutputEncoding::MatchExtension,
        }
    }

    /// Behave like a bucket: every output is JPEG encoded.
    pub fn remote(name: &str) -> Self {
        Self {
            encoding: OutputEncoding::Jpeg,
            ..Self::new(name)
        }
    }

    pub fn with_object(self, key: &str, bytes: Vec<u8>) -> Self {
        self.objects.borrow_mut().insert(key.to_string(), bytes);
        self
    }

    /// Keep `key` listed but fail every fetch of it.
    pub fn failing_fetch(mut self, key: &str) -> Self {
        self.failing_fetches.insert(key.to_string());
        self
    }

    pub fn failing_put(mut self, key: &str) -> Self {
        self.failing_puts.insert(key.to_string());
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.borrow().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.borrow().get(key).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.objects.borrow().clone()
    }
}

impl Storage for MemoryStorage {
    fn location(&self) -> String {
        format!("memory://{}", self.name)
    }

    fn list(&self) -> PrepResult<Vec<ObjectEntry>> {
        Ok(self
            .objects
            .borrow()
            .iter()
            .map(|(k, v)| ObjectEntry::new(k.clone(), v.len() as u64))
            .collect())
    }

    fn fetch(&self, key: &str) -> PrepResult<Vec<u8>> {
        if self.failing_fetches.contains(key) {
            return Err(PrepError::storage_fetch(self.location(), key, "connection reset"));
        }
        self.get(key)
            .ok_or_else(|| PrepError::storage_fetch(self.location(), key, "no such object"))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> PrepResult<()> {
        if self.failing_puts.contains(key) {
            return Err(PrepError::storage_write(self.location(), key, "simulated outage"));
        }
        self.objects
            .borrow_mut()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn output_encoding(&self) -> OutputEncoding {
        self.encoding
    }
}

/// Test image utilities
pub mod fixtures {
    use super::*;

    /// RGB gradient so resizing has something to interpolate.
    pub fn gradient_rgb(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 255 / w.max(1)) as u8, (y * 255 / h.max(1)) as u8, 200])
        })
    }

    pub fn solid_gray(w: u32, h: u32, v: u8) -> GrayImage {
        GrayImage::from_pixel(w, h, Luma([v]))
    }

    pub fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format)
            .expect("fixture encodes");
        buf
    }

    pub fn png_rgb(w: u32, h: u32) -> Vec<u8> {
        encode(DynamicImage::ImageRgb8(gradient_rgb(w, h)), ImageFormat::Png)
    }

    pub fn jpeg_rgb(w: u32, h: u32) -> Vec<u8> {
        encode(DynamicImage::ImageRgb8(gradient_rgb(w, h)), ImageFormat::Jpeg)
    }

    pub fn png_gray(w: u32, h: u32, v: u8) -> Vec<u8> {
        encode(DynamicImage::ImageLuma8(solid_gray(w, h, v)), ImageFormat::Png)
    }

    pub fn jpeg_gray(w: u32, h: u32, v: u8) -> Vec<u8> {
        encode(DynamicImage::ImageLuma8(solid_gray(w, h, v)), ImageFormat::Jpeg)
    }

    pub fn not_an_image() -> Vec<u8> {
        b"<html>403 Forbidden</html>".to_vec()
    }
}
