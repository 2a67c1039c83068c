//! Decoding of fetched bytes and encoding of processed images.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::RgbImage;
use prep_transform::buffer::ImageBuffer;
use prep_transform::key::CleanKey;

use crate::error::{PrepError, PrepResult};
use crate::storage::OutputEncoding;

/// Image container chosen for an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Png,
    Jpeg,
}

impl ArtifactFormat {
    /// Resolve the format and final destination key under an encoding policy.
    ///
    /// Keys keep a `.jpg`/`.jpeg` extension for JPEG and `.png` for PNG; any other
    /// extension is replaced (`.jpg` for JPEG, `.png` otherwise).
    pub fn resolve(key: &CleanKey, encoding: OutputEncoding) -> (Self, CleanKey) {
        let ext = key.extension();
        let is_jpeg_ext = matches!(ext.as_deref(), Some("jpg" | "jpeg"));
        match encoding {
            OutputEncoding::Jpeg if is_jpeg_ext => (Self::Jpeg, key.clone()),
            OutputEncoding::Jpeg => (Self::Jpeg, key.with_extension("jpg")),
            OutputEncoding::MatchExtension if is_jpeg_ext => (Self::Jpeg, key.clone()),
            OutputEncoding::MatchExtension if ext.as_deref() == Some("png") => {
                (Self::Png, key.clone())
            }
            OutputEncoding::MatchExtension => (Self::Png, key.with_extension("png")),
        }
    }
}

/// Decode fetched bytes, sniffing the container from its content.
pub fn decode(key: &str, bytes: &[u8]) -> PrepResult<ImageBuffer> {
    let img = image::load_from_memory(bytes).map_err(|e| PrepError::decode(key, e))?;
    ImageBuffer::from_dynamic_image(&img).map_err(|e| PrepError::shape(key, e))
}

/// A transformed image quantized to 8-bit RGB, paired with its destination key.
#[derive(Debug, Clone)]
pub struct ProcessedArtifact {
    key: CleanKey,
    format: ArtifactFormat,
    image: RgbImage,
}

impl ProcessedArtifact {
    pub fn new(key: &CleanKey, buffer: &ImageBuffer, encoding: OutputEncoding) -> PrepResult<Self> {
        let image = buffer
            .to_rgb8()
            .map_err(|e| PrepError::shape(key.as_str(), e))?;
        let (format, key) = ArtifactFormat::resolve(key, encoding);
        Ok(Self { key, format, image })
    }

    pub fn key(&self) -> &CleanKey {
        &self.key
    }

    pub fn format(&self) -> ArtifactFormat {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Encode into an in-memory file.
    pub fn encode(&self, jpeg_quality: u8) -> PrepResult<Vec<u8>> {
        let mut out = Vec::new();
        let written = match self.format {
            ArtifactFormat::Jpeg => self
                .image
                .write_with_encoder(JpegEncoder::new_with_quality(&mut out, jpeg_quality)),
            ArtifactFormat::Png => self.image.write_with_encoder(PngEncoder::new(&mut out)),
        };
        written.map_err(|e| PrepError::encode(self.key.as_str(), e))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_transform::key::normalize;

    fn solid(h: usize, w: usize, v: f32) -> ImageBuffer {
        ImageBuffer::from_shape_vec(&[h, w, 3], vec![v; h * w * 3]).unwrap()
    }

    #[test]
    fn test_resolve_local_keeps_extension() {
        let (fmt, key) = ArtifactFormat::resolve(&normalize("a.png"), OutputEncoding::MatchExtension);
        assert_eq!((fmt, key.as_str()), (ArtifactFormat::Png, "a.png"));

        let (fmt, key) = ArtifactFormat::resolve(&normalize("a.JPEG"), OutputEncoding::MatchExtension);
        assert_eq!((fmt, key.as_str()), (ArtifactFormat::Jpeg, "a.JPEG"));
    }

    #[test]
    fn test_resolve_remote_forces_jpeg() {
        let (fmt, key) = ArtifactFormat::resolve(&normalize("a.png.png"), OutputEncoding::Jpeg);
        assert_eq!((fmt, key.as_str()), (ArtifactFormat::Jpeg, "a.jpg"));

        let (fmt, key) = ArtifactFormat::resolve(&normalize("b.jpg"), OutputEncoding::Jpeg);
        assert_eq!((fmt, key.as_str()), (ArtifactFormat::Jpeg, "b.jpg"));
    }

    #[test]
    fn test_resolve_dotfile_keeps_single_extension() {
        let (fmt, key) = ArtifactFormat::resolve(&normalize(".png"), OutputEncoding::MatchExtension);
        assert_eq!((fmt, key.as_str()), (ArtifactFormat::Png, ".png"));

        let (fmt, key) = ArtifactFormat::resolve(&normalize(".png"), OutputEncoding::Jpeg);
        assert_eq!((fmt, key.as_str()), (ArtifactFormat::Jpeg, ".jpg"));

        let (fmt, key) = ArtifactFormat::resolve(&normalize(".jpg"), OutputEncoding::Jpeg);
        assert_eq!((fmt, key.as_str()), (ArtifactFormat::Jpeg, ".jpg"));
    }

    #[test]
    fn test_encode_decodes_back_to_rgb() {
        for (name, encoding) in [("x.png", OutputEncoding::MatchExtension), ("x.jpg", OutputEncoding::Jpeg)] {
            let artifact = ProcessedArtifact::new(&normalize(name), &solid(6, 8, 128.0), encoding).unwrap();
            let bytes = artifact.encode(90).unwrap();
            let back = decode(name, &bytes).unwrap();
            assert_eq!(back.shape(), &[6, 8, 3]);
        }
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let err = decode("bad.jpg", b"definitely not an image").unwrap_err();
        assert!(matches!(err, PrepError::Decode { .. }));
    }
}
