use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage};

use crate::{
    config::ImagingConfig,
    error::{MemeError, Result},
    models::ImagePayload,
};

pub const OUTPUT_MIME: &str = "image/jpeg";

/// Bounds an uploaded image to a transmittable size.
#[derive(Debug, Clone, Copy)]
pub struct ImageNormalizer {
    max_dimension: u32,
    jpeg_quality: u8,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::from_config(&ImagingConfig::default())
    }
}

impl ImageNormalizer {
    pub fn new(max_dimension: u32, jpeg_quality: u8) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &ImagingConfig) -> Self {
        Self::new(config.max_dimension, config.jpeg_quality)
    }

    /// Decodes `raw`, shrinks it so neither side exceeds the cap, and
    /// re-encodes it as JPEG.
    pub fn normalize(&self, raw: &[u8]) -> Result<ImagePayload> {
        if raw.is_empty() {
            return Err(MemeError::UnsupportedMedia("empty file".into()));
        }
        let decoded = image::load_from_memory(raw)
            .map_err(|e| MemeError::UnsupportedMedia(e.to_string()))?;

        let bounded = self.bound(decoded);
        let rgb = DynamicImage::ImageRgb8(bounded.to_rgb8());

        let mut encoded = Vec::new();
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut encoded), self.jpeg_quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| MemeError::InternalError(format!("JPEG encoding failed: {}", e)))?;

        log::debug!(
            "Normalized image to {}x{} ({} bytes)",
            rgb.width(),
            rgb.height(),
            encoded.len()
        );
        Ok(ImagePayload::new(encoded, OUTPUT_MIME, rgb.width(), rgb.height()))
    }

    fn bound(&self, image: DynamicImage) -> DynamicImage {
        if image.width().max(image.height()) <= self.max_dimension {
            return image;
        }
        // `resize` keeps the aspect ratio and fits inside the box.
        image.resize(self.max_dimension, self.max_dimension, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn large_image_is_scaled_preserving_aspect() {
        let payload = ImageNormalizer::default().normalize(&png(1600, 1000)).unwrap();
        assert_eq!(payload.mime_type(), "image/jpeg");
        assert_eq!(payload.width(), 800);
        assert_eq!(payload.height(), 500);

        let decoded = image::load_from_memory(payload.bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 500));
    }

    #[test]
    fn tall_image_caps_height() {
        let payload = ImageNormalizer::default().normalize(&png(300, 1200)).unwrap();
        assert_eq!((payload.width(), payload.height()), (200, 800));
    }

    #[test]
    fn small_image_is_not_upscaled() {
        let payload = ImageNormalizer::default().normalize(&png(120, 90)).unwrap();
        assert_eq!((payload.width(), payload.height()), (120, 90));
    }

    #[test]
    fn non_image_is_unsupported_media() {
        let err = ImageNormalizer::default()
            .normalize(b"%PDF-1.4 definitely not a bitmap")
            .unwrap_err();
        assert!(matches!(err, MemeError::UnsupportedMedia(_)));

        let err = ImageNormalizer::default().normalize(&[]).unwrap_err();
        assert!(matches!(err, MemeError::UnsupportedMedia(_)));
    }
}
