//! Image byte adapters for the watermark codec.
//!
//! Decoding goes through the `image` crate. Watermarked output is always
//! re-encoded as PNG: a lossy format would discard the payload bits.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, info, warn};

use super::codec::WatermarkCodec;
use crate::error::WatermarkError;

/// Input formats the adapters accept.
pub const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::Bmp,
];

/// Result of embedding into raw file bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedOutcome {
    /// PNG bytes carrying the watermark.
    Embedded(Vec<u8>),
    /// The input was not a supported image and is returned unmodified.
    PassedThrough(Vec<u8>),
}

impl EmbedOutcome {
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Embedded(bytes) | Self::PassedThrough(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Embedded(bytes) | Self::PassedThrough(bytes) => bytes,
        }
    }
}

/// Detected format of `data`, if it is one of [`SUPPORTED_FORMATS`].
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    image::guess_format(data)
        .ok()
        .filter(|format| SUPPORTED_FORMATS.contains(format))
}

pub fn is_supported_format(data: &[u8]) -> bool {
    detect_format(data).is_some()
}

/// Decode image bytes into an RGBA pixel buffer.
pub fn decode_pixels(data: &[u8]) -> Result<RgbaImage, WatermarkError> {
    let image =
        image::load_from_memory(data).map_err(|e| WatermarkError::Decode(e.to_string()))?;
    Ok(image.to_rgba8())
}

/// Encode a pixel buffer as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, WatermarkError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| WatermarkError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

impl WatermarkCodec {
    /// Embed `payload` into encoded image bytes.
    ///
    /// Input that is not a recognised image format passes through
    /// unmodified. A recognised but corrupt image is a decode error.
    pub fn embed_image_bytes(
        &self,
        data: &[u8],
        payload: &str,
    ) -> Result<EmbedOutcome, WatermarkError> {
        self.embed_bytes_with(data, |image| Ok(self.embed(image, payload)))
    }

    /// Like [`WatermarkCodec::embed_image_bytes`] but fails when the payload
    /// does not fit.
    pub fn embed_image_bytes_checked(
        &self,
        data: &[u8],
        payload: &str,
    ) -> Result<EmbedOutcome, WatermarkError> {
        self.embed_bytes_with(data, |image| self.embed_checked(image, payload))
    }

    fn embed_bytes_with<F>(&self, data: &[u8], embed: F) -> Result<EmbedOutcome, WatermarkError>
    where
        F: FnOnce(&RgbaImage) -> Result<RgbaImage, WatermarkError>,
    {
        let Some(format) = detect_format(data) else {
            warn!(bytes = data.len(), "Not a supported image format, passing through");
            return Ok(EmbedOutcome::PassedThrough(data.to_vec()));
        };

        let image = decode_pixels(data)?;
        debug!(?format, width = image.width(), height = image.height(), "Decoded image");

        let marked = embed(&image)?;
        let png = encode_png(&marked)?;
        if format != ImageFormat::Png {
            info!(?format, "Watermarked image re-encoded as PNG");
        }
        Ok(EmbedOutcome::Embedded(png))
    }

    /// Extract a payload from encoded image bytes.
    ///
    /// `Ok(None)` means the image decoded but carries no watermark.
    pub fn extract_image_bytes(&self, data: &[u8]) -> Result<Option<String>, WatermarkError> {
        let image = decode_pixels(data)?;
        Ok(self.extract(&image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x * 7) as u8, (y * 13) as u8, ((x + y) * 3) as u8, 255])
        });
        encode_png(&image).unwrap()
    }

    #[test]
    fn test_png_roundtrip() {
        let codec = WatermarkCodec::default();
        let outcome = codec
            .embed_image_bytes(&png_bytes(40, 40), "OWNER:Alice")
            .unwrap();

        assert!(outcome.is_embedded());
        assert_eq!(
            codec.extract_image_bytes(outcome.as_bytes()).unwrap().as_deref(),
            Some("OWNER:Alice")
        );
    }

    #[test]
    fn test_non_image_passes_through() {
        let data = b"%PDF-1.7 not an image".to_vec();
        let outcome = WatermarkCodec::default()
            .embed_image_bytes(&data, "OWNER:Alice")
            .unwrap();

        assert_eq!(outcome, EmbedOutcome::PassedThrough(data));
    }

    #[test]
    fn test_corrupt_image_is_decode_error() {
        let mut data = png_bytes(8, 8);
        data.truncate(24);

        assert!(matches!(
            WatermarkCodec::default().embed_image_bytes(&data, "x"),
            Err(WatermarkError::Decode(_))
        ));
    }

    #[test]
    fn test_extract_from_non_image_is_error() {
        assert!(matches!(
            WatermarkCodec::default().extract_image_bytes(b"plain text"),
            Err(WatermarkError::Decode(_))
        ));
    }

    #[test]
    fn test_checked_embed_reports_capacity() {
        assert!(matches!(
            WatermarkCodec::default().embed_image_bytes_checked(&png_bytes(4, 4), "hello"),
            Err(WatermarkError::InsufficientCapacity { .. })
        ));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(&png_bytes(2, 2)), Some(ImageFormat::Png));
        assert!(is_supported_format(&[0xFF, 0xD8, 0xFF]));
        assert!(!is_supported_format(&[0x00, 0x00, 0x00]));
    }
}
