//! LSB steganography codec.
//!
//! # Bit layout
//!
//! Pixels are visited in raster order (row-major, left to right, top to
//! bottom). The first 32 pixels carry the payload length in bits, most
//! significant bit first. The following pixels carry the payload bits, eight
//! per character, most significant bit first. Each bit replaces only the
//! least-significant bit of the pixel word; every pixel past the encoded
//! range is left untouched.
//!
//! # Fragility
//!
//! The watermark does not survive lossy re-encoding. JPEG and similar
//! codecs discard exactly the low-order bits that carry it, so watermarked
//! images must be stored losslessly and never recompressed afterwards.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::pixels::PixelBuffer;
use crate::error::{SigmarkError, WatermarkError};

/// Width of the length prefix in bits.
pub const LENGTH_PREFIX_BITS: u64 = 32;

/// Largest payload length (in bits) accepted on extraction. Anything larger
/// is treated as noise rather than a watermark.
pub const MAX_PAYLOAD_BITS: u32 = 10_000;

/// How payload text maps to bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    /// One byte per character: the low byte of the code point. Lossy for
    /// characters above U+00FF.
    #[default]
    Latin1,
    /// UTF-8 bytes, decoded lossily on extraction.
    Utf8,
}

impl PayloadEncoding {
    fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Latin1 => text.chars().map(|c| (u32::from(c) & 0xFF) as u8).collect(),
            Self::Utf8 => text.as_bytes().to_vec(),
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Latin1 => bytes.iter().copied().map(char::from).collect(),
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

impl FromStr for PayloadEncoding {
    type Err = SigmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Self::Latin1),
            "utf8" | "utf-8" => Ok(Self::Utf8),
            other => Err(SigmarkError::ConfigError(format!(
                "unknown watermark encoding: {other}"
            ))),
        }
    }
}

/// Embeds and extracts length-prefixed text in pixel LSBs.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatermarkCodec {
    encoding: PayloadEncoding,
}

impl WatermarkCodec {
    pub fn new(encoding: PayloadEncoding) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> PayloadEncoding {
        self.encoding
    }

    /// Number of payload bits `payload` encodes to.
    pub fn payload_bits(&self, payload: &str) -> u64 {
        self.encoding.encode(payload).len() as u64 * 8
    }

    /// Pixels needed to hold the length prefix plus `payload`.
    pub fn required_pixels(&self, payload: &str) -> u64 {
        LENGTH_PREFIX_BITS + self.payload_bits(payload)
    }

    /// Payload capacity of `image` in bits.
    pub fn capacity_bits<P: PixelBuffer>(image: &P) -> u64 {
        image.pixel_count().saturating_sub(LENGTH_PREFIX_BITS)
    }

    /// Embed into a copy of `image`.
    ///
    /// If the image is too small the bitstream is silently truncated at the
    /// last pixel and the result will not round-trip through
    /// [`WatermarkCodec::extract`]. Use [`WatermarkCodec::embed_checked`] to
    /// fail instead.
    pub fn embed<P: PixelBuffer + Clone>(&self, image: &P, payload: &str) -> P {
        let mut output = image.clone();
        self.embed_in_place(&mut output, payload);
        output
    }

    /// Embed, failing when the payload does not fit or could not be
    /// extracted again.
    pub fn embed_checked<P: PixelBuffer + Clone>(
        &self,
        image: &P,
        payload: &str,
    ) -> Result<P, WatermarkError> {
        let bits = self.payload_bits(payload);
        if bits > u64::from(MAX_PAYLOAD_BITS) {
            return Err(WatermarkError::PayloadTooLarge {
                bits,
                max: MAX_PAYLOAD_BITS,
            });
        }

        let required = LENGTH_PREFIX_BITS + bits;
        let available = image.pixel_count();
        if required > available {
            return Err(WatermarkError::InsufficientCapacity {
                required,
                available,
            });
        }

        Ok(self.embed(image, payload))
    }

    /// Embed directly into `image`. Returns the number of bits written,
    /// prefix included.
    pub fn embed_in_place<P: PixelBuffer>(&self, image: &mut P, payload: &str) -> u64 {
        let bytes = self.encoding.encode(payload);
        let bit_len = u32::try_from(bytes.len() * 8).unwrap_or(u32::MAX);

        let prefix = (0..LENGTH_PREFIX_BITS).map(|i| (bit_len >> (31 - i)) & 1 == 1);
        let data = bytes
            .iter()
            .flat_map(|&byte| (0..8u32).map(move |i| (byte >> (7 - i)) & 1 == 1));

        let mut cursor = RasterCursor::new(image.width(), image.height());
        let mut written = 0;
        for bit in prefix.chain(data) {
            let Some((x, y)) = cursor.next() else {
                debug!(written, "Image capacity exhausted, payload truncated");
                break;
            };
            let word = image.pixel_word(x, y);
            image.set_pixel_word(x, y, (word & !1) | u32::from(bit));
            written += 1;
        }

        trace!(payload_bits = bit_len, written, "Embedded watermark bits");
        written
    }

    /// Extract a payload, or `None` when no plausible watermark is present.
    ///
    /// A length prefix of zero or above [`MAX_PAYLOAD_BITS`] means "no
    /// watermark". If the image ends before the declared length, whatever
    /// whole characters were read are returned.
    pub fn extract<P: PixelBuffer>(&self, image: &P) -> Option<String> {
        let mut cursor = RasterCursor::new(image.width(), image.height());
        let read_bit = |cursor: &mut RasterCursor| cursor.next().map(|(x, y)| image.pixel_word(x, y) & 1);

        let mut length: u32 = 0;
        for _ in 0..LENGTH_PREFIX_BITS {
            length = (length << 1) | read_bit(&mut cursor)?;
        }

        if length == 0 || length > MAX_PAYLOAD_BITS {
            debug!(length, "No watermark length prefix found");
            return None;
        }

        let mut bytes = Vec::with_capacity(length as usize / 8);
        let mut current: u8 = 0;
        for i in 0..length {
            let Some(bit) = read_bit(&mut cursor) else {
                debug!(declared = length, read = i, "Image ended before payload");
                break;
            };
            current = (current << 1) | bit as u8;
            if i % 8 == 7 {
                bytes.push(current);
                current = 0;
            }
        }

        Some(self.encoding.decode(&bytes))
    }
}

/// Raster-order walk over pixel coordinates.
struct RasterCursor {
    width: u32,
    total: u64,
    index: u64,
}

impl RasterCursor {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            total: u64::from(width) * u64::from(height),
            index: 0,
        }
    }
}

impl Iterator for RasterCursor {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.total {
            return None;
        }
        let width = u64::from(self.width);
        let point = ((self.index % width) as u32, (self.index / width) as u32);
        self.index += 1;
        Some(point)
    }
}
