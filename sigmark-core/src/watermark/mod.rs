//! Invisible provenance watermarks.
//!
//! # Components
//!
//! - **Codec**: length-prefixed text hidden in pixel least-significant bits.
//! - **Payload**: the `OWNER;DATE;ID` provenance record it usually carries.
//! - **Image I/O**: decode/encode adapters over the `image` crate (feature
//!   `image-io`).
//!
//! Watermark before hashing: the signed digest must cover the watermarked
//! bytes, and those bytes must not be recompressed afterwards.

pub mod codec;
#[cfg(feature = "image-io")]
pub mod image_io;
pub mod payload;
pub mod pixels;

pub use codec::{PayloadEncoding, WatermarkCodec, LENGTH_PREFIX_BITS, MAX_PAYLOAD_BITS};
#[cfg(feature = "image-io")]
pub use image_io::{decode_pixels, encode_png, is_supported_format, EmbedOutcome};
pub use payload::{parse_fields, WatermarkPayload};
pub use pixels::{ArgbBuffer, PixelBuffer};
