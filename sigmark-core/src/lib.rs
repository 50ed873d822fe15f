//! Sigmark Core - expiry-bound content attestations and provenance watermarks
//!
//! This crate provides the primitives for attesting arbitrary content with
//! time-limited digital signatures, combining two parties' signatures into
//! one collective token, and hiding a provenance record inside images.
//!
//! # Features
//!
//! - BLAKE3 content digests, transported as base64
//! - ECDSA P-256 signatures whose expiry is part of the signed bytes
//! - Designer + brand collective tokens with per-part verification
//! - LSB steganography with a 32-bit length prefix
//!
//! # Example
//!
//! ```
//! use sigmark_core::{ContentHasher, SignatureEngine, Validity};
//!
//! # fn example() -> sigmark_core::Result<()> {
//! let engine = SignatureEngine::generate();
//!
//! let digest = ContentHasher::hash(b"Hello World");
//! let token = engine.sign_digest(&digest, Validity::from_days(1))?;
//!
//! assert!(engine.check_digest(&digest, &token.to_string()).is_valid());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod hash;
pub mod signature;
pub mod watermark;

// Re-export main types for convenience
pub use config::Config;
pub use error::{Result, SigmarkError, TokenFormatError, WatermarkError};
pub use hash::{ContentHasher, Digest, DIGEST_BYTES};
pub use signature::{
    CollectiveSignatureProtocol, CollectiveToken, CollectiveVerification, KeyMaterial, KeyOrigin,
    SignatureEngine, SignatureToken, SignatureVerifier, TokenStatus, Validity,
};
pub use watermark::{ArgbBuffer, PayloadEncoding, PixelBuffer, WatermarkCodec, WatermarkPayload};

#[cfg(feature = "image-io")]
pub use watermark::EmbedOutcome;
