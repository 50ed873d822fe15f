//! Content hashing.
//!
//! Every attestation starts from a [`Digest`]: the BLAKE3 hash of the exact
//! bytes being attested. Digests are never stored, only recomputed from the
//! presented content and compared.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::TokenFormatError;

/// Digest size in bytes (BLAKE3, 256 bits).
pub const DIGEST_BYTES: usize = 32;

/// Fixed-size content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_BYTES]);

impl Digest {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_BYTES] {
        &self.0
    }

    /// Transport form: standard base64 alphabet, padded.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    /// Parse the transport form back into a digest.
    pub fn from_base64(encoded: &str) -> std::result::Result<Self, TokenFormatError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| TokenFormatError::InvalidDigest(e.to_string()))?;
        let array: [u8; DIGEST_BYTES] = bytes.try_into().map_err(|b: Vec<u8>| {
            TokenFormatError::InvalidDigest(format!(
                "expected {} bytes, got {}",
                DIGEST_BYTES,
                b.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; DIGEST_BYTES]> for Digest {
    fn from(bytes: [u8; DIGEST_BYTES]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// Canonical hasher for attested content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// Hash arbitrary bytes. Empty input is valid.
    pub fn hash(data: &[u8]) -> Digest {
        Digest(blake3::hash(data).into())
    }

    /// Hash and return the base64 transport form directly.
    pub fn hash_base64(data: &[u8]) -> String {
        Self::hash(data).to_base64()
    }
}
