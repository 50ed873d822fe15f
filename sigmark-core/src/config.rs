//! Runtime configuration
//!
//! Loaded from environment variables with sensible defaults.

use tracing::warn;

use crate::signature::{KeyMaterial, Validity};
use crate::watermark::PayloadEncoding;

/// Environment variable holding the base64 PKCS#8 private key.
pub const PRIVATE_KEY_ENV: &str = "SIGNATURE_PRIVATE_KEY";
/// Environment variable holding the base64 SPKI public key.
pub const PUBLIC_KEY_ENV: &str = "SIGNATURE_PUBLIC_KEY";

/// Configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Key material for the signature engine (generated fresh when incomplete)
    pub key_material: KeyMaterial,
    /// Validity applied when a caller does not choose one (default: 7 days)
    pub default_validity: Validity,
    /// Watermark text encoding (default: latin1)
    pub watermark_encoding: PayloadEncoding,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values are logged and replaced by their defaults.
    pub fn from_env() -> Self {
        let key_material = KeyMaterial {
            private_key: non_empty_var(PRIVATE_KEY_ENV),
            public_key: non_empty_var(PUBLIC_KEY_ENV),
        };

        let default_validity = std::env::var("SIGNATURE_VALIDITY_MS")
            .ok()
            .and_then(|v| {
                v.parse::<Validity>()
                    .map_err(|e| warn!(error = %e, "Ignoring SIGNATURE_VALIDITY_MS"))
                    .ok()
            })
            .unwrap_or_default();

        let watermark_encoding = std::env::var("WATERMARK_ENCODING")
            .ok()
            .and_then(|v| {
                v.parse::<PayloadEncoding>()
                    .map_err(|e| warn!(error = %e, "Ignoring WATERMARK_ENCODING"))
                    .ok()
            })
            .unwrap_or_default();

        Self {
            key_material,
            default_validity,
            watermark_encoding,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
