//! Two-party collective signatures.
//!
//! A designer and a brand each sign the same content digest with their own
//! key. The brand then emits one transportable token:
//!
//! ```text
//! <digest>||<designer token>||<brand token>
//! ```
//!
//! Verification recomputes nothing from the token: it compares the presented
//! digest with the embedded one and checks both signatures against the
//! *embedded* digest, each with its own public key.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use super::engine::{now_millis, SignatureEngine, SignatureVerifier, TokenStatus};
use super::token::SignatureToken;
use super::validity::Validity;
use crate::error::{Result, TokenFormatError};
use crate::hash::Digest;

/// Separator between the three collective segments. Absent from both the
/// base64 alphabet and token text.
pub const COLLECTIVE_DELIMITER: &str = "||";

/// Parsed `digest || designer || brand` token. Segments are kept exactly as
/// transported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectiveToken {
    digest: String,
    designer: String,
    brand: String,
}

impl CollectiveToken {
    pub fn new(digest: &Digest, designer: &SignatureToken, brand: &SignatureToken) -> Self {
        Self {
            digest: digest.to_base64(),
            designer: designer.to_string(),
            brand: brand.to_string(),
        }
    }

    /// Parse the transported form, requiring exactly three segments.
    pub fn parse(token: &str) -> std::result::Result<Self, TokenFormatError> {
        let segments: Vec<&str> = token.split(COLLECTIVE_DELIMITER).collect();
        match segments.as_slice() {
            [digest, designer, brand] => Ok(Self {
                digest: digest.to_string(),
                designer: designer.to_string(),
                brand: brand.to_string(),
            }),
            _ => Err(TokenFormatError::SegmentCount {
                expected: 3,
                found: segments.len(),
                delimiter: COLLECTIVE_DELIMITER,
            }),
        }
    }

    /// Embedded digest, in its transported base64 form.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn designer_token(&self) -> &str {
        &self.designer
    }

    pub fn brand_token(&self) -> &str {
        &self.brand
    }
}

impl fmt::Display for CollectiveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}",
            self.digest,
            self.designer,
            self.brand,
            d = COLLECTIVE_DELIMITER
        )
    }
}

impl FromStr for CollectiveToken {
    type Err = TokenFormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Per-part outcome of verifying a collective token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectiveVerification {
    /// Conjunction of the three checks below
    pub valid: bool,
    pub hash_valid: bool,
    pub designer_valid: bool,
    pub brand_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designer_status: Option<TokenStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_status: Option<TokenStatus>,
    /// Diagnostic for malformed tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CollectiveVerification {
    fn format_error(error: TokenFormatError) -> Self {
        Self {
            valid: false,
            hash_valid: false,
            designer_valid: false,
            brand_valid: false,
            designer_status: None,
            brand_status: None,
            message: Some(format!("Invalid collective signature format: {error}")),
        }
    }
}

/// Verifies collective tokens against the designer's and brand's public keys.
#[derive(Debug, Clone)]
pub struct CollectiveSignatureProtocol {
    designer: SignatureVerifier,
    brand: SignatureVerifier,
}

impl CollectiveSignatureProtocol {
    pub fn new(designer: SignatureVerifier, brand: SignatureVerifier) -> Self {
        Self { designer, brand }
    }

    /// Designer step: a plain signature over the digest, default validity.
    pub fn compose_designer(engine: &SignatureEngine, digest: &Digest) -> Result<SignatureToken> {
        engine.sign_digest(digest, Validity::DEFAULT)
    }

    /// Brand step: sign the same digest independently and join it with the
    /// designer's token.
    pub fn compose_brand(
        engine: &SignatureEngine,
        digest: &Digest,
        designer_token: &str,
    ) -> Result<CollectiveToken> {
        let designer = SignatureToken::parse(designer_token)?;
        let brand = engine.sign_digest(digest, Validity::DEFAULT)?;
        debug!(digest = %digest, "Composed collective token");
        Ok(CollectiveToken::new(digest, &designer, &brand))
    }

    pub fn verify(&self, digest: &Digest, token: &str) -> CollectiveVerification {
        self.verify_at(digest, token, now_millis())
    }

    /// Verify as if the current time were `now_millis`.
    pub fn verify_at(&self, digest: &Digest, token: &str, now_millis: i64) -> CollectiveVerification {
        let parsed = match CollectiveToken::parse(token) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Rejected malformed collective token");
                return CollectiveVerification::format_error(e);
            }
        };

        let hash_valid = parsed.digest() == digest.to_base64();

        // Signatures are checked against the embedded digest, not the presented one.
        let stored = parsed.digest().as_bytes();
        let designer_status = self.designer.check_at(stored, parsed.designer_token(), now_millis);
        let brand_status = self.brand.check_at(stored, parsed.brand_token(), now_millis);

        let designer_valid = designer_status.is_valid();
        let brand_valid = brand_status.is_valid();

        CollectiveVerification {
            valid: hash_valid && designer_valid && brand_valid,
            hash_valid,
            designer_valid,
            brand_valid,
            designer_status: Some(designer_status),
            brand_status: Some(brand_status),
            message: None,
        }
    }
}
