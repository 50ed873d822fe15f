//! Wire format of expiry-bound signature tokens.
//!
//! A token is `base64(signature) ":" expiry`, where `expiry` is a decimal
//! Unix timestamp in milliseconds. The signature covers
//! `message ‖ be64(expiry)`, so the expiry cannot be changed without
//! invalidating it.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, TimeZone, Utc};

use crate::error::TokenFormatError;

/// Separator between the signature and expiry segments.
pub const TOKEN_DELIMITER: char = ':';

/// Parsed `{signature, expiry}` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureToken {
    signature: Vec<u8>,
    expiry_millis: i64,
}

impl SignatureToken {
    pub fn new(signature: Vec<u8>, expiry_millis: i64) -> Self {
        Self {
            signature,
            expiry_millis,
        }
    }

    /// Parse the transported form, requiring exactly two segments.
    pub fn parse(token: &str) -> Result<Self, TokenFormatError> {
        let segments: Vec<&str> = token.split(TOKEN_DELIMITER).collect();
        let [signature_b64, expiry] = segments.as_slice() else {
            return Err(TokenFormatError::SegmentCount {
                expected: 2,
                found: segments.len(),
                delimiter: ":",
            });
        };

        let expiry_millis = expiry
            .trim()
            .parse::<i64>()
            .map_err(|e| TokenFormatError::InvalidExpiry(format!("{expiry:?}: {e}")))?;
        let signature = BASE64
            .decode(signature_b64)
            .map_err(|e| TokenFormatError::InvalidBase64(e.to_string()))?;

        Ok(Self {
            signature,
            expiry_millis,
        })
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn expiry_millis(&self) -> i64 {
        self.expiry_millis
    }

    /// Expiry as a UTC date-time, if it is representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.expiry_millis).single()
    }

    /// A token is still usable at the instant of its expiry; it expires strictly after.
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis > self.expiry_millis
    }

    /// Bytes covered by the signature: `message ‖ be64(expiry)`.
    pub fn signed_bytes(message: &[u8], expiry_millis: i64) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(message.len() + 8);
        bytes.extend_from_slice(message);
        bytes.extend_from_slice(&expiry_millis.to_be_bytes());
        bytes
    }
}

impl fmt::Display for SignatureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            BASE64.encode(&self.signature),
            TOKEN_DELIMITER,
            self.expiry_millis
        )
    }
}

impl FromStr for SignatureToken {
    type Err = TokenFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
