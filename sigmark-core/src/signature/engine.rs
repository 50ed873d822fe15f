//! ECDSA P-256 signature engine with expiry-bound tokens.
//!
//! The engine owns exactly one key pair for its whole lifetime. It is either
//! restored from operator-supplied key material (base64 PKCS#8 private half,
//! base64 SPKI public half) or generated fresh when no material is supplied.
//! The engine is immutable after construction and can be shared across
//! threads by reference.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{DerSignature, SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rand_core::OsRng;
use serde::Serialize;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::token::SignatureToken;
use super::validity::Validity;
use crate::error::{Result, SigmarkError};
use crate::hash::{ContentHasher, Digest};

/// Current wall-clock time in Unix milliseconds.
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Externally supplied, base64-encoded key material.
///
/// Both halves must be present and non-empty for the engine to restore
/// from them.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    /// Base64 PKCS#8 DER private key
    pub private_key: Option<String>,
    /// Base64 SPKI DER public key
    pub public_key: Option<String>,
}

impl KeyMaterial {
    pub fn new(private_key: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            private_key: Some(private_key.into()),
            public_key: Some(public_key.into()),
        }
    }

    /// True when both halves are present and non-empty.
    pub fn is_complete(&self) -> bool {
        let present = |half: &Option<String>| half.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.private_key) && present(&self.public_key)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("public_key", &self.public_key.as_deref().map(prefix))
            .finish()
    }
}

fn prefix(s: &str) -> String {
    let head: String = s.chars().take(10).collect();
    format!("{head}...")
}

/// How the engine obtained its key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrigin {
    Restored,
    Generated,
}

/// Outcome of checking a token against a message.
///
/// Expiry is reported separately from cryptographic failure so callers can
/// tell "expired" apart from "tampered or signed by another key".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TokenStatus {
    /// Signature verifies and the token has not expired.
    Valid { expires_at: i64 },
    /// The token's expiry is in the past. The signature was not checked.
    Expired { expired_at: i64 },
    /// Signature does not verify for this message and key.
    Invalid,
    /// The token string could not be parsed.
    Malformed { reason: String },
}

impl TokenStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Human-readable description for reports.
    pub fn description(&self) -> String {
        match self {
            Self::Valid { .. } => "Valid".to_string(),
            Self::Expired { expired_at } => format!("Expired at {expired_at}ms"),
            Self::Invalid => "Signature does not match this content".to_string(),
            Self::Malformed { reason } => format!("Malformed token: {reason}"),
        }
    }
}

/// Public-half-only verifier, usable across processes.
#[derive(Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Build a verifier from a base64 SPKI DER public key.
    pub fn from_public_key_base64(encoded: &str) -> Result<Self> {
        let der = BASE64
            .decode(encoded.trim())
            .map_err(|e| SigmarkError::KeyError(format!("public key is not base64: {e}")))?;
        let key = VerifyingKey::from_public_key_der(&der)
            .map_err(|e| SigmarkError::KeyError(format!("invalid public key: {e}")))?;
        Ok(Self { key })
    }

    /// Base64 SPKI DER encoding of the public key.
    pub fn to_public_key_base64(&self) -> Result<String> {
        let der = self
            .key
            .to_public_key_der()
            .map_err(|e| SigmarkError::KeyError(format!("failed to encode public key: {e}")))?;
        Ok(BASE64.encode(der.as_bytes()))
    }

    /// Short hex fingerprint of the public key (first 8 bytes of its digest).
    pub fn fingerprint(&self) -> String {
        let point = self.key.to_encoded_point(true);
        let digest = ContentHasher::hash(point.as_bytes());
        hex::encode(&digest.as_bytes()[..8])
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.key
    }

    /// Check a parsed token at the given instant.
    pub fn check_token_at(
        &self,
        message: &[u8],
        token: &SignatureToken,
        now_millis: i64,
    ) -> TokenStatus {
        if token.is_expired_at(now_millis) {
            debug!(expiry = token.expiry_millis(), now = now_millis, "Token expired");
            return TokenStatus::Expired {
                expired_at: token.expiry_millis(),
            };
        }

        let Ok(signature) = DerSignature::from_bytes(token.signature()) else {
            debug!("Signature bytes are not a DER ECDSA signature");
            return TokenStatus::Invalid;
        };

        let signed = SignatureToken::signed_bytes(message, token.expiry_millis());
        match self.key.verify(&signed, &signature) {
            Ok(()) => TokenStatus::Valid {
                expires_at: token.expiry_millis(),
            },
            Err(_) => TokenStatus::Invalid,
        }
    }

    /// Check a transported token string at the given instant.
    pub fn check_at(&self, message: &[u8], token: &str, now_millis: i64) -> TokenStatus {
        match SignatureToken::parse(token) {
            Ok(parsed) => self.check_token_at(message, &parsed, now_millis),
            Err(e) => TokenStatus::Malformed {
                reason: e.to_string(),
            },
        }
    }

    pub fn check(&self, message: &[u8], token: &str) -> TokenStatus {
        self.check_at(message, token, now_millis())
    }

    /// Boolean verification. Never fails: malformed or expired tokens are `false`.
    pub fn verify(&self, message: &[u8], token: &str) -> bool {
        self.check(message, token).is_valid()
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Signs messages with an embedded expiry and verifies the resulting tokens.
pub struct SignatureEngine {
    signing_key: SigningKey,
    verifier: SignatureVerifier,
    origin: KeyOrigin,
}

impl SignatureEngine {
    /// Restore from `material` when it is complete, otherwise generate a
    /// fresh key pair.
    pub fn from_key_material(material: &KeyMaterial) -> Result<Self> {
        match (&material.private_key, &material.public_key) {
            (Some(private_key), Some(public_key)) if material.is_complete() => {
                info!(public_key = %prefix(public_key), "Using existing key pair from key material");
                Self::restore(private_key, public_key)
            }
            _ => {
                let engine = Self::generate();
                warn!(
                    fingerprint = %engine.verifier.fingerprint(),
                    "No key material supplied, generated a new key pair"
                );
                Ok(engine)
            }
        }
    }

    /// Generate a fresh P-256 key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifier = SignatureVerifier::new(VerifyingKey::from(&signing_key));
        debug!(fingerprint = %verifier.fingerprint(), "Generated P-256 key pair");
        Self {
            signing_key,
            verifier,
            origin: KeyOrigin::Generated,
        }
    }

    /// Restore from base64 PKCS#8 (private) and SPKI (public) DER.
    ///
    /// The public half must belong to the private half.
    pub fn restore(private_key_b64: &str, public_key_b64: &str) -> Result<Self> {
        let der = Zeroizing::new(
            BASE64
                .decode(private_key_b64.trim())
                .map_err(|e| SigmarkError::KeyError(format!("private key is not base64: {e}")))?,
        );
        let signing_key = SigningKey::from_pkcs8_der(&der)
            .map_err(|e| SigmarkError::KeyError(format!("invalid private key: {e}")))?;
        let verifier = SignatureVerifier::from_public_key_base64(public_key_b64)?;

        if VerifyingKey::from(&signing_key) != *verifier.verifying_key() {
            return Err(SigmarkError::KeyError(
                "public key does not match private key".into(),
            ));
        }

        Ok(Self {
            signing_key,
            verifier,
            origin: KeyOrigin::Restored,
        })
    }

    pub fn origin(&self) -> KeyOrigin {
        self.origin
    }

    /// Verifier for this engine's public half.
    pub fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    /// Export the key pair as base64 DER so it can be supplied again later.
    pub fn export_key_material(&self) -> Result<KeyMaterial> {
        let private_der = self
            .signing_key
            .to_pkcs8_der()
            .map_err(|e| SigmarkError::KeyError(format!("failed to encode private key: {e}")))?;
        Ok(KeyMaterial::new(
            BASE64.encode(private_der.as_bytes()),
            self.verifier.to_public_key_base64()?,
        ))
    }

    /// Sign `message` with an expiry of `now + validity`.
    pub fn sign(&self, message: &[u8], validity: Validity) -> Result<SignatureToken> {
        self.sign_at(message, validity, now_millis())
    }

    /// Sign with the default 7-day validity.
    pub fn sign_default(&self, message: &[u8]) -> Result<SignatureToken> {
        self.sign(message, Validity::DEFAULT)
    }

    /// Sign as if the current time were `now_millis`.
    pub fn sign_at(
        &self,
        message: &[u8],
        validity: Validity,
        now_millis: i64,
    ) -> Result<SignatureToken> {
        let expiry = validity.expiry_from(now_millis);
        let signed = SignatureToken::signed_bytes(message, expiry);
        let signature: DerSignature = self
            .signing_key
            .try_sign(&signed)
            .map_err(|e| SigmarkError::SignatureError(e.to_string()))?;

        debug!(expiry, signature_len = signature.as_bytes().len(), "Signed message");
        Ok(SignatureToken::new(signature.as_bytes().to_vec(), expiry))
    }

    /// Sign a content digest. The signed message is the digest's base64
    /// transport form, which is also what collective tokens embed.
    pub fn sign_digest(&self, digest: &Digest, validity: Validity) -> Result<SignatureToken> {
        self.sign(digest.to_base64().as_bytes(), validity)
    }

    pub fn verify(&self, message: &[u8], token: &str) -> bool {
        self.verifier.verify(message, token)
    }

    pub fn check(&self, message: &[u8], token: &str) -> TokenStatus {
        self.verifier.check(message, token)
    }

    pub fn check_at(&self, message: &[u8], token: &str, now_millis: i64) -> TokenStatus {
        self.verifier.check_at(message, token, now_millis)
    }

    /// Check a token issued by [`SignatureEngine::sign_digest`].
    pub fn check_digest(&self, digest: &Digest, token: &str) -> TokenStatus {
        self.verifier.check(digest.to_base64().as_bytes(), token)
    }
}

impl fmt::Debug for SignatureEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureEngine")
            .field("origin", &self.origin)
            .field("verifier", &self.verifier)
            .finish()
    }
}
