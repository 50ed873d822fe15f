//! Expiry-bound signatures and collective (designer + brand) attestations.

pub mod collective;
pub mod engine;
pub mod token;
pub mod validity;

pub use collective::{
    CollectiveSignatureProtocol, CollectiveToken, CollectiveVerification, COLLECTIVE_DELIMITER,
};
pub use engine::{KeyMaterial, KeyOrigin, SignatureEngine, SignatureVerifier, TokenStatus};
pub use token::{SignatureToken, TOKEN_DELIMITER};
pub use validity::Validity;
