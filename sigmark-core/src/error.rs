use thiserror::Error;

/// Structural problems with a transported token string.
///
/// These are always recoverable: verification paths turn them into a
/// `false` result with a diagnostic instead of propagating them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenFormatError {
    #[error("expected {expected} segments separated by '{delimiter}', found {found}")]
    SegmentCount {
        expected: usize,
        found: usize,
        delimiter: &'static str,
    },

    #[error("signature segment is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("expiry segment is not a decimal timestamp: {0}")]
    InvalidExpiry(String),

    #[error("digest segment is not a valid digest: {0}")]
    InvalidDigest(String),
}

/// Errors from the watermark codec and its image adapters.
#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("payload needs {required} pixels but the image only has {available}")]
    InsufficientCapacity { required: u64, available: u64 },

    #[error("payload is {bits} bits, more than the {max} bits a reader will accept")]
    PayloadTooLarge { bits: u64, max: u32 },

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),
}

#[derive(Error, Debug)]
pub enum SigmarkError {
    #[error("Key material error: {0}")]
    KeyError(String),

    #[error("Signature error: {0}")]
    SignatureError(String),

    #[error("Token format error: {0}")]
    TokenFormat(#[from] TokenFormatError),

    #[error("Watermark error: {0}")]
    Watermark(#[from] WatermarkError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, SigmarkError>;
