use thiserror::Error;

/// Errors from key providers.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The private key material is malformed.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The digest to sign has the wrong length.
    #[error("Invalid digest length: expected 32 bytes, got {0}")]
    InvalidDigestLength(usize),

    /// The signing backend failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Hex decoding of key material failed.
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
