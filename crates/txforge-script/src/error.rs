/// Error types for script and address operations.
///
/// Covers script construction failures, address generation, and the
/// distinct decode-failure modes (malformed input vs. checksum mismatch)
/// that the facade's boolean validator collapses.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Generic invalid script error.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// Push data exceeds the maximum encodable size.
    #[error("push data too large: {0} bytes")]
    DataTooBig(usize),

    /// Address derivation failed (bad key, unsupported variant, or codec failure).
    #[error("generate address failed: {0}")]
    AddressGeneration(String),

    /// Address string is malformed (bad charset, wrong length, unknown prefix).
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Address decoded but its payload length is wrong.
    #[error("invalid address length: {0} bytes")]
    InvalidAddressLength(usize),

    /// Address version byte or witness version is not recognized.
    #[error("address not supported: {0}")]
    UnsupportedAddress(String),

    /// Base58Check or Bech32 checksum does not match.
    #[error("checksum failed")]
    ChecksumFailed,

    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Error from the primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] txforge_primitives::PrimitivesError),
}
