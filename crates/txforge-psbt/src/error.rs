use thiserror::Error;
use txforge_primitives::PrimitivesError;
use txforge_script::ScriptError;

/// Errors from transaction construction and PSBT handling.
#[derive(Error, Debug)]
pub enum PsbtError {
    /// The request or accumulated state cannot produce a valid transaction.
    #[error("Construction error: {0}")]
    Construction(String),

    /// Inputs do not cover the requested outputs plus fee.
    #[error("Insufficient funds: inputs {inputs} do not cover outputs {outputs} plus fee {fee}")]
    InsufficientFunds { inputs: u64, outputs: u64, fee: u64 },

    /// An attached signature failed verification against its digest.
    #[error("Signature verification failed for input {input_index} under key {public_key}")]
    SignatureVerification { input_index: usize, public_key: String },

    /// The transaction or PSBT wire bytes are malformed.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Script or address handling failed.
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// A primitive operation failed.
    #[error("Primitives error: {0}")]
    Primitives(#[from] PrimitivesError),

    /// Hex decoding failed.
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
