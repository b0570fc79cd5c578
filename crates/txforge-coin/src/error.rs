use thiserror::Error;
use txforge_keys::KeyError;
use txforge_message::MessageError;
use txforge_psbt::PsbtError;
use txforge_script::ScriptError;

/// Errors surfaced by the coin facades.
#[derive(Error, Debug)]
pub enum CoinError {
    /// Transaction construction or finalization failed.
    #[error(transparent)]
    Psbt(#[from] PsbtError),

    /// Address derivation or parsing failed.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// A key provider failed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Message signing failed.
    #[error(transparent)]
    Message(#[from] MessageError),

    /// Hex decoding failed.
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
