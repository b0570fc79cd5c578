//! Domain-separated message signing.
//!
//! Messages are hashed under a chain-specific magic prefix so a signed
//! message can never double as a transaction signature. The signature
//! is reported as the 128-character r‖s hex concatenation.

use thiserror::Error;
use txforge_keys::{KeyError, KeyProvider, KeyProviderSync};
use txforge_primitives::hash::sha256d;
use txforge_primitives::util::{TxWriter, VarInt};

/// The magic prefix of the Bitcoin message-signing domain.
pub const BITCOIN_MESSAGE_PREFIX: &str = "Bitcoin Signed Message:\n";

/// Errors from message signing.
#[derive(Error, Debug)]
pub enum MessageError {
    /// The key provider failed to sign.
    #[error("Signing failed: {0}")]
    Signing(#[from] KeyError),
}

/// Compute the digest of a message under a magic prefix.
///
/// The preimage is `varint(len(prefix)) ‖ prefix ‖ varint(len(message))
/// ‖ message`, double-SHA-256 hashed.
///
/// # Arguments
/// * `prefix` - The chain's magic prefix.
/// * `message` - The message bytes.
///
/// # Returns
/// The 32-byte digest.
pub fn digest_with_prefix(prefix: &str, message: &[u8]) -> [u8; 32] {
    let mut writer = TxWriter::new();
    writer.write_varint(VarInt::from(prefix.len()));
    writer.write_bytes(prefix.as_bytes());
    writer.write_varint(VarInt::from(message.len()));
    writer.write_bytes(message);
    sha256d(writer.as_bytes())
}

/// Compute the Bitcoin message-signing digest of a message.
///
/// # Arguments
/// * `message` - The message bytes.
///
/// # Returns
/// The 32-byte digest under [`BITCOIN_MESSAGE_PREFIX`].
pub fn construct_message_hash(message: &[u8]) -> [u8; 32] {
    digest_with_prefix(BITCOIN_MESSAGE_PREFIX, message)
}

/// Sign a message with an async key provider.
///
/// # Arguments
/// * `provider` - The signer.
/// * `message` - The message bytes.
///
/// # Returns
/// The r‖s signature as 128 hex characters; the recovery id is never
/// appended.
pub async fn sign_message(
    provider: &dyn KeyProvider,
    message: &[u8],
) -> Result<String, MessageError> {
    let digest = construct_message_hash(message);
    let parts = provider.sign(&digest).await?;
    Ok(parts.to_concat_hex())
}

/// Sign a message with a blocking key provider.
///
/// # Arguments
/// * `provider` - The signer.
/// * `message` - The message bytes.
///
/// # Returns
/// The r‖s signature as 128 hex characters.
pub fn sign_message_sync(
    provider: &dyn KeyProviderSync,
    message: &[u8],
) -> Result<String, MessageError> {
    let digest = construct_message_hash(message);
    let parts = provider.sign(&digest)?;
    Ok(parts.to_concat_hex())
}
