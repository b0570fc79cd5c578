//! XRP Ledger classic address encoding.
//!
//! XRP classic addresses use the same account-ID construction as
//! Base58Check P2PKH (version byte, Hash160 of the public key, sha256d
//! checksum) but encode with the Ripple base58 alphabet.

use txforge_primitives::hash::sha256d;
use txforge_primitives::PublicKey;

use crate::ScriptError;

/// Version byte for XRP classic account addresses.
const XRP_ACCOUNT_VERSION: u8 = 0x00;

/// Derive an XRP classic address from a hex-encoded public key.
///
/// # Arguments
/// * `pub_key_hex` - Hex encoding of a 33-byte compressed secp256k1 key
///   or any SEC-encoded key.
///
/// # Returns
/// The classic address string (beginning with `r`), or an error if the
/// key hex is invalid.
pub fn address_from_public_key(pub_key_hex: &str) -> Result<String, ScriptError> {
    let public_key = PublicKey::from_hex(pub_key_hex)?;
    let account_id = public_key.hash160();
    Ok(encode_account_id(&account_id))
}

/// Encode a 20-byte account ID as a classic address.
pub fn encode_account_id(account_id: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(25);
    payload.push(XRP_ACCOUNT_VERSION);
    payload.extend_from_slice(account_id);
    let checksum = sha256d(&payload);
    payload.extend_from_slice(&checksum[0..4]);
    bs58::encode(payload)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_string()
}

/// Decode and validate an XRP classic address.
///
/// # Arguments
/// * `address` - The classic address string.
///
/// # Returns
/// The 20-byte account ID, or an error if the address is malformed,
/// fails its checksum, or carries an unexpected version byte.
pub fn decode_address(address: &str) -> Result<[u8; 20], ScriptError> {
    let decoded = bs58::decode(address)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .map_err(|e| ScriptError::InvalidAddress(e.to_string()))?;
    if decoded.len() != 25 {
        return Err(ScriptError::InvalidAddressLength(decoded.len()));
    }
    let (payload, checksum) = decoded.split_at(21);
    let expected = sha256d(payload);
    if checksum != &expected[0..4] {
        return Err(ScriptError::ChecksumFailed);
    }
    if payload[0] != XRP_ACCOUNT_VERSION {
        return Err(ScriptError::UnsupportedAddress(format!(
            "unknown account version byte: 0x{:02x}",
            payload[0]
        )));
    }
    let mut account_id = [0u8; 20];
    account_id.copy_from_slice(&payload[1..]);
    Ok(account_id)
}

/// Check whether a string is a valid XRP classic address.
pub fn is_valid_address(address: &str) -> bool {
    decode_address(address).is_ok()
}
