//! In-process secp256k1 ECDSA key provider.

use k256::ecdsa::{RecoveryId, SigningKey};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::provider::{check_digest, KeyProviderSync, SignatureParts};
use crate::KeyError;

/// A secp256k1 private key that signs digests with recoverable ECDSA.
///
/// Signatures are low-S normalized; the recovery id is adjusted when
/// normalization flips `s`.
pub struct Secp256k1KeyProvider {
    signing_key: SigningKey,
}

impl Secp256k1KeyProvider {
    /// Create a provider from a 32-byte private key.
    ///
    /// # Arguments
    /// * `bytes` - The raw scalar bytes.
    ///
    /// # Returns
    /// A provider, or an error if the scalar is zero or out of range.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;
        Ok(Secp256k1KeyProvider { signing_key })
    }

    /// Create a provider from a hex-encoded private key.
    ///
    /// # Arguments
    /// * `hex_str` - 64 hex characters encoding the scalar.
    ///
    /// # Returns
    /// A provider, or an error if the hex or scalar is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let mut bytes = hex::decode(hex_str)?;
        let result = Self::from_bytes(&bytes);
        bytes.zeroize();
        result
    }

    /// Generate a provider with a fresh random key.
    pub fn random() -> Self {
        Secp256k1KeyProvider {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// The compressed public key as 66 hex characters.
    pub fn public_key_hex(&self) -> String {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        hex::encode(point.as_bytes())
    }
}

impl KeyProviderSync for Secp256k1KeyProvider {
    fn public_key(&self) -> String {
        self.public_key_hex()
    }

    fn sign(&self, digest: &[u8]) -> Result<SignatureParts, KeyError> {
        let digest = check_digest(digest)?;
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| KeyError::SigningFailed(e.to_string()))?;

        // Low-S normalization flips the y-parity of the recovery id.
        let (signature, recovery_id) = match signature.normalize_s() {
            Some(normalized) => {
                let flipped = RecoveryId::from_byte(recovery_id.to_byte() ^ 1)
                    .ok_or_else(|| KeyError::SigningFailed("recovery id out of range".to_string()))?;
                (normalized, flipped)
            }
            None => (signature, recovery_id),
        };

        let bytes = signature.to_bytes();
        Ok(SignatureParts {
            r: hex::encode(&bytes[0..32]),
            s: hex::encode(&bytes[32..64]),
            recovery_id: recovery_id.to_byte(),
        })
    }
}
