//! In-process sr25519 (Schnorr over Ristretto255) key provider.
//!
//! Signs under the `substrate` signing context. The 64-byte Schnorr
//! signature is reported through [`SignatureParts`] with the first half
//! as `r`, the second as `s`, and a recovery id of 0 since sr25519 has
//! no public key recovery.

use schnorrkel::{signing_context, ExpansionMode, Keypair, MiniSecretKey, SecretKey};

use crate::provider::{check_digest, KeyProviderSync, SignatureParts};
use crate::KeyError;

const SUBSTRATE_SIGNING_CONTEXT: &[u8] = b"substrate";

/// An sr25519 keypair that signs digests Substrate-style.
pub struct Sr25519KeyProvider {
    keypair: Keypair,
}

impl Sr25519KeyProvider {
    /// Create a provider from a 96-byte keystore blob.
    ///
    /// The blob is the 64-byte secret key in its ed25519-compatible
    /// form followed by the 32-byte public key. The public half is
    /// cross-checked against the key derived from the secret.
    ///
    /// # Arguments
    /// * `bytes` - 96 bytes of secret-then-public key material.
    ///
    /// # Returns
    /// A provider, or an error if lengths or the key pairing are wrong.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 96 {
            return Err(KeyError::InvalidPrivateKey(format!(
                "keypair blob must be 96 bytes, got {}",
                bytes.len()
            )));
        }
        let provider = Self::from_secret_bytes(&bytes[0..64])?;
        if provider.keypair.public.to_bytes() != bytes[64..96] {
            return Err(KeyError::InvalidPrivateKey(
                "public key does not match secret key".to_string(),
            ));
        }
        Ok(provider)
    }

    /// Create a provider from a 64-byte ed25519-form secret key.
    ///
    /// # Arguments
    /// * `bytes` - The expanded secret key bytes.
    ///
    /// # Returns
    /// A provider, or an error if the bytes are not a valid secret key.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let secret = SecretKey::from_ed25519_bytes(bytes)
            .map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;
        Ok(Sr25519KeyProvider {
            keypair: secret.to_keypair(),
        })
    }

    /// Create a provider from a 32-byte mini secret (seed).
    ///
    /// # Arguments
    /// * `seed` - The 32-byte mini secret key.
    ///
    /// # Returns
    /// A provider, or an error if the seed is invalid.
    pub fn from_mini_secret(seed: &[u8]) -> Result<Self, KeyError> {
        let mini = MiniSecretKey::from_bytes(seed)
            .map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;
        Ok(Sr25519KeyProvider {
            keypair: mini.expand_to_keypair(ExpansionMode::Ed25519),
        })
    }

    /// The 32-byte public key as 64 hex characters.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.keypair.public.to_bytes())
    }
}

impl KeyProviderSync for Sr25519KeyProvider {
    fn public_key(&self) -> String {
        self.public_key_hex()
    }

    fn sign(&self, digest: &[u8]) -> Result<SignatureParts, KeyError> {
        let digest = check_digest(digest)?;
        let context = signing_context(SUBSTRATE_SIGNING_CONTEXT);
        let signature = self.keypair.sign(context.bytes(&digest));
        let bytes = signature.to_bytes();
        Ok(SignatureParts {
            r: hex::encode(&bytes[0..32]),
            s: hex::encode(&bytes[32..64]),
            recovery_id: 0,
        })
    }
}
