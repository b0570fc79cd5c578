//! The key provider abstraction.
//!
//! Providers expose a public key and sign fixed 32-byte digests. The
//! async [`KeyProvider`] trait returns boxed futures so heterogeneous
//! provider lists (`&[&dyn KeyProvider]`) work with providers backed by
//! network services; the blocking [`KeyProviderSync`] variant serves
//! purely in-process keys.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::KeyError;

/// A signature split into its scalar halves plus a recovery id.
///
/// `r` and `s` are fixed-width 64-character hex strings. For algorithms
/// without public key recovery, `recovery_id` is 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParts {
    pub r: String,
    pub s: String,
    #[serde(rename = "recId")]
    pub recovery_id: u8,
}

impl SignatureParts {
    /// Concatenate `r` and `s` into a single 128-character hex string.
    pub fn to_concat_hex(&self) -> String {
        format!("{}{}", self.r, self.s)
    }
}

/// A future returned by [`KeyProvider::sign`].
pub type SignFuture<'a> = Pin<Box<dyn Future<Output = Result<SignatureParts, KeyError>> + Send + 'a>>;

/// An asynchronous signer bound to one key.
pub trait KeyProvider: Send + Sync {
    /// The hex-encoded public key this provider signs for.
    ///
    /// # Returns
    /// The public key in its algorithm-native hex encoding.
    fn public_key(&self) -> String;

    /// Sign a 32-byte digest.
    ///
    /// # Arguments
    /// * `digest` - The 32-byte hash to sign.
    ///
    /// # Returns
    /// A future resolving to the signature parts, or an error if the
    /// digest is malformed or the backend fails.
    fn sign<'a>(&'a self, digest: &'a [u8]) -> SignFuture<'a>;
}

/// A blocking signer bound to one key.
pub trait KeyProviderSync: Send + Sync {
    /// The hex-encoded public key this provider signs for.
    fn public_key(&self) -> String;

    /// Sign a 32-byte digest, blocking until done.
    ///
    /// # Arguments
    /// * `digest` - The 32-byte hash to sign.
    ///
    /// # Returns
    /// The signature parts, or an error if the digest is malformed or
    /// the backend fails.
    fn sign(&self, digest: &[u8]) -> Result<SignatureParts, KeyError>;
}

/// Every blocking provider is trivially usable as an async provider.
impl<T: KeyProviderSync> KeyProvider for T {
    fn public_key(&self) -> String {
        KeyProviderSync::public_key(self)
    }

    fn sign<'a>(&'a self, digest: &'a [u8]) -> SignFuture<'a> {
        Box::pin(async move { KeyProviderSync::sign(self, digest) })
    }
}

pub(crate) fn check_digest(digest: &[u8]) -> Result<[u8; 32], KeyError> {
    if digest.len() != 32 {
        return Err(KeyError::InvalidDigestLength(digest.len()));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(digest);
    Ok(out)
}
