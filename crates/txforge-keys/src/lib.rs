//! Key providers and signing backends.
//!
//! A [`KeyProvider`] supplies a public key and signs 32-byte digests,
//! abstracting over where the key material lives (in-process, hardware,
//! remote service) and which algorithm it uses. The crate ships two
//! in-process providers: secp256k1 ECDSA and sr25519 Schnorr.

pub mod provider;
pub mod secp256k1;
pub mod sr25519;

mod error;

pub use error::KeyError;
pub use provider::{KeyProvider, KeyProviderSync, SignatureParts};
pub use secp256k1::Secp256k1KeyProvider;
pub use sr25519::Sr25519KeyProvider;
