//! Elliptic-curve types used by the signing pipeline.
//!
//! The pipeline itself is algorithm-agnostic: it only moves fixed-width
//! r/s signature halves around. This module provides the secp256k1 side
//! of that contract — public key parsing and ECDSA verification — which
//! the finalizer uses to validate assembled signatures.

pub mod public_key;
pub mod signature;

pub use public_key::PublicKey;
pub use signature::Signature;
