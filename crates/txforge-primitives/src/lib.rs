/// txforge SDK - Cryptographic primitives, hashing, and wire-format utilities.
///
/// This crate provides the foundational building blocks for the txforge SDK:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
/// - Variable-length integer encoding and byte reader/writer types
/// - secp256k1 public keys and r/s-style signatures with DER support

pub mod hash;
pub mod util;
pub mod ec;

mod error;
pub use ec::{PublicKey, Signature};
pub use error::PrimitivesError;
