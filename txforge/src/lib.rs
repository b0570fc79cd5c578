#![deny(missing_docs)]

//! txforge - Complete toolkit.
//!
//! Re-exports all txforge components for convenient single-crate usage.

pub use txforge_primitives as primitives;
pub use txforge_script as script;
pub use txforge_keys as keys;
pub use txforge_psbt as psbt;
pub use txforge_message as message;
pub use txforge_coin as coin;
