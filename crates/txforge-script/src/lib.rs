/// txforge SDK - Script construction and address handling.
///
/// Provides the Script type with standard-template constructors and
/// classification, opcode definitions, and address generation/validation
/// for Base58Check and Bech32 encodings (plus the Ripple account-chain
/// variant).

pub mod script;
pub mod opcodes;
pub mod address;
pub mod ripple;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use address::{Address, AddressPayload, AddressType, Network};
