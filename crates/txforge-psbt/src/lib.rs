//! Transaction construction and partially-signed transaction handling.
//!
//! The flow is: describe the spend as a [`request::TxData`], accumulate
//! it into a [`Psbt`] with the [`PsbtBuilder`], collect signatures over
//! the per-input digests, then validate, finalize and extract the fully
//! signed transaction.

pub mod builder;
pub mod psbt;
pub mod request;
pub mod sighash;
pub mod transaction;

mod error;

#[cfg(test)]
mod tests;

pub use builder::PsbtBuilder;
pub use error::PsbtError;
pub use psbt::{ParsedInput, ParsedOutput, ParsedPsbt, Psbt, SignedTx};
pub use request::{TxData, TxInputItem, TxOutputItem, WitnessUtxo};
pub use transaction::{Transaction, TransactionInput, TransactionOutput};
