//! Per-chain coin facades.
//!
//! A coin bundles address handling, transaction construction and
//! message signing for one chain behind a small capability surface:
//! [`UtxoCoin`] for UTXO chains, [`AccountCoin`] for account chains.
//! [`Coin::new`] is the closed-set factory over the supported chains.

pub mod btc;
pub mod coin;
pub mod xrp;

mod error;

pub use btc::Btc;
pub use coin::{AccountCoin, Coin, CoinKind, UtxoCoin};
pub use error::CoinError;
pub use xrp::Xrp;
