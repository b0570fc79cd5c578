//! The coin capability traits and the closed-set factory.

use std::future::Future;
use std::pin::Pin;

use txforge_keys::{KeyProvider, KeyProviderSync};
use txforge_psbt::{ParsedPsbt, SignedTx, TxData};
use txforge_script::{AddressType, Network};

use crate::btc::Btc;
use crate::xrp::Xrp;
use crate::CoinError;

/// A future resolving to an extracted transaction.
pub type TxFuture<'a> = Pin<Box<dyn Future<Output = Result<SignedTx, CoinError>> + Send + 'a>>;
/// A future resolving to a message signature.
pub type SignatureFuture<'a> = Pin<Box<dyn Future<Output = Result<String, CoinError>> + Send + 'a>>;

/// Capabilities of a UTXO chain.
pub trait UtxoCoin: Send + Sync {
    /// Derive an address of the requested form from a public key.
    fn generate_address(
        &self,
        public_key_hex: &str,
        address_type: AddressType,
    ) -> Result<String, CoinError>;

    /// Check whether a string is a valid address on this coin's
    /// network. Never fails; malformed input is simply `false`.
    fn is_address_valid(&self, address: &str) -> bool;

    /// Build, sign, finalize and extract a transaction, awaiting each
    /// signer strictly in sequence.
    fn generate_transaction<'a>(
        &'a self,
        data: &'a TxData,
        signers: &'a [&'a dyn KeyProvider],
    ) -> TxFuture<'a>;

    /// Blocking variant of [`UtxoCoin::generate_transaction`].
    fn generate_transaction_sync(
        &self,
        data: &TxData,
        signers: &[&dyn KeyProviderSync],
    ) -> Result<SignedTx, CoinError>;

    /// Build an unsigned PSBT from a request and encode it for
    /// interchange.
    fn generate_psbt(&self, data: &TxData) -> Result<String, CoinError>;

    /// Decode an interchange PSBT and render its inputs and outputs.
    fn parse_psbt(&self, encoded: &str) -> Result<ParsedPsbt, CoinError>;

    /// Sign a message under the coin's message-signing domain.
    fn sign_message<'a>(
        &'a self,
        message: &'a [u8],
        provider: &'a dyn KeyProvider,
    ) -> SignatureFuture<'a>;

    /// Blocking variant of [`UtxoCoin::sign_message`].
    fn sign_message_sync(
        &self,
        message: &[u8],
        provider: &dyn KeyProviderSync,
    ) -> Result<String, CoinError>;
}

/// Capabilities of an account chain. Transaction construction for
/// account chains is outside this core.
pub trait AccountCoin: Send + Sync {
    /// Derive the chain's canonical address from a public key.
    fn generate_address(&self, public_key_hex: &str) -> Result<String, CoinError>;

    /// Check whether a string is a valid address. Never fails.
    fn is_address_valid(&self, address: &str) -> bool;
}

/// The supported chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinKind {
    Btc,
    Xrp,
}

/// A constructed coin, tagged by chain.
pub enum Coin {
    Btc(Btc),
    Xrp(Xrp),
}

impl Coin {
    /// Construct a coin for the given chain and network.
    ///
    /// # Arguments
    /// * `kind` - Which chain.
    /// * `network` - The network (ignored by chains without a testnet
    ///   distinction in this core).
    ///
    /// # Returns
    /// The constructed coin.
    pub fn new(kind: CoinKind, network: Network) -> Self {
        match kind {
            CoinKind::Btc => Coin::Btc(Btc::new(network)),
            CoinKind::Xrp => Coin::Xrp(Xrp::new()),
        }
    }

    /// Check address validity regardless of chain kind.
    pub fn is_address_valid(&self, address: &str) -> bool {
        match self {
            Coin::Btc(btc) => btc.is_address_valid(address),
            Coin::Xrp(xrp) => xrp.is_address_valid(address),
        }
    }
}
