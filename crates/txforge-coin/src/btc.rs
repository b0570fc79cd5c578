//! The Bitcoin coin facade: address handling, the signature
//! orchestrator, PSBT interchange and message signing.

use txforge_keys::{KeyProvider, KeyProviderSync};
use txforge_message::{sign_message, sign_message_sync};
use txforge_psbt::builder::DEFAULT_DUST_THRESHOLD;
use txforge_psbt::{ParsedPsbt, Psbt, PsbtBuilder, SignedTx, TxData};
use txforge_script::{Address, AddressType, Network};

use crate::coin::{SignatureFuture, TxFuture, UtxoCoin};
use crate::CoinError;

/// Bitcoin on a fixed network.
pub struct Btc {
    network: Network,
    dust_threshold: u64,
}

impl Btc {
    /// Create a facade for the given network with the default dust
    /// threshold.
    pub fn new(network: Network) -> Self {
        Btc {
            network,
            dust_threshold: DEFAULT_DUST_THRESHOLD,
        }
    }

    /// Override the dust threshold.
    pub fn with_dust_threshold(mut self, dust_threshold: u64) -> Self {
        self.dust_threshold = dust_threshold;
        self
    }

    /// The network this facade targets.
    pub fn network(&self) -> Network {
        self.network
    }

    fn build_psbt(&self, data: &TxData) -> Result<Psbt, CoinError> {
        let mut builder =
            PsbtBuilder::new(self.network).with_dust_threshold(self.dust_threshold);
        builder.add_inputs_for_psbt(data)?;
        builder.add_output_for_psbt(data)?;
        Ok(builder.into_psbt())
    }

    fn extract(mut psbt: Psbt) -> Result<SignedTx, CoinError> {
        psbt.validate_signatures_of_all_inputs()?;
        psbt.finalize_all_inputs()?;
        Ok(psbt.extract_tx()?)
    }

    /// Quick prefix check before attempting a full decode.
    fn address_prefix_plausible(&self, address: &str) -> bool {
        match self.network {
            Network::Mainnet => {
                address.starts_with('1') || address.starts_with('3') || address.starts_with("bc1")
            }
            Network::Testnet => {
                address.starts_with('m')
                    || address.starts_with('n')
                    || address.starts_with('2')
                    || address.starts_with("tb1")
            }
        }
    }
}

impl UtxoCoin for Btc {
    fn generate_address(
        &self,
        public_key_hex: &str,
        address_type: AddressType,
    ) -> Result<String, CoinError> {
        let address = Address::from_public_key(public_key_hex, address_type, self.network)?;
        Ok(address.address_string().to_string())
    }

    fn is_address_valid(&self, address: &str) -> bool {
        if !self.address_prefix_plausible(address) {
            return false;
        }
        match Address::from_string(address) {
            Ok(parsed) => parsed.network() == self.network,
            Err(_) => false,
        }
    }

    fn generate_transaction<'a>(
        &'a self,
        data: &'a TxData,
        signers: &'a [&'a dyn KeyProvider],
    ) -> TxFuture<'a> {
        Box::pin(async move {
            let mut psbt = self.build_psbt(data)?;
            for signer in signers {
                let public_key = signer.public_key();
                for index in 0..psbt.input_count() {
                    let digest = psbt.signing_digest(index)?;
                    // Any signer failure aborts; no partial result escapes.
                    let parts = signer.sign(&digest).await?;
                    let signature = hex::decode(parts.to_concat_hex())?;
                    psbt.add_partial_signature(index, &public_key, &signature)?;
                }
            }
            Self::extract(psbt)
        })
    }

    fn generate_transaction_sync(
        &self,
        data: &TxData,
        signers: &[&dyn KeyProviderSync],
    ) -> Result<SignedTx, CoinError> {
        let mut psbt = self.build_psbt(data)?;
        for signer in signers {
            let public_key = signer.public_key();
            for index in 0..psbt.input_count() {
                let digest = psbt.signing_digest(index)?;
                let parts = signer.sign(&digest)?;
                let signature = hex::decode(parts.to_concat_hex())?;
                psbt.add_partial_signature(index, &public_key, &signature)?;
            }
        }
        Self::extract(psbt)
    }

    fn generate_psbt(&self, data: &TxData) -> Result<String, CoinError> {
        Ok(self.build_psbt(data)?.to_base64())
    }

    fn parse_psbt(&self, encoded: &str) -> Result<ParsedPsbt, CoinError> {
        let psbt = Psbt::from_base64(encoded)?;
        Ok(psbt.parsed(self.network)?)
    }

    fn sign_message<'a>(
        &'a self,
        message: &'a [u8],
        provider: &'a dyn KeyProvider,
    ) -> SignatureFuture<'a> {
        Box::pin(async move { Ok(sign_message(provider, message).await?) })
    }

    fn sign_message_sync(
        &self,
        message: &[u8],
        provider: &dyn KeyProviderSync,
    ) -> Result<String, CoinError> {
        Ok(sign_message_sync(provider, message)?)
    }
}
