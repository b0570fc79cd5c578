//! Accumulating builder from a transaction request to a [`Psbt`].

use txforge_script::{Address, Network, Script};

use crate::psbt::{Psbt, PsbtInput, UtxoProof};
use crate::request::TxData;
use crate::transaction::{Transaction, TransactionInput, TransactionOutput};
use crate::PsbtError;

/// Outputs at or below this value are not worth their spend cost and
/// are absorbed into the fee instead of becoming change.
pub const DEFAULT_DUST_THRESHOLD: u64 = 546;

/// Builds a [`Psbt`] from a [`TxData`] request. Single use: inputs and
/// outputs are accumulated, then [`PsbtBuilder::into_psbt`] consumes
/// the builder.
pub struct PsbtBuilder {
    network: Network,
    dust_threshold: u64,
    tx: Transaction,
    psbt_inputs: Vec<PsbtInput>,
}

impl PsbtBuilder {
    /// Create a builder for the given network with the default dust
    /// threshold.
    pub fn new(network: Network) -> Self {
        PsbtBuilder {
            network,
            dust_threshold: DEFAULT_DUST_THRESHOLD,
            tx: Transaction::new(),
            psbt_inputs: Vec::new(),
        }
    }

    /// Override the dust threshold.
    pub fn with_dust_threshold(mut self, dust_threshold: u64) -> Self {
        self.dust_threshold = dust_threshold;
        self
    }

    /// Attach every input of the request, with its UTXO proof.
    ///
    /// Legacy inputs carry the full previous transaction, which is
    /// cross-checked against the outpoint (transaction id and spent
    /// value). Witness inputs carry the descriptor, whose value must
    /// match the input's declared value.
    ///
    /// # Arguments
    /// * `data` - The transaction request.
    ///
    /// # Returns
    /// `Ok(())`, or a `Construction` error naming the offending input.
    pub fn add_inputs_for_psbt(&mut self, data: &TxData) -> Result<(), PsbtError> {
        data.validate()?;
        for (i, item) in data.inputs.iter().enumerate() {
            let input = TransactionInput::new(&item.hash, item.index)?;

            let proof = if let Some(prev_hex) = &item.non_witness_utxo {
                let prev_tx = Transaction::from_hex(prev_hex)?;
                if !prev_tx.tx_id_hex().eq_ignore_ascii_case(&item.hash) {
                    return Err(PsbtError::Construction(format!(
                        "input {}: previous transaction does not match outpoint {}",
                        i, item.hash
                    )));
                }
                let spent = prev_tx.outputs.get(item.index as usize).ok_or_else(|| {
                    PsbtError::Construction(format!(
                        "input {}: previous transaction has no output {}",
                        i, item.index
                    ))
                })?;
                if spent.value != item.value {
                    return Err(PsbtError::Construction(format!(
                        "input {}: declared value {} does not match spent output value {}",
                        i, item.value, spent.value
                    )));
                }
                UtxoProof::NonWitness(prev_tx)
            } else if let Some(witness) = &item.witness_utxo {
                if witness.value != item.value {
                    return Err(PsbtError::Construction(format!(
                        "input {}: declared value {} does not match witness descriptor value {}",
                        i, item.value, witness.value
                    )));
                }
                UtxoProof::Witness {
                    public_key: witness.public_key.clone(),
                    script: Script::from_hex(&witness.script)?,
                    value: witness.value,
                }
            } else {
                // Unreachable after validate, but keep the invariant local.
                return Err(PsbtError::Construction(format!(
                    "input {}: no proof mode",
                    i
                )));
            };

            self.tx.inputs.push(input);
            self.psbt_inputs.push(PsbtInput {
                proof,
                partial_sigs: Vec::new(),
            });
        }
        Ok(())
    }

    /// Attach the request's outputs, computing change when needed.
    ///
    /// Explicit outputs are taken verbatim after checking the funds
    /// invariant. Otherwise a single payment to `to` is emitted and the
    /// leftover above the dust threshold becomes a change output to
    /// `change_address`; dust-or-below leftover is absorbed into the
    /// fee.
    ///
    /// # Arguments
    /// * `data` - The transaction request.
    ///
    /// # Returns
    /// `Ok(())`, `InsufficientFunds` when inputs cannot cover outputs
    /// plus fee, or `Construction` for a missing required address.
    pub fn add_output_for_psbt(&mut self, data: &TxData) -> Result<(), PsbtError> {
        data.validate()?;
        let total_in = data.total_input_value().ok_or_else(|| {
            PsbtError::Construction("input values overflow u64".to_string())
        })?;

        if let Some(outputs) = &data.outputs {
            let total_out = outputs
                .iter()
                .try_fold(0u64, |acc, output| acc.checked_add(output.value))
                .ok_or_else(|| {
                    PsbtError::Construction("output values overflow u64".to_string())
                })?;
            let covered = total_out
                .checked_add(data.fee)
                .map_or(false, |required| total_in >= required);
            if !covered {
                return Err(PsbtError::InsufficientFunds {
                    inputs: total_in,
                    outputs: total_out,
                    fee: data.fee,
                });
            }
            for output in outputs {
                let address = self.parse_address(&output.address)?;
                self.tx
                    .outputs
                    .push(TransactionOutput::new(output.value, address.locking_script()));
            }
            return Ok(());
        }

        // validate() guarantees both are present here.
        let to = data
            .to
            .as_ref()
            .ok_or_else(|| PsbtError::Construction("destination address missing".to_string()))?;
        let amount = data
            .amount
            .ok_or_else(|| PsbtError::Construction("amount missing".to_string()))?;

        let leftover = total_in
            .checked_sub(amount)
            .and_then(|rest| rest.checked_sub(data.fee))
            .ok_or(PsbtError::InsufficientFunds {
                inputs: total_in,
                outputs: amount,
                fee: data.fee,
            })?;

        let destination = self.parse_address(to)?;
        self.tx
            .outputs
            .push(TransactionOutput::new(amount, destination.locking_script()));

        if leftover > self.dust_threshold {
            let change_address = data.change_address.as_ref().ok_or_else(|| {
                PsbtError::Construction(
                    "change address required for non-dust leftover".to_string(),
                )
            })?;
            let change = self.parse_address(change_address)?;
            self.tx
                .outputs
                .push(TransactionOutput::new(leftover, change.locking_script()));
        }
        Ok(())
    }

    fn parse_address(&self, address: &str) -> Result<Address, PsbtError> {
        let parsed = Address::from_string(address)?;
        if parsed.network() != self.network {
            return Err(PsbtError::Construction(format!(
                "address {} belongs to a different network",
                address
            )));
        }
        Ok(parsed)
    }

    /// Hand over the accumulated state as a [`Psbt`], consuming the
    /// builder.
    pub fn into_psbt(self) -> Psbt {
        Psbt::from_parts(self.tx, self.psbt_inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{TxInputItem, TxOutputItem, WitnessUtxo};

    const DEST: &str = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";
    const CHANGE: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
    const PUB_HEX: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn witness_input(value: u64) -> TxInputItem {
        TxInputItem {
            hash: "11".repeat(32),
            index: 0,
            value,
            non_witness_utxo: None,
            witness_utxo: Some(WitnessUtxo {
                public_key: PUB_HEX.to_string(),
                script: "0014751e76e8199196d454941c45d1b3a323f1433bd6".to_string(),
                value,
            }),
        }
    }

    fn request(value: u64, amount: u64, fee: u64) -> TxData {
        TxData {
            inputs: vec![witness_input(value)],
            outputs: None,
            to: Some(DEST.to_string()),
            amount: Some(amount),
            fee,
            change_address: Some(CHANGE.to_string()),
        }
    }

    #[test]
    fn test_change_emitted_above_dust() {
        let data = request(100_000, 60_000, 1_000);
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        builder.add_inputs_for_psbt(&data).unwrap();
        builder.add_output_for_psbt(&data).unwrap();
        let psbt = builder.into_psbt();

        let tx = psbt.unsigned_tx();
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[0].value, 60_000);
        assert_eq!(tx.outputs[1].value, 39_000);
        assert!(tx.outputs[1].locking_script.is_p2wpkh());
    }

    #[test]
    fn test_dust_leftover_absorbed_into_fee() {
        // Leftover is exactly the threshold: absorbed, no change output.
        let data = request(61_546, 60_000, 1_000);
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        builder.add_inputs_for_psbt(&data).unwrap();
        builder.add_output_for_psbt(&data).unwrap();
        let psbt = builder.into_psbt();
        assert_eq!(psbt.unsigned_tx().outputs.len(), 1);
    }

    #[test]
    fn test_exact_spend_no_change() {
        let data = request(61_000, 60_000, 1_000);
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        builder.add_inputs_for_psbt(&data).unwrap();
        builder.add_output_for_psbt(&data).unwrap();
        assert_eq!(builder.into_psbt().unsigned_tx().outputs.len(), 1);
    }

    #[test]
    fn test_insufficient_funds() {
        let data = request(50_000, 60_000, 1_000);
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        builder.add_inputs_for_psbt(&data).unwrap();
        let err = builder.add_output_for_psbt(&data).unwrap_err();
        assert!(matches!(err, PsbtError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_overflowing_values_rejected() {
        // Output values summing past u64::MAX must not wrap the funds check.
        let overflowing_outputs = TxData {
            inputs: vec![witness_input(1_000)],
            outputs: Some(vec![
                TxOutputItem {
                    address: DEST.to_string(),
                    value: u64::MAX,
                },
                TxOutputItem {
                    address: CHANGE.to_string(),
                    value: 2,
                },
            ]),
            to: None,
            amount: None,
            fee: 0,
            change_address: None,
        };
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        builder.add_inputs_for_psbt(&overflowing_outputs).unwrap();
        assert!(matches!(
            builder.add_output_for_psbt(&overflowing_outputs),
            Err(PsbtError::Construction(_))
        ));

        // Output total plus fee overflowing is simply unaffordable.
        let overflowing_fee = TxData {
            inputs: vec![witness_input(1_000)],
            outputs: Some(vec![TxOutputItem {
                address: DEST.to_string(),
                value: u64::MAX,
            }]),
            to: None,
            amount: None,
            fee: 1,
            change_address: None,
        };
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        builder.add_inputs_for_psbt(&overflowing_fee).unwrap();
        assert!(matches!(
            builder.add_output_for_psbt(&overflowing_fee),
            Err(PsbtError::InsufficientFunds { .. })
        ));

        // Input values summing past u64::MAX are rejected outright.
        let mut data = request(u64::MAX, 60_000, 1_000);
        data.inputs.push(witness_input(2));
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        builder.add_inputs_for_psbt(&data).unwrap();
        assert!(matches!(
            builder.add_output_for_psbt(&data),
            Err(PsbtError::Construction(_))
        ));
    }

    #[test]
    fn test_missing_change_address_for_leftover() {
        let mut data = request(100_000, 60_000, 1_000);
        data.change_address = None;
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        builder.add_inputs_for_psbt(&data).unwrap();
        assert!(matches!(
            builder.add_output_for_psbt(&data),
            Err(PsbtError::Construction(_))
        ));
    }

    #[test]
    fn test_explicit_outputs_taken_verbatim() {
        let data = TxData {
            inputs: vec![witness_input(100_000)],
            outputs: Some(vec![
                TxOutputItem {
                    address: DEST.to_string(),
                    value: 40_000,
                },
                TxOutputItem {
                    address: CHANGE.to_string(),
                    value: 59_000,
                },
            ]),
            to: None,
            amount: None,
            fee: 1_000,
            change_address: None,
        };
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        builder.add_inputs_for_psbt(&data).unwrap();
        builder.add_output_for_psbt(&data).unwrap();
        let psbt = builder.into_psbt();
        assert_eq!(psbt.unsigned_tx().outputs.len(), 2);
        assert!(psbt.unsigned_tx().outputs[0].locking_script.is_p2pkh());
    }

    #[test]
    fn test_non_witness_proof_cross_checks() {
        // Build a believable previous transaction paying to a P2PKH output.
        let mut prev = Transaction::new();
        prev.inputs
            .push(TransactionInput::new(&"22".repeat(32), 0).unwrap());
        prev.outputs.push(TransactionOutput::new(
            70_000,
            Address::from_string(DEST).unwrap().locking_script(),
        ));

        let good = TxData {
            inputs: vec![TxInputItem {
                hash: prev.tx_id_hex(),
                index: 0,
                value: 70_000,
                non_witness_utxo: Some(prev.to_hex()),
                witness_utxo: None,
            }],
            outputs: None,
            to: Some(DEST.to_string()),
            amount: Some(60_000),
            fee: 1_000,
            change_address: Some(CHANGE.to_string()),
        };
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        builder.add_inputs_for_psbt(&good).unwrap();

        // Mismatched outpoint txid is rejected.
        let mut bad = good.clone();
        bad.inputs[0].hash = "33".repeat(32);
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        assert!(matches!(
            builder.add_inputs_for_psbt(&bad),
            Err(PsbtError::Construction(_))
        ));

        // Mismatched value is rejected.
        let mut bad = good.clone();
        bad.inputs[0].value = 80_000;
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        assert!(builder.add_inputs_for_psbt(&bad).is_err());
    }

    #[test]
    fn test_rejects_wrong_network_address() {
        let mut data = request(100_000, 60_000, 1_000);
        data.to = Some("mrCDrCybB6J1vRfbwM5hemdJz73FwDBC8r".to_string()); // testnet
        let mut builder = PsbtBuilder::new(Network::Mainnet);
        builder.add_inputs_for_psbt(&data).unwrap();
        assert!(matches!(
            builder.add_output_for_psbt(&data),
            Err(PsbtError::Construction(_))
        ));
    }

    #[test]
    fn test_custom_dust_threshold() {
        let data = request(61_100, 60_000, 1_000); // leftover 100
        let mut builder = PsbtBuilder::new(Network::Mainnet).with_dust_threshold(50);
        builder.add_inputs_for_psbt(&data).unwrap();
        builder.add_output_for_psbt(&data).unwrap();
        assert_eq!(builder.into_psbt().unsigned_tx().outputs.len(), 2);
    }
}
