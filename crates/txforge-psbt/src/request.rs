//! The JSON-shaped transaction request contract.
//!
//! A [`TxData`] describes a spend: the UTXOs to consume, either an
//! explicit output list or a single destination with amount, the fee,
//! and where change goes. Field names follow the camelCase JSON
//! contract callers supply.

use serde::{Deserialize, Serialize};

use crate::PsbtError;

/// A witness-mode UTXO proof: the spent output's script and value plus
/// the public key that can spend it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitnessUtxo {
    /// Compressed public key hex controlling the output.
    pub public_key: String,
    /// The spent output's locking script, hex-encoded.
    pub script: String,
    /// The spent output's value in base units.
    pub value: u64,
}

/// One UTXO to spend.
///
/// Exactly one proof mode must be present: `non_witness_utxo` (the full
/// previous transaction, hex) for legacy inputs, or `witness_utxo` for
/// segwit-style inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInputItem {
    /// The source transaction id in display order.
    pub hash: String,
    /// The output index within the source transaction.
    pub index: u32,
    /// The spent output's value in base units.
    pub value: u64,
    /// Full previous transaction hex (legacy proof mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_witness_utxo: Option<String>,
    /// Witness descriptor (segwit proof mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness_utxo: Option<WitnessUtxo>,
}

/// One explicit output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutputItem {
    /// Destination address.
    pub address: String,
    /// Value in base units.
    pub value: u64,
}

/// A full transaction request.
///
/// Either `outputs` is given verbatim, or `to` + `amount` describe a
/// single payment and the builder computes change against
/// `change_address`. `fee` is always explicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxData {
    pub inputs: Vec<TxInputItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<TxOutputItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    pub fee: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_address: Option<String>,
}

impl TxData {
    /// Sum of all input values, or `None` if the sum overflows `u64`.
    pub fn total_input_value(&self) -> Option<u64> {
        self.inputs
            .iter()
            .try_fold(0u64, |acc, input| acc.checked_add(input.value))
    }

    /// Check structural invariants before building.
    ///
    /// Requires at least one input, exactly one output mode (`outputs`
    /// xor `to`+`amount`), and exactly one proof mode per input.
    ///
    /// # Returns
    /// `Ok(())`, or a `Construction` error naming the violation.
    pub fn validate(&self) -> Result<(), PsbtError> {
        if self.inputs.is_empty() {
            return Err(PsbtError::Construction("no inputs supplied".to_string()));
        }
        match (&self.outputs, &self.to, &self.amount) {
            (Some(_), None, None) => {}
            (None, Some(_), Some(_)) => {}
            (Some(_), _, _) => {
                return Err(PsbtError::Construction(
                    "outputs cannot be combined with to/amount".to_string(),
                ))
            }
            _ => {
                return Err(PsbtError::Construction(
                    "either outputs or both to and amount must be supplied".to_string(),
                ))
            }
        }
        for (i, input) in self.inputs.iter().enumerate() {
            match (&input.non_witness_utxo, &input.witness_utxo) {
                (Some(_), None) | (None, Some(_)) => {}
                (Some(_), Some(_)) => {
                    return Err(PsbtError::Construction(format!(
                        "input {} carries both proof modes",
                        i
                    )))
                }
                (None, None) => {
                    return Err(PsbtError::Construction(format!(
                        "input {} carries neither a previous transaction nor a witness descriptor",
                        i
                    )))
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn witness_input() -> TxInputItem {
        TxInputItem {
            hash: "11".repeat(32),
            index: 0,
            value: 100_000,
            non_witness_utxo: None,
            witness_utxo: Some(WitnessUtxo {
                public_key: "02".repeat(33),
                script: "0014".to_string() + &"00".repeat(20),
                value: 100_000,
            }),
        }
    }

    #[test]
    fn test_camel_case_contract() {
        let data = TxData {
            inputs: vec![witness_input()],
            outputs: None,
            to: Some("addr".to_string()),
            amount: Some(90_000),
            fee: 1_000,
            change_address: Some("change".to_string()),
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"changeAddress\""));
        assert!(json.contains("\"witnessUtxo\""));
        assert!(json.contains("\"publicKey\""));
        assert!(!json.contains("\"outputs\""));

        let back: TxData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_validate_output_modes() {
        let mut data = TxData {
            inputs: vec![witness_input()],
            outputs: None,
            to: None,
            amount: None,
            fee: 500,
            change_address: None,
        };
        assert!(data.validate().is_err());

        data.to = Some("addr".to_string());
        assert!(data.validate().is_err()); // amount still missing

        data.amount = Some(1_000);
        assert!(data.validate().is_ok());

        data.outputs = Some(vec![TxOutputItem {
            address: "addr".to_string(),
            value: 1_000,
        }]);
        assert!(data.validate().is_err()); // both modes
    }

    #[test]
    fn test_validate_proof_modes() {
        let mut input = witness_input();
        input.non_witness_utxo = Some("00".to_string());
        let data = TxData {
            inputs: vec![input.clone()],
            outputs: Some(vec![]),
            to: None,
            amount: None,
            fee: 0,
            change_address: None,
        };
        assert!(data.validate().is_err()); // both proofs

        input.non_witness_utxo = None;
        input.witness_utxo = None;
        let data = TxData {
            inputs: vec![input],
            outputs: Some(vec![]),
            to: None,
            amount: None,
            fee: 0,
            change_address: None,
        };
        assert!(data.validate().is_err()); // neither proof
    }

    #[test]
    fn test_total_input_value() {
        let mut second = witness_input();
        second.value = 25_000;
        let data = TxData {
            inputs: vec![witness_input(), second],
            outputs: Some(vec![]),
            to: None,
            amount: None,
            fee: 0,
            change_address: None,
        };
        assert_eq!(data.total_input_value(), Some(125_000));
    }

    #[test]
    fn test_total_input_value_overflow() {
        let mut first = witness_input();
        first.value = u64::MAX;
        let mut second = witness_input();
        second.value = 2;
        let data = TxData {
            inputs: vec![first, second],
            outputs: Some(vec![]),
            to: None,
            amount: None,
            fee: 0,
            change_address: None,
        };
        assert_eq!(data.total_input_value(), None);
    }
}
