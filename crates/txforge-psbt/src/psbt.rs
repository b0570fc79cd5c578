//! The partially-signed transaction container.
//!
//! A [`Psbt`] carries the unsigned transaction plus, per input, the
//! proof of the spent output and the partial signatures collected so
//! far. Signatures are validated against the per-input digests before
//! finalization converts them into unlocking data for the recognized
//! templates, after which the broadcastable transaction is extracted.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use txforge_primitives::hash::hash160;
use txforge_primitives::util::{TxReader, TxWriter, VarInt};
use txforge_primitives::{PublicKey, Signature};
use txforge_script::{Address, Network, Script};

use crate::sighash::{legacy_digest, witness_v0_digest, SIGHASH_ALL};
use crate::transaction::Transaction;
use crate::PsbtError;

const PSBT_MAGIC: &[u8; 4] = b"pstx";
const PSBT_VERSION: u8 = 1;

/// Proof of the output an input spends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtxoProof {
    /// The full previous transaction (legacy inputs).
    NonWitness(Transaction),
    /// The spent output's script and value plus the controlling key
    /// (segwit-style inputs).
    Witness {
        public_key: String,
        script: Script,
        value: u64,
    },
}

/// Per-input signing state: the proof plus partial signatures in
/// attachment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsbtInput {
    pub proof: UtxoProof,
    /// (public key hex, 64-byte r‖s signature), in attachment order.
    pub partial_sigs: Vec<(String, [u8; 64])>,
}

/// The extracted, broadcastable transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTx {
    pub tx_id: String,
    pub tx_hex: String,
}

/// One input of a parsed PSBT, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInput {
    pub tx_id: String,
    pub index: u32,
}

/// One output of a parsed PSBT, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedOutput {
    pub address: String,
    pub value: u64,
}

/// The display form of a PSBT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPsbt {
    pub inputs: Vec<ParsedInput>,
    pub outputs: Vec<ParsedOutput>,
}

/// A partially-signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Psbt {
    unsigned_tx: Transaction,
    inputs: Vec<PsbtInput>,
    finalized: bool,
}

impl Psbt {
    pub(crate) fn from_parts(unsigned_tx: Transaction, inputs: Vec<PsbtInput>) -> Self {
        Psbt {
            unsigned_tx,
            inputs,
            finalized: false,
        }
    }

    /// The unsigned transaction being assembled.
    pub fn unsigned_tx(&self) -> &Transaction {
        &self.unsigned_tx
    }

    /// Number of inputs.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    // -----------------------------------------------------------------------
    // Digests and signatures
    // -----------------------------------------------------------------------

    /// Compute the digest a signer must sign for one input.
    ///
    /// Non-witness inputs use the legacy SIGHASH_ALL algorithm over the
    /// spent output's locking script; witness inputs use the version-0
    /// witness algorithm with the key-hash script code and the spent
    /// value.
    ///
    /// # Arguments
    /// * `input_index` - The input to compute the digest for.
    ///
    /// # Returns
    /// The 32-byte digest, or an error if the index is out of range or
    /// the proof is inconsistent.
    pub fn signing_digest(&self, input_index: usize) -> Result<[u8; 32], PsbtError> {
        let input = self.inputs.get(input_index).ok_or_else(|| {
            PsbtError::Construction(format!(
                "input index {} out of range ({} inputs)",
                input_index,
                self.inputs.len()
            ))
        })?;
        match &input.proof {
            UtxoProof::NonWitness(prev_tx) => {
                let outpoint = &self.unsigned_tx.inputs[input_index];
                let spent = prev_tx
                    .outputs
                    .get(outpoint.source_output_index as usize)
                    .ok_or_else(|| {
                        PsbtError::Construction(format!(
                            "previous transaction has no output {}",
                            outpoint.source_output_index
                        ))
                    })?;
                legacy_digest(&self.unsigned_tx, input_index, &spent.locking_script)
            }
            UtxoProof::Witness {
                public_key, value, ..
            } => {
                let key_hash = pubkey_hash(public_key)?;
                let script_code = Script::p2pkh_lock(&key_hash);
                witness_v0_digest(&self.unsigned_tx, input_index, &script_code, *value)
            }
        }
    }

    /// Attach a partial signature to an input.
    ///
    /// Attachment order is preserved; no key ordering is enforced.
    ///
    /// # Arguments
    /// * `input_index` - The input the signature covers.
    /// * `public_key` - Hex of the key that produced the signature.
    /// * `signature` - The 64-byte r‖s signature.
    ///
    /// # Returns
    /// `Ok(())`, or an error for a bad index or signature length.
    pub fn add_partial_signature(
        &mut self,
        input_index: usize,
        public_key: &str,
        signature: &[u8],
    ) -> Result<(), PsbtError> {
        if signature.len() != 64 {
            return Err(PsbtError::Construction(format!(
                "signature must be 64 bytes, got {}",
                signature.len()
            )));
        }
        let input = self.inputs.get_mut(input_index).ok_or_else(|| {
            PsbtError::Construction(format!("input index {} out of range", input_index))
        })?;
        let mut sig = [0u8; 64];
        sig.copy_from_slice(signature);
        input.partial_sigs.push((public_key.to_string(), sig));
        Ok(())
    }

    /// Verify every attached signature against its input digest.
    ///
    /// Every input must carry at least one signature, and every
    /// signature must verify under its declared key.
    ///
    /// # Returns
    /// `Ok(())`, or the first failure as `SignatureVerification`.
    pub fn validate_signatures_of_all_inputs(&self) -> Result<(), PsbtError> {
        for (input_index, input) in self.inputs.iter().enumerate() {
            if input.partial_sigs.is_empty() {
                return Err(PsbtError::Construction(format!(
                    "input {} has no signatures",
                    input_index
                )));
            }
            let digest = self.signing_digest(input_index)?;
            for (public_key, sig_bytes) in &input.partial_sigs {
                let public_key_parsed = PublicKey::from_hex(public_key)?;
                let signature = Signature::from_fixed_bytes(sig_bytes)?;
                if !signature.verify(&digest, &public_key_parsed) {
                    return Err(PsbtError::SignatureVerification {
                        input_index,
                        public_key: public_key.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Finalization and extraction
    // -----------------------------------------------------------------------

    /// Convert validated signatures into unlocking data for every input.
    ///
    /// Recognized templates: P2PKH scriptSig, native P2WPKH witness,
    /// and P2SH-wrapped P2WPKH (redeem push plus witness). Anything
    /// else fails with `Construction`.
    ///
    /// # Returns
    /// `Ok(())` once all inputs carry unlocking data.
    pub fn finalize_all_inputs(&mut self) -> Result<(), PsbtError> {
        for input_index in 0..self.inputs.len() {
            self.finalize_input(input_index)?;
        }
        self.finalized = true;
        Ok(())
    }

    fn finalize_input(&mut self, input_index: usize) -> Result<(), PsbtError> {
        let input = &self.inputs[input_index];
        match &input.proof {
            UtxoProof::NonWitness(prev_tx) => {
                let outpoint = &self.unsigned_tx.inputs[input_index];
                let spent = prev_tx
                    .outputs
                    .get(outpoint.source_output_index as usize)
                    .ok_or_else(|| {
                        PsbtError::Construction(format!(
                            "previous transaction has no output {}",
                            outpoint.source_output_index
                        ))
                    })?;
                let locking = spent.locking_script.clone();
                if !locking.is_p2pkh() {
                    return Err(PsbtError::Construction(format!(
                        "input {}: only key-hash previous outputs can be finalized from a \
                         full previous transaction",
                        input_index
                    )));
                }
                let key_hash = locking.committed_hash().ok_or_else(|| {
                    PsbtError::Construction("malformed locking script".to_string())
                })?;
                let (public_key, sig) = self.signature_for_key_hash(input_index, &key_hash)?;
                let mut script_sig = Script::new();
                script_sig.append_push_data(&encode_sig_with_hashtype(&sig))?;
                script_sig.append_push_data(&hex::decode(&public_key)?)?;
                self.unsigned_tx.inputs[input_index].unlocking_script = script_sig;
            }
            UtxoProof::Witness {
                public_key,
                script,
                ..
            } => {
                let public_key = public_key.clone();
                let script = script.clone();
                let key_hash = pubkey_hash(&public_key)?;
                let (_, sig) = self.signature_for_pubkey(input_index, &public_key)?;
                let witness = vec![
                    encode_sig_with_hashtype(&sig),
                    hex::decode(&public_key)?,
                ];

                if script.is_p2wpkh() {
                    if script.committed_hash() != Some(key_hash) {
                        return Err(PsbtError::Construction(format!(
                            "input {}: witness program does not commit to the supplied key",
                            input_index
                        )));
                    }
                    self.unsigned_tx.inputs[input_index].unlocking_script = Script::new();
                } else if script.is_p2sh() {
                    let redeem = Script::p2wpkh_lock(&key_hash);
                    if script.committed_hash() != Some(hash160(redeem.to_bytes())) {
                        return Err(PsbtError::Construction(format!(
                            "input {}: script hash does not commit to the derived redeem script",
                            input_index
                        )));
                    }
                    let mut script_sig = Script::new();
                    script_sig.append_push_data(redeem.to_bytes())?;
                    self.unsigned_tx.inputs[input_index].unlocking_script = script_sig;
                } else {
                    return Err(PsbtError::Construction(format!(
                        "input {}: unrecognized locking script template",
                        input_index
                    )));
                }
                self.unsigned_tx.inputs[input_index].witness = witness;
            }
        }
        Ok(())
    }

    fn signature_for_key_hash(
        &self,
        input_index: usize,
        key_hash: &[u8; 20],
    ) -> Result<(String, [u8; 64]), PsbtError> {
        for (public_key, sig) in &self.inputs[input_index].partial_sigs {
            if &pubkey_hash(public_key)? == key_hash {
                return Ok((public_key.clone(), *sig));
            }
        }
        Err(PsbtError::Construction(format!(
            "input {}: no signature matches the spent output's key hash",
            input_index
        )))
    }

    fn signature_for_pubkey(
        &self,
        input_index: usize,
        public_key: &str,
    ) -> Result<(String, [u8; 64]), PsbtError> {
        for (candidate, sig) in &self.inputs[input_index].partial_sigs {
            if candidate.eq_ignore_ascii_case(public_key) {
                return Ok((candidate.clone(), *sig));
            }
        }
        Err(PsbtError::Construction(format!(
            "input {}: no signature under the descriptor's key",
            input_index
        )))
    }

    /// Extract the finalized transaction.
    ///
    /// # Returns
    /// The transaction id (display order) and broadcast hex, or an
    /// error if finalization has not run.
    pub fn extract_tx(&self) -> Result<SignedTx, PsbtError> {
        if !self.finalized {
            return Err(PsbtError::Construction(
                "transaction has not been finalized".to_string(),
            ));
        }
        Ok(SignedTx {
            tx_id: self.unsigned_tx.tx_id_hex(),
            tx_hex: self.unsigned_tx.to_hex(),
        })
    }

    // -----------------------------------------------------------------------
    // Interchange
    // -----------------------------------------------------------------------

    /// Encode the PSBT for interchange as base64.
    pub fn to_base64(&self) -> String {
        let mut writer = TxWriter::new();
        writer.write_bytes(PSBT_MAGIC);
        writer.write_u8(PSBT_VERSION);
        writer.write_var_bytes(&self.unsigned_tx.to_bytes_legacy());
        for input in &self.inputs {
            match &input.proof {
                UtxoProof::NonWitness(prev_tx) => {
                    writer.write_u8(0);
                    writer.write_var_bytes(&prev_tx.to_bytes());
                }
                UtxoProof::Witness {
                    public_key,
                    script,
                    value,
                } => {
                    writer.write_u8(1);
                    // Key hex is validated on construction, safe to decode.
                    writer.write_var_bytes(&hex::decode(public_key).unwrap_or_default());
                    writer.write_var_bytes(script.to_bytes());
                    writer.write_u64_le(*value);
                }
            }
            writer.write_varint(VarInt::from(input.partial_sigs.len()));
            for (public_key, sig) in &input.partial_sigs {
                writer.write_var_bytes(&hex::decode(public_key).unwrap_or_default());
                writer.write_bytes(sig);
            }
        }
        BASE64.encode(writer.into_bytes())
    }

    /// Decode a PSBT from its base64 interchange form.
    ///
    /// # Arguments
    /// * `encoded` - The base64 string produced by [`Psbt::to_base64`].
    ///
    /// # Returns
    /// The decoded PSBT, or a `Deserialization` error.
    pub fn from_base64(encoded: &str) -> Result<Self, PsbtError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| PsbtError::Deserialization(e.to_string()))?;
        let mut reader = TxReader::new(&bytes);

        let magic = reader.read_bytes(4)?;
        if magic != PSBT_MAGIC {
            return Err(PsbtError::Deserialization("bad magic".to_string()));
        }
        let version = reader.read_u8()?;
        if version != PSBT_VERSION {
            return Err(PsbtError::Deserialization(format!(
                "unsupported version {}",
                version
            )));
        }

        let tx_bytes = reader.read_var_bytes()?;
        let unsigned_tx = Transaction::from_bytes(tx_bytes)?;

        let mut inputs = Vec::with_capacity(unsigned_tx.inputs.len());
        for _ in 0..unsigned_tx.inputs.len() {
            let mode = reader.read_u8()?;
            let proof = match mode {
                0 => {
                    let prev_bytes = reader.read_var_bytes()?;
                    UtxoProof::NonWitness(Transaction::from_bytes(prev_bytes)?)
                }
                1 => {
                    let key_bytes = reader.read_var_bytes()?;
                    let script_bytes = reader.read_var_bytes()?;
                    let value = reader.read_u64_le()?;
                    UtxoProof::Witness {
                        public_key: hex::encode(key_bytes),
                        script: Script::from_bytes(script_bytes),
                        value,
                    }
                }
                other => {
                    return Err(PsbtError::Deserialization(format!(
                        "unknown proof mode {}",
                        other
                    )))
                }
            };
            let sig_count = reader.read_varint()?.value();
            let mut partial_sigs =
                Vec::with_capacity(sig_count.min(reader.remaining() as u64) as usize);
            for _ in 0..sig_count {
                let key_bytes = reader.read_var_bytes()?;
                let sig_bytes = reader.read_bytes(64)?;
                let mut sig = [0u8; 64];
                sig.copy_from_slice(sig_bytes);
                partial_sigs.push((hex::encode(key_bytes), sig));
            }
            inputs.push(PsbtInput {
                proof,
                partial_sigs,
            });
        }

        if reader.remaining() != 0 {
            return Err(PsbtError::Deserialization(
                "trailing bytes after inputs".to_string(),
            ));
        }
        Ok(Psbt::from_parts(unsigned_tx, inputs))
    }

    /// Render the PSBT's inputs and outputs for display.
    ///
    /// # Arguments
    /// * `network` - The network to encode output addresses for.
    ///
    /// # Returns
    /// The parsed form, or an error for an unrecognized output script.
    pub fn parsed(&self, network: Network) -> Result<ParsedPsbt, PsbtError> {
        let inputs = self
            .unsigned_tx
            .inputs
            .iter()
            .map(|input| ParsedInput {
                tx_id: input.source_txid_hex(),
                index: input.source_output_index,
            })
            .collect();
        let outputs = self
            .unsigned_tx
            .outputs
            .iter()
            .map(|output| {
                let address = Address::from_output_script(&output.locking_script, network)?;
                Ok(ParsedOutput {
                    address: address.address_string().to_string(),
                    value: output.value,
                })
            })
            .collect::<Result<Vec<_>, PsbtError>>()?;
        Ok(ParsedPsbt { inputs, outputs })
    }
}

fn pubkey_hash(public_key_hex: &str) -> Result<[u8; 20], PsbtError> {
    let bytes = hex::decode(public_key_hex)?;
    Ok(hash160(&bytes))
}

/// Append the SIGHASH_ALL byte to the DER encoding of a 64-byte r‖s
/// signature.
fn encode_sig_with_hashtype(sig: &[u8; 64]) -> Vec<u8> {
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&sig[0..32]);
    s.copy_from_slice(&sig[32..64]);
    let mut encoded = Signature::new(r, s).to_der();
    encoded.push(SIGHASH_ALL as u8);
    encoded
}
