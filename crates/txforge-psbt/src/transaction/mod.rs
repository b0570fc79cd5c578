//! Bitcoin-style transaction wire types.
//!
//! Serialization supports both the legacy form and the extended form
//! with the segwit marker/flag and per-input witness stacks. The
//! transaction id is always the double SHA-256 of the legacy form,
//! reversed for display.

mod input;
mod output;

pub use input::{TransactionInput, DEFAULT_SEQUENCE};
pub use output::TransactionOutput;

use txforge_primitives::hash::sha256d;
use txforge_primitives::util::{TxReader, TxWriter, VarInt};

use crate::PsbtError;

/// Transaction version emitted by the builder.
pub const DEFAULT_VERSION: u32 = 2;

const SEGWIT_MARKER: u8 = 0x00;
const SEGWIT_FLAG: u8 = 0x01;

/// A transaction: version, inputs, outputs and lock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// Create an empty version-2 transaction.
    ///
    /// # Returns
    /// A transaction with no inputs or outputs and lock time 0.
    pub fn new() -> Self {
        Transaction {
            version: DEFAULT_VERSION,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    /// Whether any input carries witness data.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize in legacy wire format, ignoring witness data.
    ///
    /// # Returns
    /// The legacy serialization bytes. This is the form the transaction
    /// id commits to.
    pub fn to_bytes_legacy(&self) -> Vec<u8> {
        let mut writer = TxWriter::new();
        writer.write_u32_le(self.version);
        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write(&mut writer);
        }
        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write(&mut writer);
        }
        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    /// Serialize in wire format, using the extended segwit form when
    /// any input carries witness data.
    ///
    /// # Returns
    /// The broadcastable serialization bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        if !self.has_witness() {
            return self.to_bytes_legacy();
        }
        let mut writer = TxWriter::new();
        writer.write_u32_le(self.version);
        writer.write_u8(SEGWIT_MARKER);
        writer.write_u8(SEGWIT_FLAG);
        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write(&mut writer);
        }
        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write(&mut writer);
        }
        for input in &self.inputs {
            writer.write_varint(VarInt::from(input.witness.len()));
            for item in &input.witness {
                writer.write_var_bytes(item);
            }
        }
        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    /// Serialize to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Deserialize from wire bytes, accepting both the legacy and the
    /// extended segwit forms.
    ///
    /// # Arguments
    /// * `bytes` - The transaction wire bytes.
    ///
    /// # Returns
    /// The decoded transaction, or an error if bytes are malformed or
    /// trailing data remains.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PsbtError> {
        let mut reader = TxReader::new(bytes);
        let version = reader.read_u32_le()?;

        // A zero marker byte cannot start a legacy input count for a
        // non-empty transaction, so it signals the extended form.
        let segwit = reader.peek(0) == Some(SEGWIT_MARKER) && reader.peek(1) == Some(SEGWIT_FLAG);
        if segwit {
            reader.read_u8()?;
            reader.read_u8()?;
        }

        // Pre-allocation is bounded by the bytes actually present, so a
        // hostile count cannot force a huge reservation.
        let input_count = reader.read_varint()?.value();
        let mut inputs = Vec::with_capacity(input_count.min(reader.remaining() as u64) as usize);
        for _ in 0..input_count {
            inputs.push(TransactionInput::read(&mut reader)?);
        }

        let output_count = reader.read_varint()?.value();
        let mut outputs = Vec::with_capacity(output_count.min(reader.remaining() as u64) as usize);
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read(&mut reader)?);
        }

        if segwit {
            for input in &mut inputs {
                let item_count = reader.read_varint()?.value();
                let mut witness = Vec::with_capacity(item_count as usize);
                for _ in 0..item_count {
                    witness.push(reader.read_var_bytes()?.to_vec());
                }
                input.witness = witness;
            }
        }

        let lock_time = reader.read_u32_le()?;
        if reader.remaining() != 0 {
            return Err(PsbtError::Deserialization(format!(
                "{} trailing bytes after transaction",
                reader.remaining()
            )));
        }

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Deserialize from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PsbtError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// The transaction id in wire order: sha256d of the legacy form.
    pub fn tx_id(&self) -> [u8; 32] {
        sha256d(&self.to_bytes_legacy())
    }

    /// The transaction id in display order (byte-reversed hex).
    pub fn tx_id_hex(&self) -> String {
        let mut id = self.tx_id();
        id.reverse();
        hex::encode(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txforge_script::Script;

    fn sample_tx() -> Transaction {
        let mut tx = Transaction::new();
        tx.inputs
            .push(TransactionInput::new(&"11".repeat(32), 0).unwrap());
        tx.outputs.push(TransactionOutput::new(
            40_000,
            Script::from_hex("76a914751e76e8199196d454941c45d1b3a323f1433bd688ac").unwrap(),
        ));
        tx
    }

    #[test]
    fn test_legacy_roundtrip() {
        let tx = sample_tx();
        let parsed = Transaction::from_bytes(&tx.to_bytes()).unwrap();
        assert_eq!(parsed, tx);
        assert!(!tx.has_witness());
    }

    #[test]
    fn test_segwit_roundtrip() {
        let mut tx = sample_tx();
        tx.inputs[0].witness = vec![vec![0x30, 0x44], vec![0x02; 33]];
        assert!(tx.has_witness());

        let bytes = tx.to_bytes();
        // Marker and flag follow the version.
        assert_eq!(bytes[4], SEGWIT_MARKER);
        assert_eq!(bytes[5], SEGWIT_FLAG);

        let parsed = Transaction::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, tx);
    }

    #[test]
    fn test_tx_id_excludes_witness() {
        let tx = sample_tx();
        let mut with_witness = tx.clone();
        with_witness.inputs[0].witness = vec![vec![0xab; 71]];
        assert_eq!(tx.tx_id_hex(), with_witness.tx_id_hex());
        assert_ne!(tx.to_bytes(), with_witness.to_bytes());
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = sample_tx().to_bytes();
        bytes.push(0x00);
        assert!(Transaction::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_rejects_huge_declared_input_count() {
        let mut bytes = DEFAULT_VERSION.to_le_bytes().to_vec();
        bytes.push(0xfe);
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(Transaction::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_rejects_truncated() {
        let bytes = sample_tx().to_bytes();
        assert!(Transaction::from_bytes(&bytes[..bytes.len() - 2]).is_err());
    }
}
