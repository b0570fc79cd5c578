use txforge_primitives::util::{TxReader, TxWriter};
use txforge_script::Script;

use crate::PsbtError;

/// Default sequence number (final, no relative locktime).
pub const DEFAULT_SEQUENCE: u32 = 0xffff_ffff;

/// A transaction input: an outpoint plus its unlocking data.
///
/// `source_txid` is stored in wire order (little-endian); display order
/// is the byte-reversed hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInput {
    pub source_txid: [u8; 32],
    pub source_output_index: u32,
    pub unlocking_script: Script,
    pub sequence: u32,
    pub witness: Vec<Vec<u8>>,
}

impl TransactionInput {
    /// Create an input spending the given outpoint with empty unlocking data.
    ///
    /// # Arguments
    /// * `txid_hex` - The source transaction id in display order.
    /// * `source_output_index` - The output index within that transaction.
    ///
    /// # Returns
    /// A new input with an empty unlocking script, default sequence and
    /// no witness, or an error if the txid hex is malformed.
    pub fn new(txid_hex: &str, source_output_index: u32) -> Result<Self, PsbtError> {
        let bytes = hex::decode(txid_hex)?;
        if bytes.len() != 32 {
            return Err(PsbtError::Deserialization(format!(
                "txid must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut source_txid = [0u8; 32];
        // Display order is reversed relative to wire order.
        for (i, byte) in bytes.iter().rev().enumerate() {
            source_txid[i] = *byte;
        }
        Ok(TransactionInput {
            source_txid,
            source_output_index,
            unlocking_script: Script::new(),
            sequence: DEFAULT_SEQUENCE,
            witness: Vec::new(),
        })
    }

    /// The source transaction id in display order.
    pub fn source_txid_hex(&self) -> String {
        let mut reversed = self.source_txid;
        reversed.reverse();
        hex::encode(reversed)
    }

    /// Write the input in wire format (outpoint, script, sequence).
    pub fn write(&self, writer: &mut TxWriter) {
        writer.write_bytes(&self.source_txid);
        writer.write_u32_le(self.source_output_index);
        writer.write_var_bytes(self.unlocking_script.to_bytes());
        writer.write_u32_le(self.sequence);
    }

    /// Read an input in wire format. The witness, if any, is attached
    /// separately by the transaction reader.
    pub fn read(reader: &mut TxReader) -> Result<Self, PsbtError> {
        let txid_bytes = reader.read_bytes(32)?;
        let mut source_txid = [0u8; 32];
        source_txid.copy_from_slice(txid_bytes);
        let source_output_index = reader.read_u32_le()?;
        let script_bytes = reader.read_var_bytes()?;
        let sequence = reader.read_u32_le()?;
        Ok(TransactionInput {
            source_txid,
            source_output_index,
            unlocking_script: Script::from_bytes(&script_bytes),
            sequence,
            witness: Vec::new(),
        })
    }
}
