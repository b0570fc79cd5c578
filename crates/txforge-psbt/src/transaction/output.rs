use txforge_primitives::util::{TxReader, TxWriter};
use txforge_script::Script;

use crate::PsbtError;

/// A transaction output: a value in base units and its locking script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    pub value: u64,
    pub locking_script: Script,
}

impl TransactionOutput {
    /// Create an output paying `value` to `locking_script`.
    pub fn new(value: u64, locking_script: Script) -> Self {
        TransactionOutput {
            value,
            locking_script,
        }
    }

    /// Write the output in wire format (value, script).
    pub fn write(&self, writer: &mut TxWriter) {
        writer.write_u64_le(self.value);
        writer.write_var_bytes(self.locking_script.to_bytes());
    }

    /// Read an output in wire format.
    pub fn read(reader: &mut TxReader) -> Result<Self, PsbtError> {
        let value = reader.read_u64_le()?;
        let script_bytes = reader.read_var_bytes()?;
        Ok(TransactionOutput {
            value,
            locking_script: Script::from_bytes(script_bytes),
        })
    }
}
