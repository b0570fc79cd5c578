//! Signature-hash computation.
//!
//! Two digest algorithms cover the supported input kinds: the legacy
//! SIGHASH_ALL preimage for non-witness inputs, and the version-0
//! witness preimage (amount-committing, with cached prevout/sequence/
//! output hashes) for segwit inputs.

use txforge_primitives::hash::sha256d;
use txforge_primitives::util::TxWriter;
use txforge_script::Script;

use crate::transaction::Transaction;
use crate::PsbtError;

/// The only supported hash type: sign all inputs and outputs.
pub const SIGHASH_ALL: u32 = 0x01;

/// Compute the legacy SIGHASH_ALL digest for one input.
///
/// Every input's unlocking script is cleared except the one being
/// signed, which is replaced by `subscript` (the locking script of the
/// output it spends).
///
/// # Arguments
/// * `tx` - The unsigned transaction.
/// * `input_index` - The input being signed.
/// * `subscript` - The locking script of the spent output.
///
/// # Returns
/// The 32-byte digest, or an error if `input_index` is out of range.
pub fn legacy_digest(
    tx: &Transaction,
    input_index: usize,
    subscript: &Script,
) -> Result<[u8; 32], PsbtError> {
    if input_index >= tx.inputs.len() {
        return Err(PsbtError::Construction(format!(
            "input index {} out of range ({} inputs)",
            input_index,
            tx.inputs.len()
        )));
    }

    let mut preimage = tx.clone();
    for (i, input) in preimage.inputs.iter_mut().enumerate() {
        input.witness.clear();
        input.unlocking_script = if i == input_index {
            subscript.clone()
        } else {
            Script::new()
        };
    }

    let mut writer = TxWriter::new();
    writer.write_bytes(&preimage.to_bytes_legacy());
    writer.write_u32_le(SIGHASH_ALL);
    Ok(sha256d(writer.as_bytes()))
}

/// Compute the version-0 witness SIGHASH_ALL digest for one input.
///
/// # Arguments
/// * `tx` - The unsigned transaction.
/// * `input_index` - The input being signed.
/// * `script_code` - The script code committed by the digest (for
///   P2WPKH, the P2PKH template over the key hash).
/// * `value` - The value of the spent output in base units.
///
/// # Returns
/// The 32-byte digest, or an error if `input_index` is out of range.
pub fn witness_v0_digest(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    value: u64,
) -> Result<[u8; 32], PsbtError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        PsbtError::Construction(format!(
            "input index {} out of range ({} inputs)",
            input_index,
            tx.inputs.len()
        ))
    })?;

    let mut prevouts = TxWriter::new();
    let mut sequences = TxWriter::new();
    for each in &tx.inputs {
        prevouts.write_bytes(&each.source_txid);
        prevouts.write_u32_le(each.source_output_index);
        sequences.write_u32_le(each.sequence);
    }
    let hash_prevouts = sha256d(prevouts.as_bytes());
    let hash_sequence = sha256d(sequences.as_bytes());

    let mut outputs = TxWriter::new();
    for output in &tx.outputs {
        output.write(&mut outputs);
    }
    let hash_outputs = sha256d(outputs.as_bytes());

    let mut writer = TxWriter::new();
    writer.write_u32_le(tx.version);
    writer.write_bytes(&hash_prevouts);
    writer.write_bytes(&hash_sequence);
    writer.write_bytes(&input.source_txid);
    writer.write_u32_le(input.source_output_index);
    writer.write_var_bytes(script_code.to_bytes());
    writer.write_u64_le(value);
    writer.write_u32_le(input.sequence);
    writer.write_bytes(&hash_outputs);
    writer.write_u32_le(tx.lock_time);
    writer.write_u32_le(SIGHASH_ALL);
    Ok(sha256d(writer.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{TransactionInput, TransactionOutput};

    #[test]
    fn test_legacy_digest_vector() {
        let mut tx = Transaction::new();
        tx.inputs
            .push(TransactionInput::new(&"11".repeat(32), 0).unwrap());
        let script =
            Script::from_hex("76a914751e76e8199196d454941c45d1b3a323f1433bd688ac").unwrap();
        tx.outputs.push(TransactionOutput::new(40_000, script.clone()));

        let digest = legacy_digest(&tx, 0, &script).unwrap();
        assert_eq!(
            hex::encode(digest),
            "5cee171e65d41ba74031dcb42360ff658cb79094826b73bbbd9d044be2c955c8"
        );
    }

    #[test]
    fn test_witness_v0_reference_vector() {
        // Native P2WPKH example from the segwit signing proposal.
        let tx = Transaction::from_hex(
            "0100000002fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f00000000\
             00eeffffffef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57b90ec68a01000000\
             00ffffffff02202cb206000000001976a9148280b37df378db99f66f85c95a783a76ac7a6d5988ac90\
             93510d000000001976a9143bde42dbee7e4dbe6a21b2d50ce2f0167faa815988ac11000000",
        )
        .unwrap();
        let script_code =
            Script::from_hex("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac").unwrap();

        let digest = witness_v0_digest(&tx, 1, &script_code, 600_000_000).unwrap();
        assert_eq!(
            hex::encode(digest),
            "c37af31116d1b27caf68aae9e3ac82f1477929014d5b917657d0eb49478cb670"
        );
    }

    #[test]
    fn test_out_of_range_index() {
        let tx = Transaction::new();
        let script = Script::new();
        assert!(legacy_digest(&tx, 0, &script).is_err());
        assert!(witness_v0_digest(&tx, 0, &script, 0).is_err());
    }

    #[test]
    fn test_legacy_digest_differs_per_input() {
        let mut tx = Transaction::new();
        tx.inputs
            .push(TransactionInput::new(&"11".repeat(32), 0).unwrap());
        tx.inputs
            .push(TransactionInput::new(&"22".repeat(32), 1).unwrap());
        let script =
            Script::from_hex("76a914751e76e8199196d454941c45d1b3a323f1433bd688ac").unwrap();
        tx.outputs.push(TransactionOutput::new(1_000, script.clone()));

        let first = legacy_digest(&tx, 0, &script).unwrap();
        let second = legacy_digest(&tx, 1, &script).unwrap();
        assert_ne!(first, second);
    }
}
