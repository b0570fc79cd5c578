//! End-to-end build, sign, finalize and extract scenarios.

use txforge_keys::{KeyProviderSync, Secp256k1KeyProvider};
use txforge_script::Network;

use crate::builder::PsbtBuilder;
use crate::psbt::Psbt;
use crate::request::{TxData, TxInputItem, WitnessUtxo};
use crate::transaction::{Transaction, TransactionInput, TransactionOutput};
use crate::PsbtError;

const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
const DEST: &str = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";
const CHANGE: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";

// Locking scripts controlled by KEY_ONE.
const P2WPKH_SCRIPT: &str = "0014751e76e8199196d454941c45d1b3a323f1433bd6";
const P2SH_WRAP_SCRIPT: &str = "a914bcfeb728b584253d5f3f70bcb780e9ef218a68f487";

fn provider() -> Secp256k1KeyProvider {
    Secp256k1KeyProvider::from_hex(KEY_ONE).unwrap()
}

fn witness_request(script: &str) -> TxData {
    TxData {
        inputs: vec![TxInputItem {
            hash: "11".repeat(32),
            index: 0,
            value: 100_000,
            non_witness_utxo: None,
            witness_utxo: Some(WitnessUtxo {
                public_key: provider().public_key_hex(),
                script: script.to_string(),
                value: 100_000,
            }),
        }],
        outputs: None,
        to: Some(DEST.to_string()),
        amount: Some(60_000),
        fee: 1_000,
        change_address: Some(CHANGE.to_string()),
    }
}

fn build_and_sign(data: &TxData) -> Psbt {
    let mut builder = PsbtBuilder::new(Network::Mainnet);
    builder.add_inputs_for_psbt(data).unwrap();
    builder.add_output_for_psbt(data).unwrap();
    let mut psbt = builder.into_psbt();

    let signer = provider();
    for index in 0..psbt.input_count() {
        let digest = psbt.signing_digest(index).unwrap();
        let parts = signer.sign(&digest).unwrap();
        let sig = hex::decode(parts.to_concat_hex()).unwrap();
        psbt.add_partial_signature(index, &signer.public_key_hex(), &sig)
            .unwrap();
    }
    psbt
}

#[test]
fn test_native_segwit_end_to_end() {
    let mut psbt = build_and_sign(&witness_request(P2WPKH_SCRIPT));
    psbt.validate_signatures_of_all_inputs().unwrap();
    psbt.finalize_all_inputs().unwrap();
    let signed = psbt.extract_tx().unwrap();

    let tx = Transaction::from_hex(&signed.tx_hex).unwrap();
    assert!(tx.has_witness());
    assert_eq!(tx.inputs[0].witness.len(), 2);
    assert!(tx.inputs[0].unlocking_script.is_empty());
    assert_eq!(tx.tx_id_hex(), signed.tx_id);
    assert_eq!(tx.outputs.len(), 2);
}

#[test]
fn test_wrapped_segwit_end_to_end() {
    let mut psbt = build_and_sign(&witness_request(P2SH_WRAP_SCRIPT));
    psbt.validate_signatures_of_all_inputs().unwrap();
    psbt.finalize_all_inputs().unwrap();
    let signed = psbt.extract_tx().unwrap();

    let tx = Transaction::from_hex(&signed.tx_hex).unwrap();
    assert!(tx.has_witness());
    // scriptSig is a single push of the redeem script.
    let script_sig = tx.inputs[0].unlocking_script.to_bytes();
    assert_eq!(script_sig[0] as usize, script_sig.len() - 1);
    assert_eq!(hex::encode(&script_sig[1..]), P2WPKH_SCRIPT);
}

#[test]
fn test_legacy_end_to_end() {
    // A previous transaction paying KEY_ONE's P2PKH output.
    let mut prev = Transaction::new();
    prev.inputs
        .push(TransactionInput::new(&"22".repeat(32), 0).unwrap());
    prev.outputs.push(TransactionOutput::new(
        100_000,
        txforge_script::Address::from_string(DEST).unwrap().locking_script(),
    ));

    let data = TxData {
        inputs: vec![TxInputItem {
            hash: prev.tx_id_hex(),
            index: 0,
            value: 100_000,
            non_witness_utxo: Some(prev.to_hex()),
            witness_utxo: None,
        }],
        outputs: None,
        to: Some(DEST.to_string()),
        amount: Some(60_000),
        fee: 1_000,
        change_address: Some(CHANGE.to_string()),
    };

    let mut psbt = build_and_sign(&data);
    psbt.validate_signatures_of_all_inputs().unwrap();
    psbt.finalize_all_inputs().unwrap();
    let signed = psbt.extract_tx().unwrap();

    let tx = Transaction::from_hex(&signed.tx_hex).unwrap();
    assert!(!tx.has_witness());
    assert!(!tx.inputs[0].unlocking_script.is_empty());
}

#[test]
fn test_tampered_signature_fails_validation() {
    let data = witness_request(P2WPKH_SCRIPT);
    let mut builder = PsbtBuilder::new(Network::Mainnet);
    builder.add_inputs_for_psbt(&data).unwrap();
    builder.add_output_for_psbt(&data).unwrap();
    let mut psbt = builder.into_psbt();

    let signer = provider();
    let digest = psbt.signing_digest(0).unwrap();
    let parts = signer.sign(&digest).unwrap();
    let mut sig = hex::decode(parts.to_concat_hex()).unwrap();
    sig[5] ^= 0x01; // flip one bit of r
    psbt.add_partial_signature(0, &signer.public_key_hex(), &sig)
        .unwrap();

    let err = psbt.validate_signatures_of_all_inputs().unwrap_err();
    assert!(matches!(err, PsbtError::SignatureVerification { input_index: 0, .. }));
    // Extraction is unreachable without finalization.
    assert!(psbt.extract_tx().is_err());
}

#[test]
fn test_unsigned_input_fails_validation() {
    let data = witness_request(P2WPKH_SCRIPT);
    let mut builder = PsbtBuilder::new(Network::Mainnet);
    builder.add_inputs_for_psbt(&data).unwrap();
    builder.add_output_for_psbt(&data).unwrap();
    let psbt = builder.into_psbt();
    assert!(psbt.validate_signatures_of_all_inputs().is_err());
}

#[test]
fn test_base64_interchange_roundtrip() {
    let psbt = build_and_sign(&witness_request(P2WPKH_SCRIPT));
    let encoded = psbt.to_base64();
    let decoded = Psbt::from_base64(&encoded).unwrap();
    assert_eq!(decoded, psbt);

    // Signatures survive the roundtrip and still validate.
    decoded.validate_signatures_of_all_inputs().unwrap();
}

#[test]
fn test_from_base64_rejects_garbage() {
    assert!(Psbt::from_base64("not base64 at all!").is_err());
    use base64::Engine;
    let wrong_magic = base64::engine::general_purpose::STANDARD.encode(b"nope\x01");
    assert!(Psbt::from_base64(&wrong_magic).is_err());
}

#[test]
fn test_from_base64_rejects_absurd_length_prefix() {
    // Valid magic and version followed by a length claim of u64::MAX.
    use base64::Engine;
    let mut blob = b"pstx\x01".to_vec();
    blob.push(0xff);
    blob.extend_from_slice(&u64::MAX.to_le_bytes());
    let encoded = base64::engine::general_purpose::STANDARD.encode(&blob);
    assert!(Psbt::from_base64(&encoded).is_err());
}

#[test]
fn test_parsed_rendering() {
    let psbt = build_and_sign(&witness_request(P2WPKH_SCRIPT));
    let parsed = psbt.parsed(Network::Mainnet).unwrap();
    assert_eq!(parsed.inputs.len(), 1);
    assert_eq!(parsed.inputs[0].tx_id, "11".repeat(32));
    assert_eq!(parsed.inputs[0].index, 0);
    assert_eq!(parsed.outputs.len(), 2);
    assert_eq!(parsed.outputs[0].address, DEST);
    assert_eq!(parsed.outputs[0].value, 60_000);
    assert_eq!(parsed.outputs[1].address, CHANGE);
}

#[test]
fn test_signature_order_preserved() {
    let data = witness_request(P2WPKH_SCRIPT);
    let mut builder = PsbtBuilder::new(Network::Mainnet);
    builder.add_inputs_for_psbt(&data).unwrap();
    builder.add_output_for_psbt(&data).unwrap();
    let mut psbt = builder.into_psbt();

    psbt.add_partial_signature(0, "aa", &[1u8; 64]).unwrap();
    psbt.add_partial_signature(0, "bb", &[2u8; 64]).unwrap();
    let encoded = psbt.to_base64();
    let decoded = Psbt::from_base64(&encoded).unwrap();
    assert_eq!(decoded, psbt);
}
