//! Script type - a byte-vector newtype with template helpers.
//!
//! Scripts define spending conditions on outputs (locking) and supply
//! the data satisfying them on inputs (unlocking). This module provides
//! construction of the standard single-key templates the finalizer
//! emits, push-data encoding, and classification of the templates it
//! recognizes when spending.

use std::fmt;

use crate::opcodes::*;
use crate::ScriptError;

/// A script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new empty script.
    ///
    /// # Returns
    /// An empty `Script` instance.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string (e.g. "76a914...88ac").
    ///
    /// # Returns
    /// A `Script` wrapping the decoded bytes, or an error if the hex is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex_str).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Ok(Script(bytes))
    }

    /// Create a script from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - Raw script bytes.
    ///
    /// # Returns
    /// A `Script` wrapping a copy of the given bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    // -----------------------------------------------------------------------
    // Standard locking-script templates
    // -----------------------------------------------------------------------

    /// Build a P2PKH locking script for a 20-byte public key hash.
    ///
    /// Produces: `OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG`.
    ///
    /// # Arguments
    /// * `pubkey_hash` - The Hash160 of the public key.
    ///
    /// # Returns
    /// The 25-byte P2PKH locking script.
    pub fn p2pkh_lock(pubkey_hash: &[u8; 20]) -> Self {
        let mut bytes = Vec::with_capacity(25);
        bytes.push(OP_DUP);
        bytes.push(OP_HASH160);
        bytes.push(OP_DATA_20);
        bytes.extend_from_slice(pubkey_hash);
        bytes.push(OP_EQUALVERIFY);
        bytes.push(OP_CHECKSIG);
        Script(bytes)
    }

    /// Build a P2SH locking script for a 20-byte script hash.
    ///
    /// Produces: `OP_HASH160 <20-byte hash> OP_EQUAL`.
    ///
    /// # Arguments
    /// * `script_hash` - The Hash160 of the redeem script.
    ///
    /// # Returns
    /// The 23-byte P2SH locking script.
    pub fn p2sh_lock(script_hash: &[u8; 20]) -> Self {
        let mut bytes = Vec::with_capacity(23);
        bytes.push(OP_HASH160);
        bytes.push(OP_DATA_20);
        bytes.extend_from_slice(script_hash);
        bytes.push(OP_EQUAL);
        Script(bytes)
    }

    /// Build a P2WPKH locking script (version-0 witness program).
    ///
    /// Produces: `OP_0 <20-byte hash>`.
    ///
    /// # Arguments
    /// * `pubkey_hash` - The Hash160 of the compressed public key.
    ///
    /// # Returns
    /// The 22-byte P2WPKH locking script.
    pub fn p2wpkh_lock(pubkey_hash: &[u8; 20]) -> Self {
        let mut bytes = Vec::with_capacity(22);
        bytes.push(OP_0);
        bytes.push(OP_DATA_20);
        bytes.extend_from_slice(pubkey_hash);
        Script(bytes)
    }

    // -----------------------------------------------------------------------
    // Push data
    // -----------------------------------------------------------------------

    /// Append a data push to the script with the minimal push encoding.
    ///
    /// Uses a direct length byte for data up to 75 bytes, OP_PUSHDATA1 up
    /// to 255, and OP_PUSHDATA2 up to 65535.
    ///
    /// # Arguments
    /// * `data` - The bytes to push.
    ///
    /// # Returns
    /// `Ok(())`, or an error if the data exceeds the encodable size.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        match data.len() {
            n if n <= 75 => {
                self.0.push(n as u8);
            }
            n if n <= 0xff => {
                self.0.push(OP_PUSHDATA1);
                self.0.push(n as u8);
            }
            n if n <= 0xffff => {
                self.0.push(OP_PUSHDATA2);
                self.0.extend_from_slice(&(n as u16).to_le_bytes());
            }
            n => return Err(ScriptError::DataTooBig(n)),
        }
        self.0.extend_from_slice(data);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Encode the script as a hex string.
    ///
    /// # Returns
    /// A lowercase hex representation of the script bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Return a reference to the underlying bytes.
    ///
    /// # Returns
    /// A byte slice of the script contents.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Return the length of the script in bytes.
    ///
    /// # Returns
    /// The number of bytes in the script.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the script is empty (zero bytes).
    ///
    /// # Returns
    /// `true` if the script has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // -----------------------------------------------------------------------
    // Template classification
    // -----------------------------------------------------------------------

    /// Check whether this script is a P2PKH locking script.
    ///
    /// # Returns
    /// `true` for `OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn is_p2pkh(&self) -> bool {
        self.0.len() == 25
            && self.0[0] == OP_DUP
            && self.0[1] == OP_HASH160
            && self.0[2] == OP_DATA_20
            && self.0[23] == OP_EQUALVERIFY
            && self.0[24] == OP_CHECKSIG
    }

    /// Check whether this script is a P2SH locking script.
    ///
    /// # Returns
    /// `true` for `OP_HASH160 <20> OP_EQUAL`.
    pub fn is_p2sh(&self) -> bool {
        self.0.len() == 23
            && self.0[0] == OP_HASH160
            && self.0[1] == OP_DATA_20
            && self.0[22] == OP_EQUAL
    }

    /// Check whether this script is a version-0 P2WPKH witness program.
    ///
    /// # Returns
    /// `true` for `OP_0 <20>`.
    pub fn is_p2wpkh(&self) -> bool {
        self.0.len() == 22 && self.0[0] == OP_0 && self.0[1] == OP_DATA_20
    }

    /// Extract the 20-byte hash committed by a recognized template.
    ///
    /// Works for P2PKH (pubkey hash), P2SH (script hash), and P2WPKH
    /// (pubkey hash) scripts.
    ///
    /// # Returns
    /// `Some([u8; 20])` for a recognized template, otherwise `None`.
    pub fn committed_hash(&self) -> Option<[u8; 20]> {
        let slice = if self.is_p2pkh() {
            &self.0[3..23]
        } else if self.is_p2sh() {
            &self.0[2..22]
        } else if self.is_p2wpkh() {
            &self.0[2..22]
        } else {
            return None;
        };
        let mut out = [0u8; 20];
        out.copy_from_slice(slice);
        Some(out)
    }
}

impl fmt::Debug for Script {
    /// Debug-format the script as its hex encoding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl fmt::Display for Script {
    /// Display the script as its hex encoding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
