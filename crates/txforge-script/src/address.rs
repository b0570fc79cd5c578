//! Address encoding and decoding.
//!
//! Supports the three standard single-key address forms: Base58Check
//! P2PKH and P2SH addresses, and Bech32 version-0 P2WPKH addresses, on
//! mainnet and testnet.

use std::fmt;

use bech32::{FromBase32, ToBase32, Variant};
use txforge_primitives::hash::{hash160, sha256d};
use txforge_primitives::PublicKey;

use crate::{Script, ScriptError};

/// Base58Check version byte for mainnet P2PKH addresses.
const MAINNET_P2PKH_VERSION: u8 = 0x00;
/// Base58Check version byte for mainnet P2SH addresses.
const MAINNET_P2SH_VERSION: u8 = 0x05;
/// Base58Check version byte for testnet P2PKH addresses.
const TESTNET_P2PKH_VERSION: u8 = 0x6f;
/// Base58Check version byte for testnet P2SH addresses.
const TESTNET_P2SH_VERSION: u8 = 0xc4;

/// The network an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    fn p2pkh_version(&self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2PKH_VERSION,
            Network::Testnet => TESTNET_P2PKH_VERSION,
        }
    }

    fn p2sh_version(&self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2SH_VERSION,
            Network::Testnet => TESTNET_P2SH_VERSION,
        }
    }

    fn bech32_hrp(&self) -> &'static str {
        match self {
            Network::Mainnet => "bc",
            Network::Testnet => "tb",
        }
    }
}

/// The address form to derive from a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    /// Legacy pay-to-public-key-hash.
    P2pkh,
    /// Pay-to-witness-public-key-hash nested in P2SH.
    P2shP2wpkh,
    /// Native segwit version-0 pay-to-witness-public-key-hash.
    P2wpkh,
}

/// The hash an address commits to, tagged by address form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressPayload {
    /// Hash160 of a public key, spent via P2PKH.
    PubKeyHash([u8; 20]),
    /// Hash160 of a redeem script, spent via P2SH.
    ScriptHash([u8; 20]),
    /// Hash160 of a compressed public key, spent via P2WPKH.
    WitnessPubKeyHash([u8; 20]),
}

/// A decoded address: its string form, payload and network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    address_string: String,
    payload: AddressPayload,
    network: Network,
}

impl Address {
    // -----------------------------------------------------------------------
    // Derivation from public keys
    // -----------------------------------------------------------------------

    /// Derive an address from a hex-encoded public key.
    ///
    /// For `P2shP2wpkh` the redeem script `OP_0 <hash160(pubkey)>` is
    /// built and its Hash160 becomes the script hash. `P2wpkh` and
    /// `P2shP2wpkh` require a compressed public key.
    ///
    /// # Arguments
    /// * `pub_key_hex` - Hex encoding of a 33- or 65-byte SEC public key.
    /// * `address_type` - The address form to derive.
    /// * `network` - The target network.
    ///
    /// # Returns
    /// The derived `Address`, or an error if the key is invalid or the
    /// form requires compression the key lacks.
    pub fn from_public_key(
        pub_key_hex: &str,
        address_type: AddressType,
        network: Network,
    ) -> Result<Self, ScriptError> {
        let key_bytes = hex::decode(pub_key_hex)
            .map_err(|e| ScriptError::AddressGeneration(e.to_string()))?;
        let public_key = PublicKey::from_bytes(&key_bytes)?;

        match address_type {
            AddressType::P2pkh => {
                // Hash the key in the serialization the caller supplied.
                let hash = hash160(&key_bytes);
                let address_string = base58check_encode(network.p2pkh_version(), &hash);
                Ok(Address {
                    address_string,
                    payload: AddressPayload::PubKeyHash(hash),
                    network,
                })
            }
            AddressType::P2shP2wpkh => {
                require_compressed(pub_key_hex)?;
                let redeem = Script::p2wpkh_lock(&public_key.hash160());
                let script_hash = hash160(redeem.to_bytes());
                let address_string = base58check_encode(network.p2sh_version(), &script_hash);
                Ok(Address {
                    address_string,
                    payload: AddressPayload::ScriptHash(script_hash),
                    network,
                })
            }
            AddressType::P2wpkh => {
                require_compressed(pub_key_hex)?;
                let hash = public_key.hash160();
                let address_string = bech32_encode_v0(network, &hash)?;
                Ok(Address {
                    address_string,
                    payload: AddressPayload::WitnessPubKeyHash(hash),
                    network,
                })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    /// Parse an address string, validating its checksum and version.
    ///
    /// Bech32 addresses are recognized by their `bc1`/`tb1` prefix;
    /// everything else is decoded as Base58Check.
    ///
    /// # Arguments
    /// * `address` - The address string to parse.
    ///
    /// # Returns
    /// The decoded `Address`, or an error describing why the string is
    /// not a valid supported address.
    pub fn from_string(address: &str) -> Result<Self, ScriptError> {
        let lower = address.to_ascii_lowercase();
        if lower.starts_with("bc1") || lower.starts_with("tb1") {
            return Self::from_bech32(address);
        }
        Self::from_base58check(address)
    }

    fn from_bech32(address: &str) -> Result<Self, ScriptError> {
        let (hrp, data, variant) = bech32::decode(address)
            .map_err(|e| ScriptError::InvalidAddress(e.to_string()))?;
        if variant != Variant::Bech32 {
            return Err(ScriptError::UnsupportedAddress(
                "only bech32 version-0 witness addresses are supported".to_string(),
            ));
        }
        let network = match hrp.as_str() {
            "bc" => Network::Mainnet,
            "tb" => Network::Testnet,
            other => {
                return Err(ScriptError::UnsupportedAddress(format!(
                    "unknown bech32 prefix: {}",
                    other
                )))
            }
        };
        if data.is_empty() || data[0].to_u8() != 0 {
            return Err(ScriptError::UnsupportedAddress(
                "only witness version 0 is supported".to_string(),
            ));
        }
        let program = Vec::<u8>::from_base32(&data[1..])
            .map_err(|e| ScriptError::InvalidAddress(e.to_string()))?;
        if program.len() != 20 {
            return Err(ScriptError::InvalidAddressLength(program.len()));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&program);
        Ok(Address {
            address_string: address.to_string(),
            payload: AddressPayload::WitnessPubKeyHash(hash),
            network,
        })
    }

    fn from_base58check(address: &str) -> Result<Self, ScriptError> {
        let (version, hash) = base58check_decode(address)?;
        let (payload, network) = match version {
            MAINNET_P2PKH_VERSION => (AddressPayload::PubKeyHash(hash), Network::Mainnet),
            MAINNET_P2SH_VERSION => (AddressPayload::ScriptHash(hash), Network::Mainnet),
            TESTNET_P2PKH_VERSION => (AddressPayload::PubKeyHash(hash), Network::Testnet),
            TESTNET_P2SH_VERSION => (AddressPayload::ScriptHash(hash), Network::Testnet),
            other => {
                return Err(ScriptError::UnsupportedAddress(format!(
                    "unknown address version byte: 0x{:02x}",
                    other
                )))
            }
        };
        Ok(Address {
            address_string: address.to_string(),
            payload,
            network,
        })
    }

    /// Recover the address committed by a recognized locking script.
    ///
    /// # Arguments
    /// * `script` - A P2PKH, P2SH or P2WPKH locking script.
    /// * `network` - The network to encode the address for.
    ///
    /// # Returns
    /// The corresponding `Address`, or an error for an unrecognized
    /// script template.
    pub fn from_output_script(script: &Script, network: Network) -> Result<Self, ScriptError> {
        let hash = script.committed_hash().ok_or_else(|| {
            ScriptError::UnsupportedAddress("unrecognized locking script template".to_string())
        })?;
        if script.is_p2pkh() {
            Ok(Address {
                address_string: base58check_encode(network.p2pkh_version(), &hash),
                payload: AddressPayload::PubKeyHash(hash),
                network,
            })
        } else if script.is_p2sh() {
            Ok(Address {
                address_string: base58check_encode(network.p2sh_version(), &hash),
                payload: AddressPayload::ScriptHash(hash),
                network,
            })
        } else {
            Ok(Address {
                address_string: bech32_encode_v0(network, &hash)?,
                payload: AddressPayload::WitnessPubKeyHash(hash),
                network,
            })
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The address in its canonical string form.
    pub fn address_string(&self) -> &str {
        &self.address_string
    }

    /// The hash payload the address commits to.
    pub fn payload(&self) -> &AddressPayload {
        &self.payload
    }

    /// The network the address belongs to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Build the locking script paying to this address.
    ///
    /// # Returns
    /// A P2PKH, P2SH or P2WPKH locking script per the address payload.
    pub fn locking_script(&self) -> Script {
        match &self.payload {
            AddressPayload::PubKeyHash(hash) => Script::p2pkh_lock(hash),
            AddressPayload::ScriptHash(hash) => Script::p2sh_lock(hash),
            AddressPayload::WitnessPubKeyHash(hash) => Script::p2wpkh_lock(hash),
        }
    }
}

impl fmt::Display for Address {
    /// Display the address in its string form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_string)
    }
}

// ---------------------------------------------------------------------------
// Encoding helpers
// ---------------------------------------------------------------------------

fn require_compressed(pub_key_hex: &str) -> Result<(), ScriptError> {
    // 33 bytes -> 66 hex chars
    if pub_key_hex.len() != 66 {
        return Err(ScriptError::AddressGeneration(
            "witness addresses require a compressed public key".to_string(),
        ));
    }
    Ok(())
}

/// Base58Check-encode a version byte plus 20-byte hash.
pub(crate) fn base58check_encode(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(25);
    payload.push(version);
    payload.extend_from_slice(hash);
    let checksum = sha256d(&payload);
    payload.extend_from_slice(&checksum[0..4]);
    bs58::encode(payload).into_string()
}

/// Decode a Base58Check address into its version byte and 20-byte hash.
pub(crate) fn base58check_decode(address: &str) -> Result<(u8, [u8; 20]), ScriptError> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| ScriptError::InvalidAddress(e.to_string()))?;
    if decoded.len() != 25 {
        return Err(ScriptError::InvalidAddressLength(decoded.len()));
    }
    let (payload, checksum) = decoded.split_at(21);
    let expected = sha256d(payload);
    if checksum != &expected[0..4] {
        return Err(ScriptError::ChecksumFailed);
    }
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok((payload[0], hash))
}

fn bech32_encode_v0(network: Network, program: &[u8; 20]) -> Result<String, ScriptError> {
    let mut data = vec![bech32::u5::try_from_u8(0)
        .map_err(|e| ScriptError::AddressGeneration(e.to_string()))?];
    data.extend(program.to_base32());
    bech32::encode(network.bech32_hrp(), data, Variant::Bech32)
        .map_err(|e| ScriptError::AddressGeneration(e.to_string()))
}
