//! Opcode constants used by the standard locking-script templates.
//!
//! Only the opcodes that appear in P2PKH, P2SH, and P2WPKH templates are
//! defined here; this SDK builds and recognizes scripts, it does not
//! execute them.

/// Push an empty array onto the stack (also the segwit version-0 marker).
pub const OP_0: u8 = 0x00;

/// Direct push of 20 bytes (the length byte doubles as the opcode).
pub const OP_DATA_20: u8 = 0x14;

/// The next byte contains the number of bytes to push.
pub const OP_PUSHDATA1: u8 = 0x4c;

/// The next two bytes (LE) contain the number of bytes to push.
pub const OP_PUSHDATA2: u8 = 0x4d;

/// Duplicate the top stack item.
pub const OP_DUP: u8 = 0x76;

/// Pop the top item and push its RIPEMD160(SHA256(x)) hash.
pub const OP_HASH160: u8 = 0xa9;

/// Pop two items and push whether they are equal.
pub const OP_EQUAL: u8 = 0x87;

/// Pop two items and fail the script if they are not equal.
pub const OP_EQUALVERIFY: u8 = 0x88;

/// Verify an ECDSA signature against a public key.
pub const OP_CHECKSIG: u8 = 0xac;
