//! The XRP Ledger coin facade.
//!
//! XRP is an account chain: this core covers classic address
//! derivation and validation only.

use txforge_script::ripple;

use crate::coin::AccountCoin;
use crate::CoinError;

/// The XRP Ledger.
#[derive(Default)]
pub struct Xrp;

impl Xrp {
    /// Create the facade. XRP classic addresses carry no network
    /// distinction, so no configuration is needed.
    pub fn new() -> Self {
        Xrp
    }
}

impl AccountCoin for Xrp {
    fn generate_address(&self, public_key_hex: &str) -> Result<String, CoinError> {
        Ok(ripple::address_from_public_key(public_key_hex)?)
    }

    fn is_address_valid(&self, address: &str) -> bool {
        address.starts_with('r') && ripple::is_valid_address(address)
    }
}
