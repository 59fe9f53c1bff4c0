//! Signer settings, read from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use signer_crypto::NetworkId;
use signer_transaction::user_command::DEFAULT_VALID_UNTIL;

use crate::error::WalletError;

/// Nanomina charged per account update when checking a zkApp command's fee (0.001 MINA).
pub const DEFAULT_ACCOUNT_UPDATE_FEE: u64 = 1_000_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct SignerConfig {
    pub network: NetworkId,
    pub default_valid_until: u32,
    pub account_update_fee: u64,
    /// Transaction-hash layout used when a caller does not choose one.
    pub berkeley_hashes: bool,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::Mainnet,
            default_valid_until: DEFAULT_VALID_UNTIL,
            account_update_fee: DEFAULT_ACCOUNT_UPDATE_FEE,
            berkeley_hashes: true,
        }
    }
}

impl SignerConfig {
    pub fn for_network(network: NetworkId) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        serde_json::from_str(json).map_err(|err| WalletError::Config(err.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|err| WalletError::Config(format!("{}: {err}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, WalletError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
