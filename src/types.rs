//! Shared types for Meridian Core
//!
//! All data structures that cross module boundaries are defined here
//! for consistent serialization across the collaborator boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MeridianError;

// =============================================================================
// Network Types
// =============================================================================

/// Supported ledger networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Solana,
    Ethereum,
}

impl NetworkId {
    pub fn symbol(&self) -> &'static str {
        match self {
            NetworkId::Solana => "SOL",
            NetworkId::Ethereum => "ETH",
        }
    }

    /// Decimal places of the native unit (lamports, wei)
    pub fn decimals(&self) -> u8 {
        match self {
            NetworkId::Solana => 9,
            NetworkId::Ethereum => 18,
        }
    }

    /// SLIP-0044 coin type used in derivation paths
    pub fn coin_type(&self) -> u32 {
        match self {
            NetworkId::Solana => 501,
            NetworkId::Ethereum => 60,
        }
    }

    /// Smallest-unit scale factor (10^decimals)
    pub fn unit_scale(&self) -> u128 {
        10u128.pow(self.decimals() as u32)
    }

    /// Capitalized display name, used for default wallet naming
    pub fn display_name(&self) -> &'static str {
        match self {
            NetworkId::Solana => "Solana",
            NetworkId::Ethereum => "Ethereum",
        }
    }

    /// Default public RPC endpoint
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            NetworkId::Solana => "https://api.devnet.solana.com",
            NetworkId::Ethereum => "https://eth.llamarpc.com",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for NetworkId {
    type Err = MeridianError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solana" | "sol" => Ok(NetworkId::Solana),
            "ethereum" | "eth" => Ok(NetworkId::Ethereum),
            other => Err(MeridianError::UnsupportedNetwork(other.to_string())),
        }
    }
}

// =============================================================================
// Key and Wallet Types
// =============================================================================

/// A derived keypair: canonical address plus hex-encoded secret.
///
/// The secret is owned exclusively by the Wallet record that holds it and is
/// never included in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// A derived account tracked by the registry.
///
/// `balance` is a cache and may be stale until explicitly refreshed.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub name: String,
    pub network: NetworkId,
    pub public_key: String,
    pub private_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    pub account_index: u32,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("name", &self.name)
            .field("network", &self.network)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .field("balance", &self.balance)
            .field("account_index", &self.account_index)
            .finish()
    }
}

// =============================================================================
// Transfer Types
// =============================================================================

/// Input to one pipeline run. Built and consumed within a single call,
/// never persisted.
#[derive(Clone)]
pub struct TransferRequest {
    pub network: NetworkId,
    pub sender_private_key: String,
    pub recipient_address: String,
    /// Decimal string in the network's native display unit
    pub amount: String,
}

impl fmt::Debug for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferRequest")
            .field("network", &self.network)
            .field("sender_private_key", &"[REDACTED]")
            .field("recipient_address", &self.recipient_address)
            .field("amount", &self.amount)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub transaction_id: String,
    pub confirmed: bool,
}

/// Network-specific secondary account metadata
#[derive(Debug, Clone, PartialEq)]
pub enum AccountState {
    /// Transaction count for the secp256k1 ledger
    Nonce(u64),
    /// Raw account payload for the ed25519 ledger (None if the account
    /// does not exist yet)
    Account(Option<serde_json::Value>),
}
