//! Unified error types for Meridian Core
//!
//! Every fallible operation in the crate returns one of the named kinds
//! below; nothing is surfaced as an untyped boxed error.

use serde::{Deserialize, Serialize};

/// Main error type for all Meridian operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum MeridianError {
    /// Seed material is empty or not the expected 64 bytes
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// A network name outside the supported set
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    /// The curve library rejected derived key material
    #[error("derivation failure: {0}")]
    DerivationFailure(String),

    /// No network selected in the session
    #[error("no network selected")]
    MissingNetwork,

    /// Wallet reference does not exist in the registry
    #[error("wallet not found: {0}")]
    NotFound(String),

    /// Transport failure or a non-empty error field in the RPC envelope.
    /// Transport-level failures carry code -1.
    #[error("rpc error {code}: {message}")]
    RpcError { code: i64, message: String },

    /// Amount string failed to parse as a positive decimal for the network
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Recipient address is syntactically invalid for the target network
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Broadcast succeeded but no confirmation was observed within the bound
    #[error("confirmation timed out for transaction {tx_id}")]
    ConfirmationTimeout { tx_id: String },

    /// Failure after broadcast: the transaction may still land.
    /// Callers must check the ledger rather than resubmit.
    #[error("broadcast outcome uncertain for transaction {tx_id}")]
    BroadcastUncertain { tx_id: String },

    /// The signer rejected the key material or transaction payload
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Persisted record could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl MeridianError {
    pub fn invalid_seed(msg: impl Into<String>) -> Self {
        MeridianError::InvalidSeed(msg.into())
    }

    pub fn derivation(msg: impl Into<String>) -> Self {
        MeridianError::DerivationFailure(msg.into())
    }

    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        MeridianError::RpcError { code, message: message.into() }
    }

    /// Transport-level RPC failure (no server-assigned code)
    pub fn transport(message: impl Into<String>) -> Self {
        MeridianError::RpcError { code: -1, message: message.into() }
    }

    pub fn signing(msg: impl Into<String>) -> Self {
        MeridianError::SigningFailed(msg.into())
    }
}

/// Result type alias for Meridian operations
pub type MeridianResult<T> = Result<T, MeridianError>;

// Conversions from common library error types

impl From<serde_json::Error> for MeridianError {
    fn from(e: serde_json::Error) -> Self {
        MeridianError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for MeridianError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MeridianError::transport("request timed out")
        } else if e.is_connect() {
            MeridianError::transport("connection failed")
        } else {
            MeridianError::transport(e.to_string())
        }
    }
}

impl From<bitcoin::bip32::Error> for MeridianError {
    fn from(e: bitcoin::bip32::Error) -> Self {
        MeridianError::DerivationFailure(format!("bip32: {}", e))
    }
}

impl From<bip39::Error> for MeridianError {
    fn from(e: bip39::Error) -> Self {
        MeridianError::InvalidSeed(format!("mnemonic: {}", e))
    }
}
