//! Chain Clients
//!
//! One JSON-RPC client per supported network, behind the `ChainClient`
//! trait. Clients never retry internally: retry policy belongs to the
//! caller, and the transfer pipeline applies none.

mod ethereum;
mod solana;

pub use ethereum::{
    address_for_key as ethereum_address_for_key, build_transfer as build_ethereum_transfer,
    EthereumClient,
};
pub use solana::{build_transfer as build_solana_transfer, SolanaClient};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::{MeridianError, MeridianResult};
use crate::types::{AccountState, NetworkId};

/// Network data a transfer needs before it can be built and signed.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferContext {
    Solana { recent_blockhash: String },
    Ethereum { nonce: u64, gas_price: u128, chain_id: u64 },
}

/// Capability set each network client provides.
pub trait ChainClient {
    fn network(&self) -> NetworkId;

    /// Balance in the network's human-readable unit.
    fn get_balance(&self, address: &str) -> MeridianResult<String>;

    /// Network-specific secondary account metadata.
    fn get_account_state(&self, address: &str) -> MeridianResult<AccountState>;

    /// Current block/slot height.
    fn get_latest_height(&self) -> MeridianResult<u64>;

    /// Data needed to build a signable transfer from `sender`.
    fn transfer_context(&self, sender: &str) -> MeridianResult<TransferContext>;

    /// Submit a signed transaction; returns its identifier.
    fn broadcast(&self, raw_tx: &str) -> MeridianResult<String>;

    /// Single confirmation probe: Ok(true) once the transaction is durably
    /// included, Ok(false) while still pending, Err for transport trouble
    /// or an on-chain failure.
    fn confirm(&self, tx_id: &str) -> MeridianResult<bool>;
}

/// Per-client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn for_network(network: NetworkId) -> Self {
        Self::new(network.default_endpoint())
    }
}

/// Construct the client for a network.
pub fn client_for(network: NetworkId, config: ClientConfig) -> MeridianResult<Box<dyn ChainClient>> {
    Ok(match network {
        NetworkId::Solana => Box::new(SolanaClient::new(config)?),
        NetworkId::Ethereum => Box::new(EthereumClient::new(config)?),
    })
}

// =============================================================================
// JSON-RPC plumbing
// =============================================================================

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
pub(crate) struct RpcEnvelope {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
pub(crate) struct RpcErrorBody {
    code: i64,
    message: String,
}

pub(crate) fn build_http_client(config: &ClientConfig) -> MeridianResult<Client> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent("MeridianCore/0.1")
        .build()
        .map_err(|e| MeridianError::transport(format!("failed to build http client: {}", e)))
}

/// Issue one JSON-RPC call and unwrap the response envelope, requiring a
/// non-null result.
pub(crate) fn rpc_call(
    http: &Client,
    endpoint: &str,
    method: &str,
    params: Value,
) -> MeridianResult<Value> {
    rpc_call_nullable(http, endpoint, method, params)?
        .ok_or_else(|| MeridianError::transport("missing result in rpc response"))
}

/// Like `rpc_call`, but a null result is a legal answer (pending receipts,
/// unknown signatures).
pub(crate) fn rpc_call_nullable(
    http: &Client,
    endpoint: &str,
    method: &str,
    params: Value,
) -> MeridianResult<Option<Value>> {
    let response = http
        .post(endpoint)
        .json(&RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        })
        .send()?;

    if !response.status().is_success() {
        return Err(MeridianError::transport(format!(
            "http status {}",
            response.status()
        )));
    }

    let envelope: RpcEnvelope = response
        .json()
        .map_err(|e| MeridianError::transport(format!("malformed rpc response: {}", e)))?;

    unwrap_envelope(envelope)
}

pub(crate) fn unwrap_envelope(envelope: RpcEnvelope) -> MeridianResult<Option<Value>> {
    if let Some(error) = envelope.error {
        return Err(MeridianError::rpc(error.code, error.message));
    }
    Ok(envelope.result)
}

/// Decode a 0x-prefixed hex quantity.
pub(crate) fn parse_hex_quantity(value: &Value) -> MeridianResult<u128> {
    let text = value
        .as_str()
        .ok_or_else(|| MeridianError::transport("expected hex quantity"))?;
    u128::from_str_radix(text.trim_start_matches("0x"), 16)
        .map_err(|e| MeridianError::transport(format!("invalid hex quantity: {}", e)))
}

// =============================================================================
// Unit normalization
// =============================================================================

/// Lamports to SOL, fixed to 4 decimal places.
pub fn format_lamports(lamports: u64) -> String {
    format!("{:.4}", lamports as f64 / 1e9)
}

/// Wei to ETH at full precision, trailing zeros trimmed but always at
/// least one fractional digit.
pub fn format_wei(wei: u128) -> String {
    let scale = NetworkId::Ethereum.unit_scale();
    let whole = wei / scale;
    let frac = wei % scale;

    let frac_str = format!("{:018}", frac);
    let trimmed = frac_str.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, trimmed)
    }
}
