//! Transaction Pipeline
//!
//! Drives one transfer through Built -> Signed -> Broadcast -> Confirmed.
//! Validation happens before any network call, so a rejected request has
//! no side effect. After a successful broadcast the pipeline never
//! resubmits: a failed confirmation probe surfaces as uncertainty the
//! caller must resolve against the ledger.

use std::fmt;
use std::thread;
use std::time::Duration;

use crate::client::{self, ChainClient, TransferContext};
use crate::error::{MeridianError, MeridianResult};
use crate::registry::WalletRegistry;
use crate::types::{NetworkId, TransferRequest, TransferResult};
use crate::validate;

const MODULE: &str = "pipeline";

/// Stages a transfer moves through; used for progress logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    Built,
    Signed,
    Broadcast,
    Confirmed,
    Failed,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferStage::Built => "built",
            TransferStage::Signed => "signed",
            TransferStage::Broadcast => "broadcast",
            TransferStage::Confirmed => "confirmed",
            TransferStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Confirmation polling bounds.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub poll_interval: Duration,
    pub poll_attempts: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            poll_attempts: 40,
        }
    }
}

/// Result of a registry-level send: the transfer itself plus whether the
/// cached sender balance could be refreshed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub transfer: TransferResult,
    pub balance_refreshed: bool,
}

pub struct TransferPipeline<'a> {
    client: &'a dyn ChainClient,
    config: PipelineConfig,
}

impl<'a> TransferPipeline<'a> {
    pub fn new(client: &'a dyn ChainClient) -> Self {
        Self {
            client,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(client: &'a dyn ChainClient, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    /// Run one transfer to confirmation or bounded timeout.
    pub fn execute(&self, request: &TransferRequest) -> MeridianResult<TransferResult> {
        let network = request.network;
        if network != self.client.network() {
            return Err(MeridianError::UnsupportedNetwork(format!(
                "client serves {}, request targets {}",
                self.client.network(),
                network
            )));
        }

        // Built: both checks run before any network traffic
        let recipient = validate::validate_address(&request.recipient_address, network)?;
        let raw_amount = validate::parse_amount(&request.amount, network)?;
        crate::log_debug!(
            MODULE,
            "transfer validated",
            stage = TransferStage::Built,
            network = network,
            recipient_address = recipient,
            amount = request.amount
        );

        // Signed
        let sender = sender_address(network, &request.sender_private_key)?;
        let context = self.client.transfer_context(&sender)?;
        let raw_tx = match context {
            TransferContext::Solana { recent_blockhash } => {
                let lamports = u64::try_from(raw_amount).map_err(|_| {
                    MeridianError::InvalidAmount("amount exceeds the ledger's range".into())
                })?;
                client::build_solana_transfer(
                    &request.sender_private_key,
                    &recipient,
                    lamports,
                    &recent_blockhash,
                )?
            }
            TransferContext::Ethereum {
                nonce,
                gas_price,
                chain_id,
            } => client::build_ethereum_transfer(
                &request.sender_private_key,
                &recipient,
                raw_amount,
                nonce,
                gas_price,
                chain_id,
            )?,
        };

        crate::log_debug!(MODULE, "transfer signed", stage = TransferStage::Signed, network = network);

        // Broadcast: failures here still have no usable transaction id
        let tx_id = self.client.broadcast(&raw_tx)?;
        crate::log_info!(
            MODULE,
            "transfer broadcast",
            stage = TransferStage::Broadcast,
            network = network,
            tx_id = tx_id
        );

        // Confirmed: bounded polling; never resubmit past this point
        self.wait_for_confirmation(tx_id)
    }

    fn wait_for_confirmation(&self, tx_id: String) -> MeridianResult<TransferResult> {
        for attempt in 0..self.config.poll_attempts {
            match self.client.confirm(&tx_id) {
                Ok(true) => {
                    crate::log_info!(
                        MODULE,
                        "transfer confirmed",
                        stage = TransferStage::Confirmed,
                        tx_id = tx_id
                    );
                    return Ok(TransferResult {
                        transaction_id: tx_id,
                        confirmed: true,
                    });
                }
                Ok(false) => {
                    if attempt + 1 < self.config.poll_attempts {
                        thread::sleep(self.config.poll_interval);
                    }
                }
                Err(err) => {
                    crate::log_warn!(
                        MODULE,
                        "confirmation probe failed after broadcast",
                        stage = TransferStage::Failed,
                        tx_id = tx_id,
                        error = err
                    );
                    return Err(MeridianError::BroadcastUncertain { tx_id });
                }
            }
        }

        Err(MeridianError::ConfirmationTimeout { tx_id })
    }

    /// Send from a registry wallet, then refresh its cached balance.
    ///
    /// The refresh is best-effort: once the transfer confirmed, a balance
    /// failure downgrades to a warning and the outcome reports the cache
    /// as stale.
    pub fn send_from_wallet(
        &self,
        registry: &mut WalletRegistry,
        sender_public_key: &str,
        recipient: &str,
        amount: &str,
    ) -> MeridianResult<TransferOutcome> {
        let wallet = registry
            .get(sender_public_key)
            .ok_or_else(|| MeridianError::NotFound(sender_public_key.to_string()))?;

        if wallet.network != self.client.network() {
            return Err(MeridianError::UnsupportedNetwork(format!(
                "wallet is on {}, client serves {}",
                wallet.network,
                self.client.network()
            )));
        }

        let request = TransferRequest {
            network: wallet.network,
            sender_private_key: wallet.private_key.clone(),
            recipient_address: recipient.to_string(),
            amount: amount.to_string(),
        };

        let transfer = self.execute(&request)?;

        let balance_refreshed = match self.client.get_balance(sender_public_key) {
            Ok(balance) => registry
                .refresh_balance(sender_public_key, balance)
                .is_ok(),
            Err(err) => {
                crate::log_warn!(
                    MODULE,
                    "balance refresh failed; cached balance may be stale",
                    address = sender_public_key,
                    error = err
                );
                false
            }
        };

        Ok(TransferOutcome {
            transfer,
            balance_refreshed,
        })
    }
}

/// Canonical address for the sending key.
fn sender_address(network: NetworkId, private_key_hex: &str) -> MeridianResult<String> {
    match network {
        NetworkId::Solana => {
            let bytes = hex::decode(private_key_hex)
                .map_err(|_| MeridianError::signing("sender key is not hexadecimal"))?;
            if bytes.len() != 64 {
                return Err(MeridianError::signing(format!(
                    "expected 64 keypair bytes, got {}",
                    bytes.len()
                )));
            }
            Ok(bs58::encode(&bytes[32..]).into_string())
        }
        NetworkId::Ethereum => client::ethereum_address_for_key(private_key_hex),
    }
}
