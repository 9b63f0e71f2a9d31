//! Solana chain client and transfer builder

#![allow(deprecated)]

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::Client;
use serde_json::json;
use solana_sdk::{
    hash::Hash,
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::Transaction,
};
use std::str::FromStr;

use crate::client::{
    build_http_client, format_lamports, rpc_call, ChainClient, ClientConfig, TransferContext,
};
use crate::error::{MeridianError, MeridianResult};
use crate::types::{AccountState, NetworkId};

pub struct SolanaClient {
    http: Client,
    endpoint: String,
}

impl SolanaClient {
    pub fn new(config: ClientConfig) -> MeridianResult<Self> {
        Ok(Self {
            http: build_http_client(&config)?,
            endpoint: config.endpoint,
        })
    }
}

impl ChainClient for SolanaClient {
    fn network(&self) -> NetworkId {
        NetworkId::Solana
    }

    fn get_balance(&self, address: &str) -> MeridianResult<String> {
        let result = rpc_call(&self.http, &self.endpoint, "getBalance", json!([address]))?;
        let lamports = result["value"]
            .as_u64()
            .ok_or_else(|| MeridianError::transport("getBalance returned no value"))?;
        Ok(format_lamports(lamports))
    }

    fn get_account_state(&self, address: &str) -> MeridianResult<AccountState> {
        let result = rpc_call(
            &self.http,
            &self.endpoint,
            "getAccountInfo",
            json!([address, {"encoding": "base64"}]),
        )?;
        let value = result.get("value").cloned().filter(|v| !v.is_null());
        Ok(AccountState::Account(value))
    }

    fn get_latest_height(&self) -> MeridianResult<u64> {
        let result = rpc_call(&self.http, &self.endpoint, "getSlot", json!([]))?;
        result
            .as_u64()
            .ok_or_else(|| MeridianError::transport("getSlot returned no slot"))
    }

    fn transfer_context(&self, _sender: &str) -> MeridianResult<TransferContext> {
        let result = rpc_call(&self.http, &self.endpoint, "getLatestBlockhash", json!([]))?;
        let blockhash = result["value"]["blockhash"]
            .as_str()
            .ok_or_else(|| MeridianError::transport("getLatestBlockhash returned no blockhash"))?;
        Ok(TransferContext::Solana {
            recent_blockhash: blockhash.to_string(),
        })
    }

    fn broadcast(&self, raw_tx: &str) -> MeridianResult<String> {
        let result = rpc_call(
            &self.http,
            &self.endpoint,
            "sendTransaction",
            json!([raw_tx, {"encoding": "base64", "preflightCommitment": "confirmed"}]),
        )?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| MeridianError::transport("sendTransaction returned no signature"))
    }

    fn confirm(&self, tx_id: &str) -> MeridianResult<bool> {
        let result = rpc_call(
            &self.http,
            &self.endpoint,
            "getSignatureStatuses",
            json!([[tx_id], {"searchTransactionHistory": true}]),
        )?;

        let status = &result["value"][0];
        if status.is_null() {
            return Ok(false);
        }
        if !status["err"].is_null() {
            return Err(MeridianError::rpc(
                -1,
                format!("transaction failed on chain: {}", status["err"]),
            ));
        }
        let commitment = status["confirmationStatus"].as_str().unwrap_or("");
        Ok(commitment == "confirmed" || commitment == "finalized")
    }
}

/// Build and sign a system-program transfer, returning the base64-encoded
/// wire transaction.
pub fn build_transfer(
    sender_private_hex: &str,
    recipient: &str,
    lamports: u64,
    recent_blockhash: &str,
) -> MeridianResult<String> {
    let keypair_bytes = hex::decode(sender_private_hex)
        .map_err(|_| MeridianError::signing("sender key is not hexadecimal"))?;
    let sender_keypair = Keypair::from_bytes(&keypair_bytes)
        .map_err(|e| MeridianError::signing(format!("invalid keypair bytes: {}", e)))?;

    let recipient_pubkey = Pubkey::from_str(recipient)
        .map_err(|e| MeridianError::InvalidAddress(format!("{}: {}", recipient, e)))?;
    let blockhash = Hash::from_str(recent_blockhash)
        .map_err(|e| MeridianError::signing(format!("invalid blockhash: {}", e)))?;

    let instruction =
        system_instruction::transfer(&sender_keypair.pubkey(), &recipient_pubkey, lamports);
    let message = Message::new(&[instruction], Some(&sender_keypair.pubkey()));
    let mut tx = Transaction::new_unsigned(message);
    tx.try_sign(&[&sender_keypair], blockhash)
        .map_err(|e| MeridianError::signing(format!("signing rejected: {}", e)))?;

    let serialized = bincode::serialize(&tx)
        .map_err(|e| MeridianError::signing(format!("serialization failed: {}", e)))?;
    Ok(BASE64.encode(serialized))
}
