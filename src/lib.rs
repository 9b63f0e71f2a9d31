//! Meridian Core Library
//!
//! Dual-ledger hierarchically-deterministic wallet engine.
//!
//! # Architecture
//!
//! This crate provides:
//! - **derive**: SLIP-0010 / BIP-32 account derivation from a BIP-39 seed
//! - **registry**: the authoritative in-memory set of derived wallets
//! - **client**: blocking JSON-RPC chain clients for Solana and Ethereum
//! - **pipeline**: build, sign, broadcast and confirm transfers, then
//!   reconcile the sender's cached balance
//! - **session**: the step/network state an embedding UI drives
//!
//! # Security
//!
//! Seeds and intermediate key material are wrapped in `zeroize::Zeroizing`
//! and cleared on drop. Private keys never appear in `Debug` output or in
//! log lines; the logging layer redacts anything that looks like key
//! material.
//!
//! # Example
//!
//! ```rust,ignore
//! use meridian_core::{derive, NetworkId, WalletRegistry};
//!
//! let seed = derive::seed_from_mnemonic(&phrase)?;
//! let mut registry = WalletRegistry::new();
//! let index = registry.next_index(NetworkId::Solana);
//! let keypair = derive::derive(seed.as_ref(), NetworkId::Solana, index)?;
//! registry.create(NetworkId::Solana, None, keypair);
//! ```

pub mod client;
pub mod derive;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod types;
pub mod utils;
pub mod validate;

// Re-export key types for convenience
pub use client::{
    client_for, ChainClient, ClientConfig, EthereumClient, SolanaClient, TransferContext,
};
pub use error::{MeridianError, MeridianResult};
pub use pipeline::{PipelineConfig, TransferOutcome, TransferPipeline, TransferStage};
pub use registry::{Removal, WalletRegistry};
pub use session::{Step, WalletSession};
pub use types::{AccountState, Keypair, NetworkId, TransferRequest, TransferResult, Wallet};
