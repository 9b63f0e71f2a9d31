//! Derivation path templates
//!
//! Each network has a fixed path shape with a single variable slot (the
//! account index). Keeping the templates here is what prevents path
//! confusion between the two ledgers: this is the only place a network is
//! paired with a coin type and hardening pattern.

use std::fmt;

use crate::types::NetworkId;

/// BIP-32 purpose used by both supported networks
pub const BIP44_PURPOSE: u32 = 44;

/// Hardened offset for BIP-32 style derivation
pub const HARDENED: u32 = 0x8000_0000;

/// Single component of a derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment {
    pub index: u32,
    pub hardened: bool,
}

impl PathSegment {
    pub fn hardened(index: u32) -> Self {
        Self { index, hardened: true }
    }

    pub fn normal(index: u32) -> Self {
        Self { index, hardened: false }
    }

    /// Full index including the hardened bit
    pub fn full_index(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED
        } else {
            self.index
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// An ordered derivation path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    segments: Vec<PathSegment>,
}

impl DerivationPath {
    /// Build the network's standard path for one account index.
    ///
    /// Solana uses fully-hardened `m/44'/501'/{index}'/0'`; Ethereum keeps
    /// the account level fixed at 0 and varies the final address index:
    /// `m/44'/60'/0'/0/{index}`.
    pub fn for_network(network: NetworkId, account_index: u32) -> Self {
        let segments = match network {
            NetworkId::Solana => vec![
                PathSegment::hardened(BIP44_PURPOSE),
                PathSegment::hardened(network.coin_type()),
                PathSegment::hardened(account_index),
                PathSegment::hardened(0),
            ],
            NetworkId::Ethereum => vec![
                PathSegment::hardened(BIP44_PURPOSE),
                PathSegment::hardened(network.coin_type()),
                PathSegment::hardened(0),
                PathSegment::normal(0),
                PathSegment::normal(account_index),
            ],
        };
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_fully_hardened(&self) -> bool {
        self.segments.iter().all(|s| s.hardened)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
