//! Wallet Registry
//!
//! The authoritative in-memory set of derived wallets. Insertion order is
//! preserved; the next derivation index for a network is the count of
//! wallets currently held on it. All mutation goes through `&mut self`,
//! which is what serializes concurrent create/delete callers.

use serde::{Deserialize, Serialize};

use crate::error::{MeridianError, MeridianResult};
use crate::types::{Keypair, NetworkId, Wallet};

const MODULE: &str = "registry";

/// Outcome of a deletion, reported to the caller so session state can
/// react; the registry itself performs no session changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub network: NetworkId,
    pub network_now_empty: bool,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct WalletRegistry {
    wallets: Vec<Wallet>,
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derivation index for the next wallet on `network`: the count of
    /// wallets currently held there.
    pub fn next_index(&self, network: NetworkId) -> u32 {
        self.wallets.iter().filter(|w| w.network == network).count() as u32
    }

    /// Append a new wallet. Without an explicit name, one is synthesized
    /// as "{Network} Wallet {index+1}".
    pub fn create(&mut self, network: NetworkId, name: Option<&str>, keypair: Keypair) -> &Wallet {
        let account_index = self.next_index(network);
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => format!("{} Wallet {}", network.display_name(), account_index + 1),
        };

        // Deleting a non-terminal wallet makes the count rule hand out an
        // index a survivor already occupies; the count rule stays
        // authoritative, but the collision is worth surfacing.
        if self
            .wallets
            .iter()
            .any(|w| w.network == network && w.account_index == account_index)
        {
            crate::log_warn!(
                MODULE,
                "assigned index duplicates a surviving wallet",
                network = network,
                index = account_index
            );
        }

        let wallet = Wallet {
            name,
            network,
            public_key: keypair.public_key,
            private_key: keypair.private_key,
            balance: None,
            account_index,
        };
        crate::log_info!(
            MODULE,
            "wallet created",
            network = network,
            index = wallet.account_index,
            address = wallet.public_key
        );

        let position = self.wallets.len();
        self.wallets.push(wallet);
        &self.wallets[position]
    }

    /// Remove the wallet with the given public key. Indices of surviving
    /// wallets are untouched.
    pub fn delete(&mut self, public_key: &str) -> MeridianResult<Removal> {
        let position = self
            .wallets
            .iter()
            .position(|w| w.public_key == public_key)
            .ok_or_else(|| MeridianError::NotFound(public_key.to_string()))?;

        let removed = self.wallets.remove(position);
        let network_now_empty = !self.wallets.iter().any(|w| w.network == removed.network);

        crate::log_info!(
            MODULE,
            "wallet deleted",
            network = removed.network,
            index = removed.account_index,
            now_empty = network_now_empty
        );

        Ok(Removal {
            network: removed.network,
            network_now_empty,
        })
    }

    /// Live read-only view of one network's wallets, in insertion order.
    pub fn filter_by_network(&self, network: NetworkId) -> impl Iterator<Item = &Wallet> {
        self.wallets.iter().filter(move |w| w.network == network)
    }

    /// Replace only the cached balance; identity fields are untouched.
    pub fn refresh_balance(&mut self, public_key: &str, new_balance: String) -> MeridianResult<()> {
        let wallet = self
            .wallets
            .iter_mut()
            .find(|w| w.public_key == public_key)
            .ok_or_else(|| MeridianError::NotFound(public_key.to_string()))?;
        wallet.balance = Some(new_balance);
        Ok(())
    }

    pub fn get(&self, public_key: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.public_key == public_key)
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Opaque structured record for the persistence collaborator.
    pub fn serialize(&self) -> MeridianResult<String> {
        serde_json::to_string(self).map_err(Into::into)
    }

    /// Restore the full collection from a previously serialized record.
    pub fn restore(record: &str) -> MeridianResult<Self> {
        serde_json::from_str(record).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair(tag: &str) -> Keypair {
        Keypair {
            public_key: format!("pub-{}", tag),
            private_key: format!("priv-{}", tag),
        }
    }

    #[test]
    fn test_sequential_index_assignment() {
        let mut registry = WalletRegistry::new();
        for i in 0..4 {
            let wallet = registry.create(NetworkId::Solana, None, keypair(&i.to_string()));
            assert_eq!(wallet.account_index, i);
        }
        assert_eq!(registry.next_index(NetworkId::Solana), 4);
        // The other network is unaffected
        assert_eq!(registry.next_index(NetworkId::Ethereum), 0);
    }

    #[test]
    fn test_default_naming() {
        let mut registry = WalletRegistry::new();
        let name = registry
            .create(NetworkId::Solana, None, keypair("a"))
            .name
            .clone();
        assert_eq!(name, "Solana Wallet 1");

        let name = registry
            .create(NetworkId::Ethereum, Some("Savings"), keypair("b"))
            .name
            .clone();
        assert_eq!(name, "Savings");

        // Blank names fall back to the synthesized one
        let name = registry
            .create(NetworkId::Ethereum, Some("   "), keypair("c"))
            .name
            .clone();
        assert_eq!(name, "Ethereum Wallet 2");
    }

    #[test]
    fn test_delete_preserves_surviving_indices() {
        let mut registry = WalletRegistry::new();
        for i in 0..3 {
            registry.create(NetworkId::Solana, None, keypair(&i.to_string()));
        }

        let removal = registry.delete("pub-1").unwrap();
        assert_eq!(removal.network, NetworkId::Solana);
        assert!(!removal.network_now_empty);

        let indices: Vec<u32> = registry
            .filter_by_network(NetworkId::Solana)
            .map(|w| w.account_index)
            .collect();
        assert_eq!(indices, vec![0, 2]);

        // Count rule, not gap-fill: the next create gets index 2, never 1
        assert_eq!(registry.next_index(NetworkId::Solana), 2);
        let wallet = registry.create(NetworkId::Solana, None, keypair("3"));
        assert_eq!(wallet.account_index, 2);
        assert_ne!(wallet.account_index, 1);
    }

    #[test]
    fn test_delete_signals_network_empty() {
        let mut registry = WalletRegistry::new();
        registry.create(NetworkId::Solana, None, keypair("a"));
        registry.create(NetworkId::Ethereum, None, keypair("b"));

        let removal = registry.delete("pub-a").unwrap();
        assert!(removal.network_now_empty);

        // The other network still has wallets
        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.delete("pub-a"),
            Err(MeridianError::NotFound(_))
        ));
    }

    #[test]
    fn test_refresh_balance_touches_only_cache() {
        let mut registry = WalletRegistry::new();
        registry.create(NetworkId::Solana, None, keypair("a"));
        let before = registry.get("pub-a").unwrap().clone();

        registry.refresh_balance("pub-a", "1.5000".into()).unwrap();
        let after = registry.get("pub-a").unwrap();

        assert_eq!(after.balance.as_deref(), Some("1.5000"));
        assert_eq!(after.name, before.name);
        assert_eq!(after.private_key, before.private_key);
        assert_eq!(after.account_index, before.account_index);

        assert!(matches!(
            registry.refresh_balance("missing", "0".into()),
            Err(MeridianError::NotFound(_))
        ));
    }

    #[test]
    fn test_serialize_restore_roundtrip() {
        let mut registry = WalletRegistry::new();
        registry.create(NetworkId::Solana, None, keypair("a"));
        registry.create(NetworkId::Ethereum, Some("Main"), keypair("b"));
        registry.refresh_balance("pub-a", "2.0000".into()).unwrap();

        let record = registry.serialize().unwrap();
        let restored = WalletRegistry::restore(&record).unwrap();

        assert_eq!(restored.wallets(), registry.wallets());
        assert_eq!(restored.next_index(NetworkId::Solana), 1);

        assert!(matches!(
            WalletRegistry::restore("not json"),
            Err(MeridianError::Serialization(_))
        ));
    }
}
