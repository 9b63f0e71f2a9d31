//! Session Controller
//!
//! The one piece of session state the engine owns: the onboarding step,
//! the active network selection, the installed seed and the registry.
//! External collaborators drive the step sequence; everything else in the
//! crate takes its inputs as explicit parameters.

use zeroize::Zeroizing;

use crate::derive;
use crate::error::{MeridianError, MeridianResult};
use crate::registry::WalletRegistry;
use crate::types::{NetworkId, Wallet};

const MODULE: &str = "session";

/// Onboarding step sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Welcome,
    NetworkSelection,
    Warning,
    SeedPhrase,
    ManageWallets,
}

pub struct WalletSession {
    step: Step,
    network: Option<NetworkId>,
    seed: Option<Zeroizing<[u8; derive::SEED_LEN]>>,
    agreed: bool,
    registry: WalletRegistry,
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletSession {
    pub fn new() -> Self {
        Self {
            step: Step::Welcome,
            network: None,
            seed: None,
            agreed: false,
            registry: WalletRegistry::new(),
        }
    }

    /// Resume a session around a previously restored registry.
    pub fn with_registry(registry: WalletRegistry) -> Self {
        Self {
            step: Step::ManageWallets,
            network: None,
            seed: None,
            agreed: true,
            registry,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn set_step(&mut self, step: Step) {
        self.step = step;
    }

    pub fn network(&self) -> Option<NetworkId> {
        self.network
    }

    pub fn select_network(&mut self, network: Option<NetworkId>) {
        self.network = network;
    }

    pub fn agreed(&self) -> bool {
        self.agreed
    }

    pub fn accept_warning(&mut self) {
        self.agreed = true;
    }

    /// Install the seed produced by the external mnemonic provider.
    pub fn install_seed(&mut self, seed: &[u8]) -> MeridianResult<()> {
        if seed.len() != derive::SEED_LEN {
            return Err(MeridianError::invalid_seed(format!(
                "expected {} seed bytes, got {}",
                derive::SEED_LEN,
                seed.len()
            )));
        }
        let mut owned = Zeroizing::new([0u8; derive::SEED_LEN]);
        owned.copy_from_slice(seed);
        self.seed = Some(owned);
        Ok(())
    }

    pub fn has_seed(&self) -> bool {
        self.seed.is_some()
    }

    /// Derive the next account on the active network and register it.
    pub fn create_wallet(&mut self, name: Option<&str>) -> MeridianResult<&Wallet> {
        let network = self.network.ok_or(MeridianError::MissingNetwork)?;
        let seed = self
            .seed
            .as_ref()
            .ok_or_else(|| MeridianError::invalid_seed("no seed installed"))?;

        let index = self.registry.next_index(network);
        let keypair = derive::derive(seed.as_ref(), network, index)?;
        Ok(self.registry.create(network, name, keypair))
    }

    /// Delete a wallet; if its network ends up empty, the active selection
    /// is cleared so the collaborator can re-prompt.
    pub fn delete_wallet(&mut self, public_key: &str) -> MeridianResult<()> {
        let removal = self.registry.delete(public_key)?;
        if removal.network_now_empty && self.network == Some(removal.network) {
            self.network = None;
            crate::log_info!(MODULE, "network selection cleared", network = removal.network);
        }
        Ok(())
    }

    pub fn registry(&self) -> &WalletRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WalletRegistry {
        &mut self.registry
    }
}
