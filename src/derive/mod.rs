//! Key Derivation
//!
//! Turns (seed, network, account index) into a keypair plus canonical
//! address. Derivation is pure and deterministic: identical inputs always
//! yield byte-identical keypairs, and no I/O happens here.
//!
//! SECURITY: seeds and intermediate key material are zeroized when no
//! longer needed.

pub mod path;

mod ed25519;
mod secp256k1;

use bip39::Mnemonic;
use bitcoin::secp256k1::Secp256k1;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{MeridianError, MeridianResult};
use crate::types::{Keypair, NetworkId};
use crate::utils::crypto::{keccak256, to_checksum_address};

pub use path::{DerivationPath, PathSegment, HARDENED};

/// BIP-39 seeds are always 64 bytes
pub const SEED_LEN: usize = 64;

/// How many successive child indices to probe when the curve library
/// rejects a derived scalar (the standard BIP-32 skip rule).
const MAX_SCALAR_RETRIES: u32 = 3;

/// Derive the keypair for one account index on one network.
pub fn derive(seed: &[u8], network: NetworkId, index: u32) -> MeridianResult<Keypair> {
    if seed.is_empty() {
        return Err(MeridianError::invalid_seed("seed bytes are empty"));
    }
    if seed.len() != SEED_LEN {
        return Err(MeridianError::invalid_seed(format!(
            "expected {} seed bytes, got {}",
            SEED_LEN,
            seed.len()
        )));
    }

    match network {
        NetworkId::Solana => derive_solana(seed, index),
        NetworkId::Ethereum => derive_ethereum(seed, index),
    }
}

/// Convert a BIP-39 phrase into seed bytes (empty passphrase).
pub fn seed_from_mnemonic(phrase: &str) -> MeridianResult<Zeroizing<[u8; SEED_LEN]>> {
    let mnemonic = Mnemonic::parse(phrase)?;
    Ok(Zeroizing::new(mnemonic.to_seed("")))
}

/// Generate a fresh 12-word phrase from OS entropy.
pub fn generate_mnemonic() -> MeridianResult<String> {
    let mut entropy = Zeroizing::new([0u8; 16]);
    OsRng.fill_bytes(entropy.as_mut());

    let mnemonic = Mnemonic::from_entropy(entropy.as_ref())?;
    Ok(mnemonic.to_string())
}

fn derive_solana(seed: &[u8], index: u32) -> MeridianResult<Keypair> {
    let path = DerivationPath::for_network(NetworkId::Solana, index);
    let scalar = ed25519::derive_scalar(seed, &path)?;

    let signing_key = SigningKey::from_bytes(&scalar);
    let public_key_bytes = signing_key.verifying_key().to_bytes();

    // The ledger's keypair wire format is seed || public key
    let mut keypair_bytes = [0u8; 64];
    keypair_bytes[..32].copy_from_slice(&signing_key.to_bytes());
    keypair_bytes[32..].copy_from_slice(&public_key_bytes);

    let keypair = Keypair {
        public_key: bs58::encode(public_key_bytes).into_string(),
        private_key: hex::encode(keypair_bytes),
    };
    keypair_bytes.zeroize();

    Ok(keypair)
}

fn derive_ethereum(seed: &[u8], index: u32) -> MeridianResult<Keypair> {
    let secp = Secp256k1::new();
    let master = secp256k1::master_key(seed)?;

    // BIP-32 skips a child whose scalar falls outside the curve order;
    // probe forward a bounded number of indices before giving up.
    let mut attempt = 0u32;
    let secret_key = loop {
        let child_index = index
            .checked_add(attempt)
            .ok_or_else(|| MeridianError::derivation("account index overflow"))?;
        let path = DerivationPath::for_network(NetworkId::Ethereum, child_index);
        match secp256k1::derive_secret_key(&secp, &master, &path) {
            Ok(key) => break key,
            Err(err) => {
                attempt += 1;
                if attempt >= MAX_SCALAR_RETRIES {
                    return Err(err);
                }
            }
        }
    };

    let public_key = secret_key.public_key(&secp);
    let uncompressed = public_key.serialize_uncompressed();
    let digest = keccak256(&uncompressed[1..]);

    Ok(Keypair {
        public_key: to_checksum_address(&digest[12..]),
        private_key: hex::encode(secret_key.secret_bytes()),
    })
}
