//! BIP-32 derivation for the secp256k1 ledger

use bitcoin::bip32::{ChildNumber, DerivationPath as Bip32Path, Xpriv};
use bitcoin::secp256k1::{All, Secp256k1, SecretKey};
use bitcoin::NetworkKind;

use crate::derive::path::DerivationPath;
use crate::error::{MeridianError, MeridianResult};

/// Build the BIP-32 master extended key from a 64-byte seed.
pub fn master_key(seed: &[u8]) -> MeridianResult<Xpriv> {
    Xpriv::new_master(NetworkKind::Main, seed).map_err(Into::into)
}

/// Derive the child secret key at `path` below `master`.
pub fn derive_secret_key(
    secp: &Secp256k1<All>,
    master: &Xpriv,
    path: &DerivationPath,
) -> MeridianResult<SecretKey> {
    let children = path
        .segments()
        .iter()
        .map(|segment| {
            if segment.hardened {
                ChildNumber::from_hardened_idx(segment.index)
            } else {
                ChildNumber::from_normal_idx(segment.index)
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MeridianError::derivation(format!("invalid child index: {}", e)))?;

    let child = master.derive_priv(secp, &Bip32Path::from(children))?;
    Ok(child.private_key)
}
