//! SLIP-0010 ed25519 derivation
//!
//! HMAC-SHA512 hierarchical derivation for the ed25519 ledger. Unlike
//! BIP-32, the master secret is "ed25519 seed" and only hardened children
//! exist; a path with any non-hardened segment is rejected. All
//! intermediate key material is zeroized.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

use crate::derive::path::DerivationPath;
use crate::error::{MeridianError, MeridianResult};

type HmacSha512 = Hmac<Sha512>;

const MASTER_SECRET: &[u8] = b"ed25519 seed";

/// Derive a 32-byte ed25519 scalar from a seed and a fully-hardened path.
pub fn derive_scalar(seed: &[u8], path: &DerivationPath) -> MeridianResult<Zeroizing<[u8; 32]>> {
    if !path.is_fully_hardened() {
        return Err(MeridianError::derivation(format!(
            "ed25519 derivation requires every segment of {} to be hardened",
            path
        )));
    }

    let (mut key, mut chain_code) = hmac_split(MASTER_SECRET, &[seed])?;

    for segment in path.segments() {
        let index_be = segment.full_index().to_be_bytes();
        let (child_key, child_chain) = hmac_split(&chain_code, &[&[0x00], &key, &index_be])?;
        key.zeroize();
        chain_code.zeroize();
        key = child_key;
        chain_code = child_chain;
    }

    chain_code.zeroize();
    Ok(Zeroizing::new(key))
}

/// HMAC-SHA512 over the concatenated parts, split into (IL, IR).
fn hmac_split(mac_key: &[u8], parts: &[&[u8]]) -> MeridianResult<([u8; 32], [u8; 32])> {
    let mut mac = HmacSha512::new_from_slice(mac_key)
        .map_err(|e| MeridianError::derivation(format!("hmac init: {}", e)))?;
    for part in parts {
        mac.update(part);
    }
    let digest = mac.finalize().into_bytes();

    let mut buf = [0u8; 64];
    buf.copy_from_slice(&digest);

    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&buf[..32]);
    right.copy_from_slice(&buf[32..]);
    buf.zeroize();

    Ok((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NetworkId;

    // Official SLIP-0010 ed25519 test vector 1, seed 000102030405060708090a0b0c0d0e0f

    #[test]
    fn test_slip0010_master_key() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let (key, chain_code) = hmac_split(MASTER_SECRET, &[&seed]).unwrap();
        assert_eq!(
            hex::encode(key),
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );
        assert_eq!(
            hex::encode(chain_code),
            "90046a93de5380a72b5e45010748567d5ea02bbf6522f979e05c0d8d8ca9fffb"
        );
    }

    #[test]
    fn test_slip0010_first_hardened_child() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let (key, chain) = hmac_split(MASTER_SECRET, &[&seed]).unwrap();
        let index_be = (0u32 | crate::derive::path::HARDENED).to_be_bytes();
        let (child, _) = hmac_split(&chain, &[&[0x00], &key, &index_be]).unwrap();
        assert_eq!(
            hex::encode(child),
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let seed = [7u8; 64];
        let path = DerivationPath::for_network(NetworkId::Solana, 0);
        let a = derive_scalar(&seed, &path).unwrap();
        let b = derive_scalar(&seed, &path).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn test_distinct_accounts_distinct_scalars() {
        let seed = [7u8; 64];
        let k0 = derive_scalar(&seed, &DerivationPath::for_network(NetworkId::Solana, 0)).unwrap();
        let k1 = derive_scalar(&seed, &DerivationPath::for_network(NetworkId::Solana, 1)).unwrap();
        assert_ne!(*k0, *k1);
    }

    #[test]
    fn test_rejects_non_hardened_path() {
        let seed = [7u8; 64];
        let path = DerivationPath::for_network(NetworkId::Ethereum, 0);
        let result = derive_scalar(&seed, &path);
        assert!(matches!(result, Err(MeridianError::DerivationFailure(_))));
    }
}
