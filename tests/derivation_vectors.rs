//! Fixture regression tests against the standard BIP-39 test mnemonic.

use meridian_core::{derive, NetworkId};

const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

// BIP-39 seed for the test mnemonic with an empty passphrase
const TEST_SEED_HEX: &str = "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4";

fn test_seed() -> Vec<u8> {
    hex::decode(TEST_SEED_HEX).unwrap()
}

#[test]
fn mnemonic_produces_reference_seed() {
    let seed = derive::seed_from_mnemonic(TEST_MNEMONIC).unwrap();
    assert_eq!(seed.as_ref(), test_seed().as_slice());
}

#[test]
fn ethereum_first_account_matches_reference_address() {
    // The widely published first address for m/44'/60'/0'/0/0 under the
    // test mnemonic
    let keypair = derive::derive(&test_seed(), NetworkId::Ethereum, 0).unwrap();
    assert_eq!(
        keypair.public_key,
        "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
    );
}

#[test]
fn ethereum_accounts_differ_by_final_index() {
    let seed = test_seed();
    let first = derive::derive(&seed, NetworkId::Ethereum, 0).unwrap();
    let second = derive::derive(&seed, NetworkId::Ethereum, 1).unwrap();
    assert_ne!(first.public_key, second.public_key);

    // Same path, same key, byte for byte
    let again = derive::derive(&seed, NetworkId::Ethereum, 1).unwrap();
    assert_eq!(second, again);
}

#[test]
fn solana_first_account_is_stable_and_well_formed() {
    let seed = test_seed();
    let keypair = derive::derive(&seed, NetworkId::Solana, 0).unwrap();

    // 32-byte base58 address; the SLIP-0010 vectors in the derivation
    // module pin the algorithm itself
    let public = bs58::decode(&keypair.public_key).into_vec().unwrap();
    assert_eq!(public.len(), 32);

    let again = derive::derive(&seed, NetworkId::Solana, 0).unwrap();
    assert_eq!(keypair, again);

    let other = derive::derive(&seed, NetworkId::Solana, 1).unwrap();
    assert_ne!(keypair.public_key, other.public_key);
}

#[test]
fn networks_never_share_key_material() {
    let seed = test_seed();
    let solana = derive::derive(&seed, NetworkId::Solana, 0).unwrap();
    let ethereum = derive::derive(&seed, NetworkId::Ethereum, 0).unwrap();
    assert_ne!(solana.private_key, ethereum.private_key);
}
