//! Recipient and amount validation
//!
//! Both checks run before any network call is issued, so a bad request
//! never produces a side effect.

use crate::error::{MeridianError, MeridianResult};
use crate::types::NetworkId;
use crate::utils::crypto::to_checksum_address;

/// Validate a recipient address for the target network and return its
/// normalized form (EIP-55 checksummed for Ethereum).
pub fn validate_address(address: &str, network: NetworkId) -> MeridianResult<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(MeridianError::InvalidAddress("address is empty".into()));
    }

    match network {
        NetworkId::Solana => validate_solana_address(trimmed),
        NetworkId::Ethereum => validate_ethereum_address(trimmed),
    }
}

fn validate_solana_address(address: &str) -> MeridianResult<String> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|_| MeridianError::InvalidAddress(format!("not base58: {}", address)))?;

    if decoded.len() != 32 {
        return Err(MeridianError::InvalidAddress(format!(
            "expected 32 decoded bytes, got {}",
            decoded.len()
        )));
    }

    Ok(address.to_string())
}

fn validate_ethereum_address(address: &str) -> MeridianResult<String> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| MeridianError::InvalidAddress("missing 0x prefix".into()))?;

    if hex_part.len() != 40 {
        return Err(MeridianError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    let bytes = hex::decode(hex_part.to_lowercase())
        .map_err(|_| MeridianError::InvalidAddress("not hexadecimal".into()))?;

    let checksummed = to_checksum_address(&bytes);

    // Mixed case means the sender intended an EIP-55 checksum; verify it.
    // All-lowercase and all-uppercase forms carry no checksum.
    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && format!("0x{}", hex_part) != checksummed {
        return Err(MeridianError::InvalidAddress("checksum mismatch".into()));
    }

    Ok(checksummed)
}

/// Parse a decimal amount in the network's display unit into the smallest
/// unit. Rejects zero, negative, malformed and over-precise values.
pub fn parse_amount(amount: &str, network: NetworkId) -> MeridianResult<u128> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(MeridianError::InvalidAmount("amount is empty".into()));
    }

    let decimals = network.decimals() as usize;

    let (whole_str, frac_str) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole_str.is_empty() && frac_str.is_empty() {
        return Err(MeridianError::InvalidAmount(format!("malformed amount: {}", amount)));
    }

    let whole: u128 = if whole_str.is_empty() {
        0
    } else {
        whole_str
            .parse()
            .map_err(|_| MeridianError::InvalidAmount(format!("malformed amount: {}", amount)))?
    };

    if frac_str.len() > decimals {
        return Err(MeridianError::InvalidAmount(format!(
            "{} supports at most {} decimal places",
            network.symbol(),
            decimals
        )));
    }

    let frac: u128 = if frac_str.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac_str, width = decimals);
        padded
            .parse()
            .map_err(|_| MeridianError::InvalidAmount(format!("malformed amount: {}", amount)))?
    };

    let raw = whole
        .checked_mul(network.unit_scale())
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(|| MeridianError::InvalidAmount("amount overflow".into()))?;

    if raw == 0 {
        return Err(MeridianError::InvalidAmount("amount must be positive".into()));
    }

    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_solana_amounts() {
        assert_eq!(parse_amount("1.5", NetworkId::Solana).unwrap(), 1_500_000_000);
        assert_eq!(parse_amount("0.000000001", NetworkId::Solana).unwrap(), 1);
        assert_eq!(parse_amount("2", NetworkId::Solana).unwrap(), 2_000_000_000);
        assert_eq!(parse_amount(".5", NetworkId::Solana).unwrap(), 500_000_000);
    }

    #[test]
    fn test_parse_ethereum_amounts() {
        assert_eq!(
            parse_amount("1", NetworkId::Ethereum).unwrap(),
            1_000_000_000_000_000_000
        );
        assert_eq!(parse_amount("0.000000000000000001", NetworkId::Ethereum).unwrap(), 1);
    }

    #[test]
    fn test_rejects_bad_amounts() {
        for bad in ["0", "0.0", "", "  ", "-1", "abc", "1.2.3", "1e5", "."] {
            assert!(
                matches!(
                    parse_amount(bad, NetworkId::Ethereum),
                    Err(MeridianError::InvalidAmount(_))
                ),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_rejects_over_precision() {
        // 10 decimal places against a 9-decimal ledger
        assert!(matches!(
            parse_amount("0.0000000001", NetworkId::Solana),
            Err(MeridianError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_solana_address_validation() {
        // 32 bytes of base58
        let valid = bs58::encode([1u8; 32]).into_string();
        assert_eq!(validate_address(&valid, NetworkId::Solana).unwrap(), valid);

        assert!(validate_address("not-base58-0OIl", NetworkId::Solana).is_err());
        let short = bs58::encode([1u8; 16]).into_string();
        assert!(validate_address(&short, NetworkId::Solana).is_err());
    }

    #[test]
    fn test_ethereum_address_validation() {
        // Checksummed address passes and is preserved
        let addr = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(validate_address(addr, NetworkId::Ethereum).unwrap(), addr);

        // Lowercase is accepted and normalized to the checksummed form
        let lower = addr.to_lowercase();
        assert_eq!(validate_address(&lower, NetworkId::Ethereum).unwrap(), addr);

        // A flipped-case character breaks the checksum
        let tampered = addr.replace("Ef1", "eF1");
        assert!(matches!(
            validate_address(&tampered, NetworkId::Ethereum),
            Err(MeridianError::InvalidAddress(_))
        ));

        assert!(validate_address("0x1234", NetworkId::Ethereum).is_err());
        assert!(validate_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", NetworkId::Ethereum).is_err());
    }
}
