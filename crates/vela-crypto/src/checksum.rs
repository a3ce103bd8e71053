//! EIP-55 mixed-case address checksums

use vela_primitives::Address;

use crate::error::CryptoError;
use crate::hash::keccak256;

/// Render an address with its EIP-55 checksum casing
pub fn to_checksum(address: &Address) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(lower.as_bytes());
    let hash = hash.as_bytes();

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Check that a mixed-case address string carries a correct checksum.
///
/// All-lowercase and all-uppercase strings carry no checksum and are accepted.
pub fn is_valid_checksum(s: &str) -> bool {
    parse_checksummed(s).is_ok()
}

/// Parse an address, enforcing the checksum when the input is mixed-case
pub fn parse_checksummed(s: &str) -> Result<Address, CryptoError> {
    let s = s.trim();
    let address = Address::from_hex(s)?;
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum(&address)[2..] != *digits {
        return Err(CryptoError::InvalidChecksum(s.to_string()));
    }
    Ok(address)
}
