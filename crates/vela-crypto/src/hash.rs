//! Keccak-256 hashing

use sha3::{Digest, Keccak256};
use vela_primitives::H256;

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    H256::from_bytes(result.into())
}

/// 4-byte selector of a canonical signature such as `transfer(address,uint256)`
pub fn selector(signature: &str) -> [u8; 4] {
    keccak256(signature.as_bytes()).selector()
}
