//! Cryptographic errors

use thiserror::Error;

/// Cryptographic operation error
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Address text could not be parsed at all
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] vela_primitives::AddressError),

    /// Mixed-case address whose letter case does not match its EIP-55 checksum
    #[error("checksum mismatch for address {0}")]
    InvalidChecksum(String),
}
