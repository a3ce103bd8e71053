//! # vela-crypto
//!
//! Hashing helpers used by the ABI layer.
//!
//! - Keccak-256 hashing (signatures, selectors, event topics)
//! - EIP-55 mixed-case checksum addresses

#![warn(missing_docs)]
#![warn(clippy::all)]

mod checksum;
mod error;
mod hash;

pub use checksum::{is_valid_checksum, parse_checksummed, to_checksum};
pub use error::CryptoError;
pub use hash::{keccak256, selector};
