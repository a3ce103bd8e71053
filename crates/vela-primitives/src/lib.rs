//! # vela-primitives
//!
//! Fixed-size value types shared by the vela crates.
//!
//! - [`Address`]: 20-byte account address
//! - [`H256`]: 32-byte hash (Keccak digests, event topics)
//! - [`U256`]: unsigned 256-bit integer (re-exported from `primitive-types`)
//! - [`I256`]: signed 256-bit integer in two's complement

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;
mod int;

pub use address::{Address, AddressError};
pub use hash::{Hash, HashError, H256};
pub use int::{IntError, I256};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Size of one EVM word in bytes
pub const WORD_SIZE: usize = 32;
