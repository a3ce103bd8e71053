//! # vela-sdk
//!
//! Solidity ABI toolkit for Ethereum-compatible chains.
//!
//! ## Features
//!
//! - **abi**: type-string parser, static/dynamic classification, encoder and
//!   decoder, JSON ABI elements, revert and event decoding
//! - **Contract**: an address bound to its ABI, with overload-aware lookups
//! - **CodecConfig**: decoder strictness and limits, loadable from TOML
//!
//! ## Quick Start
//!
//! ```rust
//! use vela_sdk::{abi::Token, Contract, U256};
//!
//! let abi = r#"[{"type":"function","name":"balanceOf",
//!     "inputs":[{"name":"owner","type":"address"}],
//!     "outputs":[{"name":"balance","type":"uint256"}],
//!     "stateMutability":"view"}]"#;
//! let contract = Contract::from_json("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", abi).unwrap();
//!
//! let data = contract
//!     .encode_call("balanceOf", &[Token::Address(*contract.address())])
//!     .unwrap();
//! assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
//!
//! let mut ret = [0u8; 32];
//! ret[31] = 42;
//! let outcome = contract.decode_output("balanceOf", &ret).unwrap();
//! assert_eq!(outcome.outputs().by_name("balance"), Some(&Token::Uint(U256::from(42))));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
mod config;
pub mod contract;
mod error;

// Re-export main types
pub use config::CodecConfig;
pub use contract::{Contract, ContractBuilder};
pub use error::SdkError;

// Re-export primitives for convenience
pub use vela_primitives::{Address, H256, I256, U256};
