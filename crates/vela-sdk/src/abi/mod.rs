//! ABI encoding and decoding for Solidity contracts
//!
//! This module provides functionality for:
//! - Parsing type strings such as `uint256[3][]` or `(address,uint8)[2]`
//! - Classifying types (static/dynamic, head size, zero value)
//! - Encoding function calls and constructor arguments
//! - Decoding return data, reverts, calldata and event logs
//! - Reading JSON ABI documents
//!
//! # Example
//!
//! ```rust
//! use vela_sdk::abi::{decode, encode, function_selector, parse_type, Token};
//! use vela_primitives::{Address, U256};
//!
//! // Encode a transfer call
//! let types = [parse_type("address").unwrap(), parse_type("uint256").unwrap()];
//! let selector = function_selector("transfer(address,uint256)");
//! let mut data = selector.to_vec();
//! data.extend(encode(&types, &[Token::Address(Address::ZERO), Token::Uint(U256::from(1000))]).unwrap());
//! assert_eq!(data.len(), 68);
//!
//! // Decode a balance response
//! let return_data = [0u8; 32];
//! let balance = decode(&[parse_type("uint256").unwrap()], &return_data).unwrap();
//! assert_eq!(balance[0], Token::Uint(U256::zero()));
//! ```

mod decode;
mod element;
mod encode;
mod error;
mod json;
mod layout;
mod param_type;
mod parser;
mod revert;
mod token;

pub use decode::{decode, decode_params, AbiDecoder, DecodedParams};
pub use element::{
    Constructor, CustomError, Element, Event, Fallback, Function, Param, Receive, StateMutability,
};
pub use encode::{
    encode, encode_function_call, encode_packed, encode_params, encode_single, function_selector,
    solidity_sha3,
};
pub use error::AbiError;
pub use json::{Abi, AbiEntry, AbiParam};
pub use layout::{ArraySize, MAX_INLINE_SIZE, MAX_TYPE_DEPTH};
pub use param_type::ParamType;
pub use parser::parse_type;
pub use revert::{decode_revert, CallOutcome, Revert, RevertReason, ERROR_SELECTOR, PANIC_SELECTOR};
pub use token::Token;
