//! Native values handed to and returned by the codec

use std::fmt;

use vela_primitives::{Address, H256, I256, U256};

use super::param_type::ParamType;

/// Solidity ABI token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (20 bytes)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Signed integer (8-256 bits)
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// External function pointer: 20-byte address followed by a 4-byte selector
    Function([u8; 24]),
    /// Dynamic array
    Array(Vec<Token>),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Tuple (struct)
    Tuple(Vec<Token>),
}

impl Token {
    /// Create an address token
    pub fn address(addr: Address) -> Self {
        Token::Address(addr)
    }

    /// Create a uint256 token
    pub fn uint256(value: U256) -> Self {
        Token::Uint(value)
    }

    /// Create a uint256 from u128
    pub fn uint256_from_u128(value: u128) -> Self {
        Token::Uint(U256::from(value))
    }

    /// Create an int256 from i128
    pub fn int256_from_i128(value: i128) -> Self {
        Token::Int(I256::from(value))
    }

    /// Create a bool token
    pub fn bool(value: bool) -> Self {
        Token::Bool(value)
    }

    /// Create a bytes token
    pub fn bytes(data: Vec<u8>) -> Self {
        Token::Bytes(data)
    }

    /// Create a string token
    pub fn string(s: impl Into<String>) -> Self {
        Token::String(s.into())
    }

    /// Create a bytes32 token
    pub fn bytes32(data: H256) -> Self {
        Token::FixedBytes(data.as_bytes().to_vec())
    }

    /// Create a function-pointer token from its address and selector
    pub fn function(address: Address, selector: [u8; 4]) -> Self {
        let mut raw = [0u8; 24];
        raw[..20].copy_from_slice(address.as_bytes());
        raw[20..].copy_from_slice(&selector);
        Token::Function(raw)
    }

    /// Get the type of this token.
    ///
    /// Integers report 256 bits, and empty arrays report `uint256` elements
    /// since the element type cannot be recovered.
    pub fn type_of(&self) -> ParamType {
        match self {
            Token::Address(_) => ParamType::Address,
            Token::Uint(_) => ParamType::Uint(256),
            Token::Int(_) => ParamType::Int(256),
            Token::Bool(_) => ParamType::Bool,
            Token::Bytes(_) => ParamType::Bytes,
            Token::FixedBytes(b) => ParamType::FixedBytes(b.len()),
            Token::String(_) => ParamType::String,
            Token::Function(_) => ParamType::Function,
            Token::Array(tokens) => {
                let inner = tokens.first().map(|t| t.type_of()).unwrap_or(ParamType::Uint(256));
                ParamType::Array(Box::new(inner))
            }
            Token::FixedArray(tokens) => {
                let inner = tokens.first().map(|t| t.type_of()).unwrap_or(ParamType::Uint(256));
                ParamType::FixedArray(Box::new(inner), tokens.len())
            }
            Token::Tuple(tokens) => ParamType::Tuple(tokens.iter().map(|t| t.type_of()).collect()),
        }
    }

    /// The address, if this is an address token
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Token::Address(addr) => Some(addr),
            _ => None,
        }
    }

    /// The value, if this is an unsigned integer token
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Token::Uint(value) => Some(*value),
            _ => None,
        }
    }

    /// The value, if this is a signed integer token
    pub fn as_int(&self) -> Option<I256> {
        match self {
            Token::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The flag, if this is a bool token
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Token::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The text, if this is a string token
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes of a bytes, fixed-bytes or function token
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Token::Bytes(b) | Token::FixedBytes(b) => Some(b),
            Token::Function(raw) => Some(raw),
            _ => None,
        }
    }

    /// Members of an array, fixed array or tuple token
    pub fn as_slice(&self) -> Option<&[Token]> {
        match self {
            Token::Array(items) | Token::FixedArray(items) | Token::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Address> for Token {
    fn from(addr: Address) -> Self {
        Token::Address(addr)
    }
}

impl From<U256> for Token {
    fn from(value: U256) -> Self {
        Token::Uint(value)
    }
}

impl From<I256> for Token {
    fn from(value: I256) -> Self {
        Token::Int(value)
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        Token::Bool(value)
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token::Uint(U256::from(value))
    }
}

impl From<u128> for Token {
    fn from(value: u128) -> Self {
        Token::Uint(U256::from(value))
    }
}

impl From<i64> for Token {
    fn from(value: i64) -> Self {
        Token::Int(I256::from(value))
    }
}

impl From<i128> for Token {
    fn from(value: i128) -> Self {
        Token::Int(I256::from(value))
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token::String(s)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token::String(s.to_string())
    }
}

impl From<Vec<u8>> for Token {
    fn from(data: Vec<u8>) -> Self {
        Token::Bytes(data)
    }
}

impl From<H256> for Token {
    fn from(hash: H256) -> Self {
        Token::bytes32(hash)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Token], open: &str, close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Address(addr) => f.write_str(&vela_crypto::to_checksum(addr)),
            Token::Uint(value) => write!(f, "{}", value),
            Token::Int(value) => write!(f, "{}", value),
            Token::Bool(value) => write!(f, "{}", value),
            Token::FixedBytes(b) | Token::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Token::Function(raw) => write!(f, "0x{}", hex::encode(raw)),
            Token::String(s) => write!(f, "{:?}", s),
            Token::Array(items) | Token::FixedArray(items) => write_list(f, items, "[", "]"),
            Token::Tuple(items) => write_list(f, items, "(", ")"),
        }
    }
}
