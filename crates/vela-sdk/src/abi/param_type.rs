//! Solidity parameter types

use std::fmt;

use super::error::AbiError;
use super::layout::{MAX_INLINE_SIZE, MAX_TYPE_DEPTH};

/// Solidity ABI parameter type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Address
    Address,
    /// Boolean
    Bool,
    /// External function pointer (address + selector, 24 bytes)
    Function,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// Dynamic bytes
    Bytes,
    /// UTF-8 string
    String,
    /// Dynamic array `T[]`
    Array(Box<ParamType>),
    /// Fixed-size array `T[N]`
    FixedArray(Box<ParamType>, usize),
    /// Tuple (struct)
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Whether the tree satisfies the width/length constraints at every level
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check width/length constraints, reporting the first offending node.
    ///
    /// Trees nested deeper than [`MAX_TYPE_DEPTH`] or describing more than
    /// [`MAX_INLINE_SIZE`] inline bytes are rejected as well.
    pub fn validate(&self) -> Result<(), AbiError> {
        self.validate_at(0)?;
        let footprint = self.inline_footprint();
        if footprint > MAX_INLINE_SIZE {
            return Err(AbiError::InvalidType(format!(
                "{}: inline size {} exceeds limit {}",
                self, footprint, MAX_INLINE_SIZE
            )));
        }
        Ok(())
    }

    fn validate_at(&self, depth: usize) -> Result<(), AbiError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(AbiError::InvalidType(format!(
                "type nested deeper than {} levels",
                MAX_TYPE_DEPTH
            )));
        }
        match self {
            ParamType::Uint(bits) | ParamType::Int(bits) => {
                if *bits == 0 || *bits > 256 || bits % 8 != 0 {
                    return Err(AbiError::InvalidType(format!(
                        "{}: bit width must be a multiple of 8 in 8..=256",
                        self
                    )));
                }
                Ok(())
            }
            ParamType::FixedBytes(len) => {
                if *len == 0 || *len > 32 {
                    return Err(AbiError::InvalidType(format!(
                        "{}: length must be in 1..=32",
                        self
                    )));
                }
                Ok(())
            }
            ParamType::Array(inner) => inner.validate_at(depth + 1),
            ParamType::FixedArray(inner, len) => {
                if *len == 0 {
                    return Err(AbiError::InvalidType(format!(
                        "{}: fixed array length must be positive",
                        self
                    )));
                }
                inner.validate_at(depth + 1)
            }
            ParamType::Tuple(members) => members.iter().try_for_each(|m| m.validate_at(depth + 1)),
            ParamType::Address
            | ParamType::Bool
            | ParamType::Function
            | ParamType::Bytes
            | ParamType::String => Ok(()),
        }
    }

    /// Canonical type string used in signatures, e.g. `(uint256,address)[]`
    pub fn abi_representation(&self) -> String {
        self.to_string()
    }

    /// Replace the innermost tuple placeholder with `components`.
    ///
    /// Array wrappers are kept, so `tuple[2][]` with components `[uint256, bool]`
    /// becomes `(uint256,bool)[2][]`. Fails when no tuple sits at the bottom of
    /// the array chain.
    pub fn attach_components(self, components: Vec<ParamType>) -> Result<ParamType, AbiError> {
        match self {
            ParamType::Tuple(_) => Ok(ParamType::Tuple(components)),
            ParamType::Array(inner) => Ok(ParamType::Array(Box::new(
                inner.attach_components(components)?,
            ))),
            ParamType::FixedArray(inner, len) => Ok(ParamType::FixedArray(
                Box::new(inner.attach_components(components)?),
                len,
            )),
            other => Err(AbiError::InvalidAbi(format!(
                "components given for non-tuple type {}",
                other
            ))),
        }
    }

    /// Whether the bottom of the array chain is a tuple
    pub fn is_tuple_based(&self) -> bool {
        match self {
            ParamType::Tuple(_) => true,
            ParamType::Array(inner) | ParamType::FixedArray(inner, _) => inner.is_tuple_based(),
            _ => false,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::Address => f.write_str("address"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Function => f.write_str("function"),
            ParamType::FixedBytes(len) => write!(f, "bytes{}", len),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::String => f.write_str("string"),
            ParamType::Array(inner) => write!(f, "{}[]", inner),
            ParamType::FixedArray(inner, len) => write!(f, "{}[{}]", inner, len),
            ParamType::Tuple(members) => {
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", member)?;
                }
                f.write_str(")")
            }
        }
    }
}
