//! Static/dynamic classification, head sizes and zero values

use vela_primitives::{Address, I256, U256, WORD_SIZE};

use super::error::AbiError;
use super::param_type::ParamType;
use super::token::Token;

/// Deepest array/tuple nesting accepted by the parser and by validation
pub const MAX_TYPE_DEPTH: usize = 128;

/// Largest inline encoding (in bytes) a single type may describe.
///
/// Bounds fixed-size arrays such as `uint256[576460752303423488]` so that head
/// sizes cannot overflow and zero values cannot exhaust memory.
pub const MAX_INLINE_SIZE: usize = 1 << 24;

/// Array shape of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArraySize {
    /// `T[]`
    Dynamic,
    /// `T[n]`
    Static(usize),
    /// Not an array
    NotArray,
}

impl ParamType {
    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(types) => types.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }

    /// Check if this type is encoded entirely in place
    pub fn is_static(&self) -> bool {
        !self.is_dynamic()
    }

    /// `T[]` or `T[n]`
    pub fn is_array(&self) -> bool {
        matches!(self, ParamType::Array(_) | ParamType::FixedArray(..))
    }

    /// Tuple at the top level (arrays of tuples are arrays)
    pub fn is_tuple(&self) -> bool {
        matches!(self, ParamType::Tuple(_))
    }

    /// Element type of an array
    pub fn subtype(&self) -> Option<&ParamType> {
        match self {
            ParamType::Array(inner) | ParamType::FixedArray(inner, _) => Some(inner),
            _ => None,
        }
    }

    /// Array shape
    pub fn array_size(&self) -> ArraySize {
        match self {
            ParamType::Array(_) => ArraySize::Dynamic,
            ParamType::FixedArray(_, len) => ArraySize::Static(*len),
            _ => ArraySize::NotArray,
        }
    }

    /// Bytes the type occupies in the head of an enclosing encoding.
    ///
    /// Dynamic types take one offset word. Static arrays and tuples are laid
    /// out inline, so their size is the sum of their members.
    pub fn word_size(&self) -> usize {
        match self {
            ParamType::FixedArray(inner, len) if !inner.is_dynamic() => {
                inner.word_size().saturating_mul(*len)
            }
            ParamType::Tuple(types) if !types.iter().any(|t| t.is_dynamic()) => types
                .iter()
                .map(ParamType::word_size)
                .fold(0, usize::saturating_add),
            _ => WORD_SIZE,
        }
    }

    /// Upper bound on the inline bytes of this type, counting the heads of
    /// dynamic fixed arrays and at least one word per array element.
    pub(crate) fn inline_footprint(&self) -> usize {
        match self {
            ParamType::FixedArray(inner, len) => {
                inner.inline_footprint().max(WORD_SIZE).saturating_mul(*len)
            }
            ParamType::Tuple(types) => types
                .iter()
                .map(ParamType::inline_footprint)
                .fold(0, usize::saturating_add),
            _ => WORD_SIZE,
        }
    }

    /// Canonical empty value, used to fill outputs of a reverted call
    pub fn zero_value(&self) -> Token {
        match self {
            ParamType::Uint(_) => Token::Uint(U256::zero()),
            ParamType::Int(_) => Token::Int(I256::ZERO),
            ParamType::Address => Token::Address(Address::ZERO),
            ParamType::Bool => Token::Bool(false),
            ParamType::Function => Token::Function([0u8; 24]),
            ParamType::FixedBytes(len) => Token::FixedBytes(vec![0u8; *len]),
            ParamType::Bytes => Token::Bytes(Vec::new()),
            ParamType::String => Token::String(String::new()),
            ParamType::Array(_) => Token::Array(Vec::new()),
            ParamType::FixedArray(inner, len) => {
                Token::FixedArray((0..*len).map(|_| inner.zero_value()).collect())
            }
            ParamType::Tuple(types) => Token::Tuple(types.iter().map(ParamType::zero_value).collect()),
        }
    }

    /// Reject dynamic arrays of dynamic arrays (`uint256[][]`, `bytes[][2][]`).
    ///
    /// Fixed-size wrappers are looked through; tuples are not, so
    /// `(uint256[])[]` is accepted.
    pub fn check_nesting(&self) -> Result<(), AbiError> {
        match self {
            ParamType::Array(inner) => {
                if inner.has_dynamic_array_core() {
                    return Err(AbiError::UnsupportedType(format!(
                        "{}: nested dynamic arrays are not supported",
                        self
                    )));
                }
                inner.check_nesting()
            }
            ParamType::FixedArray(inner, _) => inner.check_nesting(),
            ParamType::Tuple(types) => types.iter().try_for_each(ParamType::check_nesting),
            _ => Ok(()),
        }
    }

    fn has_dynamic_array_core(&self) -> bool {
        match self {
            ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.has_dynamic_array_core(),
            _ => false,
        }
    }
}
