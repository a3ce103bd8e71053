//! ABI error types

use thiserror::Error;

/// Errors raised while parsing types or encoding/decoding ABI data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Type string does not match the grammar, or the type tree is invalid
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// Number of values differs from number of declared types
    #[error("arity mismatch: expected {expected} values, got {got}")]
    ArityMismatch {
        /// Declared parameter count
        expected: usize,
        /// Supplied value count
        got: usize,
    },

    /// A value cannot be represented as its declared type
    #[error("cannot encode {value} as {expected}")]
    ValueCoercion {
        /// Declared type
        expected: String,
        /// Description of the offending value
        value: String,
    },

    /// Buffer too short for the data it must hold
    #[error("truncated data: need {needed} bytes, have {available}")]
    TruncatedData {
        /// Bytes required
        needed: usize,
        /// Bytes present
        available: usize,
    },

    /// A dynamic offset points outside the buffer
    #[error("offset {offset} out of bounds for {len}-byte buffer")]
    OffsetOutOfBounds {
        /// Offending offset
        offset: usize,
        /// Buffer length
        len: usize,
    },

    /// Bytes present but not a canonical encoding of the declared type
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Structurally valid type the codec refuses to handle
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Malformed JSON ABI entry
    #[error("invalid ABI: {0}")]
    InvalidAbi(String),

    /// Calldata selector does not belong to the function
    #[error("selector mismatch: expected 0x{expected}, got 0x{got}")]
    SelectorMismatch {
        /// Function selector, hex
        expected: String,
        /// Selector found in the data, hex
        got: String,
    },

    /// Log topics do not belong to the event
    #[error("log does not match event {0}")]
    EventMismatch(String),
}

impl AbiError {
    pub(crate) fn coercion(expected: impl ToString, value: impl ToString) -> Self {
        AbiError::ValueCoercion {
            expected: expected.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn truncated(needed: usize, available: usize) -> Self {
        AbiError::TruncatedData { needed, available }
    }
}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::InvalidAbi(e.to_string())
    }
}
