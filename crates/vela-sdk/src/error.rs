//! SDK error types

use thiserror::Error;

use crate::abi::AbiError;

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    /// Type parsing, encoding or decoding failed
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    /// No function matches the name, signature or selector
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// A bare name matches several overloads
    #[error("Ambiguous function {name}: candidates {candidates:?}")]
    AmbiguousFunction {
        /// Name looked up
        name: String,
        /// Signatures of the matching overloads
        candidates: Vec<String>,
    },

    /// No event matches the name, signature or topic
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Invalid address format or checksum
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl From<hex::FromHexError> for SdkError {
    fn from(e: hex::FromHexError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<vela_crypto::CryptoError> for SdkError {
    fn from(e: vela_crypto::CryptoError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}
