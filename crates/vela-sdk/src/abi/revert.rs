//! Return-data decoding with revert detection

use std::fmt;

use tracing::debug;
use vela_primitives::U256;

use super::decode::{AbiDecoder, DecodedParams};
use super::element::{CustomError, Function};
use super::error::AbiError;
use super::param_type::ParamType;
use super::token::Token;

/// Selector of `Error(string)`, emitted by `require(cond, "message")` and `revert("message")`
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Selector of `Panic(uint256)`, emitted by failed asserts and arithmetic checks
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Why a call reverted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// No return data: `require(cond)` or `revert()`
    Empty,
    /// `Error(string)` message
    Message(String),
    /// `Panic(uint256)` code
    Panic(U256),
    /// Custom error declared in the ABI
    Custom {
        /// Declaration, e.g. `InsufficientBalance(uint256 available)`
        declaration: String,
        /// Decoded error fields
        params: DecodedParams,
    },
}

impl RevertReason {
    /// Solidity's meaning of a panic code
    pub fn panic_description(code: &U256) -> Option<&'static str> {
        if code.bits() > 8 {
            return None;
        }
        let description = match code.low_u64() {
            0x00 => "generic compiler panic",
            0x01 => "assertion failed",
            0x11 => "arithmetic overflow or underflow",
            0x12 => "division or modulo by zero",
            0x21 => "invalid enum value",
            0x22 => "corrupt storage byte array",
            0x31 => "pop on empty array",
            0x32 => "array index out of bounds",
            0x41 => "out of memory",
            0x51 => "call to zero-initialized function",
            _ => return None,
        };
        Some(description)
    }
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevertReason::Empty => f.write_str("execution reverted"),
            RevertReason::Message(msg) => write!(f, "execution reverted: {}", msg),
            RevertReason::Panic(code) => match Self::panic_description(code) {
                Some(description) => write!(f, "panic 0x{:02x}: {}", code.low_u64(), description),
                None => write!(f, "panic 0x{:x}", code),
            },
            RevertReason::Custom { declaration, .. } => {
                write!(f, "execution reverted with {}", declaration)
            }
        }
    }
}

/// A reverted call; outputs are still fully populated with zero values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revert {
    /// Why the call reverted
    pub reason: RevertReason,
    /// Declared outputs set to their zero value
    pub outputs: DecodedParams,
}

/// Result of decoding a call's return data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// Normal return
    Success(DecodedParams),
    /// Revert recognised in the return data
    Reverted(Revert),
}

impl CallOutcome {
    /// True for a normal return
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    /// Decoded outputs, zero-filled on revert
    pub fn outputs(&self) -> &DecodedParams {
        match self {
            CallOutcome::Success(outputs) => outputs,
            CallOutcome::Reverted(revert) => &revert.outputs,
        }
    }

    /// Revert reason, if the call reverted
    pub fn revert_reason(&self) -> Option<&RevertReason> {
        match self {
            CallOutcome::Success(_) => None,
            CallOutcome::Reverted(revert) => Some(&revert.reason),
        }
    }

    /// Outputs of a successful call, the revert otherwise
    pub fn into_result(self) -> Result<DecodedParams, Revert> {
        match self {
            CallOutcome::Success(outputs) => Ok(outputs),
            CallOutcome::Reverted(revert) => Err(revert),
        }
    }
}

/// Recognise a revert payload: `Error(string)`, `Panic(uint256)` or a known custom error.
///
/// Payloads whose body does not decode are not treated as reverts.
pub fn decode_revert(decoder: &AbiDecoder, data: &[u8], errors: &[CustomError]) -> Option<RevertReason> {
    if data.len() < 4 {
        return None;
    }
    let (selector, body) = data.split_at(4);

    if selector == ERROR_SELECTOR {
        if let Ok(mut tokens) = decoder.decode(&[ParamType::String], body) {
            if let Some(Token::String(msg)) = tokens.pop() {
                debug!(message = %msg, "revert with message");
                return Some(RevertReason::Message(msg));
            }
        }
    }

    if selector == PANIC_SELECTOR {
        if let Ok(mut tokens) = decoder.decode(&[ParamType::Uint(256)], body) {
            if let Some(Token::Uint(code)) = tokens.pop() {
                debug!(code = %code, "panic revert");
                return Some(RevertReason::Panic(code));
            }
        }
    }

    let error = errors.iter().find(|e| e.selector() == selector)?;
    match decoder.decode_params(&error.inputs, body) {
        Ok(params) => {
            debug!(error = %error.signature(), "custom error revert");
            Some(RevertReason::Custom {
                declaration: error.declaration(),
                params,
            })
        }
        Err(e) => {
            debug!(error = %error.signature(), %e, "custom error selector with undecodable body");
            None
        }
    }
}

impl Function {
    /// Zero value for every declared output
    pub fn zero_outputs(&self) -> DecodedParams {
        let tokens = self.outputs.iter().map(|p| p.kind.zero_value()).collect();
        DecodedParams::from_tokens(&self.outputs, tokens)
    }

    /// Decode return data, recognising reverts
    pub fn decode_output(&self, data: &[u8], errors: &[CustomError]) -> Result<CallOutcome, AbiError> {
        self.decode_output_with(&AbiDecoder::default(), data, errors)
    }

    /// Decode return data with explicit decoder settings.
    ///
    /// Empty data while outputs are declared is a bare `require` failure.
    /// Reverts are reported as [`CallOutcome::Reverted`], not as errors.
    pub fn decode_output_with(
        &self,
        decoder: &AbiDecoder,
        data: &[u8],
        errors: &[CustomError],
    ) -> Result<CallOutcome, AbiError> {
        if data.is_empty() && !self.outputs.is_empty() {
            debug!(function = %self.name, "empty return data");
            return Ok(self.reverted(RevertReason::Empty));
        }

        if let Some(reason) = decode_revert(decoder, data, errors) {
            return Ok(self.reverted(reason));
        }

        Ok(CallOutcome::Success(decoder.decode_params(&self.outputs, data)?))
    }

    fn reverted(&self, reason: RevertReason) -> CallOutcome {
        CallOutcome::Reverted(Revert {
            reason,
            outputs: self.zero_outputs(),
        })
    }
}
