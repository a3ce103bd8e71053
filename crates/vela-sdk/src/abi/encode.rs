//! ABI encoding

use tracing::trace;
use vela_primitives::{H256, I256, U256, WORD_SIZE};

use super::element::Param;
use super::error::AbiError;
use super::param_type::ParamType;
use super::token::Token;

/// Encode tokens against their declared types (Solidity head/tail layout)
pub fn encode(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    let types: Vec<&ParamType> = types.iter().collect();
    encode_checked(&types, tokens)
}

/// Encode tokens against a parameter list
pub fn encode_params(params: &[Param], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    let types: Vec<&ParamType> = params.iter().map(|p| &p.kind).collect();
    encode_checked(&types, tokens)
}

/// Encode one value without the enclosing head.
///
/// For a dynamic type this is the payload an offset would point at, so
/// `bytes` `[1, 2, 3]` yields a length word and one padded data word.
pub fn encode_single(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, AbiError> {
    param_type.validate()?;
    param_type.check_nesting()?;
    encode_token(param_type, token)
}

/// Encode function call (selector + params)
pub fn encode_function_call(
    selector: [u8; 4],
    types: &[ParamType],
    tokens: &[Token],
) -> Result<Vec<u8>, AbiError> {
    let mut result = selector.to_vec();
    result.extend(encode(types, tokens)?);
    Ok(result)
}

/// Compute function selector (first 4 bytes of keccak256(signature))
pub fn function_selector(signature: &str) -> [u8; 4] {
    vela_crypto::selector(signature)
}

/// Non-standard packed encoding, as produced by Solidity's `abi.encodePacked`.
///
/// Elementary values take their natural width with no padding (`uint64` is 8
/// bytes, `bool` is 1, `address` is 20), `bytes` and `string` are written raw
/// without a length, and array elements are padded to a word each. Tuples and
/// arrays of dynamic or composite elements have no packed form.
pub fn encode_packed(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    if types.len() != tokens.len() {
        return Err(AbiError::ArityMismatch {
            expected: types.len(),
            got: tokens.len(),
        });
    }
    let mut packed = Vec::new();
    for (param_type, token) in types.iter().zip(tokens) {
        param_type.validate()?;
        packed.extend(encode_packed_token(param_type, token)?);
    }
    trace!(params = types.len(), bytes = packed.len(), "packed parameters");
    Ok(packed)
}

/// `keccak256(abi.encodePacked(..))`, the web3 `soliditySha3` helper
pub fn solidity_sha3(types: &[ParamType], tokens: &[Token]) -> Result<H256, AbiError> {
    Ok(vela_crypto::keccak256(&encode_packed(types, tokens)?))
}

fn encode_checked(types: &[&ParamType], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    if types.len() != tokens.len() {
        return Err(AbiError::ArityMismatch {
            expected: types.len(),
            got: tokens.len(),
        });
    }
    for param_type in types {
        param_type.validate()?;
        param_type.check_nesting()?;
    }
    let items: Vec<(&ParamType, &Token)> = types.iter().copied().zip(tokens).collect();
    let encoded = encode_head_tail(&items)?;
    trace!(params = types.len(), bytes = encoded.len(), "encoded parameters");
    Ok(encoded)
}

/// Lay out a sequence: static members inline, dynamic members as offsets into the tail
fn encode_head_tail(items: &[(&ParamType, &Token)]) -> Result<Vec<u8>, AbiError> {
    let head_size = items.iter().map(|(t, _)| t.word_size()).fold(0, usize::saturating_add);

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (param_type, token) in items {
        if param_type.is_dynamic() {
            let offset = head_size + tail.len();
            head.extend(encode_u256(&U256::from(offset)));
            tail.extend(encode_token(param_type, token)?);
        } else {
            head.extend(encode_token(param_type, token)?);
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Encode a single token
fn encode_token(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, AbiError> {
    let mismatch = || AbiError::coercion(param_type, token);

    match param_type {
        ParamType::Uint(bits) => {
            let value = match token {
                Token::Uint(value) => *value,
                Token::Int(value) if !value.is_negative() => value.into_raw(),
                _ => return Err(mismatch()),
            };
            if value.bits() > *bits {
                return Err(mismatch());
            }
            Ok(encode_u256(&value))
        }
        ParamType::Int(bits) => {
            let value = match token {
                Token::Int(value) => *value,
                Token::Uint(value) => I256::try_from(*value).map_err(|_| mismatch())?,
                _ => return Err(mismatch()),
            };
            if !value.fits_in_bits(*bits) {
                return Err(mismatch());
            }
            Ok(value.to_be_bytes().to_vec())
        }
        ParamType::Address => match token {
            Token::Address(addr) => Ok(addr.to_word().to_vec()),
            _ => Err(mismatch()),
        },
        ParamType::Bool => match token {
            Token::Bool(b) => {
                let mut buf = [0u8; 32];
                buf[31] = u8::from(*b);
                Ok(buf.to_vec())
            }
            _ => Err(mismatch()),
        },
        ParamType::FixedBytes(size) => match token {
            Token::FixedBytes(data) | Token::Bytes(data) if data.len() <= *size => {
                Ok(right_pad(data))
            }
            _ => Err(mismatch()),
        },
        ParamType::Function => match token {
            Token::Function(raw) => Ok(right_pad(raw)),
            Token::FixedBytes(data) if data.len() == 24 => Ok(right_pad(data)),
            _ => Err(mismatch()),
        },
        ParamType::Bytes => match token {
            Token::Bytes(data) | Token::FixedBytes(data) => Ok(encode_bytes(data)),
            _ => Err(mismatch()),
        },
        ParamType::String => match token {
            Token::String(s) => Ok(encode_bytes(s.as_bytes())),
            _ => Err(mismatch()),
        },
        ParamType::Array(inner) => match token {
            Token::Array(tokens) => {
                let items: Vec<(&ParamType, &Token)> =
                    tokens.iter().map(|t| (inner.as_ref(), t)).collect();
                let mut result = encode_u256(&U256::from(tokens.len()));
                result.extend(encode_head_tail(&items)?);
                Ok(result)
            }
            _ => Err(mismatch()),
        },
        ParamType::FixedArray(inner, size) => match token {
            Token::FixedArray(tokens) | Token::Array(tokens) if tokens.len() == *size => {
                let items: Vec<(&ParamType, &Token)> =
                    tokens.iter().map(|t| (inner.as_ref(), t)).collect();
                encode_head_tail(&items)
            }
            _ => Err(mismatch()),
        },
        ParamType::Tuple(types) => match token {
            Token::Tuple(tokens) if tokens.len() == types.len() => {
                let items: Vec<(&ParamType, &Token)> = types.iter().zip(tokens).collect();
                encode_head_tail(&items)
            }
            _ => Err(mismatch()),
        },
    }
}

/// Packed form of a single value; elementary values reuse the word encoding
/// (and its range checks) and keep only the significant bytes
fn encode_packed_token(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, AbiError> {
    match param_type {
        ParamType::Uint(bits) | ParamType::Int(bits) => {
            let word = encode_token(param_type, token)?;
            Ok(word[WORD_SIZE - bits / 8..].to_vec())
        }
        ParamType::Address => Ok(encode_token(param_type, token)?[12..].to_vec()),
        ParamType::Bool => Ok(encode_token(param_type, token)?[WORD_SIZE - 1..].to_vec()),
        ParamType::FixedBytes(size) => Ok(encode_token(param_type, token)?[..*size].to_vec()),
        ParamType::Function => Ok(encode_token(param_type, token)?[..24].to_vec()),
        ParamType::Bytes => match token {
            Token::Bytes(data) | Token::FixedBytes(data) => Ok(data.clone()),
            _ => Err(AbiError::coercion(param_type, token)),
        },
        ParamType::String => match token {
            Token::String(s) => Ok(s.as_bytes().to_vec()),
            _ => Err(AbiError::coercion(param_type, token)),
        },
        ParamType::Array(inner) | ParamType::FixedArray(inner, _) => {
            if inner.is_dynamic() || inner.is_array() || inner.is_tuple() {
                return Err(AbiError::UnsupportedType(format!(
                    "{}: packed arrays need elementary static elements",
                    param_type
                )));
            }
            let items = match (param_type, token) {
                (ParamType::Array(_), Token::Array(items)) => items,
                (ParamType::FixedArray(_, size), Token::FixedArray(items) | Token::Array(items))
                    if items.len() == *size =>
                {
                    items
                }
                _ => return Err(AbiError::coercion(param_type, token)),
            };
            let mut packed = Vec::with_capacity(items.len() * WORD_SIZE);
            for item in items {
                packed.extend(encode_token(inner, item)?);
            }
            Ok(packed)
        }
        ParamType::Tuple(_) => Err(AbiError::UnsupportedType(format!(
            "{}: tuples have no packed encoding",
            param_type
        ))),
    }
}

/// Convert U256 to 32-byte big-endian array
fn u256_to_bytes(value: &U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

/// Encode a U256 as 32 bytes
fn encode_u256(value: &U256) -> Vec<u8> {
    u256_to_bytes(value).to_vec()
}

/// Left-align `data` and zero-pad to a word boundary
fn right_pad(data: &[u8]) -> Vec<u8> {
    let padded_len = data.len().div_ceil(WORD_SIZE).max(1) * WORD_SIZE;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    padded
}

/// Encode dynamic bytes
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = encode_u256(&U256::from(data.len()));
    if !data.is_empty() {
        result.extend(right_pad(data));
    }
    result
}
