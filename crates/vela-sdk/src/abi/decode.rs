//! ABI decoding
//!
//! Every nested sequence (the top-level parameter list, an array body, a
//! tuple) is decoded against its own base slice, because offsets inside a
//! nested encoding are relative to the start of that encoding.

use std::ops::Index;

use tracing::{debug, trace};
use vela_primitives::{Address, I256, U256, WORD_SIZE};

use super::element::Param;
use super::error::AbiError;
use super::param_type::ParamType;
use super::token::Token;
use crate::config::CodecConfig;

/// Decode tokens from ABI-encoded data with the default (strict) settings
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    AbiDecoder::default().decode(types, data)
}

/// Decode a parameter list, keeping parameter names alongside the values
pub fn decode_params(params: &[Param], data: &[u8]) -> Result<DecodedParams, AbiError> {
    AbiDecoder::default().decode_params(params, data)
}

/// Decoder carrying a [`CodecConfig`]
#[derive(Debug, Clone, Default)]
pub struct AbiDecoder {
    config: CodecConfig,
}

impl AbiDecoder {
    /// Strict decoder with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder with explicit settings
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Active settings
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode `data` against `types`
    pub fn decode(&self, types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
        let types: Vec<&ParamType> = types.iter().collect();
        self.decode_top_level(&types, data)
    }

    /// Decode `data` against a parameter list
    pub fn decode_params(&self, params: &[Param], data: &[u8]) -> Result<DecodedParams, AbiError> {
        let types: Vec<&ParamType> = params.iter().map(|p| &p.kind).collect();
        let tokens = self.decode_top_level(&types, data)?;
        Ok(DecodedParams::from_tokens(params, tokens))
    }

    fn decode_top_level(&self, types: &[&ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
        for param_type in types {
            param_type.validate()?;
            param_type.check_nesting()?;
        }
        self.decode_sequence(types, data, true)
    }

    /// Decode a head/tail sequence laid out at the start of `data`
    fn decode_sequence(
        &self,
        types: &[&ParamType],
        data: &[u8],
        top_level: bool,
    ) -> Result<Vec<Token>, AbiError> {
        let head_size = types.iter().map(|t| t.word_size()).fold(0, usize::saturating_add);
        if data.len() < head_size {
            return Err(AbiError::truncated(head_size, data.len()));
        }

        let mut tokens = Vec::with_capacity(types.len());
        let mut cursor = 0;

        for param_type in types {
            let token = if param_type.is_dynamic() {
                let word = read_word(data, cursor)?;
                let result = payload_offset(word, data.len())
                    .and_then(|offset| {
                        trace!(ty = %param_type, head = cursor, offset, "following offset");
                        self.decode_token(param_type, &data[offset..])
                    });
                match result {
                    Ok(token) => token,
                    Err(e @ AbiError::OffsetOutOfBounds { .. })
                        if top_level && self.config.bytes32_string_fallback =>
                    {
                        self.fixed_word_fallback(param_type, word).ok_or(e)?
                    }
                    Err(e) => return Err(e),
                }
            } else {
                trace!(ty = %param_type, head = cursor, "decoding in place");
                self.decode_token(param_type, &data[cursor..])?
            };
            tokens.push(token);
            cursor += param_type.word_size();
        }

        Ok(tokens)
    }

    /// Decode one value whose encoding starts at `data[0]`
    fn decode_token(&self, param_type: &ParamType, data: &[u8]) -> Result<Token, AbiError> {
        let strict = self.config.strict;

        match param_type {
            ParamType::Address => {
                let word = read_word(data, 0)?;
                let addr = if strict {
                    Address::from_word(word).map_err(|_| {
                        AbiError::InvalidData(format!("dirty address padding: 0x{}", hex::encode(word)))
                    })?
                } else {
                    Address::from_word_unchecked(word)
                };
                Ok(Token::Address(addr))
            }
            ParamType::Uint(bits) => {
                let value = U256::from_big_endian(read_word(data, 0)?);
                if value.bits() <= *bits {
                    Ok(Token::Uint(value))
                } else if strict {
                    Err(AbiError::InvalidData(format!("{} does not fit in uint{}", value, bits)))
                } else {
                    Ok(Token::Uint(value & ((U256::one() << *bits) - U256::one())))
                }
            }
            ParamType::Int(bits) => {
                let value = I256::from_be_bytes(read_word(data, 0)?);
                if value.fits_in_bits(*bits) {
                    Ok(Token::Int(value))
                } else if strict {
                    Err(AbiError::InvalidData(format!("{} does not fit in int{}", value, bits)))
                } else {
                    Ok(Token::Int(value.truncate_to_bits(*bits)))
                }
            }
            ParamType::Bool => {
                let word = read_word(data, 0)?;
                let nonzero = word.iter().any(|b| *b != 0);
                if strict && nonzero && !(word[31] == 1 && word[..31].iter().all(|b| *b == 0)) {
                    return Err(AbiError::InvalidData(format!(
                        "non-canonical bool: 0x{}",
                        hex::encode(word)
                    )));
                }
                Ok(Token::Bool(nonzero))
            }
            ParamType::FixedBytes(size) => {
                let word = read_word(data, 0)?;
                check_padding(word, *size, strict, param_type)?;
                Ok(Token::FixedBytes(word[..*size].to_vec()))
            }
            ParamType::Function => {
                let word = read_word(data, 0)?;
                check_padding(word, 24, strict, param_type)?;
                let mut raw = [0u8; 24];
                raw.copy_from_slice(&word[..24]);
                Ok(Token::Function(raw))
            }
            ParamType::Bytes => Ok(Token::Bytes(read_length_prefixed(data)?.to_vec())),
            ParamType::String => {
                let raw = read_length_prefixed(data)?;
                Ok(Token::String(self.to_utf8(raw)?))
            }
            ParamType::Array(inner) => {
                let len = read_length(data)?;
                let body = &data[WORD_SIZE..];
                if len > self.config.max_array_len {
                    return Err(AbiError::InvalidData(format!(
                        "array length {} exceeds limit {}",
                        len, self.config.max_array_len
                    )));
                }
                let needed = len.saturating_mul(inner.word_size());
                if needed > body.len() {
                    return Err(AbiError::truncated(
                        needed.saturating_add(WORD_SIZE),
                        data.len(),
                    ));
                }
                let types = vec![inner.as_ref(); len];
                Ok(Token::Array(self.decode_sequence(&types, body, false)?))
            }
            ParamType::FixedArray(inner, size) => {
                let needed = size.saturating_mul(inner.word_size());
                if needed > data.len() {
                    return Err(AbiError::truncated(needed, data.len()));
                }
                let types = vec![inner.as_ref(); *size];
                Ok(Token::FixedArray(self.decode_sequence(&types, data, false)?))
            }
            ParamType::Tuple(members) => {
                let types: Vec<&ParamType> = members.iter().collect();
                Ok(Token::Tuple(self.decode_sequence(&types, data, false)?))
            }
        }
    }

    fn to_utf8(&self, raw: &[u8]) -> Result<String, AbiError> {
        if self.config.strict {
            String::from_utf8(raw.to_vec())
                .map_err(|e| AbiError::InvalidData(format!("invalid UTF-8: {}", e)))
        } else {
            Ok(String::from_utf8_lossy(raw).into_owned())
        }
    }

    /// Read a top-level `string`/`bytes` whose head word is the value itself,
    /// as returned by contracts declaring `bytes32` where `string` is expected
    fn fixed_word_fallback(&self, param_type: &ParamType, word: &[u8; 32]) -> Option<Token> {
        let token = match param_type {
            ParamType::String => {
                let end = word.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
                Token::String(self.to_utf8(&word[..end]).ok()?)
            }
            ParamType::Bytes => Token::Bytes(word.to_vec()),
            _ => return None,
        };
        debug!(ty = %param_type, "decoded fixed word in place of out-of-range payload");
        Some(token)
    }
}

/// Borrow the 32-byte word at `pos`
fn read_word(data: &[u8], pos: usize) -> Result<&[u8; 32], AbiError> {
    let end = pos.saturating_add(WORD_SIZE);
    data.get(pos..end)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| AbiError::truncated(end, data.len()))
}

/// Interpret a word as a `usize`, `None` when it does not fit
fn word_to_usize(word: &[u8; 32]) -> Option<usize> {
    let value = U256::from_big_endian(word);
    if value.bits() > 64 {
        return None;
    }
    usize::try_from(value.low_u64()).ok()
}

/// Resolve an offset word; every dynamic payload starts with at least one word
fn payload_offset(word: &[u8; 32], len: usize) -> Result<usize, AbiError> {
    let offset = word_to_usize(word).unwrap_or(usize::MAX);
    match offset.checked_add(WORD_SIZE) {
        Some(end) if end <= len => Ok(offset),
        _ => Err(AbiError::OffsetOutOfBounds { offset, len }),
    }
}

/// Read the length word at the start of `data`
fn read_length(data: &[u8]) -> Result<usize, AbiError> {
    let word = read_word(data, 0)?;
    word_to_usize(word).ok_or_else(|| AbiError::truncated(usize::MAX, data.len()))
}

/// Length word followed by that many bytes
fn read_length_prefixed(data: &[u8]) -> Result<&[u8], AbiError> {
    let len = read_length(data)?;
    let end = len.saturating_add(WORD_SIZE);
    data.get(WORD_SIZE..end)
        .ok_or_else(|| AbiError::truncated(end, data.len()))
}

/// Bytes past `used` must be zero in strict mode
fn check_padding(word: &[u8; 32], used: usize, strict: bool, ty: &ParamType) -> Result<(), AbiError> {
    if strict && word[used..].iter().any(|b| *b != 0) {
        return Err(AbiError::InvalidData(format!(
            "dirty padding for {}: 0x{}",
            ty,
            hex::encode(word)
        )));
    }
    Ok(())
}

/// Decoded values in declaration order, addressable by position or name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedParams {
    entries: Vec<(String, Token)>,
}

impl DecodedParams {
    /// Build from `(name, value)` pairs; unnamed entries use an empty name
    pub fn new(entries: Vec<(String, Token)>) -> Self {
        Self { entries }
    }

    /// Pair decoded tokens with the parameters they were decoded against
    pub fn from_tokens(params: &[Param], tokens: Vec<Token>) -> Self {
        let entries = params
            .iter()
            .map(|p| p.name.clone())
            .chain(std::iter::repeat(String::new()))
            .zip(tokens)
            .collect();
        Self { entries }
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was decoded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `index`
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.entries.get(index).map(|(_, token)| token)
    }

    /// First value whose parameter is called `name`
    pub fn by_name(&self, name: &str) -> Option<&Token> {
        if name.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, token)| token)
    }

    /// Look up by decimal position (`"0"`) or by parameter name
    pub fn get_key(&self, key: &str) -> Option<&Token> {
        match key.parse::<usize>() {
            Ok(index) => self.get(index),
            Err(_) => self.by_name(key),
        }
    }

    /// `(name, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Token)> {
        self.entries.iter().map(|(name, token)| (name.as_str(), token))
    }

    /// Values in order, names dropped
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.entries.iter().map(|(_, token)| token)
    }

    /// Consume into the values, names dropped
    pub fn into_tokens(self) -> Vec<Token> {
        self.entries.into_iter().map(|(_, token)| token).collect()
    }
}

impl Index<usize> for DecodedParams {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.entries[index].1
    }
}
