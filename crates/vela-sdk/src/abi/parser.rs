//! Solidity type-string grammar
//!
//! ```text
//! type   := base suffix*
//! base   := ident digits? | "(" [ type ("," type)* ] ")"
//! suffix := "[" digits? "]"
//! ```
//!
//! Recognised identifiers are `address`, `bool`, `string`, `function`, `uint`,
//! `int`, `bytes` and `tuple`. `uint`/`int` default to 256 bits, bare `bytes` is
//! the dynamic byte string, and `tuple` yields an empty tuple placeholder that
//! callers fill with [`ParamType::attach_components`].

use super::error::AbiError;
use super::layout::MAX_TYPE_DEPTH;
use super::param_type::ParamType;

/// Parse a type string such as `uint256[3][]` or `(address,uint8)[2]`.
///
/// The whole input must match; the resulting tree is validated, so `uint7`,
/// `bytes33` or `bool[0]` are rejected with [`AbiError::InvalidType`].
pub fn parse_type(s: &str) -> Result<ParamType, AbiError> {
    let mut parser = TypeParser::new(s);
    let ty = parser.parse_type()?;
    if !parser.at_end() {
        return Err(parser.unexpected());
    }
    ty.validate()?;
    Ok(ty)
}

/// Cursor over the type string
struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
    /// Open tuple levels plus array suffixes on the current path
    depth: usize,
}

impl<'a> TypeParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, expected: u8) -> Result<(), AbiError> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if pred(b)) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn unexpected(&self) -> AbiError {
        match self.input[self.pos..].chars().next() {
            Some(c) => AbiError::InvalidType(format!(
                "unexpected `{}` at position {} in `{}`",
                c, self.pos, self.input
            )),
            None => AbiError::InvalidType(format!("unexpected end of `{}`", self.input)),
        }
    }

    fn parse_type(&mut self) -> Result<ParamType, AbiError> {
        let outer = self.depth;
        let base = self.parse_base()?;
        let ty = self.parse_array_suffixes(base)?;
        self.depth = outer;
        Ok(ty)
    }

    fn descend(&mut self) -> Result<(), AbiError> {
        self.depth += 1;
        if self.depth > MAX_TYPE_DEPTH {
            return Err(AbiError::InvalidType(format!(
                "type nested deeper than {} levels at position {}",
                MAX_TYPE_DEPTH, self.pos
            )));
        }
        Ok(())
    }

    fn parse_base(&mut self) -> Result<ParamType, AbiError> {
        if self.peek() == Some(b'(') {
            return self.parse_tuple();
        }
        let ident = self.take_while(|b| b.is_ascii_lowercase());
        if ident.is_empty() {
            return Err(self.unexpected());
        }
        let digits = self.take_while(|b| b.is_ascii_digit());
        let suffix = if digits.is_empty() {
            None
        } else {
            Some(self.parse_number(digits)?)
        };
        self.resolve_base(ident, suffix)
    }

    fn resolve_base(&self, ident: &str, suffix: Option<usize>) -> Result<ParamType, AbiError> {
        let ty = match (ident, suffix) {
            ("address", None) => ParamType::Address,
            ("bool", None) => ParamType::Bool,
            ("string", None) => ParamType::String,
            ("function", None) => ParamType::Function,
            ("tuple", None) => ParamType::Tuple(Vec::new()),
            ("uint", bits) => ParamType::Uint(bits.unwrap_or(256)),
            ("int", bits) => ParamType::Int(bits.unwrap_or(256)),
            ("bytes", None) => ParamType::Bytes,
            ("bytes", Some(len)) => ParamType::FixedBytes(len),
            ("address" | "bool" | "string" | "function" | "tuple", Some(n)) => {
                return Err(AbiError::InvalidType(format!(
                    "`{}` does not take a size suffix (got {}) in `{}`",
                    ident, n, self.input
                )));
            }
            _ => {
                return Err(AbiError::InvalidType(format!(
                    "unknown base type `{}` in `{}`",
                    ident, self.input
                )));
            }
        };
        Ok(ty)
    }

    fn parse_tuple(&mut self) -> Result<ParamType, AbiError> {
        self.descend()?;
        self.eat(b'(')?;
        self.skip_whitespace();
        let mut members = Vec::new();
        if self.peek() == Some(b')') {
            self.bump();
            return Ok(ParamType::Tuple(members));
        }
        loop {
            self.skip_whitespace();
            members.push(self.parse_type()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.bump(),
                Some(b')') => {
                    self.bump();
                    return Ok(ParamType::Tuple(members));
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_array_suffixes(&mut self, mut ty: ParamType) -> Result<ParamType, AbiError> {
        while self.peek() == Some(b'[') {
            self.descend()?;
            self.bump();
            let digits = self.take_while(|b| b.is_ascii_digit());
            self.eat(b']')?;
            ty = if digits.is_empty() {
                ParamType::Array(Box::new(ty))
            } else {
                ParamType::FixedArray(Box::new(ty), self.parse_number(digits)?)
            };
        }
        Ok(ty)
    }

    fn parse_number(&self, digits: &str) -> Result<usize, AbiError> {
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(AbiError::InvalidType(format!(
                "leading zero in `{}` of `{}`",
                digits, self.input
            )));
        }
        digits.parse().map_err(|_| {
            AbiError::InvalidType(format!("size `{}` out of range in `{}`", digits, self.input))
        })
    }
}
