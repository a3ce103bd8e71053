//! Signed 256-bit integer stored in two's complement

use std::fmt;
use std::str::FromStr;

use primitive_types::U256;
use thiserror::Error;

/// Signed integer conversion error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntError {
    /// Magnitude does not fit in 256-bit two's complement
    #[error("value out of range for int256")]
    Overflow,
    /// Malformed decimal string
    #[error("invalid decimal integer: {0}")]
    InvalidDigit(String),
}

/// Signed 256-bit integer.
///
/// The raw `U256` is the two's-complement bit pattern, which is exactly what the
/// ABI puts on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct I256(U256);

fn twos_complement(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

impl I256 {
    /// Zero
    pub const ZERO: I256 = I256(U256([0, 0, 0, 0]));

    /// Largest value, 2^255 - 1
    pub const MAX: I256 = I256(U256([u64::MAX, u64::MAX, u64::MAX, i64::MAX as u64]));

    /// Smallest value, -2^255
    pub const MIN: I256 = I256(U256([0, 0, 0, 1 << 63]));

    /// Wrap a raw two's-complement bit pattern
    pub const fn from_raw(raw: U256) -> Self {
        I256(raw)
    }

    /// Raw two's-complement bit pattern
    pub fn into_raw(self) -> U256 {
        self.0
    }

    /// Build from a sign flag and magnitude
    pub fn from_sign_and_abs(negative: bool, abs: U256) -> Result<Self, IntError> {
        if !negative {
            if abs.bit(255) {
                return Err(IntError::Overflow);
            }
            return Ok(I256(abs));
        }
        if abs > Self::MIN.0 {
            return Err(IntError::Overflow);
        }
        Ok(I256(twos_complement(abs)))
    }

    /// True when the sign bit is set
    pub fn is_negative(&self) -> bool {
        self.0.bit(255)
    }

    /// True for zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Magnitude as an unsigned value (`MIN` maps to 2^255)
    pub fn unsigned_abs(&self) -> U256 {
        if self.is_negative() {
            twos_complement(self.0)
        } else {
            self.0
        }
    }

    /// Negation, `None` for `MIN`
    pub fn checked_neg(&self) -> Option<Self> {
        if *self == Self::MIN {
            return None;
        }
        Some(I256(twos_complement(self.0)))
    }

    /// Whether the value is representable as `int<bits>`
    pub fn fits_in_bits(&self, bits: usize) -> bool {
        if bits >= 256 {
            return true;
        }
        if bits == 0 {
            return false;
        }
        if self.is_negative() {
            (self.unsigned_abs() - U256::one()).bits() < bits
        } else {
            self.0.bits() < bits
        }
    }

    /// Keep the low `bits` bits and sign-extend from bit `bits - 1`
    pub fn truncate_to_bits(&self, bits: usize) -> Self {
        if bits >= 256 || bits == 0 {
            return *self;
        }
        let mask = (U256::one() << bits) - U256::one();
        let low = self.0 & mask;
        if low.bit(bits - 1) {
            I256(low | !mask)
        } else {
            I256(low)
        }
    }

    /// Big-endian two's-complement bytes
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.0.to_big_endian(&mut bytes);
        bytes
    }

    /// Read big-endian two's-complement bytes
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        I256(U256::from_big_endian(bytes))
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(
            impl From<$t> for I256 {
                fn from(value: $t) -> Self {
                    let abs = U256::from(value.unsigned_abs());
                    if value < 0 {
                        I256(twos_complement(abs))
                    } else {
                        I256(abs)
                    }
                }
            }
        )*
    };
}

impl_from_signed!(i8, i16, i32, i64, i128);

impl TryFrom<U256> for I256 {
    type Error = IntError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        Self::from_sign_and_abs(false, value)
    }
}

impl FromStr for I256 {
    type Err = IntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IntError::InvalidDigit(s.to_string()));
        }
        let abs = U256::from_dec_str(digits).map_err(|_| IntError::Overflow)?;
        Self::from_sign_and_abs(negative, abs)
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}", self.unsigned_abs())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Debug for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I256({})", self)
    }
}
