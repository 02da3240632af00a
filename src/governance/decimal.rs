//! Fixed-point numeric types used on the wire.
//!
//! Percentages are never binary floats: a `Decimal` is an integer count of
//! 10^-18 units, so `yes / total >= percentage` is decided with integer
//! arithmetic and the boundary case compares exactly.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits carried by [`Decimal`].
pub const DECIMAL_PLACES: u32 = 18;

const DECIMAL_FRACTIONAL: u128 = 1_000_000_000_000_000_000;

/// Decimal parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("empty decimal string")]
    Empty,

    #[error("invalid decimal '{0}'")]
    Invalid(String),

    #[error("decimal '{0}' has more than 18 fractional digits")]
    TooPrecise(String),

    #[error("decimal '{0}' is out of range")]
    Overflow(String),
}

/// Unsigned fixed-point decimal with 18 fractional digits.
///
/// Serialized as a string (`"0.5"`), the same shape chain clients send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(u128);

impl Decimal {
    /// Build from raw 10^-18 units.
    pub const fn from_atomics(atomics: u128) -> Self {
        Self(atomics)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn one() -> Self {
        Self(DECIMAL_FRACTIONAL)
    }

    /// `percent(50)` is 0.5.
    pub const fn percent(x: u64) -> Self {
        Self(x as u128 * (DECIMAL_FRACTIONAL / 100))
    }

    /// `permille(125)` is 0.125.
    pub const fn permille(x: u64) -> Self {
        Self(x as u128 * (DECIMAL_FRACTIONAL / 1000))
    }

    pub const fn atomics(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// True when the value lies in (0, 1].
    pub fn is_unit_fraction(&self) -> bool {
        self.0 > 0 && self.0 <= DECIMAL_FRACTIONAL
    }

    /// Exact check of `numerator / denominator >= self`.
    ///
    /// Weights are `u64` and `self` is at most 1 for validated thresholds, so
    /// both products fit in `u128`. A zero denominator never satisfies a
    /// non-zero bound.
    pub fn is_reached_by(&self, numerator: u64, denominator: u64) -> bool {
        if denominator == 0 {
            return self.is_zero();
        }
        let lhs = (numerator as u128).checked_mul(DECIMAL_FRACTIONAL);
        let rhs = self.0.checked_mul(denominator as u128);
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => lhs >= rhs,
            // rhs overflowed: self > 1, unreachable with numerator <= denominator
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    /// Smallest integer weight `w` such that `w / total >= self`.
    pub fn ceil_weight(&self, total: u64) -> u64 {
        let product = self.0.saturating_mul(total as u128);
        let weight = product.div_ceil(DECIMAL_FRACTIONAL);
        u64::try_from(weight).unwrap_or(u64::MAX)
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(DecimalError::Empty);
        }

        let (whole, fraction) = match input.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (input, ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(DecimalError::Invalid(input.to_string()));
        }
        if input.contains('.') && fraction.is_empty() {
            return Err(DecimalError::Invalid(input.to_string()));
        }
        if fraction.len() > DECIMAL_PLACES as usize {
            return Err(DecimalError::TooPrecise(input.to_string()));
        }

        let whole: u128 = whole
            .parse()
            .map_err(|_| DecimalError::Overflow(input.to_string()))?;
        let mut atomics = whole
            .checked_mul(DECIMAL_FRACTIONAL)
            .ok_or_else(|| DecimalError::Overflow(input.to_string()))?;

        if !fraction.is_empty() {
            let scale = 10u128.pow(DECIMAL_PLACES - fraction.len() as u32);
            let fraction: u128 = fraction
                .parse()
                .map_err(|_| DecimalError::Invalid(input.to_string()))?;
            atomics = atomics
                .checked_add(fraction * scale)
                .ok_or_else(|| DecimalError::Overflow(input.to_string()))?;
        }

        Ok(Self(atomics))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / DECIMAL_FRACTIONAL;
        let fraction = self.0 % DECIMAL_FRACTIONAL;
        if fraction == 0 {
            write!(f, "{}", whole)
        } else {
            let digits = format!("{:018}", fraction);
            write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
        }
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// 128-bit token amount, serialized as a decimal string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uint128(pub u128);

impl Uint128 {
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn u128(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl From<u128> for Uint128 {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Uint128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Uint128 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Uint128 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u128>()
            .map(Self)
            .map_err(|e| de::Error::custom(format!("invalid Uint128 '{}': {}", raw, e)))
    }
}
