//! Monetary amount carried in the transaction amount field.

use core::fmt;
use core::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{BrCodeError, Result};

/// Exclusive upper bound, in cents, for an encodable amount.
///
/// `9999999999.99` is 13 characters, the longest value the transaction
/// amount field accepts.
const CENTS_LIMIT: f64 = 1e12;

/// Cents per currency unit.
const CENTS_PER_UNIT: u64 = 100;

/// A non-negative amount with two fractional digits, stored as integer
/// cents so formatting never shows floating-point noise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    /// The zero amount. Payloads with a zero amount omit the field.
    pub const ZERO: Self = Self(0);

    /// Converts a decimal amount, rounding to the nearest cent.
    ///
    /// # Errors
    ///
    /// Returns [`BrCodeError::InvalidAmount`] if `value` is negative, NaN,
    /// infinite, or would need more than 13 characters to render.
    #[inline]
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0_f64 {
            return Err(BrCodeError::InvalidAmount(value));
        }
        let scaled = (value * 100.0_f64).round();
        if scaled >= CENTS_LIMIT {
            return Err(BrCodeError::InvalidAmount(value));
        }
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "scaled is a whole number in 0..1e12"
        )]
        let cents = scaled as u64;
        Ok(Self(cents))
    }

    /// Creates an amount from whole cents.
    #[inline]
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents.
    #[inline]
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Returns `true` for a zero amount.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Amount {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0.div_euclid(CENTS_PER_UNIT),
            self.0.rem_euclid(CENTS_PER_UNIT)
        )
    }
}

impl FromStr for Amount {
    type Err = BrCodeError;

    /// Parses the text form used in payloads: digits, optionally followed
    /// by `.` and up to two fractional digits.
    #[inline]
    fn from_str(raw: &str) -> Result<Self> {
        let malformed = || BrCodeError::MalformedAmount(raw.to_owned());
        let (units, fraction) = raw.split_once('.').unwrap_or((raw, ""));
        let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if units.is_empty() || !is_digits(units) || !is_digits(fraction) || fraction.len() > 2 {
            return Err(malformed());
        }
        let whole: u64 = units.parse().map_err(|_err| malformed())?;
        let fractional: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_err| malformed())? * 10,
            _ => fraction.parse().map_err(|_err| malformed())?,
        };
        whole
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|cents| cents.checked_add(fractional))
            .map(Self)
            .ok_or_else(malformed)
    }
}

impl Serialize for Amount {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
