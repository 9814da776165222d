use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use super::errors::RowParseError;

/// Non-negative fixed-point amount with two fractional digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(BigDecimal);

impl Price {
    pub const SCALE: i64 = 2;
    /// Integer digits allowed by the `NUMERIC(12, 2)` price column.
    pub const MAX_INTEGER_DIGITS: i64 = 10;

    /// Rounds half away from zero, like the store's NUMERIC column does.
    pub fn new(amount: BigDecimal) -> Result<Self, RowParseError> {
        if amount.is_zero() {
            return Ok(Self(BigDecimal::zero().with_scale(Self::SCALE)));
        }
        if amount.is_negative() {
            return Err(RowParseError::InvalidPrice(exponent_form(&amount)));
        }

        // Checked on the exponent form, before anything is expanded.
        let width = integer_digits(&amount);
        if width > Self::MAX_INTEGER_DIGITS {
            return Err(RowParseError::InvalidPrice(exponent_form(&amount)));
        }
        if width < -Self::SCALE {
            // Below 0.001: rounds to zero at two fractional digits.
            return Ok(Self(BigDecimal::zero().with_scale(Self::SCALE)));
        }

        let rounded = amount.with_scale_round(Self::SCALE, RoundingMode::HalfUp);
        if integer_digits(&rounded) > Self::MAX_INTEGER_DIGITS {
            return Err(RowParseError::InvalidPrice(exponent_form(&amount)));
        }
        Ok(Self(rounded))
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl FromStr for Price {
    type Err = RowParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RowParseError::InvalidPrice(s.to_string());
        let amount = BigDecimal::from_str(s.trim()).map_err(|_| invalid())?;
        Price::new(amount).map_err(|_| invalid())
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Digits left of the decimal point; zero or negative for amounts below one.
fn integer_digits(amount: &BigDecimal) -> i64 {
    let (_, scale) = amount.as_bigint_and_exponent();
    amount.digits() as i64 - scale
}

/// `<digits>E<exponent>`; never expands the exponent.
fn exponent_form(amount: &BigDecimal) -> String {
    let (digits, scale) = amount.as_bigint_and_exponent();
    format!("{}E{}", digits, -scale)
}

/// Parses a stock quantity: a non-negative integer that fits the store's 32-bit column.
pub fn parse_quantity(raw: &str) -> Result<u32, RowParseError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .and_then(|qty| u32::try_from(qty).ok())
        .ok_or_else(|| RowParseError::InvalidQuantity(raw.to_string()))
}
