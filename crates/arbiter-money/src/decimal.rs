//! Scale-normalized decimal numbers.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest fractional-digit count a literal may carry.
///
/// Generous for business data (amounts, rates, weights) while keeping scale
/// alignment within `i128` arithmetic.
pub const MAX_SCALE: u32 = 28;

/// Errors from parsing a decimal literal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseDecimalError {
    #[error("empty decimal literal")]
    Empty,

    #[error("invalid character {character:?} in decimal literal")]
    InvalidCharacter { character: char },

    #[error("decimal literal exceeds the representable range")]
    OutOfRange,
}

/// A decimal number normalized to its canonical form.
///
/// Stored as `mantissa × 10^-scale` with trailing zeros stripped at
/// construction, so numeric equality coincides with structural equality:
/// `1.0` and `1.00` parse to the same mantissa/scale pair. The derived
/// `PartialEq`/`Eq`/`Hash` and the manual `Ord` below rely on that canonical
/// form being unique per numeric value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
    };

    /// Build a decimal from a raw mantissa/scale pair, normalizing it.
    pub fn new(mantissa: i128, scale: u32) -> Decimal {
        let mut mantissa = mantissa;
        let mut scale = scale;
        if mantissa == 0 {
            scale = 0;
        }
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        Decimal { mantissa, scale }
    }

    /// The normalized mantissa.
    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// The normalized scale (count of fractional digits).
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Sign of the value: -1, 0, or 1.
    pub fn signum(&self) -> i32 {
        match self.mantissa.cmp(&0) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(input: &str) -> Result<Decimal, ParseDecimalError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseDecimalError::Empty);
        }

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if digits.is_empty() {
            return Err(ParseDecimalError::Empty);
        }

        let mut mantissa: i128 = 0;
        let mut scale: u32 = 0;
        let mut in_fraction = false;
        let mut seen_digit = false;

        for character in digits.chars() {
            match character {
                '0'..='9' => {
                    seen_digit = true;
                    if in_fraction {
                        scale = scale
                            .checked_add(1)
                            .filter(|s| *s <= MAX_SCALE)
                            .ok_or(ParseDecimalError::OutOfRange)?;
                    }
                    let digit = i128::from(character as u8 - b'0');
                    mantissa = mantissa
                        .checked_mul(10)
                        .and_then(|m| m.checked_add(digit))
                        .ok_or(ParseDecimalError::OutOfRange)?;
                }
                '.' if !in_fraction => in_fraction = true,
                other => return Err(ParseDecimalError::InvalidCharacter { character: other }),
            }
        }
        if !seen_digit {
            return Err(ParseDecimalError::InvalidCharacter { character: '.' });
        }

        if negative {
            mantissa = -mantissa;
        }
        Ok(Decimal::new(mantissa, scale))
    }
}

impl TryFrom<String> for Decimal {
    type Error = ParseDecimalError;

    fn try_from(value: String) -> Result<Decimal, ParseDecimalError> {
        value.parse()
    }
}

impl From<Decimal> for String {
    fn from(value: Decimal) -> String {
        value.to_string()
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Decimal {
        Decimal::new(i128::from(value), 0)
    }
}

impl TryFrom<f64> for Decimal {
    type Error = ParseDecimalError;

    /// Converts through the shortest decimal rendering of the float; NaN and
    /// infinities are rejected.
    fn try_from(value: f64) -> Result<Decimal, ParseDecimalError> {
        if !value.is_finite() {
            return Err(ParseDecimalError::OutOfRange);
        }
        format!("{value}").parse()
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Decimal) -> Ordering {
        if self.scale == other.scale {
            return self.mantissa.cmp(&other.mantissa);
        }
        if self.scale < other.scale {
            compare_aligned(self.mantissa, other.scale - self.scale, other.mantissa)
        } else {
            compare_aligned(other.mantissa, self.scale - other.scale, self.mantissa).reverse()
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Decimal) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare `coarse × 10^shift` against `fine` without losing overflow cases:
/// when the scaled mantissa no longer fits in `i128`, its magnitude already
/// exceeds any representable `fine`, so the sign decides.
fn compare_aligned(coarse: i128, shift: u32, fine: i128) -> Ordering {
    match 10i128
        .checked_pow(shift)
        .and_then(|factor| coarse.checked_mul(factor))
    {
        Some(scaled) => scaled.cmp(&fine),
        None => {
            if coarse >= 0 {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
    }
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let digits = self.mantissa.unsigned_abs().to_string();
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let scale = self.scale as usize;
        if digits.len() > scale {
            let split = digits.len() - scale;
            write!(f, "{sign}{}.{}", &digits[..split], &digits[split..])
        } else {
            write!(f, "{sign}0.{}{}", "0".repeat(scale - digits.len()), digits)
        }
    }
}
