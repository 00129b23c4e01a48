//! Amount type
//!
//! Domain primitive for monetary amounts with precision validation.
//! All amounts are validated at construction time, ensuring out-of-range
//! values cannot reach the store layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum total digits (integer + fractional)
const MAX_DIGITS: u32 = 10;

/// Maximum decimal places
const MAX_DECIMAL_PLACES: u32 = 2;

/// Maximum digits before the decimal point
const MAX_WHOLE_DIGITS: u32 = MAX_DIGITS - MAX_DECIMAL_PLACES;

/// Amount represents a validated monetary value.
///
/// # Invariants
/// - At most 10 digits in total
/// - At most 2 decimal places
/// - Stored normalized to exactly 2 decimal places
///
/// Sign is not restricted: refunds and corrections are recorded as
/// negative amounts.
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use fintrack::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(125, 1)).unwrap();
/// assert_eq!(amount.to_string(), "12.50");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount.
///
/// Display strings are the exact messages returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Ensure that there are no more than {MAX_DIGITS} digits in total.")]
    TooManyDigits,

    #[error("Ensure that there are no more than {MAX_DECIMAL_PLACES} decimal places.")]
    TooManyDecimals,

    #[error("Ensure that there are no more than {MAX_WHOLE_DIGITS} digits before the decimal point.")]
    TooManyWholeDigits,

    #[error("A valid number is required.")]
    Invalid,
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::TooManyDigits` if more than 10 digits in total
    /// - `AmountError::TooManyDecimals` if more than 2 decimal places
    /// - `AmountError::TooManyWholeDigits` if more than 8 integer digits
    ///
    /// Trailing fractional zeros count as decimal places, so `0.100` is
    /// rejected even though it equals `0.10`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        let mantissa_digits = value.mantissa().unsigned_abs().to_string().len() as u32;
        let scale = value.scale();

        let (total_digits, whole_digits, decimal_places) = if mantissa_digits > scale {
            (mantissa_digits, mantissa_digits - scale, scale)
        } else {
            (scale, 0, scale)
        };

        if total_digits > MAX_DIGITS {
            return Err(AmountError::TooManyDigits);
        }
        if decimal_places > MAX_DECIMAL_PLACES {
            return Err(AmountError::TooManyDecimals);
        }
        if whole_digits > MAX_WHOLE_DIGITS {
            return Err(AmountError::TooManyWholeDigits);
        }

        let mut normalized = value;
        normalized.rescale(MAX_DECIMAL_PLACES);
        Ok(Self(normalized))
    }

    /// Get the underlying Decimal value (always at scale 2).
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s).map_err(|_| AmountError::Invalid)?;
        Amount::new(decimal)
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Amount::from_str(&value)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        format!("{:.2}", amount.0)
    }
}
