//! Input domain checks run before any engine.
//!
//! Each helper returns [`CalcError::InvalidInput`] naming the offending field,
//! so a form can show the message inline next to that field.

use rust_decimal::Decimal;

use super::common::HUNDRED;
use crate::error::CalcError;

/// Money amounts must be zero or positive.
pub fn non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, CalcError> {
    if value < Decimal::ZERO {
        return Err(CalcError::invalid(field, format!("must not be negative, got {value}")));
    }
    Ok(value)
}

/// Amounts that must be strictly positive, such as a loan principal.
pub fn positive(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, CalcError> {
    if value <= Decimal::ZERO {
        return Err(CalcError::invalid(field, format!("must be positive, got {value}")));
    }
    Ok(value)
}

/// Percentages must lie in `[0, 100]`.
pub fn percent(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, CalcError> {
    if value < Decimal::ZERO || value > HUNDRED {
        return Err(CalcError::invalid(field, format!("must be between 0 and 100, got {value}")));
    }
    Ok(value)
}

/// Rate fractions must lie in `[0, 1]`.
pub fn fraction(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, CalcError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(CalcError::invalid(field, format!("must be between 0 and 1, got {value}")));
    }
    Ok(value)
}

/// Terms and period counts must be at least one.
pub fn term(
    field: &'static str,
    periods: u32,
) -> Result<u32, CalcError> {
    if periods == 0 {
        return Err(CalcError::invalid(field, "must be at least 1"));
    }
    Ok(periods)
}

/// Integer values bounded to `min..=max`.
pub fn within(
    field: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<u32, CalcError> {
    if value < min || value > max {
        return Err(CalcError::invalid(field, format!("must be between {min} and {max}, got {value}")));
    }
    Ok(value)
}
