//! Common utility functions for financial calculations.
//!
//! Rounding, clamping and percentage conversion shared by every engine.

use rust_decimal::{Decimal, RoundingStrategy};

/// One hundred, for percent conversions.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Months in a year.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fincalc_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// ```
/// use rust_decimal_macros::dec;
/// use fincalc_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Clamps a value to zero from below.
pub fn floor_zero(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// Converts a percentage (`31`) to a rate fraction (`0.31`).
pub fn percent_to_rate(percent: Decimal) -> Decimal {
    percent / HUNDRED
}

/// Converts an annual percentage to a monthly rate fraction.
///
/// ```
/// use rust_decimal_macros::dec;
/// use fincalc_core::calculations::common::monthly_rate;
///
/// assert_eq!(monthly_rate(dec!(24)), dec!(0.02));
/// ```
pub fn monthly_rate(annual_percent: Decimal) -> Decimal {
    percent_to_rate(annual_percent) / MONTHS_PER_YEAR
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn ratio_or_zero(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}
