//! Fixed-payment loan amortization.
//!
//! The level payment is
//!
//! ```text
//! payment = principal × r × (1 + r)^n / ((1 + r)^n − 1)
//! ```
//!
//! or `principal / n` when `r` is zero. Interest is rounded to cents every
//! period and the final payment absorbs whatever residual the rounding left,
//! so the closing balance is exactly zero.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fincalc_core::calculations::amortization::schedule;
//!
//! let loan = schedule(dec!(50000), dec!(0.02), 36).unwrap();
//!
//! assert_eq!(loan.payment, dec!(1961.64));
//! assert_eq!(loan.periods.last().unwrap().balance, dec!(0));
//! ```

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::round_half_up;
use crate::calculations::validation;
use crate::error::CalcError;

/// One row of an amortization table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    /// 1-based period number.
    pub number: u32,
    pub payment: Decimal,
    pub principal_portion: Decimal,
    pub interest_portion: Decimal,
    /// Balance after this payment.
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Decimal,
    pub periodic_rate: Decimal,
    /// Level payment for every period but possibly the last.
    pub payment: Decimal,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
    pub periods: Vec<ScheduledPayment>,
}

/// Level payment for `principal` over `periods` at `periodic_rate`,
/// rounded to cents.
///
/// # Errors
///
/// [`CalcError::Overflow`] when `(1 + r)^n` leaves decimal range.
pub fn level_payment(
    principal: Decimal,
    periodic_rate: Decimal,
    periods: u32,
) -> Result<Decimal, CalcError> {
    let n = Decimal::from(periods);
    if periodic_rate.is_zero() {
        return Ok(round_half_up(principal / n));
    }

    let growth = (Decimal::ONE + periodic_rate)
        .checked_powi(i64::from(periods))
        .ok_or(CalcError::Overflow("loan growth factor"))?;
    let payment = principal
        .checked_mul(periodic_rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(growth - Decimal::ONE))
        .ok_or(CalcError::Overflow("level payment"))?;

    Ok(round_half_up(payment))
}

/// Builds the full amortization table.
///
/// # Errors
///
/// * [`CalcError::InvalidInput`] for a negative principal or rate, or zero periods.
/// * [`CalcError::Overflow`] from [`level_payment`].
pub fn schedule(
    principal: Decimal,
    periodic_rate: Decimal,
    periods: u32,
) -> Result<AmortizationSchedule, CalcError> {
    validation::non_negative("principal", principal)?;
    validation::non_negative("periodic_rate", periodic_rate)?;
    validation::term("periods", periods)?;

    let payment = level_payment(principal, periodic_rate, periods)?;

    let mut rows = Vec::with_capacity(periods as usize);
    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    for number in 1..=periods {
        let interest_portion = round_half_up(balance * periodic_rate);
        let principal_portion = if number == periods {
            balance
        } else {
            (payment - interest_portion).min(balance)
        };
        let period_payment = principal_portion + interest_portion;
        balance -= principal_portion;

        total_interest += interest_portion;
        total_paid += period_payment;
        rows.push(ScheduledPayment {
            number,
            payment: period_payment,
            principal_portion,
            interest_portion,
            balance,
        });
    }

    debug!(
        %principal,
        %periodic_rate,
        periods,
        %payment,
        %total_interest,
        "built amortization schedule"
    );

    Ok(AmortizationSchedule {
        principal,
        periodic_rate,
        payment,
        total_interest,
        total_paid,
        periods: rows,
    })
}
