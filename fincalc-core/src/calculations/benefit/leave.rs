//! Annual leave accrual and payout.
//!
//! # Calculation Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Entitlement per 12-month cycle by working week |
//! | 2    | Accrued days (Step 1 × months worked ÷ 12) |
//! | 3    | Outstanding days (Step 2 − days taken, minimum 0) |
//! | 4    | Daily rate (monthly salary × 12 ÷ (days per week × 52)) |
//! | 5    | Payout (Step 3 × Step 4) |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{MONTHS_PER_YEAR, floor_zero, round_half_up};
use crate::calculations::validation;
use crate::error::CalcError;
use crate::models::LeaveRules;

const WEEKS_PER_YEAR: Decimal = Decimal::from_parts(52, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveInput {
    pub monthly_salary: Decimal,
    /// 5 or 6.
    pub working_days_per_week: u32,
    /// Months worked in the current leave cycle, 0 to 12.
    pub months_worked: u32,
    pub days_taken: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveResult {
    pub annual_entitlement: Decimal,
    pub accrued_days: Decimal,
    pub days_taken: Decimal,
    pub outstanding_days: Decimal,
    pub daily_rate: Decimal,
    pub payout: Decimal,
}

pub struct LeaveCalculator<'a> {
    rules: &'a LeaveRules,
}

impl<'a> LeaveCalculator<'a> {
    pub fn new(rules: &'a LeaveRules) -> Self {
        Self { rules }
    }

    pub fn calculate(
        &self,
        input: &LeaveInput,
    ) -> Result<LeaveResult, CalcError> {
        validation::non_negative("monthly_salary", input.monthly_salary)?;
        validation::non_negative("days_taken", input.days_taken)?;
        validation::within("months_worked", input.months_worked, 0, 12)?;

        let annual_entitlement = self.entitlement(input.working_days_per_week)?;
        let accrued_days =
            (annual_entitlement * Decimal::from(input.months_worked) / MONTHS_PER_YEAR).round_dp(2);
        let outstanding_days = floor_zero(accrued_days - input.days_taken);
        let daily_rate = round_half_up(
            input.monthly_salary * MONTHS_PER_YEAR
                / (Decimal::from(input.working_days_per_week) * WEEKS_PER_YEAR),
        );
        let payout = round_half_up(outstanding_days * daily_rate);

        debug!(%accrued_days, %outstanding_days, %payout, "leave calculated");

        Ok(LeaveResult {
            annual_entitlement,
            accrued_days,
            days_taken: input.days_taken,
            outstanding_days,
            daily_rate,
            payout,
        })
    }

    fn entitlement(
        &self,
        working_days_per_week: u32,
    ) -> Result<Decimal, CalcError> {
        match working_days_per_week {
            5 => Ok(self.rules.five_day_week_days),
            6 => Ok(self.rules.six_day_week_days),
            other => Err(CalcError::invalid(
                "working_days_per_week",
                format!("must be 5 or 6, got {other}"),
            )),
        }
    }
}
