//! Revolving-balance payoff simulation.
//!
//! Each period interest accrues on the opening balance, then the payment is
//! taken: `max(balance × percent, floor)` under a minimum-payment rule, or a
//! fixed amount, capped at the balance plus interest. A payment that does
//! not exceed the accruing interest can never clear the balance, and the
//! loop never runs more than [`MAX_PAYOFF_PERIODS`] periods.
//!
//! [`plan_card_payoff`] is the card-level entry point: it takes an annual
//! percentage, runs the minimum-payment rule and an optional fixed payment,
//! and reports the saving only when both clear.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{max, monthly_rate, percent_to_rate, round_half_up};
use crate::calculations::validation;
use crate::error::{CalcError, NonConvergenceReason};

/// Hard ceiling on simulated periods (fifty years of monthly payments).
pub const MAX_PAYOFF_PERIODS: u32 = 600;

/// How the payment for each period is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentRule {
    /// Share of the opening balance (fraction), never less than `floor`.
    Minimum { percent: Decimal, floor: Decimal },
    /// The same amount every period.
    Fixed(Decimal),
}

impl PaymentRule {
    fn validate(&self) -> Result<(), CalcError> {
        match *self {
            Self::Minimum { percent, floor } => {
                validation::fraction("minimum_percent", percent)?;
                validation::non_negative("minimum_floor", floor)?;
                if percent.is_zero() && floor.is_zero() {
                    return Err(CalcError::invalid(
                        "minimum_percent",
                        "a zero percent needs a positive floor payment",
                    ));
                }
            }
            Self::Fixed(amount) => {
                validation::positive("fixed_payment", amount)?;
            }
        }
        Ok(())
    }

    fn payment_for(&self, balance: Decimal) -> Decimal {
        match *self {
            Self::Minimum { percent, floor } => max(round_half_up(balance * percent), floor),
            Self::Fixed(amount) => amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum PayoffOutcome {
    Cleared,
    NeverClears { reason: NonConvergenceReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffPeriod {
    pub number: u32,
    pub opening_balance: Decimal,
    pub interest: Decimal,
    pub payment: Decimal,
    pub closing_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffSimulation {
    pub outcome: PayoffOutcome,
    pub starting_balance: Decimal,
    pub periodic_rate: Decimal,
    pub rule: PaymentRule,
    /// Periods simulated, including the clearing one.
    pub periods_taken: u32,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
    /// Balance left when the simulation stopped; zero when cleared.
    pub remaining_balance: Decimal,
    pub first_payment: Decimal,
    pub schedule: Vec<PayoffPeriod>,
}

impl PayoffSimulation {
    pub fn is_cleared(&self) -> bool {
        self.outcome == PayoffOutcome::Cleared
    }

    /// Converts a never-clearing simulation into [`CalcError::NonConvergence`].
    pub fn into_cleared(self) -> Result<Self, CalcError> {
        match self.outcome {
            PayoffOutcome::Cleared => Ok(self),
            PayoffOutcome::NeverClears { reason } => Err(CalcError::NonConvergence {
                periods: self.periods_taken,
                reason,
            }),
        }
    }
}

/// Simulates paying down `balance` under `rule`.
///
/// # Errors
///
/// [`CalcError::InvalidInput`] for a negative balance or rate, or an
/// out-of-domain rule. Non-convergence is not an error here; it is reported
/// through [`PayoffSimulation::outcome`].
pub fn simulate_payoff(
    balance: Decimal,
    periodic_rate: Decimal,
    rule: PaymentRule,
) -> Result<PayoffSimulation, CalcError> {
    validation::non_negative("balance", balance)?;
    validation::non_negative("periodic_rate", periodic_rate)?;
    rule.validate()?;

    let starting_balance = balance;
    let mut balance = balance;
    let mut schedule = Vec::new();
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut outcome = PayoffOutcome::Cleared;

    while balance > Decimal::ZERO {
        let number = schedule.len() as u32 + 1;
        if number > MAX_PAYOFF_PERIODS {
            outcome = PayoffOutcome::NeverClears {
                reason: NonConvergenceReason::IterationCeiling,
            };
            break;
        }

        let interest = round_half_up(balance * periodic_rate);
        let due = balance + interest;
        let payment = rule.payment_for(balance).min(due);

        if payment < due && payment <= interest {
            outcome = PayoffOutcome::NeverClears {
                reason: NonConvergenceReason::PaymentBelowInterest,
            };
            break;
        }

        let closing_balance = due - payment;
        total_interest += interest;
        total_paid += payment;
        schedule.push(PayoffPeriod {
            number,
            opening_balance: balance,
            interest,
            payment,
            closing_balance,
        });
        balance = closing_balance;
    }

    let periods_taken = schedule.len() as u32;
    match outcome {
        PayoffOutcome::Cleared => debug!(
            %starting_balance,
            periods_taken,
            %total_interest,
            "payoff simulation cleared"
        ),
        PayoffOutcome::NeverClears { reason } => warn!(
            %starting_balance,
            periods_taken,
            %reason,
            "payoff simulation does not converge"
        ),
    }

    Ok(PayoffSimulation {
        outcome,
        starting_balance,
        periodic_rate,
        rule,
        periods_taken,
        total_interest,
        total_paid,
        remaining_balance: balance,
        first_payment: schedule.first().map(|p| p.payment).unwrap_or(Decimal::ZERO),
        schedule,
    })
}

/// What paying a fixed amount saves over the minimum-payment rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffSavings {
    /// `minimum.total_interest - fixed.total_interest`; negative when the
    /// fixed payment is smaller than the effective minimum.
    pub interest_saved: Decimal,
    /// `minimum.periods_taken - fixed.periods_taken`; may be negative.
    pub periods_saved: i64,
}

impl PayoffSavings {
    /// `None` unless both simulations cleared.
    pub fn between(
        minimum: &PayoffSimulation,
        fixed: &PayoffSimulation,
    ) -> Option<Self> {
        (minimum.is_cleared() && fixed.is_cleared()).then(|| Self::of(minimum, fixed))
    }

    fn of(
        minimum: &PayoffSimulation,
        fixed: &PayoffSimulation,
    ) -> Self {
        Self {
            interest_saved: minimum.total_interest - fixed.total_interest,
            periods_saved: i64::from(minimum.periods_taken) - i64::from(fixed.periods_taken),
        }
    }
}

/// Minimum-payment versus fixed-payment comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub minimum: PayoffSimulation,
    pub fixed: PayoffSimulation,
    pub interest_saved: Decimal,
    pub periods_saved: i64,
}

/// Runs both strategies independently and compares them.
///
/// # Errors
///
/// * [`CalcError::NonConvergence`] when either strategy never clears.
/// * Any validation error from [`simulate_payoff`].
pub fn compare_strategies(
    balance: Decimal,
    periodic_rate: Decimal,
    minimum_percent: Decimal,
    minimum_floor: Decimal,
    fixed_payment: Decimal,
) -> Result<StrategyComparison, CalcError> {
    let minimum = simulate_payoff(
        balance,
        periodic_rate,
        PaymentRule::Minimum {
            percent: minimum_percent,
            floor: minimum_floor,
        },
    )?
    .into_cleared()?;
    let fixed =
        simulate_payoff(balance, periodic_rate, PaymentRule::Fixed(fixed_payment))?.into_cleared()?;

    let savings = PayoffSavings::of(&minimum, &fixed);
    Ok(StrategyComparison {
        interest_saved: savings.interest_saved,
        periods_saved: savings.periods_saved,
        minimum,
        fixed,
    })
}

/// A credit card balance with its statement terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPayoffInput {
    pub balance: Decimal,
    pub annual_rate_percent: Decimal,
    /// Minimum payment as a percentage of the balance.
    pub minimum_percent: Decimal,
    pub minimum_floor: Decimal,
    /// Optional fixed monthly payment to set against the minimum.
    pub fixed_payment: Option<Decimal>,
}

impl CardPayoffInput {
    fn validate(&self) -> Result<(), CalcError> {
        validation::non_negative("balance", self.balance)?;
        validation::percent("annual_rate_percent", self.annual_rate_percent)?;
        validation::percent("minimum_percent", self.minimum_percent)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPayoffPlan {
    pub minimum: PayoffSimulation,
    pub fixed: Option<PayoffSimulation>,
    /// Present when a fixed payment was given and both simulations cleared.
    pub savings: Option<PayoffSavings>,
}

/// Simulates a card balance under its minimum payment and, when given, a
/// fixed payment. A balance that never clears is an outcome, not an error.
///
/// # Errors
///
/// [`CalcError::InvalidInput`] for a negative balance, a rate or minimum
/// percentage outside `[0, 100]`, or an out-of-domain payment.
pub fn plan_card_payoff(input: &CardPayoffInput) -> Result<CardPayoffPlan, CalcError> {
    input.validate()?;
    let rate = monthly_rate(input.annual_rate_percent);

    let minimum = simulate_payoff(
        input.balance,
        rate,
        PaymentRule::Minimum {
            percent: percent_to_rate(input.minimum_percent),
            floor: input.minimum_floor,
        },
    )?;
    let fixed = input
        .fixed_payment
        .map(|amount| simulate_payoff(input.balance, rate, PaymentRule::Fixed(amount)))
        .transpose()?;
    let savings = fixed
        .as_ref()
        .and_then(|fixed| PayoffSavings::between(&minimum, fixed));

    Ok(CardPayoffPlan {
        minimum,
        fixed,
        savings,
    })
}
