//! Calculation engines.
//!
//! Every engine is a pure function or a calculator struct borrowing its
//! reference data, so one loaded [`RateBook`](crate::models::RateBook) can
//! serve any number of calculations.

pub mod amortization;
pub mod benefit;
pub mod cgt;
pub mod common;
pub mod compound;
pub mod income_tax;
pub mod loan;
pub mod payoff;
pub mod progressive;
pub mod rebate;
pub mod retirement;
pub mod validation;

pub use amortization::{AmortizationSchedule, ScheduledPayment, level_payment, schedule};
pub use benefit::{
    ClaimType, LeaveCalculator, LeaveInput, LeaveResult, PayoutBasis, ReplacementTiers,
    ServiceLength, UifCalculator, UifInput, UifResult, benefit, service_payout,
};
pub use cgt::{CgtCalculator, CgtInput, CgtResult, CostCategory, CostItem, taxable_gain};
pub use compound::{
    CompoundInput, CompoundInterestCalculator, CompoundResult, CompoundingFrequency,
    InterestNetting, SavingsPlan, SavingsProjection, YearSnapshot, discount, grow, net_interest,
    project_savings,
};
pub use income_tax::{IncomePeriod, IncomeTaxCalculator, IncomeTaxInput, IncomeTaxResult};
pub use loan::{LoanCalculator, LoanInput, LoanQuote};
pub use payoff::{
    CardPayoffInput, CardPayoffPlan, MAX_PAYOFF_PERIODS, PaymentRule, PayoffOutcome, PayoffPeriod,
    PayoffSavings, PayoffSimulation, StrategyComparison, compare_strategies, plan_card_payoff,
    simulate_payoff,
};
pub use progressive::{ProgressiveTaxEvaluator, StackedTax, TaxEvaluation, evaluate, tax_on_top};
pub use rebate::{apply_exclusion, apply_rebate};
pub use retirement::{RetirementCalculator, RetirementInput, RetirementResult};
