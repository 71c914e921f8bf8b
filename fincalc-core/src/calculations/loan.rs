//! Personal loan quotes.
//!
//! # Calculation Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Annual rate, clamped to the credit type's statutory maximum (repo + margin) |
//! | 2    | Monthly rate (Step 1 ÷ 100 ÷ 12) |
//! | 3    | Level payment and amortization table |
//! | 4    | Initiation fee: base + rate × (principal − threshold), capped |
//! | 5    | Monthly service fee × term |
//! | 6    | Cost of credit (interest + Step 4 + Step 5) |
//!
//! Without a credit type the requested rate is used as is and no fees apply.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::amortization::{self, AmortizationSchedule};
use crate::calculations::common::{monthly_rate, round_half_up};
use crate::calculations::validation;
use crate::error::CalcError;
use crate::models::{CreditRules, CreditType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Decimal,
    /// Nominal annual rate in percent, `[0, 100]`.
    pub annual_rate_percent: Decimal,
    pub term_months: u32,
    /// Agreement type whose interest cap and fees apply.
    pub credit_type: Option<CreditType>,
}

impl LoanInput {
    pub fn new(
        principal: Decimal,
        annual_rate_percent: Decimal,
        term_months: u32,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months,
            credit_type: None,
        }
    }

    pub fn with_credit_type(
        mut self,
        credit_type: CreditType,
    ) -> Self {
        self.credit_type = Some(credit_type);
        self
    }

    fn validate(&self) -> Result<(), CalcError> {
        validation::positive("principal", self.principal)?;
        validation::percent("annual_rate_percent", self.annual_rate_percent)?;
        validation::term("term_months", self.term_months)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub requested_annual_percent: Decimal,
    pub applied_annual_percent: Decimal,
    /// Statutory maximum for the credit type, if one was given.
    pub max_annual_percent: Option<Decimal>,
    /// Set when the requested rate exceeded the maximum and was lowered to it.
    pub rate_capped: bool,
    pub monthly_rate: Decimal,
    pub monthly_payment: Decimal,
    pub initiation_fee: Decimal,
    pub monthly_service_fee: Decimal,
    pub total_service_fees: Decimal,
    pub total_interest: Decimal,
    pub total_cost_of_credit: Decimal,
    /// Instalments plus all fees.
    pub total_repayable: Decimal,
    pub schedule: AmortizationSchedule,
}

/// Quotes loans against one year's credit rules.
pub struct LoanCalculator<'a> {
    rules: &'a CreditRules,
}

impl<'a> LoanCalculator<'a> {
    pub fn new(rules: &'a CreditRules) -> Self {
        Self { rules }
    }

    /// # Errors
    ///
    /// * [`CalcError::InvalidInput`] for a non-positive principal or term, a
    ///   rate outside `[0, 100]`, or a credit type with no configured rules.
    /// * [`CalcError::Overflow`] from the amortization engine.
    pub fn calculate(
        &self,
        input: &LoanInput,
    ) -> Result<LoanQuote, CalcError> {
        input.validate()?;

        let type_rules = match input.credit_type {
            Some(kind) => Some(self.rules.for_type(kind).ok_or_else(|| {
                CalcError::invalid("credit_type", format!("no rules configured for {kind}"))
            })?),
            None => None,
        };

        // Step 1
        let max_annual_percent =
            type_rules.map(|t| t.max_annual_percent(self.rules.repo_rate_percent));
        let (applied_annual_percent, rate_capped) = match max_annual_percent {
            Some(cap) if input.annual_rate_percent > cap => {
                warn!(
                    requested = %input.annual_rate_percent,
                    %cap,
                    "loan rate above statutory maximum, clamping"
                );
                (cap, true)
            }
            _ => (input.annual_rate_percent, false),
        };

        // Steps 2-3
        let rate = monthly_rate(applied_annual_percent);
        let schedule = amortization::schedule(input.principal, rate, input.term_months)?;

        // Steps 4-5
        let initiation_fee = type_rules
            .map(|t| round_half_up(t.initiation_fee(input.principal)))
            .unwrap_or(Decimal::ZERO);
        let monthly_service_fee = type_rules
            .map(|t| t.monthly_service_fee)
            .unwrap_or(Decimal::ZERO);
        let total_service_fees = monthly_service_fee * Decimal::from(input.term_months);

        // Step 6
        let total_cost_of_credit = schedule.total_interest + initiation_fee + total_service_fees;
        let total_repayable = schedule.total_paid + initiation_fee + total_service_fees;

        debug!(
            principal = %input.principal,
            applied = %applied_annual_percent,
            payment = %schedule.payment,
            %total_cost_of_credit,
            "loan quoted"
        );

        Ok(LoanQuote {
            requested_annual_percent: input.annual_rate_percent,
            applied_annual_percent,
            max_annual_percent,
            rate_capped,
            monthly_rate: rate,
            monthly_payment: schedule.payment,
            initiation_fee,
            monthly_service_fee,
            total_service_fees,
            total_interest: schedule.total_interest,
            total_cost_of_credit,
            total_repayable,
            schedule,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::test_support::rules_2025;

    fn quote(input: &LoanInput) -> Result<LoanQuote, CalcError> {
        let rules = rules_2025();
        LoanCalculator::new(&rules.credit).calculate(input)
    }

    #[test]
    fn plain_loan_uses_requested_rate_without_fees() {
        let result = quote(&LoanInput::new(dec!(50000), dec!(24), 36)).unwrap();

        assert_eq!(result.monthly_rate, dec!(0.02));
        assert_eq!(result.monthly_payment, dec!(1961.64));
        assert_eq!(result.total_interest, dec!(20619.18));
        assert_eq!(result.initiation_fee, dec!(0));
        assert_eq!(result.total_cost_of_credit, dec!(20619.18));
        assert_eq!(result.total_repayable, dec!(70619.18));
        assert!(!result.rate_capped);
        assert_eq!(result.max_annual_percent, None);
    }

    #[test]
    fn unsecured_loan_adds_capped_initiation_and_service_fees() {
        let input = LoanInput::new(dec!(50000), dec!(24), 36).with_credit_type(CreditType::Unsecured);

        let result = quote(&input).unwrap();

        // Cap 7.5 + 21 = 28.5, so 24% stands.
        assert_eq!(result.max_annual_percent, Some(dec!(28.50)));
        assert!(!result.rate_capped);
        assert_eq!(result.initiation_fee, dec!(1050));
        assert_eq!(result.total_service_fees, dec!(2160));
        assert_eq!(result.total_cost_of_credit, dec!(23829.18));
        assert_eq!(result.total_repayable, dec!(73829.18));
    }

    #[test]
    fn rate_above_cap_is_clamped() {
        let input =
            LoanInput::new(dec!(50000), dec!(24), 36).with_credit_type(CreditType::CreditFacility);

        let result = quote(&input).unwrap();

        assert!(result.rate_capped);
        assert_eq!(result.requested_annual_percent, dec!(24));
        assert_eq!(result.applied_annual_percent, dec!(21.50));
        assert!(result.monthly_payment < dec!(1961.64));
    }

    #[test]
    fn short_term_credit_uses_flat_cap() {
        let input = LoanInput::new(dec!(5000), dec!(70), 6).with_credit_type(CreditType::ShortTerm);

        let result = quote(&input).unwrap();

        assert_eq!(result.applied_annual_percent, dec!(60));
        assert!(result.rate_capped);
        // 165 + 10% of 4000 = 565
        assert_eq!(result.initiation_fee, dec!(565.00));
    }

    #[test]
    fn small_principal_pays_base_initiation_fee_only() {
        let input = LoanInput::new(dec!(800), dec!(20), 3).with_credit_type(CreditType::Other);

        let result = quote(&input).unwrap();

        assert_eq!(result.initiation_fee, dec!(165));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn rejects_zero_term() {
        let result = quote(&LoanInput::new(dec!(50000), dec!(24), 0));

        assert!(matches!(result, Err(CalcError::InvalidInput { field: "term_months", .. })));
    }

    #[test]
    fn rejects_rate_over_one_hundred_percent() {
        let result = quote(&LoanInput::new(dec!(50000), dec!(120), 12));

        assert!(matches!(
            result,
            Err(CalcError::InvalidInput { field: "annual_rate_percent", .. })
        ));
    }

    #[test]
    fn rejects_zero_principal() {
        let result = quote(&LoanInput::new(dec!(0), dec!(12), 12));

        assert!(matches!(result, Err(CalcError::InvalidInput { field: "principal", .. })));
    }

    #[test]
    fn rejects_credit_type_without_rules() {
        let mut rules = rules_2025().credit;
        rules.types.retain(|t| t.kind != CreditType::Mortgage);
        let input = LoanInput::new(dec!(900000), dec!(11), 240).with_credit_type(CreditType::Mortgage);

        let result = LoanCalculator::new(&rules).calculate(&input);

        assert!(matches!(result, Err(CalcError::InvalidInput { field: "credit_type", .. })));
    }
}
