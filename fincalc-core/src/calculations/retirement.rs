//! Retirement fund projection and lump-sum tax at retirement.
//!
//! # Calculation Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Project the fund to retirement age (monthly contributions, yearly escalation) |
//! | 2    | Commutation limit: fund ÷ divisor, or the whole fund at or below the de-minimis amount |
//! | 3    | Lump sum: requested share of the fund, capped at Step 2 |
//! | 4    | Tax on the lump sum from the retirement lump-sum table |
//! | 5    | Net lump sum (Step 3 − Step 4) and residual annuity capital |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{percent_to_rate, round_half_up};
use crate::calculations::compound::{SavingsPlan, SavingsProjection, project_savings};
use crate::calculations::progressive::ProgressiveTaxEvaluator;
use crate::calculations::validation;
use crate::error::CalcError;
use crate::models::{BracketTable, RetirementRules};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_fund: Decimal,
    pub monthly_contribution: Decimal,
    pub annual_return_percent: Decimal,
    pub annual_escalation_percent: Decimal,
    /// Share of the fund to take in cash, `[0, 100]`.
    pub lump_sum_percent: Decimal,
}

impl RetirementInput {
    fn validate(&self) -> Result<(), CalcError> {
        if self.retirement_age < self.current_age {
            return Err(CalcError::invalid(
                "retirement_age",
                format!(
                    "must not be before current age {}, got {}",
                    self.current_age, self.retirement_age
                ),
            ));
        }
        validation::percent("lump_sum_percent", self.lump_sum_percent)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementResult {
    pub years_to_retirement: u32,
    pub fund_at_retirement: Decimal,
    pub max_lump_sum: Decimal,
    pub requested_lump_sum: Decimal,
    pub lump_sum: Decimal,
    /// Set when the requested lump sum exceeded the commutation limit.
    pub lump_sum_capped: bool,
    pub lump_sum_tax: Decimal,
    pub net_lump_sum: Decimal,
    /// Capital left to buy an annuity.
    pub annuity_capital: Decimal,
    pub projection: SavingsProjection,
}

pub struct RetirementCalculator<'a> {
    evaluator: ProgressiveTaxEvaluator<'a>,
    rules: &'a RetirementRules,
}

impl<'a> RetirementCalculator<'a> {
    /// `lump_sum_table` is the retirement lump-sum bracket table, not the
    /// income table.
    pub fn new(
        lump_sum_table: &'a BracketTable,
        rules: &'a RetirementRules,
    ) -> Self {
        Self {
            evaluator: ProgressiveTaxEvaluator::new(lump_sum_table),
            rules,
        }
    }

    pub fn calculate(
        &self,
        input: &RetirementInput,
    ) -> Result<RetirementResult, CalcError> {
        input.validate()?;

        // Step 1
        let years_to_retirement = input.retirement_age - input.current_age;
        let projection = project_savings(&SavingsPlan {
            opening_balance: input.current_fund,
            monthly_contribution: input.monthly_contribution,
            annual_rate_percent: input.annual_return_percent,
            annual_escalation_percent: input.annual_escalation_percent,
            years: years_to_retirement,
        })?;
        let fund = projection.final_balance;

        // Step 2
        let max_lump_sum = self.max_lump_sum(fund);

        // Step 3
        let requested_lump_sum = round_half_up(fund * percent_to_rate(input.lump_sum_percent));
        let lump_sum_capped = requested_lump_sum > max_lump_sum;
        if lump_sum_capped {
            warn!(
                requested = %requested_lump_sum,
                limit = %max_lump_sum,
                "lump sum over the commutation limit, capping"
            );
        }
        let lump_sum = requested_lump_sum.min(max_lump_sum);

        // Steps 4-5
        let lump_sum_tax = self.evaluator.evaluate(lump_sum)?.tax;
        let net_lump_sum = lump_sum - lump_sum_tax;
        let annuity_capital = fund - lump_sum;

        debug!(
            %fund,
            %lump_sum,
            tax = %lump_sum_tax,
            "retirement lump sum calculated"
        );

        Ok(RetirementResult {
            years_to_retirement,
            fund_at_retirement: fund,
            max_lump_sum,
            requested_lump_sum,
            lump_sum,
            lump_sum_capped,
            lump_sum_tax,
            net_lump_sum,
            annuity_capital,
            projection,
        })
    }

    fn max_lump_sum(
        &self,
        fund: Decimal,
    ) -> Decimal {
        if fund <= self.rules.de_minimis_fund || self.rules.commutation_divisor == 0 {
            fund
        } else {
            round_half_up(fund / Decimal::from(self.rules.commutation_divisor))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::test_support::{lump_sum_2025, rules_2025};

    fn at_retirement(
        fund: Decimal,
        lump_sum_percent: Decimal,
    ) -> RetirementInput {
        RetirementInput {
            current_age: 65,
            retirement_age: 65,
            current_fund: fund,
            monthly_contribution: dec!(0),
            annual_return_percent: dec!(0),
            annual_escalation_percent: dec!(0),
            lump_sum_percent,
        }
    }

    fn calculate(input: &RetirementInput) -> Result<RetirementResult, CalcError> {
        let table = lump_sum_2025();
        let rules = rules_2025();
        RetirementCalculator::new(&table, &rules.retirement).calculate(input)
    }

    // =========================================================================
    // Step 2 - Commutation limit
    // =========================================================================

    #[test]
    fn step2_one_third_limit_above_de_minimis() {
        let table = lump_sum_2025();
        let rules = rules_2025();
        let calculator = RetirementCalculator::new(&table, &rules.retirement);

        assert_eq!(calculator.max_lump_sum(dec!(3000000)), dec!(1000000));
    }

    #[test]
    fn step2_whole_fund_at_de_minimis() {
        let table = lump_sum_2025();
        let rules = rules_2025();
        let calculator = RetirementCalculator::new(&table, &rules.retirement);

        assert_eq!(calculator.max_lump_sum(dec!(247500)), dec!(247500));
    }

    // =========================================================================
    // Integration tests
    // =========================================================================

    #[test]
    fn lump_sum_within_tax_free_band() {
        let result = calculate(&at_retirement(dec!(1500000), dec!(33.3))).unwrap();

        assert_eq!(result.lump_sum, dec!(499500.00));
        assert_eq!(result.lump_sum_tax, dec!(0));
        assert_eq!(result.annuity_capital, dec!(1000500.00));
        assert!(!result.lump_sum_capped);
    }

    #[test]
    fn lump_sum_over_limit_is_capped_and_taxed() {
        let result = calculate(&at_retirement(dec!(3000000), dec!(50))).unwrap();

        assert!(result.lump_sum_capped);
        assert_eq!(result.requested_lump_sum, dec!(1500000));
        assert_eq!(result.lump_sum, dec!(1000000));
        // 39 600 + 27% × (1 000 000 − 770 000)
        assert_eq!(result.lump_sum_tax, dec!(101700));
        assert_eq!(result.net_lump_sum, dec!(898300));
        assert_eq!(result.annuity_capital, dec!(2000000));
    }

    #[test]
    fn small_fund_may_be_taken_in_full() {
        let result = calculate(&at_retirement(dec!(200000), dec!(100))).unwrap();

        assert_eq!(result.lump_sum, dec!(200000));
        assert_eq!(result.annuity_capital, dec!(0));
        assert!(!result.lump_sum_capped);
    }

    #[test]
    fn fund_is_projected_to_retirement_age() {
        let input = RetirementInput {
            current_age: 60,
            monthly_contribution: dec!(1000),
            ..at_retirement(dec!(1500000), dec!(0))
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.years_to_retirement, 5);
        assert_eq!(result.fund_at_retirement, dec!(1560000));
        assert_eq!(result.projection.years.len(), 5);
        assert_eq!(result.lump_sum, dec!(0));
    }

    #[test]
    fn rejects_retirement_age_before_current_age() {
        let input = RetirementInput {
            current_age: 66,
            ..at_retirement(dec!(1000), dec!(0))
        };

        assert!(matches!(
            calculate(&input),
            Err(CalcError::InvalidInput { field: "retirement_age", .. })
        ));
    }
}
