//! Income tax and PAYE.
//!
//! # Calculation Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Gross annual income (monthly income × 12) plus other income |
//! | 2    | Retirement contribution deduction: smaller of contributions, rate × income, annual cap |
//! | 3    | Taxable income (Step 1 − Step 2, minimum 0) |
//! | 4    | Tax from the bracket table |
//! | 5    | Age rebates (Step 4 − rebates, minimum 0) |
//! | 6    | Medical scheme fees tax credits (Step 5 − credits, minimum 0) |
//! | 7    | Monthly PAYE (Step 6 ÷ 12) |
//!
//! Deductions and credits only exist for individuals; for companies and
//! trusts they resolve to zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{
    MONTHS_PER_YEAR, floor_zero, ratio_or_zero, round_half_up,
};
use crate::calculations::progressive::ProgressiveTaxEvaluator;
use crate::calculations::rebate::apply_rebate;
use crate::calculations::validation;
use crate::error::CalcError;
use crate::models::{BracketTable, TaxpayerProfile, YearRules};

/// Whether `gross_income` is an annual or a monthly figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomePeriod {
    Annual,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxInput {
    pub profile: TaxpayerProfile,

    /// Salary or business income for `period`.
    pub gross_income: Decimal,

    pub period: IncomePeriod,

    /// Other annual taxable income (rental, taxable interest, and so on).
    pub other_income: Decimal,

    /// Annual pension, provident and retirement annuity contributions.
    pub retirement_contributions: Decimal,

    /// Main member plus dependants on a medical scheme.
    pub medical_members: u32,

    /// Months in the year the medical cover was held.
    pub medical_months: u32,
}

impl IncomeTaxInput {
    /// Annual income with no deductions or credits.
    pub fn annual(
        profile: TaxpayerProfile,
        gross_income: Decimal,
    ) -> Self {
        Self {
            profile,
            gross_income,
            period: IncomePeriod::Annual,
            other_income: Decimal::ZERO,
            retirement_contributions: Decimal::ZERO,
            medical_members: 0,
            medical_months: 12,
        }
    }

    fn validate(&self) -> Result<(), CalcError> {
        validation::non_negative("gross_income", self.gross_income)?;
        validation::non_negative("other_income", self.other_income)?;
        validation::non_negative("retirement_contributions", self.retirement_contributions)?;
        validation::within("medical_months", self.medical_months, 0, 12)?;
        Ok(())
    }
}

/// Income tax result with every intermediate figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    pub gross_annual_income: Decimal,
    pub retirement_deduction: Decimal,
    pub taxable_income: Decimal,
    pub tax_before_rebates: Decimal,
    /// Rebates actually used (never more than the tax they reduce).
    pub rebates: Decimal,
    pub tax_after_rebates: Decimal,
    /// Medical credits actually used.
    pub medical_credits: Decimal,
    pub tax_payable: Decimal,
    pub monthly_paye: Decimal,
    pub marginal_rate: Decimal,
    /// `tax_payable / gross_annual_income` (fraction).
    pub effective_rate: Decimal,
    pub net_annual_income: Decimal,
    pub net_monthly_income: Decimal,
    /// Income below which this taxpayer's age band pays no tax.
    pub tax_threshold: Option<Decimal>,
    pub below_threshold: bool,
}

/// Calculator for annual income tax and monthly PAYE.
#[derive(Debug, Clone)]
pub struct IncomeTaxCalculator<'a> {
    evaluator: ProgressiveTaxEvaluator<'a>,
    rules: &'a YearRules,
}

impl<'a> IncomeTaxCalculator<'a> {
    /// `table` must be the schedule for the taxpayer's class.
    pub fn new(
        table: &'a BracketTable,
        rules: &'a YearRules,
    ) -> Self {
        Self {
            evaluator: ProgressiveTaxEvaluator::new(table),
            rules,
        }
    }

    /// # Errors
    ///
    /// [`CalcError::InvalidInput`] for negative amounts or more than twelve
    /// medical months, and any error from the evaluator.
    pub fn calculate(
        &self,
        input: &IncomeTaxInput,
    ) -> Result<IncomeTaxResult, CalcError> {
        input.validate()?;

        let gross_annual_income = self.gross_annual_income(input);
        let retirement_deduction = self.retirement_deduction(
            &input.profile,
            input.retirement_contributions,
            gross_annual_income,
        );
        let taxable_income = round_half_up(floor_zero(gross_annual_income - retirement_deduction));

        let evaluation = self.evaluator.evaluate(taxable_income)?;
        let tax_before_rebates = evaluation.tax;

        let tax_after_rebates =
            apply_rebate(tax_before_rebates, &input.profile, &self.rules.rebates);
        let rebates = tax_before_rebates - tax_after_rebates;

        let available_credits =
            self.medical_credits(&input.profile, input.medical_members, input.medical_months);
        let tax_payable = floor_zero(tax_after_rebates - available_credits);
        let medical_credits = tax_after_rebates - tax_payable;

        let monthly_paye = round_half_up(tax_payable / MONTHS_PER_YEAR);
        let net_annual_income = gross_annual_income - tax_payable;

        let tax_threshold = input
            .profile
            .is_individual()
            .then(|| self.rules.thresholds.for_age(input.profile.age_or_default()));

        debug!(
            %gross_annual_income,
            %taxable_income,
            %tax_payable,
            "calculated income tax"
        );

        Ok(IncomeTaxResult {
            gross_annual_income,
            retirement_deduction,
            taxable_income,
            tax_before_rebates,
            rebates,
            tax_after_rebates,
            medical_credits,
            tax_payable,
            monthly_paye,
            marginal_rate: evaluation.marginal_rate,
            effective_rate: ratio_or_zero(tax_payable, gross_annual_income),
            net_annual_income,
            net_monthly_income: round_half_up(net_annual_income / MONTHS_PER_YEAR),
            tax_threshold,
            below_threshold: tax_payable.is_zero(),
        })
    }

    fn gross_annual_income(
        &self,
        input: &IncomeTaxInput,
    ) -> Decimal {
        let salary = match input.period {
            IncomePeriod::Annual => input.gross_income,
            IncomePeriod::Monthly => input.gross_income * MONTHS_PER_YEAR,
        };
        round_half_up(salary + input.other_income)
    }

    /// Smaller of contributions, the income-based limit and the annual cap.
    fn retirement_deduction(
        &self,
        profile: &TaxpayerProfile,
        contributions: Decimal,
        income: Decimal,
    ) -> Decimal {
        if !profile.is_individual() {
            return Decimal::ZERO;
        }
        let limits = &self.rules.retirement;
        let income_limit = round_half_up(income * limits.deduction_rate);
        contributions.min(income_limit).min(limits.deduction_cap)
    }

    fn medical_credits(
        &self,
        profile: &TaxpayerProfile,
        members: u32,
        months: u32,
    ) -> Decimal {
        if !profile.is_individual() {
            return Decimal::ZERO;
        }
        self.rules.medical_credits.monthly_credit(members) * Decimal::from(months)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::test_support::{individual_2025, rules_2025};

    fn calculator_fixture() -> (BracketTable, YearRules) {
        (individual_2025(), rules_2025())
    }

    // =========================================================================
    // step tests
    // =========================================================================

    #[test]
    fn gross_annual_income_annualises_monthly_salary() {
        let (table, rules) = calculator_fixture();
        let calculator = IncomeTaxCalculator::new(&table, &rules);
        let mut input = IncomeTaxInput::annual(TaxpayerProfile::individual(None), dec!(30000));
        input.period = IncomePeriod::Monthly;
        input.other_income = dec!(5000);

        assert_eq!(calculator.gross_annual_income(&input), dec!(365000));
    }

    #[test]
    fn retirement_deduction_limited_by_income_share() {
        let (table, rules) = calculator_fixture();
        let calculator = IncomeTaxCalculator::new(&table, &rules);

        let result = calculator.retirement_deduction(
            &TaxpayerProfile::individual(None),
            dec!(200000),
            dec!(400000),
        );

        assert_eq!(result, dec!(110000.00));
    }

    #[test]
    fn retirement_deduction_limited_by_cap() {
        let (table, rules) = calculator_fixture();
        let calculator = IncomeTaxCalculator::new(&table, &rules);

        let result = calculator.retirement_deduction(
            &TaxpayerProfile::individual(None),
            dec!(600000),
            dec!(3000000),
        );

        assert_eq!(result, dec!(350000));
    }

    #[test]
    fn retirement_deduction_is_zero_for_companies() {
        let (table, rules) = calculator_fixture();
        let calculator = IncomeTaxCalculator::new(&table, &rules);

        let result =
            calculator.retirement_deduction(&TaxpayerProfile::company(), dec!(50000), dec!(400000));

        assert_eq!(result, dec!(0));
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn calculate_under_65_at_400k() {
        let (table, rules) = calculator_fixture();
        let calculator = IncomeTaxCalculator::new(&table, &rules);
        let input = IncomeTaxInput::annual(TaxpayerProfile::individual(Some(40)), dec!(400000));

        let result = calculator.calculate(&input).unwrap();

        assert_eq!(result.taxable_income, dec!(400000));
        assert_eq!(result.tax_before_rebates, dec!(86507.00));
        assert_eq!(result.rebates, dec!(17235));
        assert_eq!(result.tax_payable, dec!(69272.00));
        assert_eq!(result.monthly_paye, dec!(5772.67));
        assert_eq!(result.marginal_rate, dec!(0.31));
        assert_eq!(result.tax_threshold, Some(dec!(95750)));
        assert!(!result.below_threshold);
    }

    #[test]
    fn calculate_with_medical_credits_and_contributions() {
        let (table, rules) = calculator_fixture();
        let calculator = IncomeTaxCalculator::new(&table, &rules);
        let mut input = IncomeTaxInput::annual(TaxpayerProfile::individual(Some(40)), dec!(430000));
        input.retirement_contributions = dec!(30000);
        input.medical_members = 3;

        let result = calculator.calculate(&input).unwrap();

        // Taxable 400,000; credits (2 × 364 + 246) × 12 = 11,688
        assert_eq!(result.taxable_income, dec!(400000));
        assert_eq!(result.medical_credits, dec!(11688));
        assert_eq!(result.tax_payable, dec!(57584.00));
    }

    #[test]
    fn calculate_below_threshold_pays_nothing() {
        let (table, rules) = calculator_fixture();
        let calculator = IncomeTaxCalculator::new(&table, &rules);
        let input = IncomeTaxInput::annual(TaxpayerProfile::individual(Some(30)), dec!(90000));

        let result = calculator.calculate(&input).unwrap();

        // 16,200 of tax is wiped out by the 17,235 primary rebate.
        assert_eq!(result.tax_before_rebates, dec!(16200.00));
        assert_eq!(result.rebates, dec!(16200.00));
        assert_eq!(result.tax_payable, dec!(0));
        assert!(result.below_threshold);
    }

    #[test]
    fn calculate_rejects_negative_income() {
        let (table, rules) = calculator_fixture();
        let calculator = IncomeTaxCalculator::new(&table, &rules);
        let input = IncomeTaxInput::annual(TaxpayerProfile::individual(None), dec!(-1));

        let result = calculator.calculate(&input);

        assert!(matches!(
            result,
            Err(CalcError::InvalidInput {
                field: "gross_income",
                ..
            })
        ));
    }

    #[test]
    fn calculate_rejects_thirteen_medical_months() {
        let (table, rules) = calculator_fixture();
        let calculator = IncomeTaxCalculator::new(&table, &rules);
        let mut input = IncomeTaxInput::annual(TaxpayerProfile::individual(None), dec!(1000));
        input.medical_months = 13;

        assert!(calculator.calculate(&input).is_err());
    }
}
