//! Capital gains tax.
//!
//! # Calculation Order
//!
//! The order is fixed:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Capital gain = proceeds − (base cost + acquisition + improvement + disposal costs) |
//! | 2    | Clamp to zero; a loss is never taxed and is not carried forward |
//! | 3    | Primary residence exclusion (individuals, when claimed), minimum 0 |
//! | 4    | Annual exclusion (individuals; the year-of-death amount when flagged), minimum 0 |
//! | 5    | × inclusion rate for the taxpayer class |
//! | 6    | Taxable gain stacked on other taxable income in the class's table; rebates applied to both sides |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fincalc_core::calculations::cgt::taxable_gain;
//!
//! // 275,000 gain, 40,000 annual exclusion, 40% inclusion
//! assert_eq!(taxable_gain(dec!(275000), dec!(40000), dec!(0.40)), dec!(94000.00));
//! // a loss includes nothing
//! assert_eq!(taxable_gain(dec!(-10000), dec!(40000), dec!(0.40)), dec!(0));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{floor_zero, ratio_or_zero, round_half_up};
use crate::calculations::progressive::ProgressiveTaxEvaluator;
use crate::calculations::rebate::{apply_exclusion, apply_rebate};
use crate::calculations::validation;
use crate::error::CalcError;
use crate::models::{BracketTable, TaxpayerProfile, YearRules};

/// Steps 2–5 for an already computed gain: clamp, exclude, include.
pub fn taxable_gain(
    capital_gain: Decimal,
    exclusion: Decimal,
    inclusion_rate: Decimal,
) -> Decimal {
    let after_exclusion = apply_exclusion(floor_zero(capital_gain), exclusion, true);
    round_half_up(after_exclusion * inclusion_rate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    /// Purchase price of the asset.
    BaseCost,
    /// Transfer duty, conveyancing and other costs of buying.
    Acquisition,
    /// Capital improvements made while holding the asset.
    Improvement,
    /// Agent commission and other costs of selling.
    Disposal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostItem {
    pub category: CostCategory,
    pub amount: Decimal,
}

impl CostItem {
    pub fn new(
        category: CostCategory,
        amount: Decimal,
    ) -> Self {
        Self { category, amount }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CgtInput {
    pub profile: TaxpayerProfile,

    /// Selling price.
    pub proceeds: Decimal,

    pub costs: Vec<CostItem>,

    /// Taxable income for the year before the gain is included.
    pub other_taxable_income: Decimal,

    /// The asset is the taxpayer's primary residence.
    pub primary_residence: bool,

    /// The disposal happened in the taxpayer's year of death.
    pub year_of_death: bool,
}

/// CGT result with every intermediate figure, in calculation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CgtResult {
    pub proceeds: Decimal,
    pub base_cost: Decimal,
    pub acquisition_costs: Decimal,
    pub improvement_costs: Decimal,
    pub disposal_costs: Decimal,
    pub total_costs: Decimal,
    /// Proceeds less total costs; negative for a loss.
    pub capital_gain: Decimal,
    pub is_loss: bool,
    pub primary_residence_exclusion: Decimal,
    pub annual_exclusion: Decimal,
    pub net_gain: Decimal,
    pub inclusion_rate: Decimal,
    pub taxable_gain: Decimal,
    pub other_taxable_income: Decimal,
    /// Tax on other income alone, after rebates.
    pub tax_without_gain: Decimal,
    /// Tax on other income plus the taxable gain, after rebates.
    pub tax_with_gain: Decimal,
    pub cgt_payable: Decimal,
    /// Rate of the bracket the taxable gain tops out in.
    pub marginal_rate: Decimal,
    /// `cgt_payable / capital_gain`, zero for a loss.
    pub effective_rate: Decimal,
    /// Proceeds less disposal costs and CGT.
    pub net_proceeds: Decimal,
}

/// Calculator for capital gains tax on a single disposal.
#[derive(Debug, Clone)]
pub struct CgtCalculator<'a> {
    evaluator: ProgressiveTaxEvaluator<'a>,
    rules: &'a YearRules,
}

impl<'a> CgtCalculator<'a> {
    /// `table` must be the income-tax schedule for the taxpayer's class.
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
    /// [`CalcError::InvalidInput`] for negative proceeds, costs or income,
    /// and any error from the evaluator.
    pub fn calculate(
        &self,
        input: &CgtInput,
    ) -> Result<CgtResult, CalcError> {
        validation::non_negative("proceeds", input.proceeds)?;
        validation::non_negative("other_taxable_income", input.other_taxable_income)?;
        for cost in &input.costs {
            validation::non_negative("costs", cost.amount)?;
        }

        let base_cost = self.sum_costs(&input.costs, CostCategory::BaseCost);
        let acquisition_costs = self.sum_costs(&input.costs, CostCategory::Acquisition);
        let improvement_costs = self.sum_costs(&input.costs, CostCategory::Improvement);
        let disposal_costs = self.sum_costs(&input.costs, CostCategory::Disposal);
        let total_costs = base_cost + acquisition_costs + improvement_costs + disposal_costs;

        // Steps 1 and 2
        let capital_gain = input.proceeds - total_costs;
        let clamped_gain = floor_zero(capital_gain);

        // Step 3
        let residence_exclusion = if input.primary_residence {
            self.rules.cgt.primary_residence_exclusion(&input.profile)
        } else {
            Decimal::ZERO
        };
        let after_residence = apply_exclusion(clamped_gain, residence_exclusion, true);

        // Step 4
        let annual_exclusion = self
            .rules
            .cgt
            .annual_exclusion(&input.profile, input.year_of_death);
        let net_gain = apply_exclusion(after_residence, annual_exclusion, true);

        // Step 5
        let inclusion_rate = self.rules.cgt.inclusion_rate(input.profile.class);
        let taxable_gain = round_half_up(net_gain * inclusion_rate);

        // Step 6
        let stacked = self
            .evaluator
            .tax_on_top(input.other_taxable_income, taxable_gain)?;
        let tax_without_gain =
            apply_rebate(stacked.without.tax, &input.profile, &self.rules.rebates);
        let tax_with_gain = apply_rebate(stacked.with.tax, &input.profile, &self.rules.rebates);
        let cgt_payable = tax_with_gain - tax_without_gain;

        debug!(
            class = input.profile.class.as_str(),
            %capital_gain,
            %taxable_gain,
            %cgt_payable,
            "calculated capital gains tax"
        );

        Ok(CgtResult {
            proceeds: input.proceeds,
            base_cost,
            acquisition_costs,
            improvement_costs,
            disposal_costs,
            total_costs,
            capital_gain,
            is_loss: capital_gain < Decimal::ZERO,
            primary_residence_exclusion: clamped_gain - after_residence,
            annual_exclusion: after_residence - net_gain,
            net_gain,
            inclusion_rate,
            taxable_gain,
            other_taxable_income: input.other_taxable_income,
            tax_without_gain,
            tax_with_gain,
            cgt_payable,
            marginal_rate: stacked.with.marginal_rate,
            effective_rate: ratio_or_zero(cgt_payable, clamped_gain),
            net_proceeds: input.proceeds - disposal_costs - cgt_payable,
        })
    }

    fn sum_costs(
        &self,
        costs: &[CostItem],
        category: CostCategory,
    ) -> Decimal {
        costs
            .iter()
            .filter(|c| c.category == category)
            .map(|c| c.amount)
            .sum()
    }
}
