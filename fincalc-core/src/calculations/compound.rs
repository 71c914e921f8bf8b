//! Compound growth, interest-exemption netting and savings projections.
//!
//! ```text
//! FV = P × (1 + r/n)^(n × t)
//! ```
//!
//! Whole exponents use repeated multiplication; fractional ones (for example
//! 2.5 years compounded annually) go through `exp`/`ln`.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{
    MONTHS_PER_YEAR, floor_zero, percent_to_rate, round_half_up,
};
use crate::calculations::progressive::ProgressiveTaxEvaluator;
use crate::calculations::validation;
use crate::error::CalcError;
use crate::models::{BracketTable, TaxpayerProfile, YearRules};

/// Longest horizon accepted by the projections, in years.
pub const MAX_YEARS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundingFrequency {
    Annual,
    SemiAnnual,
    Quarterly,
    Monthly,
    Daily,
}

impl CompoundingFrequency {
    pub const ALL: [Self; 5] = [
        Self::Annual,
        Self::SemiAnnual,
        Self::Quarterly,
        Self::Monthly,
        Self::Daily,
    ];

    pub fn periods_per_year(&self) -> u32 {
        match self {
            Self::Annual => 1,
            Self::SemiAnnual => 2,
            Self::Quarterly => 4,
            Self::Monthly => 12,
            Self::Daily => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::SemiAnnual => "semi_annual",
            Self::Quarterly => "quarterly",
            Self::Monthly => "monthly",
            Self::Daily => "daily",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "annual" | "annually" | "yearly" => Some(Self::Annual),
            "semi_annual" | "semiannual" => Some(Self::SemiAnnual),
            "quarterly" => Some(Self::Quarterly),
            "monthly" => Some(Self::Monthly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

impl std::fmt::Display for CompoundingFrequency {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn growth_factor(
    annual_rate: Decimal,
    periods_per_year: u32,
    years: Decimal,
) -> Result<Decimal, CalcError> {
    let n = Decimal::from(periods_per_year);
    let base = Decimal::ONE + annual_rate / n;
    let exponent = n * years;

    let factor = if exponent.fract().is_zero() {
        i64::try_from(exponent).ok().and_then(|e| base.checked_powi(e))
    } else {
        base.checked_powd(exponent)
    };
    factor.ok_or(CalcError::Overflow("compound growth factor"))
}

fn check_growth_inputs(
    amount_field: &'static str,
    amount: Decimal,
    annual_rate: Decimal,
    periods_per_year: u32,
    years: Decimal,
) -> Result<(), CalcError> {
    validation::non_negative(amount_field, amount)?;
    validation::fraction("annual_rate", annual_rate)?;
    validation::term("periods_per_year", periods_per_year)?;
    validation::non_negative("years", years)?;
    if years > Decimal::from(MAX_YEARS) {
        return Err(CalcError::invalid("years", format!("must be at most {MAX_YEARS}, got {years}")));
    }
    Ok(())
}

/// Future value of `principal` at `annual_rate` (fraction) compounded
/// `periods_per_year` times a year for `years`, rounded to cents.
///
/// ```
/// use rust_decimal_macros::dec;
/// use fincalc_core::calculations::compound::grow;
///
/// assert_eq!(grow(dec!(10000), dec!(0.10), 1, dec!(10)).unwrap(), dec!(25937.42));
/// ```
pub fn grow(
    principal: Decimal,
    annual_rate: Decimal,
    periods_per_year: u32,
    years: Decimal,
) -> Result<Decimal, CalcError> {
    check_growth_inputs("principal", principal, annual_rate, periods_per_year, years)?;
    let factor = growth_factor(annual_rate, periods_per_year, years)?;
    principal
        .checked_mul(factor)
        .map(round_half_up)
        .ok_or(CalcError::Overflow("future value"))
}

/// Present value of `future_value`; the inverse of [`grow`].
pub fn discount(
    future_value: Decimal,
    annual_rate: Decimal,
    periods_per_year: u32,
    years: Decimal,
) -> Result<Decimal, CalcError> {
    check_growth_inputs("future_value", future_value, annual_rate, periods_per_year, years)?;
    let factor = growth_factor(annual_rate, periods_per_year, years)?;
    future_value
        .checked_div(factor)
        .map(round_half_up)
        .ok_or(CalcError::Overflow("present value"))
}

/// Interest split into its exempt, taxed and retained parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestNetting {
    pub gross_interest: Decimal,
    /// Portion of the exemption actually used.
    pub exemption_applied: Decimal,
    pub taxable_interest: Decimal,
    pub tax: Decimal,
    pub net_interest: Decimal,
}

/// Applies `exemption` once to `total_interest` and taxes the remainder at
/// `marginal_rate`.
pub fn net_interest(
    total_interest: Decimal,
    exemption: Decimal,
    marginal_rate: Decimal,
) -> InterestNetting {
    let gross_interest = floor_zero(total_interest);
    let exemption_applied = exemption.min(gross_interest).max(Decimal::ZERO);
    let taxable_interest = gross_interest - exemption_applied;
    let tax = round_half_up(taxable_interest * marginal_rate);

    InterestNetting {
        gross_interest,
        exemption_applied,
        taxable_interest,
        tax,
        net_interest: gross_interest - tax,
    }
}

// =============================================================================
// Investment growth after tax
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundInput {
    pub principal: Decimal,
    pub annual_rate_percent: Decimal,
    pub frequency: CompoundingFrequency,
    pub years: Decimal,
    pub profile: TaxpayerProfile,
    /// Other taxable income for the year, used to find the marginal rate.
    pub other_taxable_income: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundResult {
    pub future_value: Decimal,
    pub effective_annual_rate: Decimal,
    pub interest: InterestNetting,
    pub marginal_rate: Decimal,
    /// Future value less the tax on the interest.
    pub net_future_value: Decimal,
}

/// Grows a lump sum and nets the interest against the exemption and tax.
pub struct CompoundInterestCalculator<'a> {
    evaluator: ProgressiveTaxEvaluator<'a>,
    rules: &'a YearRules,
}

impl<'a> CompoundInterestCalculator<'a> {
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
    /// [`CalcError::InvalidInput`] for negative amounts, a rate outside
    /// `[0, 100]` or more than [`MAX_YEARS`] years.
    pub fn calculate(
        &self,
        input: &CompoundInput,
    ) -> Result<CompoundResult, CalcError> {
        validation::percent("annual_rate_percent", input.annual_rate_percent)?;
        validation::non_negative("other_taxable_income", input.other_taxable_income)?;

        let annual_rate = percent_to_rate(input.annual_rate_percent);
        let periods_per_year = input.frequency.periods_per_year();
        let future_value = grow(input.principal, annual_rate, periods_per_year, input.years)?;
        let effective_annual_rate = (growth_factor(annual_rate, periods_per_year, Decimal::ONE)?
            - Decimal::ONE)
            .round_dp(6);

        let exemption = self.rules.interest_exemption.for_profile(&input.profile);
        let gross_interest = future_value - input.principal;
        let taxable_interest = floor_zero(gross_interest - exemption);
        let marginal_rate = self
            .evaluator
            .evaluate(input.other_taxable_income + taxable_interest)?
            .marginal_rate;
        let interest = net_interest(gross_interest, exemption, marginal_rate);

        debug!(
            principal = %input.principal,
            %future_value,
            taxable = %interest.taxable_interest,
            %marginal_rate,
            "compound growth netted"
        );

        Ok(CompoundResult {
            net_future_value: future_value - interest.tax,
            future_value,
            effective_annual_rate,
            interest,
            marginal_rate,
        })
    }
}

// =============================================================================
// Savings projection
// =============================================================================

/// Regular monthly saving with a yearly contribution increase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsPlan {
    pub opening_balance: Decimal,
    pub monthly_contribution: Decimal,
    pub annual_rate_percent: Decimal,
    /// Contribution increase applied at the start of each year after the first.
    pub annual_escalation_percent: Decimal,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSnapshot {
    pub year: u32,
    pub monthly_contribution: Decimal,
    pub contributions: Decimal,
    pub growth: Decimal,
    pub closing_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsProjection {
    pub final_balance: Decimal,
    pub total_contributions: Decimal,
    pub total_growth: Decimal,
    pub years: Vec<YearSnapshot>,
}

/// Compounds monthly, with contributions landing at the end of each month.
pub fn project_savings(plan: &SavingsPlan) -> Result<SavingsProjection, CalcError> {
    validation::non_negative("opening_balance", plan.opening_balance)?;
    validation::non_negative("monthly_contribution", plan.monthly_contribution)?;
    validation::percent("annual_rate_percent", plan.annual_rate_percent)?;
    validation::percent("annual_escalation_percent", plan.annual_escalation_percent)?;
    validation::within("years", plan.years, 0, MAX_YEARS)?;

    let monthly_rate = percent_to_rate(plan.annual_rate_percent) / MONTHS_PER_YEAR;
    let escalation = Decimal::ONE + percent_to_rate(plan.annual_escalation_percent);

    let mut balance = plan.opening_balance;
    let mut contribution = plan.monthly_contribution;
    let mut years = Vec::with_capacity(plan.years as usize);
    let mut total_contributions = Decimal::ZERO;
    let mut total_growth = Decimal::ZERO;

    for year in 1..=plan.years {
        if year > 1 {
            contribution = round_half_up(contribution * escalation);
        }
        let mut contributions = Decimal::ZERO;
        let mut growth = Decimal::ZERO;
        for _ in 0..12 {
            let interest = round_half_up(balance * monthly_rate);
            balance += interest + contribution;
            growth += interest;
            contributions += contribution;
        }
        total_contributions += contributions;
        total_growth += growth;
        years.push(YearSnapshot {
            year,
            monthly_contribution: contribution,
            contributions,
            growth,
            closing_balance: balance,
        });
    }

    debug!(
        years = plan.years,
        final_balance = %balance,
        %total_contributions,
        "savings projected"
    );

    Ok(SavingsProjection {
        final_balance: balance,
        total_contributions,
        total_growth,
        years,
    })
}
