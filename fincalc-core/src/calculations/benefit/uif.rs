//! Unemployment Insurance Fund claims.
//!
//! # Calculation Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Monthly wage capped at the contribution ceiling |
//! | 2    | Daily wage (Step 1 × 12 ÷ 365) |
//! | 3    | Replacement rate: wage tier, or the flat maternity rate |
//! | 4    | Daily benefit (Step 2 × Step 3) |
//! | 5    | Credit days: days employed ÷ days per credit, capped (maternity has its own cap) |
//! | 6    | Total benefit (Step 4 × Step 5) |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ReplacementTiers;
use crate::calculations::common::{MONTHS_PER_YEAR, round_half_up};
use crate::calculations::validation;
use crate::error::CalcError;
use crate::models::UifRules;

const DAYS_PER_YEAR: Decimal = Decimal::from_parts(365, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Unemployment,
    Illness,
    Maternity,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unemployment => "unemployment",
            Self::Illness => "illness",
            Self::Maternity => "maternity",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unemployment" => Some(Self::Unemployment),
            "illness" => Some(Self::Illness),
            "maternity" => Some(Self::Maternity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UifInput {
    pub claim: ClaimType,
    /// Average monthly remuneration before the claim.
    pub average_monthly_wage: Decimal,
    /// Days of contributing employment in the last four years.
    pub days_employed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UifResult {
    pub claim: ClaimType,
    pub capped_monthly_wage: Decimal,
    pub daily_wage: Decimal,
    pub replacement_rate: Decimal,
    pub daily_benefit: Decimal,
    pub credit_days: u32,
    pub total_benefit: Decimal,
}

pub struct UifCalculator<'a> {
    rules: &'a UifRules,
    tiers: ReplacementTiers,
}

impl<'a> UifCalculator<'a> {
    /// # Errors
    ///
    /// Any [`ReplacementTiers::new`] error for a malformed tier scale.
    pub fn new(rules: &'a UifRules) -> Result<Self, CalcError> {
        Ok(Self {
            tiers: ReplacementTiers::new(rules.tiers.clone())?,
            rules,
        })
    }

    pub fn calculate(
        &self,
        input: &UifInput,
    ) -> Result<UifResult, CalcError> {
        validation::non_negative("average_monthly_wage", input.average_monthly_wage)?;

        // Steps 1-2
        let capped_monthly_wage = input.average_monthly_wage.min(self.rules.income_ceiling);
        let daily_wage = round_half_up(capped_monthly_wage * MONTHS_PER_YEAR / DAYS_PER_YEAR);

        // Step 3
        let replacement_rate = match input.claim {
            ClaimType::Maternity => self.rules.maternity_rate,
            ClaimType::Unemployment | ClaimType::Illness => {
                self.tiers.tier_for(capped_monthly_wage).rate
            }
        };

        // Step 4
        let daily_benefit = round_half_up(daily_wage * replacement_rate);

        // Step 5
        let credit_days = self.credit_days(input.days_employed, input.claim);

        // Step 6
        let total_benefit = daily_benefit * Decimal::from(credit_days);

        debug!(
            claim = input.claim.as_str(),
            %daily_benefit,
            credit_days,
            %total_benefit,
            "uif benefit calculated"
        );

        Ok(UifResult {
            claim: input.claim,
            capped_monthly_wage,
            daily_wage,
            replacement_rate,
            daily_benefit,
            credit_days,
            total_benefit,
        })
    }

    fn credit_days(
        &self,
        days_employed: u32,
        claim: ClaimType,
    ) -> u32 {
        let earned = days_employed
            .checked_div(self.rules.days_per_credit)
            .unwrap_or(0)
            .min(self.rules.max_credit_days);
        match claim {
            ClaimType::Maternity => earned.min(self.rules.maternity_max_days),
            ClaimType::Unemployment | ClaimType::Illness => earned,
        }
    }
}
