//! Employment benefits: UIF claims, service-based payouts and leave.
//!
//! Replacement-rate scales differ from tax brackets: the wage falls into a
//! single tier and that tier's rate applies to the whole wage. Nothing is
//! blended across tiers.

pub mod leave;
pub mod service;
pub mod uif;

pub use leave::{LeaveCalculator, LeaveInput, LeaveResult};
pub use service::{PayoutBasis, ServiceLength, service_payout};
pub use uif::{ClaimType, UifCalculator, UifInput, UifResult};

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::calculations::validation;
use crate::error::CalcError;
use crate::models::ReplacementTier;

/// Validated replacement-rate scale.
///
/// Ceilings are strictly ascending and only the last tier is open-ended, so
/// every non-negative wage selects exactly one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementTiers {
    tiers: Vec<ReplacementTier>,
}

impl ReplacementTiers {
    /// # Errors
    ///
    /// [`CalcError::EmptyTable`] with no tiers, [`CalcError::InvalidTable`]
    /// when ceilings are out of order, a middle tier is open-ended, the last
    /// tier is bounded, or a rate lies outside `[0, 1]`.
    pub fn new(tiers: Vec<ReplacementTier>) -> Result<Self, CalcError> {
        if tiers.is_empty() {
            return Err(CalcError::EmptyTable);
        }

        let last = tiers.len() - 1;
        let mut previous: Option<Decimal> = None;
        for (i, tier) in tiers.iter().enumerate() {
            if tier.rate < Decimal::ZERO || tier.rate > Decimal::ONE {
                return Err(CalcError::InvalidTable(format!(
                    "replacement tier {i} rate {} outside 0..=1",
                    tier.rate
                )));
            }
            match (tier.wage_ceiling, i == last) {
                (None, false) => {
                    return Err(CalcError::InvalidTable(format!(
                        "replacement tier {i} is open-ended but not last"
                    )));
                }
                (Some(_), true) => {
                    return Err(CalcError::InvalidTable(
                        "last replacement tier must be open-ended".to_string(),
                    ));
                }
                (Some(ceiling), false) => {
                    if previous.is_some_and(|p| ceiling <= p) {
                        return Err(CalcError::InvalidTable(format!(
                            "replacement tier {i} ceiling {ceiling} is not above the previous one"
                        )));
                    }
                    previous = Some(ceiling);
                }
                (None, true) => {}
            }
        }

        Ok(Self { tiers })
    }

    /// The tier whose ceiling covers `wage`.
    pub fn tier_for(
        &self,
        wage: Decimal,
    ) -> &ReplacementTier {
        self.tiers
            .iter()
            .find(|t| t.wage_ceiling.is_none_or(|ceiling| wage <= ceiling))
            .unwrap_or(&self.tiers[self.tiers.len() - 1])
    }

    pub fn tiers(&self) -> &[ReplacementTier] {
        &self.tiers
    }
}

/// `average_wage` × the rate of the single tier it falls in, rounded to cents.
///
/// # Errors
///
/// [`CalcError::InvalidInput`] for a negative wage.
pub fn benefit(
    average_wage: Decimal,
    tiers: &ReplacementTiers,
) -> Result<Decimal, CalcError> {
    validation::non_negative("average_wage", average_wage)?;
    Ok(round_half_up(average_wage * tiers.tier_for(average_wage).rate))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::test_support::rules_2025;

    fn tiers() -> ReplacementTiers {
        ReplacementTiers::new(rules_2025().uif.tiers).unwrap()
    }

    fn tier(
        ceiling: Option<Decimal>,
        rate: Decimal,
    ) -> ReplacementTier {
        ReplacementTier {
            wage_ceiling: ceiling,
            rate,
        }
    }

    #[test]
    fn benefit_applies_single_tier_to_whole_wage() {
        // 10 000 falls in the ≤12 000 tier: 45% of the full wage.
        assert_eq!(benefit(dec!(10000), &tiers()).unwrap(), dec!(4500.00));
    }

    #[test]
    fn benefit_tier_ceiling_is_inclusive() {
        assert_eq!(benefit(dec!(3500), &tiers()).unwrap(), dec!(2100.00));
        assert_eq!(benefit(dec!(3500.01), &tiers()).unwrap(), dec!(1750.01));
    }

    #[test]
    fn benefit_top_tier_is_open_ended() {
        assert_eq!(benefit(dec!(17712), &tiers()).unwrap(), dec!(6730.56));
    }

    #[test]
    fn benefit_rejects_negative_wage() {
        assert!(benefit(dec!(-1), &tiers()).is_err());
    }

    #[test]
    fn new_rejects_empty_scale() {
        assert_eq!(ReplacementTiers::new(vec![]), Err(CalcError::EmptyTable));
    }

    #[test]
    fn new_rejects_bounded_last_tier() {
        let result = ReplacementTiers::new(vec![tier(Some(dec!(1000)), dec!(0.5))]);

        assert!(matches!(result, Err(CalcError::InvalidTable(_))));
    }

    #[test]
    fn new_rejects_open_middle_tier() {
        let result = ReplacementTiers::new(vec![tier(None, dec!(0.5)), tier(None, dec!(0.4))]);

        assert!(matches!(result, Err(CalcError::InvalidTable(_))));
    }

    #[test]
    fn new_rejects_descending_ceilings() {
        let result = ReplacementTiers::new(vec![
            tier(Some(dec!(5000)), dec!(0.6)),
            tier(Some(dec!(4000)), dec!(0.5)),
            tier(None, dec!(0.4)),
        ]);

        assert!(matches!(result, Err(CalcError::InvalidTable(_))));
    }
}
