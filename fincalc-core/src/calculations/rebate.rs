//! Rebates and exclusions.
//!
//! A rebate comes off the computed tax; an exclusion comes off the base
//! before any rate is applied. Both floor at zero.

use rust_decimal::Decimal;

use crate::calculations::common::floor_zero;
use crate::models::{RebateSchedule, TaxpayerProfile};

/// Subtracts the rebates `profile` qualifies for from `tax`.
///
/// Age bands accumulate, and companies and trusts receive nothing (the
/// schedule resolves their rebate to zero).
pub fn apply_rebate(
    tax: Decimal,
    profile: &TaxpayerProfile,
    schedule: &RebateSchedule,
) -> Decimal {
    floor_zero(tax - schedule.total_for(profile))
}

/// Subtracts `exclusion` from `amount` when `eligible`.
///
/// An ineligible exclusion resolves to zero rather than being skipped, so
/// the result is always `amount` clamped to zero in that case.
pub fn apply_exclusion(
    amount: Decimal,
    exclusion: Decimal,
    eligible: bool,
) -> Decimal {
    let exclusion = if eligible { exclusion } else { Decimal::ZERO };
    floor_zero(amount - exclusion)
}
