//! Per-year rate constants.
//!
//! Everything a calculator needs besides the bracket tables lives here, one
//! [`YearRules`] per tax year. Values are loaded once at startup and never
//! mutated. Amounts that only apply to some taxpayer classes are resolved
//! through methods that return zero for ineligible profiles, so callers never
//! decide eligibility themselves.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{TaxpayerClass, TaxpayerProfile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRules {
    pub tax_year: i32,
    pub rebates: RebateSchedule,
    pub thresholds: TaxThresholds,
    pub medical_credits: MedicalCredits,
    pub retirement: RetirementRules,
    pub cgt: CgtRules,
    pub interest_exemption: InterestExemption,
    pub uif: UifRules,
    pub leave: LeaveRules,
    pub credit: CreditRules,
}

/// Fixed amounts subtracted from computed income tax, banded by age.
///
/// Bands are cumulative: a taxpayer at or over `tertiary_age` receives all
/// three rebates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebateSchedule {
    pub primary: Decimal,
    pub secondary: Decimal,
    pub tertiary: Decimal,
    #[serde(default = "default_secondary_age")]
    pub secondary_age: u32,
    #[serde(default = "default_tertiary_age")]
    pub tertiary_age: u32,
}

fn default_secondary_age() -> u32 {
    65
}

fn default_tertiary_age() -> u32 {
    75
}

impl RebateSchedule {
    /// Total rebate for `profile`. Zero for companies and trusts.
    pub fn total_for(
        &self,
        profile: &TaxpayerProfile,
    ) -> Decimal {
        if !profile.is_individual() {
            return Decimal::ZERO;
        }
        let age = profile.age_or_default();
        let mut total = self.primary;
        if age >= self.secondary_age {
            total += self.secondary;
        }
        if age >= self.tertiary_age {
            total += self.tertiary;
        }
        total
    }
}

/// Income below which an individual pays no tax, per age band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxThresholds {
    pub under_65: Decimal,
    pub age_65_to_74: Decimal,
    pub age_75_plus: Decimal,
}

impl TaxThresholds {
    pub fn for_age(
        &self,
        age: u32,
    ) -> Decimal {
        match age {
            0..65 => self.under_65,
            65..75 => self.age_65_to_74,
            _ => self.age_75_plus,
        }
    }
}

/// Monthly medical scheme fees tax credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalCredits {
    /// Credit for each of the main member and the first dependant.
    pub main_and_first: Decimal,
    /// Credit for every further dependant.
    pub additional: Decimal,
}

impl MedicalCredits {
    pub fn monthly_credit(
        &self,
        members: u32,
    ) -> Decimal {
        let first_two = Decimal::from(members.min(2));
        let rest = Decimal::from(members.saturating_sub(2));
        self.main_and_first * first_two + self.additional * rest
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementRules {
    /// Share of income that retirement contributions may reduce (fraction).
    pub deduction_rate: Decimal,
    /// Absolute annual ceiling on the contribution deduction.
    pub deduction_cap: Decimal,
    /// A lump sum may be at most `fund / commutation_divisor`.
    pub commutation_divisor: u32,
    /// Funds at or below this value may be taken entirely as a lump sum.
    pub de_minimis_fund: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CgtRules {
    pub inclusion_rate_individual: Decimal,
    pub inclusion_rate_company: Decimal,
    pub inclusion_rate_trust: Decimal,
    pub annual_exclusion: Decimal,
    pub death_year_exclusion: Decimal,
    pub primary_residence_exclusion: Decimal,
}

impl CgtRules {
    pub fn inclusion_rate(
        &self,
        class: TaxpayerClass,
    ) -> Decimal {
        match class {
            TaxpayerClass::Individual => self.inclusion_rate_individual,
            TaxpayerClass::Company => self.inclusion_rate_company,
            TaxpayerClass::Trust => self.inclusion_rate_trust,
        }
    }

    /// Annual exclusion available to `profile`; zero unless an individual.
    pub fn annual_exclusion(
        &self,
        profile: &TaxpayerProfile,
        year_of_death: bool,
    ) -> Decimal {
        match (profile.class, year_of_death) {
            (TaxpayerClass::Individual, true) => self.death_year_exclusion,
            (TaxpayerClass::Individual, false) => self.annual_exclusion,
            _ => Decimal::ZERO,
        }
    }

    /// Primary residence exclusion available to `profile`; zero unless an
    /// individual.
    pub fn primary_residence_exclusion(
        &self,
        profile: &TaxpayerProfile,
    ) -> Decimal {
        if profile.is_individual() {
            self.primary_residence_exclusion
        } else {
            Decimal::ZERO
        }
    }
}

/// Annual tax-free local interest for individuals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestExemption {
    pub under_65: Decimal,
    pub age_65_plus: Decimal,
}

impl InterestExemption {
    /// Exemption available to `profile`; zero for companies and trusts.
    pub fn for_profile(
        &self,
        profile: &TaxpayerProfile,
    ) -> Decimal {
        match profile.class {
            TaxpayerClass::Individual if profile.age_or_default() >= 65 => self.age_65_plus,
            TaxpayerClass::Individual => self.under_65,
            _ => Decimal::ZERO,
        }
    }
}

/// One wage band of a replacement-rate scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementTier {
    /// Highest wage in this band; `None` for the open top band.
    pub wage_ceiling: Option<Decimal>,
    /// Share of the wage paid out (fraction).
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UifRules {
    /// Monthly remuneration above this is ignored.
    pub income_ceiling: Decimal,
    /// Days employed per credit day earned.
    pub days_per_credit: u32,
    /// Most credit days that can be held at once.
    pub max_credit_days: u32,
    /// Flat replacement rate for maternity claims.
    pub maternity_rate: Decimal,
    /// Longest maternity claim in days.
    pub maternity_max_days: u32,
    pub tiers: Vec<ReplacementTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRules {
    /// Annual leave days per cycle for a five-day working week.
    pub five_day_week_days: Decimal,
    /// Annual leave days per cycle for a six-day working week.
    pub six_day_week_days: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditType {
    Mortgage,
    CreditFacility,
    Unsecured,
    Developmental,
    ShortTerm,
    Other,
}

impl CreditType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mortgage => "mortgage",
            Self::CreditFacility => "credit_facility",
            Self::Unsecured => "unsecured",
            Self::Developmental => "developmental",
            Self::ShortTerm => "short_term",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mortgage" => Some(Self::Mortgage),
            "credit_facility" => Some(Self::CreditFacility),
            "unsecured" => Some(Self::Unsecured),
            "developmental" => Some(Self::Developmental),
            "short_term" => Some(Self::ShortTerm),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for CreditType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditRules {
    /// Reserve Bank repo rate (percent) the interest caps are pegged to.
    pub repo_rate_percent: Decimal,
    pub types: Vec<CreditTypeRules>,
}

impl CreditRules {
    pub fn for_type(
        &self,
        credit_type: CreditType,
    ) -> Option<&CreditTypeRules> {
        self.types.iter().find(|t| t.kind == credit_type)
    }
}

/// Statutory interest cap and fee formula for one kind of credit agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTypeRules {
    pub kind: CreditType,
    /// Percentage points above repo.
    #[serde(default)]
    pub rate_margin_percent: Decimal,
    /// Flat annual cap that replaces `repo + margin` when present.
    #[serde(default)]
    pub fixed_max_annual_percent: Option<Decimal>,
    pub initiation_base: Decimal,
    pub initiation_rate: Decimal,
    pub initiation_threshold: Decimal,
    pub initiation_cap: Decimal,
    pub monthly_service_fee: Decimal,
}

impl CreditTypeRules {
    pub fn max_annual_percent(
        &self,
        repo_rate_percent: Decimal,
    ) -> Decimal {
        self.fixed_max_annual_percent
            .unwrap_or(repo_rate_percent + self.rate_margin_percent)
    }

    /// Initiation fee for a principal of `principal`.
    pub fn initiation_fee(
        &self,
        principal: Decimal,
    ) -> Decimal {
        let excess = (principal - self.initiation_threshold).max(Decimal::ZERO);
        (self.initiation_base + excess * self.initiation_rate).min(self.initiation_cap)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn rebates() -> RebateSchedule {
        RebateSchedule {
            primary: dec!(17235),
            secondary: dec!(9444),
            tertiary: dec!(3145),
            secondary_age: 65,
            tertiary_age: 75,
        }
    }

    fn cgt() -> CgtRules {
        CgtRules {
            inclusion_rate_individual: dec!(0.40),
            inclusion_rate_company: dec!(0.80),
            inclusion_rate_trust: dec!(0.80),
            annual_exclusion: dec!(40000),
            death_year_exclusion: dec!(300000),
            primary_residence_exclusion: dec!(2000000),
        }
    }

    #[test]
    fn rebates_are_cumulative_by_age() {
        let schedule = rebates();

        assert_eq!(schedule.total_for(&TaxpayerProfile::individual(Some(40))), dec!(17235));
        assert_eq!(schedule.total_for(&TaxpayerProfile::individual(Some(65))), dec!(26679));
        assert_eq!(schedule.total_for(&TaxpayerProfile::individual(Some(70))), dec!(26679));
        assert_eq!(schedule.total_for(&TaxpayerProfile::individual(Some(80))), dec!(29824));
    }

    #[test]
    fn rebates_default_to_primary_without_age() {
        assert_eq!(rebates().total_for(&TaxpayerProfile::individual(None)), dec!(17235));
    }

    #[test]
    fn rebates_resolve_to_zero_for_companies() {
        assert_eq!(rebates().total_for(&TaxpayerProfile::company()), Decimal::ZERO);
        assert_eq!(rebates().total_for(&TaxpayerProfile::trust()), Decimal::ZERO);
    }

    #[test]
    fn annual_exclusion_only_for_individuals() {
        let rules = cgt();

        assert_eq!(rules.annual_exclusion(&TaxpayerProfile::individual(None), false), dec!(40000));
        assert_eq!(rules.annual_exclusion(&TaxpayerProfile::individual(None), true), dec!(300000));
        assert_eq!(rules.annual_exclusion(&TaxpayerProfile::company(), false), Decimal::ZERO);
        assert_eq!(rules.annual_exclusion(&TaxpayerProfile::trust(), true), Decimal::ZERO);
    }

    #[test]
    fn inclusion_rate_is_per_class() {
        let rules = cgt();

        assert_eq!(rules.inclusion_rate(TaxpayerClass::Individual), dec!(0.40));
        assert_eq!(rules.inclusion_rate(TaxpayerClass::Company), dec!(0.80));
    }

    #[test]
    fn interest_exemption_bands_by_age() {
        let exemption = InterestExemption {
            under_65: dec!(23800),
            age_65_plus: dec!(34500),
        };

        assert_eq!(exemption.for_profile(&TaxpayerProfile::individual(Some(30))), dec!(23800));
        assert_eq!(exemption.for_profile(&TaxpayerProfile::individual(Some(65))), dec!(34500));
        assert_eq!(exemption.for_profile(&TaxpayerProfile::company()), Decimal::ZERO);
    }

    #[test]
    fn medical_credit_counts_dependants() {
        let credits = MedicalCredits {
            main_and_first: dec!(364),
            additional: dec!(246),
        };

        assert_eq!(credits.monthly_credit(0), dec!(0));
        assert_eq!(credits.monthly_credit(1), dec!(364));
        assert_eq!(credits.monthly_credit(2), dec!(728));
        assert_eq!(credits.monthly_credit(4), dec!(1220));
    }

    #[test]
    fn initiation_fee_is_capped() {
        let unsecured = CreditTypeRules {
            kind: CreditType::Unsecured,
            rate_margin_percent: dec!(21),
            fixed_max_annual_percent: None,
            initiation_base: dec!(165),
            initiation_rate: dec!(0.10),
            initiation_threshold: dec!(1000),
            initiation_cap: dec!(1050),
            monthly_service_fee: dec!(60),
        };

        assert_eq!(unsecured.initiation_fee(dec!(800)), dec!(165));
        assert_eq!(unsecured.initiation_fee(dec!(5000)), dec!(565));
        assert_eq!(unsecured.initiation_fee(dec!(50000)), dec!(1050));
        assert_eq!(unsecured.max_annual_percent(dec!(7.5)), dec!(28.5));
    }

    #[test]
    fn thresholds_band_by_age() {
        let thresholds = TaxThresholds {
            under_65: dec!(95750),
            age_65_to_74: dec!(148217),
            age_75_plus: dec!(165689),
        };

        assert_eq!(thresholds.for_age(64), dec!(95750));
        assert_eq!(thresholds.for_age(74), dec!(148217));
        assert_eq!(thresholds.for_age(75), dec!(165689));
    }
}
