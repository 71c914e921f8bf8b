//! Per-year rules from TOML.
//!
//! The file is a list of `[[year]]` tables, each deserializing straight into
//! a [`YearRules`].

use std::collections::BTreeSet;

use fincalc_core::calculations::ReplacementTiers;
use fincalc_core::{CalcError, YearRules};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::loader::DataLoadError;

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    year: Vec<YearRules>,
}

/// Parses and checks every year in a rules document.
///
/// # Errors
///
/// * [`DataLoadError::TomlParse`] for malformed TOML or missing keys.
/// * [`DataLoadError::DuplicateYear`] when a year appears twice.
/// * [`DataLoadError::Rules`] when a year's values are out of range.
pub fn parse_rules(source: &str) -> Result<Vec<YearRules>, DataLoadError> {
    let file: RulesFile =
        toml::from_str(source).map_err(|e| DataLoadError::TomlParse(e.to_string()))?;

    let mut seen = BTreeSet::new();
    for rules in &file.year {
        if !seen.insert(rules.tax_year) {
            return Err(DataLoadError::DuplicateYear(rules.tax_year));
        }
        check(rules).map_err(|source| DataLoadError::Rules {
            year: rules.tax_year,
            source,
        })?;
        debug!(year = rules.tax_year, "rules loaded");
    }

    Ok(file.year)
}

fn check(rules: &YearRules) -> Result<(), CalcError> {
    let fractions = [
        ("retirement.deduction_rate", rules.retirement.deduction_rate),
        ("cgt.inclusion_rate_individual", rules.cgt.inclusion_rate_individual),
        ("cgt.inclusion_rate_company", rules.cgt.inclusion_rate_company),
        ("cgt.inclusion_rate_trust", rules.cgt.inclusion_rate_trust),
        ("uif.maternity_rate", rules.uif.maternity_rate),
    ];
    for (field, value) in fractions {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(CalcError::InvalidInput {
                field,
                reason: format!("must be between 0 and 1, got {value}"),
            });
        }
    }
    if rules.uif.days_per_credit == 0 {
        return Err(CalcError::InvalidInput {
            field: "uif.days_per_credit",
            reason: "must be at least 1".to_string(),
        });
    }
    ReplacementTiers::new(rules.uif.tiers.clone())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use fincalc_core::CreditType;

    const MINIMAL: &str = r#"
[[year]]
tax_year = 2025

[year.rebates]
primary = 17235
secondary = 9444
tertiary = 3145

[year.thresholds]
under_65 = 95750
age_65_to_74 = 148217
age_75_plus = 165689

[year.medical_credits]
main_and_first = 364
additional = 246

[year.retirement]
deduction_rate = 0.275
deduction_cap = 350000
commutation_divisor = 3
de_minimis_fund = 247500

[year.cgt]
inclusion_rate_individual = 0.40
inclusion_rate_company = 0.80
inclusion_rate_trust = 0.80
annual_exclusion = 40000
death_year_exclusion = 300000
primary_residence_exclusion = 2000000

[year.interest_exemption]
under_65 = 23800
age_65_plus = 34500

[year.uif]
income_ceiling = 17712
days_per_credit = 4
max_credit_days = 365
maternity_rate = 0.66
maternity_max_days = 121

[[year.uif.tiers]]
wage_ceiling = 3500
rate = 0.60

[[year.uif.tiers]]
rate = 0.38

[year.leave]
five_day_week_days = 15
six_day_week_days = 18

[year.credit]
repo_rate_percent = 7.50

[[year.credit.types]]
kind = "short_term"
fixed_max_annual_percent = 60
initiation_base = 165
initiation_rate = 0.10
initiation_threshold = 1000
initiation_cap = 1050
monthly_service_fee = 69
"#;

    #[test]
    fn test_parse_minimal_year() {
        let years = parse_rules(MINIMAL).unwrap();

        assert_eq!(years.len(), 1);
        let rules = &years[0];
        assert_eq!(rules.tax_year, 2025);
        assert_eq!(rules.rebates.primary, dec!(17235));
        assert_eq!(rules.rebates.secondary_age, 65);
        assert_eq!(rules.rebates.tertiary_age, 75);
        assert_eq!(rules.retirement.deduction_rate, dec!(0.275));
        assert_eq!(rules.uif.tiers.len(), 2);
        assert_eq!(rules.uif.tiers[1].wage_ceiling, None);

        let short_term = rules.credit.for_type(CreditType::ShortTerm).unwrap();
        assert_eq!(short_term.rate_margin_percent, dec!(0));
        assert_eq!(short_term.max_annual_percent(rules.credit.repo_rate_percent), dec!(60));
    }

    #[test]
    fn test_parse_empty_document_has_no_years() {
        assert!(parse_rules("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_duplicate_year() {
        let doubled = format!("{MINIMAL}\n{MINIMAL}");

        assert_eq!(parse_rules(&doubled), Err(DataLoadError::DuplicateYear(2025)));
    }

    #[test]
    fn test_parse_rejects_missing_section() {
        let without_leave = MINIMAL.replace(
            "[year.leave]\nfive_day_week_days = 15\nsix_day_week_days = 18\n",
            "",
        );

        assert!(matches!(parse_rules(&without_leave), Err(DataLoadError::TomlParse(_))));
    }

    #[test]
    fn test_parse_rejects_inclusion_rate_above_one() {
        let broken = MINIMAL.replace("inclusion_rate_company = 0.80", "inclusion_rate_company = 80");

        assert!(matches!(
            parse_rules(&broken),
            Err(DataLoadError::Rules {
                year: 2025,
                source: CalcError::InvalidInput {
                    field: "cgt.inclusion_rate_company",
                    ..
                },
            })
        ));
    }

    #[test]
    fn test_parse_rejects_bounded_top_uif_tier() {
        let broken = MINIMAL.replace(
            "[[year.uif.tiers]]\nrate = 0.38",
            "[[year.uif.tiers]]\nwage_ceiling = 9000\nrate = 0.38",
        );

        assert!(matches!(
            parse_rules(&broken),
            Err(DataLoadError::Rules {
                source: CalcError::InvalidTable(_),
                ..
            })
        ));
    }
}
