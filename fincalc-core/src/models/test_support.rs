//! 2025 reference figures shared by unit tests.

use rust_decimal_macros::dec;

use super::*;

pub(crate) fn individual_2025() -> BracketTable {
    BracketTable::from_thresholds(
        TableKind::Individual,
        2025,
        &[
            (dec!(0), dec!(0.18)),
            (dec!(237100), dec!(0.26)),
            (dec!(370500), dec!(0.31)),
            (dec!(512800), dec!(0.36)),
            (dec!(673000), dec!(0.39)),
            (dec!(857900), dec!(0.41)),
            (dec!(1817000), dec!(0.45)),
        ],
    )
    .unwrap()
}

pub(crate) fn company_2025() -> BracketTable {
    BracketTable::from_thresholds(TableKind::Company, 2025, &[(dec!(0), dec!(0.27))]).unwrap()
}

pub(crate) fn trust_2025() -> BracketTable {
    BracketTable::from_thresholds(TableKind::Trust, 2025, &[(dec!(0), dec!(0.45))]).unwrap()
}

pub(crate) fn lump_sum_2025() -> BracketTable {
    BracketTable::from_thresholds(
        TableKind::RetirementLumpSum,
        2025,
        &[
            (dec!(0), dec!(0)),
            (dec!(550000), dec!(0.18)),
            (dec!(770000), dec!(0.27)),
            (dec!(1155000), dec!(0.36)),
        ],
    )
    .unwrap()
}

pub(crate) fn credit_type(kind: CreditType) -> CreditTypeRules {
    CreditTypeRules {
        kind,
        rate_margin_percent: match kind {
            CreditType::Mortgage => dec!(12),
            CreditType::CreditFacility => dec!(14),
            CreditType::Unsecured => dec!(21),
            CreditType::Developmental => dec!(20),
            CreditType::ShortTerm | CreditType::Other => dec!(17),
        },
        fixed_max_annual_percent: (kind == CreditType::ShortTerm).then_some(dec!(60)),
        initiation_base: dec!(165),
        initiation_rate: dec!(0.10),
        initiation_threshold: dec!(1000),
        initiation_cap: dec!(1050),
        monthly_service_fee: dec!(60),
    }
}

pub(crate) fn rules_2025() -> YearRules {
    YearRules {
        tax_year: 2025,
        rebates: RebateSchedule {
            primary: dec!(17235),
            secondary: dec!(9444),
            tertiary: dec!(3145),
            secondary_age: 65,
            tertiary_age: 75,
        },
        thresholds: TaxThresholds {
            under_65: dec!(95750),
            age_65_to_74: dec!(148217),
            age_75_plus: dec!(165689),
        },
        medical_credits: MedicalCredits {
            main_and_first: dec!(364),
            additional: dec!(246),
        },
        retirement: RetirementRules {
            deduction_rate: dec!(0.275),
            deduction_cap: dec!(350000),
            commutation_divisor: 3,
            de_minimis_fund: dec!(247500),
        },
        cgt: CgtRules {
            inclusion_rate_individual: dec!(0.40),
            inclusion_rate_company: dec!(0.80),
            inclusion_rate_trust: dec!(0.80),
            annual_exclusion: dec!(40000),
            death_year_exclusion: dec!(300000),
            primary_residence_exclusion: dec!(2000000),
        },
        interest_exemption: InterestExemption {
            under_65: dec!(23800),
            age_65_plus: dec!(34500),
        },
        uif: UifRules {
            income_ceiling: dec!(17712),
            days_per_credit: 4,
            max_credit_days: 365,
            maternity_rate: dec!(0.66),
            maternity_max_days: 121,
            tiers: vec![
                ReplacementTier {
                    wage_ceiling: Some(dec!(3500)),
                    rate: dec!(0.60),
                },
                ReplacementTier {
                    wage_ceiling: Some(dec!(7000)),
                    rate: dec!(0.50),
                },
                ReplacementTier {
                    wage_ceiling: Some(dec!(12000)),
                    rate: dec!(0.45),
                },
                ReplacementTier {
                    wage_ceiling: None,
                    rate: dec!(0.38),
                },
            ],
        },
        leave: LeaveRules {
            five_day_week_days: dec!(15),
            six_day_week_days: dec!(18),
        },
        credit: CreditRules {
            repo_rate_percent: dec!(7.50),
            types: [
                CreditType::Mortgage,
                CreditType::CreditFacility,
                CreditType::Unsecured,
                CreditType::Developmental,
                CreditType::ShortTerm,
                CreditType::Other,
            ]
            .into_iter()
            .map(credit_type)
            .collect(),
        },
    }
}
