//! Parsers for command-line values.
//!
//! Each returns a typed error so clap can print it next to the offending
//! flag.

use chrono::NaiveDate;
use fincalc_core::calculations::{ClaimType, CompoundingFrequency, PayoutBasis};
use fincalc_core::{CreditType, TaxpayerClass};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    /// A string could not be parsed as an amount.
    #[error("invalid amount '{input}': {source}")]
    Amount {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("invalid date '{input}' (expected YYYY-MM-DD): {source}")]
    Date {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("unknown {what} '{input}', expected one of: {expected}")]
    Choice {
        what: &'static str,
        input: String,
        expected: String,
    },
}

/// Normalizes amount input: trims, drops a leading rand sign, and removes
/// spaces (including non-breaking ones), commas and underscores used as
/// thousands separators.
fn normalize_amount_input(s: &str) -> String {
    let trimmed = s.trim();
    let unsigned = trimmed
        .strip_prefix('R')
        .or_else(|| trimmed.strip_prefix('r'))
        .unwrap_or(trimmed);
    unsigned
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' ' | '\u{a0}' | '\u{202f}'))
        .collect()
}

/// Parses a rand amount such as `R 1 234 567.89` or `1,234.56`.
///
/// Empty input is treated as 0.
pub fn parse_amount(s: &str) -> Result<Decimal, InputError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid amount: {}", e);
        InputError::Amount {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses a percentage, with or without a trailing `%`.
pub fn parse_percent(s: &str) -> Result<Decimal, InputError> {
    let trimmed = s.trim();
    parse_amount(trimmed.strip_suffix('%').unwrap_or(trimmed))
}

pub fn parse_date(s: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|source| InputError::Date {
        input: s.to_string(),
        source,
    })
}

fn choice<T>(
    what: &'static str,
    s: &str,
    parsed: Option<T>,
    expected: &[&str],
) -> Result<T, InputError> {
    parsed.ok_or_else(|| InputError::Choice {
        what,
        input: s.to_string(),
        expected: expected.join(", "),
    })
}

fn normalize_choice(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('-', "_")
}

pub fn parse_class(s: &str) -> Result<TaxpayerClass, InputError> {
    choice(
        "taxpayer class",
        s,
        TaxpayerClass::parse(&normalize_choice(s)),
        &["individual", "company", "trust"],
    )
}

pub fn parse_credit_type(s: &str) -> Result<CreditType, InputError> {
    choice(
        "credit type",
        s,
        CreditType::parse(&normalize_choice(s)),
        &["mortgage", "credit_facility", "unsecured", "developmental", "short_term", "other"],
    )
}

pub fn parse_frequency(s: &str) -> Result<CompoundingFrequency, InputError> {
    let expected: Vec<&str> = CompoundingFrequency::ALL.iter().map(|f| f.as_str()).collect();
    choice("compounding frequency", s, CompoundingFrequency::parse(s), &expected)
}

pub fn parse_claim(s: &str) -> Result<ClaimType, InputError> {
    choice(
        "claim type",
        s,
        ClaimType::parse(s),
        &["unemployment", "illness", "maternity"],
    )
}

pub fn parse_basis(s: &str) -> Result<PayoutBasis, InputError> {
    let expected: Vec<&str> = PayoutBasis::ALL.iter().map(|b| b.as_str()).collect();
    choice("payout basis", s, PayoutBasis::parse(s), &expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_amount_accepts_comma_thousands_separator() {
        assert_eq!(parse_amount("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("1,234,567.89").unwrap(), dec!(1234567.89));
    }

    #[test]
    fn parse_amount_accepts_rand_sign_and_spaces() {
        assert_eq!(parse_amount("R 1 234 567.89").unwrap(), dec!(1234567.89));
        assert_eq!(parse_amount("R400000").unwrap(), dec!(400000));
        assert_eq!(parse_amount("r12\u{a0}500").unwrap(), dec!(12500));
    }

    #[test]
    fn parse_amount_trim_whitespace() {
        assert_eq!(parse_amount("  123.45  ").unwrap(), dec!(123.45));
    }

    #[test]
    fn parse_amount_empty_treated_as_zero() {
        assert_eq!(parse_amount("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_invalid_returns_error() {
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("R 12.3.4").is_err());
    }

    #[test]
    fn parse_percent_strips_sign() {
        assert_eq!(parse_percent("24%").unwrap(), dec!(24));
        assert_eq!(parse_percent("7.5").unwrap(), dec!(7.5));
    }

    #[test]
    fn parse_date_iso_only() {
        assert_eq!(
            parse_date("2019-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2019, 3, 15).unwrap()
        );
        assert!(parse_date("15/03/2019").is_err());
    }

    #[test]
    fn parse_choices_accept_dashes_and_case() {
        assert_eq!(parse_class("Company").unwrap(), TaxpayerClass::Company);
        assert_eq!(parse_credit_type("credit-facility").unwrap(), CreditType::CreditFacility);
        assert_eq!(parse_frequency("quarterly").unwrap(), CompoundingFrequency::Quarterly);
        assert_eq!(parse_claim("maternity").unwrap(), ClaimType::Maternity);
        assert_eq!(parse_basis("one-month").unwrap(), PayoutBasis::OneMonthPerYear);
    }

    #[test]
    fn parse_choice_error_lists_options() {
        let err = parse_class("partnership").unwrap_err();

        assert_eq!(
            err.to_string(),
            "unknown taxpayer class 'partnership', expected one of: individual, company, trust"
        );
    }
}
