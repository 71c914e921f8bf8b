use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// Allowed drift between a published base tax and the recomputed one.
///
/// Published schedules round base amounts to whole currency units.
const BASE_TAX_TOLERANCE: Decimal = Decimal::ONE;

/// Which schedule a bracket table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Individual,
    Company,
    Trust,
    RetirementLumpSum,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Company => "company",
            Self::Trust => "trust",
            Self::RetirementLumpSum => "retirement_lump_sum",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "individual" => Some(Self::Individual),
            "company" => Some(Self::Company),
            "trust" => Some(Self::Trust),
            "retirement_lump_sum" => Some(Self::RetirementLumpSum),
            _ => None,
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progressive rate band.
///
/// An amount falls in this band when it is at least `min` and, for bounded
/// bands, at most `max`. `base_tax` is the tax payable at exactly `min`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
    pub base_tax: Decimal,
}

impl Bracket {
    /// Tax payable at the top of this band, `None` for the unbounded band.
    pub fn tax_at_max(&self) -> Option<Decimal> {
        self.max
            .map(|max| self.base_tax + (max - self.min) * self.rate)
    }

    pub fn contains(
        &self,
        amount: Decimal,
    ) -> bool {
        amount >= self.min && self.max.is_none_or(|max| amount <= max)
    }
}

/// An ordered, contiguous set of brackets for one schedule and tax year.
///
/// Only constructible through [`BracketTable::new`] or
/// [`BracketTable::from_thresholds`], both of which enforce the table
/// invariants, so evaluation never has to re-check them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTable {
    kind: TableKind,
    tax_year: i32,
    brackets: Vec<Bracket>,
}

impl BracketTable {
    /// Builds a table from brackets with published base amounts.
    ///
    /// # Errors
    ///
    /// * [`CalcError::EmptyTable`] when `brackets` is empty.
    /// * [`CalcError::InvalidTable`] when the first band does not start at
    ///   zero, bands are unsorted, overlapping or gapped, a band other than
    ///   the last is unbounded, a rate lies outside `[0, 1]`, or a base tax
    ///   disagrees with the running total of the bands below it.
    pub fn new(
        kind: TableKind,
        tax_year: i32,
        brackets: Vec<Bracket>,
    ) -> Result<Self, CalcError> {
        let first = brackets.first().ok_or(CalcError::EmptyTable)?;
        if first.min != Decimal::ZERO {
            return Err(CalcError::InvalidTable(format!(
                "{kind} {tax_year}: first bracket starts at {} instead of 0",
                first.min
            )));
        }
        if first.base_tax != Decimal::ZERO {
            return Err(CalcError::InvalidTable(format!(
                "{kind} {tax_year}: first bracket base tax must be 0, got {}",
                first.base_tax
            )));
        }

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(CalcError::InvalidTable(format!(
                    "{kind} {tax_year}: bracket {index} rate {} outside 0..=1",
                    bracket.rate
                )));
            }
            if let Some(max) = bracket.max {
                if max <= bracket.min {
                    return Err(CalcError::InvalidTable(format!(
                        "{kind} {tax_year}: bracket {index} max {max} not above min {}",
                        bracket.min
                    )));
                }
            }
        }

        for (index, pair) in brackets.windows(2).enumerate() {
            let (lower, upper) = (&pair[0], &pair[1]);
            let Some(lower_max) = lower.max else {
                return Err(CalcError::InvalidTable(format!(
                    "{kind} {tax_year}: bracket {index} is unbounded but not last"
                )));
            };
            if upper.min != lower_max {
                return Err(CalcError::InvalidTable(format!(
                    "{kind} {tax_year}: bracket {} starts at {} but bracket {index} ends at {lower_max}",
                    index + 1,
                    upper.min
                )));
            }
            let expected = lower.base_tax + (lower_max - lower.min) * lower.rate;
            if (upper.base_tax - expected).abs() > BASE_TAX_TOLERANCE {
                return Err(CalcError::InvalidTable(format!(
                    "{kind} {tax_year}: bracket {} base tax {} should be {expected}",
                    index + 1,
                    upper.base_tax
                )));
            }
        }

        Ok(Self {
            kind,
            tax_year,
            brackets,
        })
    }

    /// Builds a table from `(lower threshold, rate)` pairs, computing every
    /// band's upper bound and cumulative base tax.
    ///
    /// Thresholds must be given in ascending order starting at zero; the
    /// last band is unbounded.
    pub fn from_thresholds(
        kind: TableKind,
        tax_year: i32,
        thresholds: &[(Decimal, Decimal)],
    ) -> Result<Self, CalcError> {
        let mut brackets = Vec::with_capacity(thresholds.len());
        let mut base_tax = Decimal::ZERO;

        for (index, &(min, rate)) in thresholds.iter().enumerate() {
            let max = thresholds.get(index + 1).map(|&(next_min, _)| next_min);
            brackets.push(Bracket {
                min,
                max,
                rate,
                base_tax,
            });
            if let Some(max) = max {
                base_tax += (max - min) * rate;
            }
        }

        Self::new(kind, tax_year, brackets)
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Locates the bracket for `amount`: the one with the greatest `min`
    /// not exceeding it.
    pub fn locate(
        &self,
        amount: Decimal,
    ) -> Option<(usize, &Bracket)> {
        let index = self
            .brackets
            .partition_point(|b| b.min <= amount)
            .checked_sub(1)?;
        let bracket = &self.brackets[index];
        bracket.contains(amount).then_some((index, bracket))
    }
}
