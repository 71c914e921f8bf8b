//! Progressive tax evaluation against a [`BracketTable`].
//!
//! This is the single evaluator every calculator goes through: income tax,
//! capital gains (the taxable gain is stacked on top of other income), the
//! interest netting marginal rate and retirement lump sums.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fincalc_core::calculations::progressive::evaluate;
//! use fincalc_core::{BracketTable, TableKind};
//!
//! let table = BracketTable::from_thresholds(
//!     TableKind::Individual,
//!     2025,
//!     &[
//!         (dec!(0), dec!(0.18)),
//!         (dec!(237100), dec!(0.26)),
//!         (dec!(370500), dec!(0.31)),
//!         (dec!(512800), dec!(0.36)),
//!     ],
//! )
//! .unwrap();
//!
//! let result = evaluate(dec!(400000), &table).unwrap();
//!
//! assert_eq!(result.tax, dec!(86507.00));
//! assert_eq!(result.marginal_rate, dec!(0.31));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{ratio_or_zero, round_half_up};
use crate::error::CalcError;
use crate::models::BracketTable;

/// Outcome of evaluating one amount against a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxEvaluation {
    /// The amount that was evaluated.
    pub taxable_amount: Decimal,

    /// Tax payable, rounded to cents.
    pub tax: Decimal,

    /// Rate of the bracket the amount fell in (fraction).
    pub marginal_rate: Decimal,

    /// `tax / taxable_amount`, zero when the amount is zero (fraction).
    pub effective_rate: Decimal,

    /// Index of the located bracket within the table.
    pub bracket_index: usize,
}

/// Tax attributable to adding `addition` on top of `base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackedTax {
    pub without: TaxEvaluation,
    pub with: TaxEvaluation,
    /// `with.tax - without.tax`.
    pub tax: Decimal,
    /// `tax / addition`, zero when nothing was added (fraction).
    pub average_rate: Decimal,
}

/// Evaluates `taxable_amount` against `table`.
///
/// # Errors
///
/// * [`CalcError::InvalidInput`] when the amount is negative; callers clamp
///   negative bases to zero before evaluating.
/// * [`CalcError::NoMatchingBracket`] when the amount lies above a table
///   whose top bracket is bounded.
pub fn evaluate(
    taxable_amount: Decimal,
    table: &BracketTable,
) -> Result<TaxEvaluation, CalcError> {
    ProgressiveTaxEvaluator::new(table).evaluate(taxable_amount)
}

/// Tax on `addition` when stacked on top of `base` in the same table.
pub fn tax_on_top(
    base: Decimal,
    addition: Decimal,
    table: &BracketTable,
) -> Result<StackedTax, CalcError> {
    ProgressiveTaxEvaluator::new(table).tax_on_top(base, addition)
}

/// Evaluator bound to one table, for callers that evaluate repeatedly.
#[derive(Debug, Clone, Copy)]
pub struct ProgressiveTaxEvaluator<'a> {
    table: &'a BracketTable,
}

impl<'a> ProgressiveTaxEvaluator<'a> {
    pub fn new(table: &'a BracketTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a BracketTable {
        self.table
    }

    pub fn evaluate(
        &self,
        taxable_amount: Decimal,
    ) -> Result<TaxEvaluation, CalcError> {
        if taxable_amount < Decimal::ZERO {
            return Err(CalcError::invalid(
                "taxable_amount",
                format!("must not be negative, got {taxable_amount}"),
            ));
        }

        let (bracket_index, bracket) = self
            .table
            .locate(taxable_amount)
            .ok_or(CalcError::NoMatchingBracket(taxable_amount))?;

        let tax = round_half_up(bracket.base_tax + (taxable_amount - bracket.min) * bracket.rate);
        let effective_rate = ratio_or_zero(tax, taxable_amount);

        debug!(
            table = %self.table.kind(),
            year = self.table.tax_year(),
            %taxable_amount,
            %tax,
            bracket_index,
            "evaluated progressive tax"
        );

        Ok(TaxEvaluation {
            taxable_amount,
            tax,
            marginal_rate: bracket.rate,
            effective_rate,
            bracket_index,
        })
    }

    pub fn tax_on_top(
        &self,
        base: Decimal,
        addition: Decimal,
    ) -> Result<StackedTax, CalcError> {
        if addition < Decimal::ZERO {
            return Err(CalcError::invalid(
                "addition",
                format!("must not be negative, got {addition}"),
            ));
        }
        let without = self.evaluate(base)?;
        let with = self.evaluate(base + addition)?;
        let tax = with.tax - without.tax;

        Ok(StackedTax {
            average_rate: ratio_or_zero(tax, addition),
            tax,
            without,
            with,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Bracket, TableKind};

    fn sa_2025() -> BracketTable {
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

    // =========================================================================
    // evaluate tests
    // =========================================================================

    #[test]
    fn evaluate_zero_is_zero_tax_and_zero_effective_rate() {
        let result = evaluate(dec!(0), &sa_2025()).unwrap();

        assert_eq!(result.tax, dec!(0));
        assert_eq!(result.effective_rate, dec!(0));
        assert_eq!(result.marginal_rate, dec!(0.18));
    }

    #[test]
    fn evaluate_first_bracket() {
        let result = evaluate(dec!(100000), &sa_2025()).unwrap();

        assert_eq!(result.tax, dec!(18000.00));
        assert_eq!(result.effective_rate, dec!(0.18));
    }

    #[test]
    fn evaluate_third_bracket() {
        let result = evaluate(dec!(400000), &sa_2025()).unwrap();

        // 77,362 + 0.31 * (400,000 - 370,500)
        assert_eq!(result.tax, dec!(86507.00));
        assert_eq!(result.marginal_rate, dec!(0.31));
        assert_eq!(result.bracket_index, 2);
    }

    #[test]
    fn evaluate_unbounded_top_bracket() {
        let result = evaluate(dec!(2000000), &sa_2025()).unwrap();

        // 644,489 + 0.45 * 183,000
        assert_eq!(result.tax, dec!(726839.00));
        assert_eq!(result.marginal_rate, dec!(0.45));
    }

    #[test]
    fn evaluate_boundary_uses_upper_band_rate() {
        let result = evaluate(dec!(370500), &sa_2025()).unwrap();

        assert_eq!(result.tax, dec!(77362.00));
        assert_eq!(result.marginal_rate, dec!(0.31));
    }

    #[test]
    fn evaluate_rejects_negative_amount() {
        let result = evaluate(dec!(-1), &sa_2025());

        assert!(matches!(
            result,
            Err(CalcError::InvalidInput {
                field: "taxable_amount",
                ..
            })
        ));
    }

    #[test]
    fn evaluate_beyond_bounded_table_is_an_error() {
        let table = BracketTable::new(
            TableKind::Individual,
            2025,
            vec![Bracket {
                min: dec!(0),
                max: Some(dec!(1000)),
                rate: dec!(0.1),
                base_tax: dec!(0),
            }],
        )
        .unwrap();

        assert_eq!(evaluate(dec!(5000), &table), Err(CalcError::NoMatchingBracket(dec!(5000))));
    }

    #[test]
    fn evaluate_is_monotone_and_continuous_at_boundaries() {
        let table = sa_2025();
        let mut previous = Decimal::ZERO;
        let mut amount = Decimal::ZERO;

        while amount <= dec!(2500000) {
            let tax = evaluate(amount, &table).unwrap().tax;
            assert!(tax >= previous, "tax fell at {amount}");
            previous = tax;
            amount += dec!(2500);
        }

        for bracket in &table.brackets()[1..] {
            let below = evaluate(bracket.min - dec!(0.01), &table).unwrap().tax;
            let at = evaluate(bracket.min, &table).unwrap().tax;
            assert!(at - below <= dec!(0.01), "jump at {}", bracket.min);
        }
    }

    // =========================================================================
    // tax_on_top tests
    // =========================================================================

    #[test]
    fn tax_on_top_spans_brackets() {
        let stacked = tax_on_top(dec!(350000), dec!(50000), &sa_2025()).unwrap();

        // evaluate(400,000) - evaluate(350,000) = 86,507 - 72,032
        assert_eq!(stacked.without.tax, dec!(72032.00));
        assert_eq!(stacked.tax, dec!(14475.00));
        assert_eq!(stacked.average_rate, dec!(0.2895));
    }

    #[test]
    fn tax_on_top_of_nothing_added_is_zero() {
        let stacked = tax_on_top(dec!(350000), dec!(0), &sa_2025()).unwrap();

        assert_eq!(stacked.tax, dec!(0));
        assert_eq!(stacked.average_rate, dec!(0));
    }
}
