use std::collections::{BTreeMap, BTreeSet};

use crate::error::CalcError;

use super::{BracketTable, TableKind, TaxpayerClass, YearRules};

/// Read-only reference data for every configured tax year.
///
/// Tables are keyed by `(kind, year)` and rules by year. Older years stay
/// available so historical calculations reproduce exactly.
#[derive(Debug, Clone, Default)]
pub struct RateBook {
    tables: BTreeMap<(TableKind, i32), BracketTable>,
    rules: BTreeMap<i32, YearRules>,
}

impl RateBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing any existing one for the same kind and year.
    pub fn insert_table(
        &mut self,
        table: BracketTable,
    ) {
        self.tables.insert((table.kind(), table.tax_year()), table);
    }

    /// Adds the rules for a year, replacing any existing ones.
    pub fn insert_rules(
        &mut self,
        rules: YearRules,
    ) {
        self.rules.insert(rules.tax_year, rules);
    }

    pub fn table(
        &self,
        kind: TableKind,
        year: i32,
    ) -> Result<&BracketTable, CalcError> {
        self.tables
            .get(&(kind, year))
            .ok_or(CalcError::TableNotFound { kind, year })
    }

    /// The income-tax table a taxpayer class is assessed on.
    pub fn income_table(
        &self,
        class: TaxpayerClass,
        year: i32,
    ) -> Result<&BracketTable, CalcError> {
        self.table(class.table_kind(), year)
    }

    pub fn rules(
        &self,
        year: i32,
    ) -> Result<&YearRules, CalcError> {
        self.rules.get(&year).ok_or(CalcError::RulesNotFound(year))
    }

    /// Years that have both rules and an individual table, ascending.
    pub fn years(&self) -> Vec<i32> {
        let with_tables: BTreeSet<i32> = self
            .tables
            .keys()
            .filter(|(kind, _)| *kind == TableKind::Individual)
            .map(|(_, year)| *year)
            .collect();
        self.rules
            .keys()
            .copied()
            .filter(|year| with_tables.contains(year))
            .collect()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.years().last().copied()
    }

    pub fn tables(&self) -> impl Iterator<Item = &BracketTable> {
        self.tables.values()
    }
}
