use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;

use fincalc_core::{Bracket, BracketTable, CalcError, TableKind};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading reference data.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataLoadError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("could not read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("unknown bracket table '{0}'")]
    UnknownTable(String),

    #[error("rules for tax year {0} are defined more than once")]
    DuplicateYear(i32),

    #[error("tax year {year} has rules but no {kind} bracket table")]
    MissingTable { kind: TableKind, year: i32 },

    #[error("{kind} table for {year}: {source}")]
    Table {
        kind: TableKind,
        year: i32,
        source: CalcError,
    },

    #[error("tax year {year}: {source}")]
    Rules { year: i32, source: CalcError },
}

impl From<csv::Error> for DataLoadError {
    fn from(err: csv::Error) -> Self {
        DataLoadError::CsvParse(err.to_string())
    }
}

/// A single record from the bracket CSV file.
///
/// - `tax_year`: the year of assessment, named by the year it ends in
/// - `table`: `individual`, `company`, `trust` or `retirement_lump_sum`
/// - `min`: lower bound of the band
/// - `max`: upper bound of the band (empty for the open top band)
/// - `base_tax`: tax payable at exactly `min`
/// - `rate`: marginal rate as a fraction (e.g. 0.18 for 18%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub table: String,
    pub min: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket tables from CSV.
pub struct BracketLoader;

impl BracketLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, DataLoadError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group records by (tax_year, table) and build one validated
    /// [`BracketTable`] per group.
    ///
    /// Rows within a group may appear in any order; they are sorted by
    /// `min` before validation.
    pub fn build(records: &[BracketRecord]) -> Result<Vec<BracketTable>, DataLoadError> {
        let mut groups: BTreeMap<(i32, TableKind), Vec<Bracket>> = BTreeMap::new();

        for record in records {
            let kind = TableKind::parse(record.table.trim())
                .ok_or_else(|| DataLoadError::UnknownTable(record.table.clone()))?;
            groups
                .entry((record.tax_year, kind))
                .or_default()
                .push(Bracket {
                    min: record.min,
                    max: record.max,
                    rate: record.rate,
                    base_tax: record.base_tax,
                });
        }

        let mut tables = Vec::with_capacity(groups.len());
        for ((year, kind), mut brackets) in groups {
            brackets.sort_by(|a, b| a.min.cmp(&b.min));
            let count = brackets.len();
            let table = BracketTable::new(kind, year, brackets)
                .map_err(|source| DataLoadError::Table { kind, year, source })?;
            debug!(%kind, year, brackets = count, "bracket table loaded");
            tables.push(table);
        }

        Ok(tables)
    }
}
