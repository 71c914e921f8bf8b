//! Reference data for the calculation engine.
//!
//! A data set is two files: `brackets.csv` with every bracket table and
//! `rules.toml` with the per-year constants. The published figures for
//! 2023 to 2026 are embedded in the binary; [`load_dir`] reads a replacement
//! set from disk.

mod loader;
mod rules;

use std::path::Path;
use std::sync::OnceLock;

use fincalc_core::{RateBook, TableKind};
use tracing::info;

pub use loader::{BracketLoader, BracketRecord, DataLoadError};
pub use rules::parse_rules;

pub const BRACKETS_FILE: &str = "brackets.csv";
pub const RULES_FILE: &str = "rules.toml";

const BUILTIN_BRACKETS: &str = include_str!("../data/brackets.csv");
const BUILTIN_RULES: &str = include_str!("../data/rules.toml");

/// Table kinds every year with rules must provide.
const REQUIRED_TABLES: [TableKind; 4] = [
    TableKind::Individual,
    TableKind::Company,
    TableKind::Trust,
    TableKind::RetirementLumpSum,
];

static BUILTIN: OnceLock<Result<RateBook, DataLoadError>> = OnceLock::new();

/// Builds a rate book from CSV and TOML text.
///
/// # Errors
///
/// Any parse or validation error, or [`DataLoadError::MissingTable`] when a
/// year has rules but lacks one of the required tables.
pub fn load_from_str(
    brackets_csv: &str,
    rules_toml: &str,
) -> Result<RateBook, DataLoadError> {
    let records = BracketLoader::parse(brackets_csv.as_bytes())?;
    let tables = BracketLoader::build(&records)?;
    let years = parse_rules(rules_toml)?;

    let mut book = RateBook::new();
    for table in tables {
        book.insert_table(table);
    }
    for rules in years {
        for kind in REQUIRED_TABLES {
            if book.table(kind, rules.tax_year).is_err() {
                return Err(DataLoadError::MissingTable {
                    kind,
                    year: rules.tax_year,
                });
            }
        }
        book.insert_rules(rules);
    }

    Ok(book)
}

/// Parses the embedded data set.
pub fn load_builtin() -> Result<RateBook, DataLoadError> {
    load_from_str(BUILTIN_BRACKETS, BUILTIN_RULES)
}

/// Reads `brackets.csv` and `rules.toml` from `dir`.
pub fn load_dir(dir: &Path) -> Result<RateBook, DataLoadError> {
    let read = |name: &str| {
        let path = dir.join(name);
        std::fs::read_to_string(&path).map_err(|e| DataLoadError::Io {
            message: e.to_string(),
            path,
        })
    };
    let book = load_from_str(&read(BRACKETS_FILE)?, &read(RULES_FILE)?)?;
    info!(dir = %dir.display(), years = ?book.years(), "loaded rate book");
    Ok(book)
}

/// The embedded rate book, parsed once per process.
pub fn builtin() -> Result<&'static RateBook, DataLoadError> {
    BUILTIN
        .get_or_init(load_builtin)
        .as_ref()
        .map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn builtin_covers_2023_to_2026() {
        let book = builtin().unwrap();

        assert_eq!(book.years(), vec![2023, 2024, 2025, 2026]);
        assert_eq!(book.latest_year(), Some(2026));
    }

    #[test]
    fn builtin_has_every_required_table() {
        let book = builtin().unwrap();

        for year in book.years() {
            for kind in REQUIRED_TABLES {
                assert!(book.table(kind, year).is_ok(), "missing {kind} {year}");
            }
        }
    }

    #[test]
    fn load_from_str_rejects_rules_without_tables() {
        let brackets = "tax_year,table,min,max,base_tax,rate\n2025,individual,0,,0,0.18\n";

        let err = load_from_str(brackets, BUILTIN_RULES).unwrap_err();

        assert!(matches!(err, DataLoadError::MissingTable { .. }));
    }

    #[test]
    fn load_dir_reports_missing_file() {
        let dir = std::env::temp_dir().join("fincalc-data-missing-dir-test");

        let err = load_dir(&dir).unwrap_err();

        let DataLoadError::Io { path, .. } = err else {
            panic!("expected Io error, got {err:?}");
        };
        assert!(path.ends_with(BRACKETS_FILE));
    }
}
