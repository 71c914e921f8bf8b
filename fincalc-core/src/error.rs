use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::TableKind;

/// Why a payoff simulation stopped without clearing the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NonConvergenceReason {
    /// The payment in some period did not exceed the interest accrued in it,
    /// so the balance can never shrink.
    PaymentBelowInterest,

    /// The balance was still outstanding after the maximum number of periods.
    IterationCeiling,
}

impl std::fmt::Display for NonConvergenceReason {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::PaymentBelowInterest => write!(f, "payment below accruing interest"),
            Self::IterationCeiling => write!(f, "iteration ceiling reached"),
        }
    }
}

/// Errors returned by the calculation engine.
///
/// Every variant is recoverable at the call site: reject the request and
/// re-prompt for input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalcError {
    /// A request field is outside its declared domain.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    /// A payoff simulation never clears the balance.
    #[error("this payment will never clear the balance ({reason} after {periods} periods)")]
    NonConvergence {
        periods: u32,
        reason: NonConvergenceReason,
    },

    /// A bracket table was built without any brackets.
    #[error("no tax brackets provided")]
    EmptyTable,

    /// No bracket covers the given amount.
    #[error("no tax bracket found for taxable amount {0}")]
    NoMatchingBracket(Decimal),

    /// A bracket table violates its ordering or base-tax invariants.
    #[error("invalid bracket table: {0}")]
    InvalidTable(String),

    /// The rate book has no table for the requested kind and year.
    #[error("no {kind} bracket table for tax year {year}")]
    TableNotFound { kind: TableKind, year: i32 },

    /// The rate book has no rules for the requested year.
    #[error("no rules configured for tax year {0}")]
    RulesNotFound(i32),

    /// An intermediate value exceeded decimal range.
    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),
}

impl CalcError {
    pub(crate) fn invalid(
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
