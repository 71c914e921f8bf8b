mod bracket;
mod profile;
mod rate_book;
mod rules;

pub use bracket::{Bracket, BracketTable, TableKind};
pub use profile::{TaxpayerClass, TaxpayerProfile};
pub use rate_book::RateBook;
pub use rules::{
    CgtRules, CreditRules, CreditType, CreditTypeRules, InterestExemption, LeaveRules,
    MedicalCredits, RebateSchedule, ReplacementTier, RetirementRules, TaxThresholds, UifRules,
    YearRules,
};

#[cfg(test)]
pub(crate) mod test_support;
