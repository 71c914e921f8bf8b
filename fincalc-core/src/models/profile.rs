use serde::{Deserialize, Serialize};

use super::TableKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxpayerClass {
    Individual,
    Company,
    Trust,
}

impl TaxpayerClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Company => "company",
            Self::Trust => "trust",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "individual" => Some(Self::Individual),
            "company" => Some(Self::Company),
            "trust" => Some(Self::Trust),
            _ => None,
        }
    }

    /// The income-tax schedule this class is assessed on.
    pub fn table_kind(&self) -> TableKind {
        match self {
            Self::Individual => TableKind::Individual,
            Self::Company => TableKind::Company,
            Self::Trust => TableKind::Trust,
        }
    }
}

/// Who a calculation is for. Drives rebates, exclusions and inclusion rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerProfile {
    pub class: TaxpayerClass,
    pub age: Option<u32>,
}

impl TaxpayerProfile {
    pub fn individual(age: Option<u32>) -> Self {
        Self {
            class: TaxpayerClass::Individual,
            age,
        }
    }

    pub fn company() -> Self {
        Self {
            class: TaxpayerClass::Company,
            age: None,
        }
    }

    pub fn trust() -> Self {
        Self {
            class: TaxpayerClass::Trust,
            age: None,
        }
    }

    pub fn is_individual(&self) -> bool {
        self.class == TaxpayerClass::Individual
    }

    /// Age used for age-banded rules; unknown ages count as under 65.
    pub fn age_or_default(&self) -> u32 {
        self.age.unwrap_or(0)
    }
}
