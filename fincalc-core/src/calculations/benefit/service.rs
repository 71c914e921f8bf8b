//! Length of service and service-based payouts (gratuity, severance).

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{MONTHS_PER_YEAR, round_half_up};
use crate::calculations::validation;
use crate::error::CalcError;

const WEEKS_PER_YEAR: Decimal = Decimal::from_parts(52, 0, 0, false, 0);
/// Working days in a year on a five-day week.
const WORKING_DAYS_PER_YEAR: Decimal = Decimal::from_parts(260, 0, 0, false, 0);

/// Completed years and months of service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLength {
    pub years: u32,
    pub months: u32,
}

impl ServiceLength {
    /// Normalizes `months` of twelve or more into years.
    pub fn new(
        years: u32,
        months: u32,
    ) -> Self {
        Self {
            years: years.saturating_add(months / 12),
            months: months % 12,
        }
    }

    /// Whole months completed from `start` to `end`.
    ///
    /// # Errors
    ///
    /// [`CalcError::InvalidInput`] when `end` is before `start`.
    pub fn between(
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, CalcError> {
        if end < start {
            return Err(CalcError::invalid(
                "end_date",
                format!("{end} is before start date {start}"),
            ));
        }

        let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
        if end.day() < start.day() {
            months -= 1;
        }
        let months = u32::try_from(months.max(0)).unwrap_or(0);
        Ok(Self::new(0, months))
    }

    /// Service in fractional years (`years + months / 12`).
    pub fn as_years(&self) -> Decimal {
        Decimal::from(self.years) + Decimal::from(self.months) / MONTHS_PER_YEAR
    }
}

impl std::fmt::Display for ServiceLength {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{} years {} months", self.years, self.months)
    }
}

/// How much pay each year of service earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutBasis {
    /// The statutory severance minimum.
    OneWeekPerYear,
    TwoWeeksPerYear,
    FifteenDaysPerYear,
    OneMonthPerYear,
}

impl PayoutBasis {
    pub const ALL: [Self; 4] = [
        Self::OneWeekPerYear,
        Self::TwoWeeksPerYear,
        Self::FifteenDaysPerYear,
        Self::OneMonthPerYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneWeekPerYear => "one_week",
            Self::TwoWeeksPerYear => "two_weeks",
            Self::FifteenDaysPerYear => "fifteen_days",
            Self::OneMonthPerYear => "one_month",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|b| b.as_str() == normalized)
    }

    /// Pay earned per year of service for `monthly_salary`, unrounded.
    pub fn pay_per_year(
        &self,
        monthly_salary: Decimal,
    ) -> Decimal {
        let annual = monthly_salary * MONTHS_PER_YEAR;
        match self {
            Self::OneWeekPerYear => annual / WEEKS_PER_YEAR,
            Self::TwoWeeksPerYear => annual / WEEKS_PER_YEAR * Decimal::TWO,
            Self::FifteenDaysPerYear => annual / WORKING_DAYS_PER_YEAR * Decimal::from(15),
            Self::OneMonthPerYear => monthly_salary,
        }
    }
}

impl std::fmt::Display for PayoutBasis {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gratuity or severance for `service` at `monthly_salary`, pro rata for
/// part years.
///
/// ```
/// use rust_decimal_macros::dec;
/// use fincalc_core::calculations::benefit::{PayoutBasis, ServiceLength, service_payout};
///
/// let payout = service_payout(dec!(26000), ServiceLength::new(5, 6), PayoutBasis::OneWeekPerYear);
/// assert_eq!(payout.unwrap(), dec!(33000.00));
/// ```
pub fn service_payout(
    monthly_salary: Decimal,
    service: ServiceLength,
    basis: PayoutBasis,
) -> Result<Decimal, CalcError> {
    validation::non_negative("monthly_salary", monthly_salary)?;
    let payout = round_half_up(basis.pay_per_year(monthly_salary) * service.as_years());
    debug!(%monthly_salary, %service, basis = basis.as_str(), %payout, "service payout");
    Ok(payout)
}
