use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use fincalc_core::calculations::{ClaimType, CompoundingFrequency, PayoutBasis};
use fincalc_core::{CreditType, TaxpayerClass};
use rust_decimal::Decimal;

use crate::input::{
    parse_amount, parse_basis, parse_claim, parse_class, parse_credit_type, parse_date,
    parse_frequency, parse_percent,
};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// South African tax and personal finance calculator.
///
/// Amounts accept a rand sign and space or comma thousands separators
/// (`R 1 234 567.89`). Rates are annual percentages.
#[derive(Debug, Parser)]
#[command(name = "fincalc", version)]
pub struct Cli {
    /// Tax year of assessment, named by the year it ends in (2025 = March
    /// 2024 to February 2025). Defaults to the latest loaded year.
    #[arg(long, global = true)]
    pub year: Option<i32>,

    /// Config file (defaults to `fincalc.toml` in the working directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory with `brackets.csv` and `rules.toml` replacing the embedded data.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Annual income tax and monthly PAYE.
    IncomeTax(IncomeTaxArgs),
    /// Capital gains tax on one disposal.
    Cgt(CgtArgs),
    /// Loan repayment, fees and amortization table.
    Loan(LoanArgs),
    /// Credit card payoff under a minimum payment, optionally against a fixed payment.
    CardPayoff(CardPayoffArgs),
    /// Compound growth with interest exemption and tax.
    Compound(CompoundArgs),
    /// Retirement fund projection and lump-sum tax.
    Retirement(RetirementArgs),
    /// Unemployment Insurance Fund benefit.
    Uif(UifArgs),
    /// Gratuity or severance by length of service.
    Gratuity(GratuityArgs),
    /// Annual leave accrual and payout.
    Leave(LeaveArgs),
    /// Bracket tables and rates for the selected year.
    Tables,
}

/// Who the calculation is for.
#[derive(Debug, Clone, Args)]
pub struct ProfileArgs {
    /// individual, company or trust.
    #[arg(long, default_value = "individual", value_parser = parse_class)]
    pub class: TaxpayerClass,

    /// Age at the end of the tax year (individuals only).
    #[arg(long)]
    pub age: Option<u32>,
}

#[derive(Debug, Args)]
pub struct IncomeTaxArgs {
    /// Gross income (annual unless --monthly).
    #[arg(long, value_parser = parse_amount)]
    pub income: Decimal,

    /// Treat --income as a monthly figure.
    #[arg(long)]
    pub monthly: bool,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Other annual taxable income.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub other_income: Decimal,

    /// Annual retirement fund contributions.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub retirement_contributions: Decimal,

    /// Medical scheme members, including the main member.
    #[arg(long, default_value_t = 0)]
    pub medical_members: u32,

    /// Months of medical cover in the year.
    #[arg(long, default_value_t = 12)]
    pub medical_months: u32,
}

#[derive(Debug, Args)]
pub struct CgtArgs {
    /// Selling price.
    #[arg(long, value_parser = parse_amount)]
    pub proceeds: Decimal,

    /// Purchase price.
    #[arg(long, value_parser = parse_amount)]
    pub base_cost: Decimal,

    /// Transfer duty, legal and other acquisition costs.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub acquisition_costs: Decimal,

    /// Capital improvements.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub improvements: Decimal,

    /// Agent's commission and other selling costs.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub disposal_costs: Decimal,

    /// Other taxable income for the year.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub other_income: Decimal,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// The asset was the primary residence.
    #[arg(long)]
    pub primary_residence: bool,

    /// The disposal happened in the year of death.
    #[arg(long)]
    pub year_of_death: bool,
}

#[derive(Debug, Args)]
pub struct LoanArgs {
    #[arg(long, value_parser = parse_amount)]
    pub principal: Decimal,

    /// Annual interest rate in percent.
    #[arg(long, value_parser = parse_percent)]
    pub rate: Decimal,

    /// Term in months.
    #[arg(long)]
    pub months: u32,

    /// Credit agreement type, applying its rate cap and fees.
    #[arg(long, value_parser = parse_credit_type)]
    pub credit_type: Option<CreditType>,

    /// Print the full amortization table.
    #[arg(long)]
    pub schedule: bool,
}

#[derive(Debug, Args)]
pub struct CardPayoffArgs {
    #[arg(long, value_parser = parse_amount)]
    pub balance: Decimal,

    /// Annual interest rate in percent.
    #[arg(long, value_parser = parse_percent)]
    pub rate: Decimal,

    /// Minimum payment as a percentage of the balance.
    #[arg(long, default_value = "3", value_parser = parse_percent)]
    pub min_percent: Decimal,

    /// Smallest minimum payment.
    #[arg(long, default_value = "50", value_parser = parse_amount)]
    pub min_floor: Decimal,

    /// Fixed monthly payment to compare against.
    #[arg(long, value_parser = parse_amount)]
    pub fixed: Option<Decimal>,
}

#[derive(Debug, Args)]
pub struct CompoundArgs {
    #[arg(long, value_parser = parse_amount)]
    pub principal: Decimal,

    /// Annual interest rate in percent.
    #[arg(long, value_parser = parse_percent)]
    pub rate: Decimal,

    /// Investment term in years; fractions allowed.
    #[arg(long, value_parser = parse_amount)]
    pub years: Decimal,

    /// annual, semi_annual, quarterly, monthly or daily.
    #[arg(long, default_value = "monthly", value_parser = parse_frequency)]
    pub frequency: CompoundingFrequency,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Other taxable income, used to find the marginal rate.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub other_income: Decimal,
}

#[derive(Debug, Args)]
pub struct RetirementArgs {
    #[arg(long)]
    pub age: u32,

    #[arg(long, default_value_t = 65)]
    pub retire_at: u32,

    /// Current fund value.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub fund: Decimal,

    /// Monthly contribution.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub contribution: Decimal,

    /// Expected annual return in percent.
    #[arg(long = "return", default_value = "8", value_parser = parse_percent)]
    pub annual_return: Decimal,

    /// Yearly contribution increase in percent.
    #[arg(long, default_value = "0", value_parser = parse_percent)]
    pub escalation: Decimal,

    /// Share of the fund to take in cash, in percent.
    #[arg(long, default_value = "33.33", value_parser = parse_percent)]
    pub lump_sum: Decimal,
}

#[derive(Debug, Args)]
pub struct UifArgs {
    /// Average monthly wage.
    #[arg(long, value_parser = parse_amount)]
    pub wage: Decimal,

    /// Days worked in the last four years.
    #[arg(long)]
    pub days_employed: u32,

    /// unemployment, illness or maternity.
    #[arg(long, default_value = "unemployment", value_parser = parse_claim)]
    pub claim: ClaimType,
}

#[derive(Debug, Args)]
pub struct GratuityArgs {
    /// Monthly salary.
    #[arg(long, value_parser = parse_amount)]
    pub salary: Decimal,

    /// Completed years of service.
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub years: Option<u32>,

    /// Completed months beyond --years.
    #[arg(long, default_value_t = 0, conflicts_with_all = ["start", "end"])]
    pub months: u32,

    /// Start of employment (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date, requires = "end")]
    pub start: Option<NaiveDate>,

    /// End of employment (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date, requires = "start")]
    pub end: Option<NaiveDate>,

    /// one_week, two_weeks, fifteen_days or one_month per year of service.
    #[arg(long, default_value = "one_week", value_parser = parse_basis)]
    pub basis: PayoutBasis,
}

#[derive(Debug, Args)]
pub struct LeaveArgs {
    /// Monthly salary.
    #[arg(long, value_parser = parse_amount)]
    pub salary: Decimal,

    /// Working days per week (5 or 6).
    #[arg(long, default_value_t = 5)]
    pub days_per_week: u32,

    /// Months worked in the current leave cycle.
    #[arg(long, default_value_t = 12)]
    pub months_worked: u32,

    /// Leave days already taken this cycle.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub days_taken: Decimal,
}
