//! One runner per subcommand.
//!
//! Each runner borrows the rate book, builds the core input from the parsed
//! arguments, and returns a [`Report`] carrying both the text rows and the
//! serialized result.

use anyhow::{Context, Result, bail};
use fincalc_core::calculations::{
    CardPayoffInput, CgtCalculator, CgtInput, CompoundInput, CompoundInterestCalculator,
    CostCategory, CostItem, IncomePeriod, IncomeTaxCalculator, IncomeTaxInput, LeaveCalculator,
    LeaveInput, LoanCalculator, LoanInput, PayoffOutcome, PayoffSimulation, PayoutBasis,
    RetirementCalculator, RetirementInput, ServiceLength, UifCalculator, UifInput,
    plan_card_payoff, service_payout,
};
use fincalc_core::{BracketTable, RateBook, TableKind, TaxpayerClass, TaxpayerProfile};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::cli::{
    CardPayoffArgs, CgtArgs, Command, CompoundArgs, GratuityArgs, IncomeTaxArgs, LeaveArgs,
    LoanArgs, ProfileArgs, RetirementArgs, UifArgs,
};
use crate::format::{Report, format_percent, format_rand, format_rate};

/// Picks the requested year, or the latest one the book has.
pub fn resolve_year(
    book: &RateBook,
    requested: Option<i32>,
) -> Result<i32> {
    let available = book.years();
    match requested {
        Some(year) if available.contains(&year) => Ok(year),
        Some(year) => bail!(
            "no rates loaded for tax year {year} (available: {})",
            available
                .iter()
                .map(i32::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        None => book.latest_year().context("the rate book has no complete tax year"),
    }
}

pub fn run(
    command: &Command,
    book: &RateBook,
    year: i32,
) -> Result<Report> {
    debug!(year, ?command, "running command");
    match command {
        Command::IncomeTax(args) => income_tax(args, book, year),
        Command::Cgt(args) => cgt(args, book, year),
        Command::Loan(args) => loan(args, book, year),
        Command::CardPayoff(args) => card_payoff(args),
        Command::Compound(args) => compound(args, book, year),
        Command::Retirement(args) => retirement(args, book, year),
        Command::Uif(args) => uif(args, book, year),
        Command::Gratuity(args) => gratuity(args),
        Command::Leave(args) => leave(args, book, year),
        Command::Tables => tables(book, year),
    }
}

fn profile(args: &ProfileArgs) -> TaxpayerProfile {
    match args.class {
        TaxpayerClass::Individual => TaxpayerProfile::individual(args.age),
        TaxpayerClass::Company => TaxpayerProfile::company(),
        TaxpayerClass::Trust => TaxpayerProfile::trust(),
    }
}

// ─── income tax ──────────────────────────────────────────────────────────────

pub fn income_tax(
    args: &IncomeTaxArgs,
    book: &RateBook,
    year: i32,
) -> Result<Report> {
    let profile = profile(&args.profile);
    let table = book.income_table(profile.class, year)?;
    let rules = book.rules(year)?;
    let input = IncomeTaxInput {
        profile,
        gross_income: args.income,
        period: if args.monthly {
            IncomePeriod::Monthly
        } else {
            IncomePeriod::Annual
        },
        other_income: args.other_income,
        retirement_contributions: args.retirement_contributions,
        medical_members: args.medical_members,
        medical_months: args.medical_months,
    };

    let result = IncomeTaxCalculator::new(table, rules)
        .calculate(&input)
        .context("income tax calculation failed")?;

    let mut report = Report::new(format!("Income tax {year} ({})", profile.class.as_str()), &result)?
        .rand("Gross annual income", result.gross_annual_income)
        .rand("Retirement deduction", result.retirement_deduction)
        .rand("Taxable income", result.taxable_income)
        .rand("Tax before rebates", result.tax_before_rebates)
        .rand("Rebates", result.rebates)
        .rand("Medical credits", result.medical_credits)
        .rand("Tax payable", result.tax_payable)
        .rand("Monthly PAYE", result.monthly_paye)
        .row("Marginal rate", format_rate(result.marginal_rate))
        .row("Effective rate", format_rate(result.effective_rate))
        .rand("Net annual income", result.net_annual_income)
        .rand("Net monthly income", result.net_monthly_income);
    if let Some(threshold) = result.tax_threshold {
        report = report.rand("Tax threshold", threshold);
    }
    if result.below_threshold {
        report = report.note("income is below the tax threshold");
    }
    Ok(report)
}

// ─── capital gains ───────────────────────────────────────────────────────────

pub fn cgt(
    args: &CgtArgs,
    book: &RateBook,
    year: i32,
) -> Result<Report> {
    let profile = profile(&args.profile);
    let table = book.income_table(profile.class, year)?;
    let rules = book.rules(year)?;
    let input = CgtInput {
        profile,
        proceeds: args.proceeds,
        costs: vec![
            CostItem::new(CostCategory::BaseCost, args.base_cost),
            CostItem::new(CostCategory::Acquisition, args.acquisition_costs),
            CostItem::new(CostCategory::Improvement, args.improvements),
            CostItem::new(CostCategory::Disposal, args.disposal_costs),
        ],
        other_taxable_income: args.other_income,
        primary_residence: args.primary_residence,
        year_of_death: args.year_of_death,
    };

    let result = CgtCalculator::new(table, rules)
        .calculate(&input)
        .context("capital gains calculation failed")?;

    let mut report = Report::new(format!("Capital gains tax {year}"), &result)?
        .rand("Proceeds", result.proceeds)
        .rand("Total costs", result.total_costs)
        .rand(
            if result.is_loss { "Capital loss" } else { "Capital gain" },
            result.capital_gain,
        )
        .rand("Primary residence exclusion", result.primary_residence_exclusion)
        .rand("Annual exclusion", result.annual_exclusion)
        .rand("Net gain", result.net_gain)
        .row("Inclusion rate", format_rate(result.inclusion_rate))
        .rand("Taxable gain", result.taxable_gain)
        .rand("Tax without gain", result.tax_without_gain)
        .rand("Tax with gain", result.tax_with_gain)
        .rand("CGT payable", result.cgt_payable)
        .row("Marginal rate", format_rate(result.marginal_rate))
        .row("Effective rate on gain", format_rate(result.effective_rate))
        .rand("Net proceeds", result.net_proceeds);
    if result.is_loss {
        report = report.note("a capital loss attracts no tax");
    }
    Ok(report)
}

// ─── credit ──────────────────────────────────────────────────────────────────

pub fn loan(
    args: &LoanArgs,
    book: &RateBook,
    year: i32,
) -> Result<Report> {
    let rules = book.rules(year)?;
    let mut input = LoanInput::new(args.principal, args.rate, args.months);
    if let Some(kind) = args.credit_type {
        input = input.with_credit_type(kind);
    }

    let quote = LoanCalculator::new(&rules.credit)
        .calculate(&input)
        .context("loan calculation failed")?;

    let mut report = Report::new("Loan repayment", &quote)?
        .rand("Principal", args.principal)
        .row("Annual rate", format_percent(quote.applied_annual_percent));
    if let Some(cap) = quote.max_annual_percent {
        report = report.row("Maximum rate", format_percent(cap));
    }
    report = report
        .rand("Monthly payment", quote.monthly_payment)
        .rand("Initiation fee", quote.initiation_fee)
        .rand("Monthly service fee", quote.monthly_service_fee)
        .rand("Total interest", quote.total_interest)
        .rand("Total cost of credit", quote.total_cost_of_credit)
        .rand("Total repayable", quote.total_repayable);
    if quote.rate_capped {
        report = report.note(format!(
            "requested rate {} exceeds the legal maximum and was capped",
            format_percent(quote.requested_annual_percent)
        ));
    }

    if args.schedule {
        report = report
            .heading("Amortization")
            .table_row(["Month", "Payment", "Interest", "Principal", "Balance"]);
        for period in &quote.schedule.periods {
            report = report.table_row([
                period.number.to_string(),
                format_rand(period.payment),
                format_rand(period.interest_portion),
                format_rand(period.principal_portion),
                format_rand(period.balance),
            ]);
        }
    }
    Ok(report)
}

fn describe_payoff(
    report: Report,
    label: &str,
    simulation: &PayoffSimulation,
) -> Report {
    let report = report
        .heading(label)
        .rand("First payment", simulation.first_payment);
    match simulation.outcome {
        PayoffOutcome::Cleared => report
            .row("Months to clear", simulation.periods_taken.to_string())
            .rand("Total interest", simulation.total_interest)
            .rand("Total paid", simulation.total_paid),
        PayoffOutcome::NeverClears { reason } => report
            .rand("Balance after simulation", simulation.remaining_balance)
            .note(format!("the balance never clears: {reason}")),
    }
}

pub fn card_payoff(args: &CardPayoffArgs) -> Result<Report> {
    let plan = plan_card_payoff(&CardPayoffInput {
        balance: args.balance,
        annual_rate_percent: args.rate,
        minimum_percent: args.min_percent,
        minimum_floor: args.min_floor,
        fixed_payment: args.fixed,
    })
    .context("card payoff simulation failed")?;

    let mut report = Report::new("Credit card payoff", &plan)?
        .rand("Balance", args.balance)
        .row("Annual rate", format_percent(args.rate));
    report = describe_payoff(report, "Minimum payment", &plan.minimum);
    if let Some(fixed) = &plan.fixed {
        report = describe_payoff(report, "Fixed payment", fixed);
    }
    if let Some(savings) = plan.savings {
        report = report
            .heading("Fixed against minimum")
            .rand("Interest saved", savings.interest_saved)
            .row("Months saved", savings.periods_saved.to_string());
    }
    Ok(report)
}

// ─── savings and retirement ──────────────────────────────────────────────────

pub fn compound(
    args: &CompoundArgs,
    book: &RateBook,
    year: i32,
) -> Result<Report> {
    let profile = profile(&args.profile);
    let table = book.income_table(profile.class, year)?;
    let rules = book.rules(year)?;
    let input = CompoundInput {
        principal: args.principal,
        annual_rate_percent: args.rate,
        frequency: args.frequency,
        years: args.years,
        profile,
        other_taxable_income: args.other_income,
    };

    let result = CompoundInterestCalculator::new(table, rules)
        .calculate(&input)
        .context("compound interest calculation failed")?;

    Ok(Report::new(format!("Compound interest ({})", args.frequency), &result)?
        .rand("Principal", args.principal)
        .rand("Future value", result.future_value)
        .row("Effective annual rate", format_rate(result.effective_annual_rate))
        .rand("Gross interest", result.interest.gross_interest)
        .rand("Exemption applied", result.interest.exemption_applied)
        .rand("Taxable interest", result.interest.taxable_interest)
        .row("Marginal rate", format_rate(result.marginal_rate))
        .rand("Tax on interest", result.interest.tax)
        .rand("Net interest", result.interest.net_interest)
        .rand("Net future value", result.net_future_value))
}

pub fn retirement(
    args: &RetirementArgs,
    book: &RateBook,
    year: i32,
) -> Result<Report> {
    let table = book.table(TableKind::RetirementLumpSum, year)?;
    let rules = book.rules(year)?;
    let input = RetirementInput {
        current_age: args.age,
        retirement_age: args.retire_at,
        current_fund: args.fund,
        monthly_contribution: args.contribution,
        annual_return_percent: args.annual_return,
        annual_escalation_percent: args.escalation,
        lump_sum_percent: args.lump_sum,
    };

    let result = RetirementCalculator::new(table, &rules.retirement)
        .calculate(&input)
        .context("retirement projection failed")?;

    let mut report = Report::new("Retirement projection", &result)?
        .row("Years to retirement", result.years_to_retirement.to_string())
        .rand("Fund at retirement", result.fund_at_retirement)
        .rand("Total contributions", result.projection.total_contributions)
        .rand("Total growth", result.projection.total_growth)
        .rand("Maximum lump sum", result.max_lump_sum)
        .rand("Lump sum", result.lump_sum)
        .rand("Lump sum tax", result.lump_sum_tax)
        .rand("Net lump sum", result.net_lump_sum)
        .rand("Capital for annuity", result.annuity_capital);
    if result.lump_sum_capped {
        report = report.note(format!(
            "requested lump sum of {} was limited to the maximum",
            format_rand(result.requested_lump_sum)
        ));
    }
    if !result.projection.years.is_empty() {
        report = report
            .heading("Projection")
            .table_row(["Year", "Contribution", "Growth", "Balance"]);
        for snapshot in &result.projection.years {
            report = report.table_row([
                snapshot.year.to_string(),
                format_rand(snapshot.contributions),
                format_rand(snapshot.growth),
                format_rand(snapshot.closing_balance),
            ]);
        }
    }
    Ok(report)
}

// ─── employment benefits ─────────────────────────────────────────────────────

pub fn uif(
    args: &UifArgs,
    book: &RateBook,
    year: i32,
) -> Result<Report> {
    let rules = book.rules(year)?;
    let result = UifCalculator::new(&rules.uif)
        .context("invalid UIF rules")?
        .calculate(&UifInput {
            claim: args.claim,
            average_monthly_wage: args.wage,
            days_employed: args.days_employed,
        })
        .context("UIF calculation failed")?;

    Ok(Report::new(format!("UIF benefit ({})", args.claim.as_str()), &result)?
        .rand("Capped monthly wage", result.capped_monthly_wage)
        .rand("Daily wage", result.daily_wage)
        .row("Replacement rate", format_rate(result.replacement_rate))
        .rand("Daily benefit", result.daily_benefit)
        .row("Credit days", result.credit_days.to_string())
        .rand("Total benefit", result.total_benefit))
}

#[derive(Debug, Serialize)]
struct GratuityReport {
    monthly_salary: Decimal,
    service: ServiceLength,
    basis: PayoutBasis,
    payout: Decimal,
}

pub fn gratuity(args: &GratuityArgs) -> Result<Report> {
    let service = match (args.start, args.end) {
        (Some(start), Some(end)) => ServiceLength::between(start, end)?,
        _ => ServiceLength::new(args.years.unwrap_or(0), args.months),
    };
    let payout = service_payout(args.salary, service, args.basis).context("gratuity calculation failed")?;

    let summary = GratuityReport {
        monthly_salary: args.salary,
        service,
        basis: args.basis,
        payout,
    };
    Ok(Report::new("Gratuity", &summary)?
        .rand("Monthly salary", args.salary)
        .row("Service", service.to_string())
        .row("Basis", args.basis.to_string())
        .rand("Payout", payout))
}

pub fn leave(
    args: &LeaveArgs,
    book: &RateBook,
    year: i32,
) -> Result<Report> {
    let rules = book.rules(year)?;
    let result = LeaveCalculator::new(&rules.leave)
        .calculate(&LeaveInput {
            monthly_salary: args.salary,
            working_days_per_week: args.days_per_week,
            months_worked: args.months_worked,
            days_taken: args.days_taken,
        })
        .context("leave calculation failed")?;

    Ok(Report::new("Annual leave", &result)?
        .row("Annual entitlement (days)", result.annual_entitlement.to_string())
        .row("Accrued (days)", result.accrued_days.to_string())
        .row("Taken (days)", result.days_taken.to_string())
        .row("Outstanding (days)", result.outstanding_days.to_string())
        .rand("Daily rate", result.daily_rate)
        .rand("Payout", result.payout))
}

// ─── reference data ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TablesReport<'a> {
    tax_year: i32,
    tables: Vec<&'a BracketTable>,
}

pub fn tables(
    book: &RateBook,
    year: i32,
) -> Result<Report> {
    let tables: Vec<&BracketTable> = book.tables().filter(|t| t.tax_year() == year).collect();
    let rules = book.rules(year)?;

    let mut report = Report::new(
        format!("Tax year {year}"),
        &TablesReport {
            tax_year: year,
            tables: tables.clone(),
        },
    )?;
    for table in tables {
        report = report
            .heading(table.kind().to_string())
            .table_row(["From", "To", "Base tax", "Rate"]);
        for bracket in table.brackets() {
            report = report.table_row([
                format_rand(bracket.min),
                bracket.max.map_or_else(|| "and above".to_string(), format_rand),
                format_rand(bracket.base_tax),
                format_rate(bracket.rate),
            ]);
        }
    }

    Ok(report
        .heading("Rebates")
        .rand("Primary", rules.rebates.primary)
        .rand(format!("Secondary ({}+)", rules.rebates.secondary_age), rules.rebates.secondary)
        .rand(format!("Tertiary ({}+)", rules.rebates.tertiary_age), rules.rebates.tertiary)
        .heading("Capital gains")
        .rand("Annual exclusion", rules.cgt.annual_exclusion)
        .rand("Primary residence exclusion", rules.cgt.primary_residence_exclusion)
        .row("Individual inclusion rate", format_rate(rules.cgt.inclusion_rate_individual))
        .heading("Credit")
        .row("Repo rate", format_percent(rules.credit.repo_rate_percent)))
}
