use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use mortgage_core::amortization;
use mortgage_core::balance;
use mortgage_core::payment;
use mortgage_core::scenarios::{self, ScenarioConfig, ScenarioInput};
use mortgage_core::{LoanInput, OneTimePayment, PaymentFrequency};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Monthly,
    Biweekly,
}

impl From<FrequencyArg> for PaymentFrequency {
    fn from(f: FrequencyArg) -> Self {
        match f {
            FrequencyArg::Monthly => PaymentFrequency::Monthly,
            FrequencyArg::Biweekly => PaymentFrequency::Biweekly,
        }
    }
}

/// Loan description shared by every mortgage command
#[derive(Args)]
pub struct LoanArgs {
    /// Principal borrowed
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Appraised home value
    #[arg(long)]
    pub home_value: Option<Decimal>,

    /// Down payment
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Nominal annual interest rate (e.g. 0.035 for 3.5%)
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Loan term in years (10, 15, 20, 25, 30 or 40)
    #[arg(long, default_value = "30")]
    pub term: u32,

    /// Payment frequency
    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,

    /// Recurring extra principal paid every period
    #[arg(long)]
    pub extra_payment: Option<Decimal>,

    /// Apply the extra payment only from today onward
    #[arg(long)]
    pub extra_starts_now: bool,

    /// One-time lump payment amount
    #[arg(long, requires = "one_time_date")]
    pub one_time_amount: Option<Decimal>,

    /// Date of the one-time payment (YYYY-MM-DD)
    #[arg(long, requires = "one_time_amount")]
    pub one_time_date: Option<NaiveDate>,

    /// Purchase date (YYYY-MM-DD)
    #[arg(long)]
    pub purchase_date: Option<NaiveDate>,

    /// Borrower's current age in years
    #[arg(long)]
    pub current_age: Option<u32>,

    /// Annual PMI rate (e.g. 0.005 for 0.5%)
    #[arg(long)]
    pub pmi_rate: Option<Decimal>,

    /// Valuation date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the extra-payment scenario sweep
#[derive(Args)]
pub struct ScenarioArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Comma-separated extra payment amounts (defaults from config)
    #[arg(long, value_delimiter = ',')]
    pub amounts: Vec<Decimal>,
}

pub fn run_amortize(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(args)?;
    let result = amortization::calculate_mortgage(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(args)?;
    let schedule = amortization::generate_schedule(&loan)?;
    if !schedule.converged {
        tracing::warn!("schedule is partial: iteration cap reached");
    }
    Ok(serde_json::to_value(schedule.entries)?)
}

pub fn run_current_balance(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(args)?;
    let current = balance::estimate_current_balance(&loan)?;
    Ok(json!({
        "current_balance": current,
        "elapsed_periods": loan.elapsed_periods(),
        "as_of_date": loan.as_of(),
    }))
}

pub fn run_payment(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(args)?;
    loan.validate()?;
    Ok(json!({
        "periodic_payment": payment::periodic_payment(&loan)?,
        "monthly_payment": payment::monthly_payment(&loan)?,
        "payment_frequency": loan.payment_frequency,
    }))
}

pub fn run_scenarios(
    args: ScenarioArgs,
    config_path: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config: ScenarioConfig = match config_path {
        Some(path) => input::file::read_json(path)?,
        None => ScenarioConfig::default(),
    };

    let mut scenario_input: ScenarioInput = if let Some(ref path) = args.loan.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScenarioInput {
            loan: loan_from_flags(&args.loan)?,
            extra_payment_amounts: Vec::new(),
        }
    };
    if !args.amounts.is_empty() {
        scenario_input.extra_payment_amounts = args.amounts;
    }
    fill_as_of(&mut scenario_input.loan);

    let result = scenarios::analyze_scenarios(&scenario_input, &config)?;
    Ok(serde_json::to_value(result)?)
}

fn resolve_loan(args: LoanArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    let mut loan: LoanInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        loan_from_flags(&args)?
    };
    fill_as_of(&mut loan);
    Ok(loan)
}

fn loan_from_flags(args: &LoanArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    let one_time_payment = match (args.one_time_amount, args.one_time_date) {
        (Some(amount), Some(date)) => Some(OneTimePayment { amount, date }),
        _ => None,
    };

    Ok(LoanInput {
        loan_amount: args
            .loan_amount
            .ok_or("--loan-amount is required (or provide --input)")?,
        home_value: args
            .home_value
            .ok_or("--home-value is required (or provide --input)")?,
        down_payment: args.down_payment.unwrap_or(Decimal::ZERO),
        interest_rate: args
            .interest_rate
            .ok_or("--interest-rate is required (or provide --input)")?,
        loan_term_years: args.term,
        payment_frequency: args.frequency.into(),
        extra_payment: args.extra_payment.unwrap_or(Decimal::ZERO),
        extra_payment_starts_now: args.extra_starts_now,
        one_time_payment,
        purchase_date: args
            .purchase_date
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        current_age: args.current_age,
        pmi_rate: args.pmi_rate.unwrap_or(Decimal::ZERO),
        as_of_date: args.as_of,
    })
}

/// The engine treats a missing valuation date as the purchase date; on the
/// command line "today" is the wall clock.
fn fill_as_of(loan: &mut LoanInput) {
    if loan.as_of_date.is_none() {
        loan.as_of_date = Some(chrono::Local::now().date_naive());
    }
}
