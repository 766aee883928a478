use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Serialize;

use mortgage_core::scenarios::{ScenarioConfig, ScenarioInput};
use mortgage_core::LoanInput;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse a loan, defaulting the valuation date to the host's local date.
fn parse_loan(input_json: &str) -> NapiResult<LoanInput> {
    let mut loan: LoanInput = serde_json::from_str(input_json).map_err(to_napi_error)?;
    if loan.as_of_date.is_none() {
        loan.as_of_date = Some(chrono::Local::now().date_naive());
    }
    Ok(loan)
}

#[derive(Serialize)]
struct CurrentBalance {
    current_balance: Option<Decimal>,
    elapsed_periods: u32,
    as_of_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_mortgage(input_json: String) -> NapiResult<String> {
    let loan = parse_loan(&input_json)?;
    let output =
        mortgage_core::amortization::calculate_mortgage(&loan).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let loan = parse_loan(&input_json)?;
    let schedule =
        mortgage_core::amortization::generate_schedule(&loan).map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

#[napi]
pub fn current_balance(input_json: String) -> NapiResult<String> {
    let loan = parse_loan(&input_json)?;
    let balance =
        mortgage_core::balance::estimate_current_balance(&loan).map_err(to_napi_error)?;
    let out = CurrentBalance {
        current_balance: balance,
        elapsed_periods: loan.elapsed_periods(),
        as_of_date: loan.as_of(),
    };
    serde_json::to_string(&out).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_scenarios(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let mut input: ScenarioInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    if input.loan.as_of_date.is_none() {
        input.loan.as_of_date = Some(chrono::Local::now().date_naive());
    }
    let config: ScenarioConfig = match config_json {
        Some(json) => serde_json::from_str(&json).map_err(to_napi_error)?,
        None => ScenarioConfig::default(),
    };
    let output =
        mortgage_core::scenarios::analyze_scenarios(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
