//! Extra-payment scenario sweep.
//!
//! Runs the full amortisation once per candidate extra payment and reports
//! the months and interest saved against the same loan with no recurring
//! extra payment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use chrono::NaiveDate;

use crate::amortization::{build_schedule, Schedule};
use crate::error::MortgageError;
use crate::loan::{add_months, LoanInput};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::MortgageResult;

/// Sweep limits and defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Amounts used when the caller supplies none.
    pub default_amounts: Vec<Money>,
    /// Largest number of scenarios evaluated in one call.
    pub max_scenarios: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            default_amounts: vec![dec!(50), dec!(100), dec!(200), dec!(500)],
            max_scenarios: 10,
        }
    }
}

/// Input for the enveloped sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub loan: LoanInput,
    /// Candidate recurring extra payments; empty means the configured
    /// defaults.
    #[serde(default)]
    pub extra_payment_amounts: Vec<Money>,
}

/// Outcome of one candidate extra payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub extra_payment: Money,
    pub payoff_months: u32,
    pub payoff_date: NaiveDate,
    pub total_interest: Money,
    pub months_saved: u32,
    pub interest_saved: Money,
    pub converged: bool,
}

/// Compare each candidate extra payment with the zero-extra baseline.
/// Results come back in the order the amounts were supplied.
pub fn compare_scenarios(
    input: &LoanInput,
    extra_payment_amounts: &[Money],
    config: &ScenarioConfig,
) -> MortgageResult<Vec<ScenarioComparison>> {
    input.validate()?;

    let amounts = if extra_payment_amounts.is_empty() {
        config.default_amounts.as_slice()
    } else {
        extra_payment_amounts
    };
    validate_amounts(amounts, config)?;

    let baseline = build_schedule(&input.with_extra_payment(Decimal::ZERO))?;

    let mut comparisons = Vec::with_capacity(amounts.len());
    for &amount in amounts {
        let scenario = if amount.is_zero() {
            baseline.clone()
        } else {
            build_schedule(&input.with_extra_payment(amount))?
        };
        comparisons.push(compare(input, amount, &baseline, &scenario)?);
    }

    tracing::debug!(scenarios = comparisons.len(), "extra-payment scenarios compared");
    Ok(comparisons)
}

/// `compare_scenarios` inside the standard metadata envelope.
pub fn analyze_scenarios(
    input: &ScenarioInput,
    config: &ScenarioConfig,
) -> MortgageResult<ComputationOutput<Vec<ScenarioComparison>>> {
    let start = Instant::now();
    let comparisons = compare_scenarios(&input.loan, &input.extra_payment_amounts, config)?;

    let warnings: Vec<String> = comparisons
        .iter()
        .filter(|c| !c.converged)
        .map(|c| {
            format!(
                "Scenario with extra payment {} did not converge; figures are partial",
                c.extra_payment
            )
        })
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Extra-Payment Scenario Comparison",
        input,
        warnings,
        elapsed,
        comparisons,
    ))
}

fn validate_amounts(amounts: &[Money], config: &ScenarioConfig) -> MortgageResult<()> {
    if amounts.len() > config.max_scenarios {
        return Err(MortgageError::invalid(
            "extra_payment_amounts",
            format!(
                "{} scenarios requested; at most {} allowed",
                amounts.len(),
                config.max_scenarios
            ),
        ));
    }
    if let Some(amount) = amounts.iter().find(|a| **a < Decimal::ZERO) {
        return Err(MortgageError::invalid(
            "extra_payment_amounts",
            format!("Extra payment {amount} cannot be negative"),
        ));
    }
    Ok(())
}

fn compare(
    input: &LoanInput,
    amount: Money,
    baseline: &Schedule,
    scenario: &Schedule,
) -> MortgageResult<ScenarioComparison> {
    Ok(ScenarioComparison {
        extra_payment: amount,
        payoff_months: scenario.payoff_months,
        payoff_date: add_months(input.purchase_date, scenario.payoff_months)?,
        total_interest: scenario.total_interest,
        months_saved: baseline.payoff_months.saturating_sub(scenario.payoff_months),
        interest_saved: baseline.total_interest - scenario.total_interest,
        converged: scenario.converged,
    })
}
