//! Fixed-rate amortisation schedule with PMI, recurring extra payments and a
//! one-time lump payment.
//!
//! `generate_schedule` runs the period loop; `amortize` derives every summary
//! figure from one loop run (plus the extra-free comparison run) and returns
//! them together; `calculate_mortgage` adds the metadata envelope.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use chrono::NaiveDate;

use crate::balance;
use crate::loan::{add_months, LoanInput, PaymentFrequency};
use crate::payment::{monthly_payment, periodic_payment, periodic_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Years};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Balance at or below which the loan is considered repaid.
pub const BALANCE_EPSILON: Decimal = dec!(0.01);

/// Periods allowed past the contractual term before the loop gives up.
pub const ITERATION_HEADROOM: u32 = 120;

/// PMI is charged while balance / home value exceeds this.
pub const PMI_LTV_THRESHOLD: Rate = dec!(0.80);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One payment period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// 1-based period index in the loan's own frequency.
    pub period: u32,
    /// Month-equivalent of `period` for display.
    pub month: u32,
    /// Principal plus interest paid this period (PMI excluded).
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub pmi: Money,
    /// Balance after this period's payment, never negative.
    pub balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// Result of one run of the period loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub frequency: PaymentFrequency,
    pub periodic_payment: Money,
    pub entries: Vec<AmortizationEntry>,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_pmi: Money,
    pub payoff_periods: u32,
    pub payoff_months: u32,
    /// Months during which PMI was charged.
    pub pmi_months: u32,
    /// Whether the lump payment landed before payoff.
    pub one_time_applied: bool,
    /// False when the iteration cap stopped the loop with balance left.
    pub converged: bool,
}

/// Full calculation result for one loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOutput {
    /// Base payment due each period (half the monthly payment for biweekly).
    pub periodic_payment: Money,
    pub monthly_payment: Money,
    pub total_principal: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub payoff_periods: u32,
    pub payoff_months: u32,
    pub payoff_date: NaiveDate,
    /// `current_age` plus the months from today to the simulated payoff.
    /// Prepayments from the purchase date can retire the schedule before
    /// today, which puts this below `current_age` while `current_balance`
    /// still follows the base payments only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_at_payoff: Option<Years>,
    pub total_pmi: Money,
    pub pmi_months: u32,
    pub elapsed_periods: u32,
    /// Outstanding principal today; present only for loans bought in the past.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_balance: Option<Money>,
    /// Interest and term of the same loan with no extra or lump payments.
    pub standard_total_interest: Money,
    pub standard_payoff_months: u32,
    pub interest_saved: Money,
    pub months_saved: u32,
    pub converged: bool,
    pub schedule: Vec<AmortizationEntry>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate the loan and run the full calculation inside the standard
/// metadata envelope.
pub fn calculate_mortgage(input: &LoanInput) -> MortgageResult<ComputationOutput<LoanOutput>> {
    let start = Instant::now();
    let (output, warnings) = compute_loan(input)?;
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Mortgage Amortization",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Validate the loan and derive every summary figure. Pure: the same input
/// always yields an identical output.
pub fn amortize(input: &LoanInput) -> MortgageResult<LoanOutput> {
    compute_loan(input).map(|(output, _)| output)
}

/// Validate the loan and run the period loop once.
pub fn generate_schedule(input: &LoanInput) -> MortgageResult<Schedule> {
    input.validate()?;
    build_schedule(input)
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

fn compute_loan(input: &LoanInput) -> MortgageResult<(LoanOutput, Vec<String>)> {
    input.validate()?;
    let mut warnings: Vec<String> = Vec::new();

    let schedule = build_schedule(input)?;

    let has_prepayments = input.extra_payment > Decimal::ZERO || input.one_time_payment.is_some();
    let (standard_total_interest, standard_payoff_months) = if has_prepayments {
        let standard_input = LoanInput {
            extra_payment: Decimal::ZERO,
            one_time_payment: None,
            ..input.clone()
        };
        let standard = build_schedule(&standard_input)?;
        (standard.total_interest, standard.payoff_months)
    } else {
        (schedule.total_interest, schedule.payoff_months)
    };

    let current_balance = balance::current_balance_unchecked(input)?;
    let months_elapsed = input.months_elapsed();
    let payoff_date = add_months(input.purchase_date, schedule.payoff_months)?;
    let age_at_payoff = input.current_age.map(|age| {
        let remaining_months = i64::from(schedule.payoff_months) - i64::from(months_elapsed);
        (Decimal::from(age) + Decimal::from(remaining_months) / dec!(12)).round_dp(1)
    });

    if !schedule.converged {
        warnings.push(format!(
            "Schedule did not reach zero balance within {} periods; results are partial",
            input.total_periods() + ITERATION_HEADROOM
        ));
    }
    if input.payment_frequency == PaymentFrequency::Biweekly {
        warnings.push(
            "Biweekly payment is half the monthly payment, not a 26-period annuity".into(),
        );
    }
    if input.pmi_rate > Decimal::ZERO && schedule.total_pmi.is_zero() {
        warnings.push(format!(
            "PMI rate supplied but initial LTV is at or below {}%; no PMI charged",
            PMI_LTV_THRESHOLD * dec!(100)
        ));
    }
    if input.one_time_payment.is_some() && !schedule.one_time_applied {
        warnings.push("One-time payment falls after payoff and was not applied".into());
    }

    let total_payment = schedule.total_principal + schedule.total_interest;

    let output = LoanOutput {
        periodic_payment: schedule.periodic_payment,
        monthly_payment: monthly_payment(input)?,
        total_principal: schedule.total_principal,
        total_payment,
        total_interest: schedule.total_interest,
        payoff_periods: schedule.payoff_periods,
        payoff_months: schedule.payoff_months,
        payoff_date,
        age_at_payoff,
        total_pmi: schedule.total_pmi,
        pmi_months: schedule.pmi_months,
        elapsed_periods: input.elapsed_periods(),
        current_balance,
        standard_total_interest,
        standard_payoff_months,
        interest_saved: standard_total_interest - schedule.total_interest,
        months_saved: standard_payoff_months.saturating_sub(schedule.payoff_months),
        converged: schedule.converged,
        schedule: schedule.entries,
    };

    Ok((output, warnings))
}

/// The period loop. Assumes a validated input.
pub(crate) fn build_schedule(input: &LoanInput) -> MortgageResult<Schedule> {
    build_schedule_capped(input, input.total_periods() + ITERATION_HEADROOM)
}

/// Run at most `max_periods` periods; `converged` is false when balance is
/// left at the cap.
fn build_schedule_capped(input: &LoanInput, max_periods: u32) -> MortgageResult<Schedule> {
    let frequency = input.payment_frequency;
    let payment = periodic_payment(input)?;
    let rate = periodic_rate(input.interest_rate, frequency);
    let elapsed_periods = input.elapsed_periods();
    let one_time_period = input.one_time_period();
    let one_time_amount = input
        .one_time_payment
        .as_ref()
        .map(|otp| otp.amount)
        .unwrap_or(Decimal::ZERO);
    let period_pmi = input.loan_amount * input.pmi_rate / dec!(12);

    let mut entries = Vec::with_capacity(input.total_periods() as usize);
    let mut balance = input.loan_amount;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut total_pmi = Decimal::ZERO;
    let mut last_pmi_period = 0u32;
    let mut one_time_applied = false;
    let mut period = 0u32;

    while balance > BALANCE_EPSILON && period < max_periods {
        period += 1;

        let interest = balance * rate;
        let mut principal = payment - interest;

        if input.extra_payment > Decimal::ZERO
            && (!input.extra_payment_starts_now || period > elapsed_periods)
        {
            principal += input.extra_payment;
        }

        if one_time_period == Some(period) {
            principal += one_time_amount;
            one_time_applied = true;
        }

        if principal > balance {
            principal = balance;
        }
        if principal < Decimal::ZERO {
            principal = Decimal::ZERO;
        }

        // LTV is measured before this period's principal comes off.
        let pmi = if balance / input.home_value > PMI_LTV_THRESHOLD {
            last_pmi_period = period;
            period_pmi
        } else {
            Decimal::ZERO
        };

        balance -= principal;
        if balance <= BALANCE_EPSILON {
            // Sub-cent residue is paid off with the final instalment.
            principal += balance;
            balance = Decimal::ZERO;
        }

        total_interest += interest;
        total_principal += principal;
        total_pmi += pmi;

        entries.push(AmortizationEntry {
            period,
            month: frequency.display_month(period),
            payment: principal + interest,
            principal,
            interest,
            pmi,
            balance,
            cumulative_interest: total_interest,
            cumulative_principal: total_principal,
        });
    }

    let converged = balance <= BALANCE_EPSILON;
    if !converged {
        tracing::warn!(
            periods = period,
            remaining_balance = %balance,
            "amortization hit the iteration cap before payoff"
        );
    }

    let payoff_periods = entries.len() as u32;
    tracing::debug!(
        payoff_periods,
        frequency = ?frequency,
        total_interest = %total_interest,
        "amortization schedule generated"
    );

    Ok(Schedule {
        frequency,
        periodic_payment: payment,
        entries,
        total_interest,
        total_principal,
        total_pmi,
        payoff_periods,
        payoff_months: frequency.display_month(payoff_periods),
        pmi_months: frequency.display_month(last_pmi_period),
        one_time_applied,
        converged,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
