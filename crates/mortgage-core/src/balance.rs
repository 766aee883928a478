//! Outstanding principal as of today for a loan bought in the past.
//!
//! Replays only the contractual payment from the first period. Extra and lump
//! payments are prospective, so they never enter this figure.

use rust_decimal::Decimal;

use crate::amortization::BALANCE_EPSILON;
use crate::loan::LoanInput;
use crate::payment::{periodic_payment, periodic_rate};
use crate::types::Money;
use crate::MortgageResult;

/// Balance remaining after the periods elapsed between purchase and today.
///
/// Returns `None` when the purchase date is not in the past.
pub fn estimate_current_balance(input: &LoanInput) -> MortgageResult<Option<Money>> {
    input.validate()?;
    current_balance_unchecked(input)
}

/// Balance after `periods` contractual payments with nothing extra.
pub fn balance_after_periods(input: &LoanInput, periods: u32) -> MortgageResult<Money> {
    let payment = periodic_payment(input)?;
    let rate = periodic_rate(input.interest_rate, input.payment_frequency);

    let mut balance = input.loan_amount;
    for _ in 0..periods {
        let interest = balance * rate;
        let mut principal = payment - interest;
        if principal > balance {
            principal = balance;
        }
        balance -= principal;
        if balance <= BALANCE_EPSILON {
            return Ok(Decimal::ZERO);
        }
    }
    Ok(balance.max(Decimal::ZERO))
}

pub(crate) fn current_balance_unchecked(input: &LoanInput) -> MortgageResult<Option<Money>> {
    if input.as_of() <= input.purchase_date {
        return Ok(None);
    }
    let elapsed = input.elapsed_periods();
    let balance = balance_after_periods(input, elapsed)?;
    tracing::debug!(elapsed_periods = elapsed, balance = %balance, "current balance estimated");
    Ok(Some(balance))
}
