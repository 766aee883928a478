use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::MortgageError;
use crate::loan::{LoanInput, PaymentFrequency};
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Level payment that fully amortises `principal` over `periods` at
/// `periodic_rate`: `P * r(1+r)^n / ((1+r)^n - 1)`. A zero rate degenerates
/// to straight-line principal `P / n`.
pub fn annuity_payment(principal: Money, periodic_rate: Rate, periods: u32) -> MortgageResult<Money> {
    if periods == 0 {
        return Err(MortgageError::invalid(
            "periods",
            "Number of periods must be > 0",
        ));
    }
    if periodic_rate < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "periodic_rate",
            "Periodic rate cannot be negative",
        ));
    }

    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let factor = (Decimal::ONE + periodic_rate).powu(u64::from(periods));
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        // Rate too small to register at 28 digits; same limit as r -> 0.
        return Ok(principal / Decimal::from(periods));
    }

    principal
        .checked_mul(periodic_rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| {
            MortgageError::invalid("principal", format!("Payment on {principal} overflows"))
        })
}

/// Nominal annual rate split evenly across the periods of one year.
pub fn periodic_rate(annual_rate: Rate, frequency: PaymentFrequency) -> Rate {
    annual_rate / Decimal::from(frequency.periods_per_year())
}

/// Level monthly payment on a 12-periods-per-year basis.
pub fn monthly_payment(input: &LoanInput) -> MortgageResult<Money> {
    annuity_payment(
        input.loan_amount,
        periodic_rate(input.interest_rate, PaymentFrequency::Monthly),
        input.loan_term_years * 12,
    )
}

/// Base payment due each period.
///
/// Biweekly loans pay half the monthly payment every two weeks rather than
/// a true 26-period annuity. The result is 13 monthly payments a year and
/// an early payoff; downstream biweekly figures all depend on this.
pub fn periodic_payment(input: &LoanInput) -> MortgageResult<Money> {
    let monthly = monthly_payment(input)?;
    Ok(match input.payment_frequency {
        PaymentFrequency::Monthly => monthly,
        PaymentFrequency::Biweekly => monthly / dec!(2),
    })
}
