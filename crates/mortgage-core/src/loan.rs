//! Loan description: the immutable input record every engine stage reads.
//!
//! Holds the validation rules and the calendar arithmetic that turns dates
//! into period indices. Rates are decimals (0.035 = 3.5%).

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Loan terms (years) the engine accepts.
pub const SUPPORTED_LOAN_TERMS: [u32; 6] = [10, 15, 20, 25, 30, 40];

/// Upper bound on the nominal annual interest rate.
pub const MAX_INTEREST_RATE: Rate = dec!(0.30);

/// Upper bound on the annual PMI rate.
pub const MAX_PMI_RATE: Rate = dec!(0.05);

/// Largest home value accepted. Keeps every schedule product inside
/// `Decimal` range.
pub const MAX_HOME_VALUE: Money = dec!(10_000_000_000);

/// Largest loan, recurring extra or one-time payment accepted.
pub const MAX_LOAN_AMOUNT: Money = dec!(10_000_000_000);

/// Average Gregorian month length used to place dated payments on the
/// monthly grid. Calendar-exact month arithmetic would move lump payments
/// across period boundaries, so the average is fixed here.
pub const AVERAGE_DAYS_PER_MONTH: Decimal = dec!(30.44);

/// Length of one biweekly period in days.
pub const BIWEEKLY_PERIOD_DAYS: Decimal = dec!(14);

const MAX_BORROWER_AGE: u32 = 120;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How often the borrower pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Biweekly,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Biweekly => 26,
        }
    }

    /// Nominal length of one period in days.
    pub fn period_days(self) -> Decimal {
        match self {
            PaymentFrequency::Monthly => AVERAGE_DAYS_PER_MONTH,
            PaymentFrequency::Biweekly => BIWEEKLY_PERIOD_DAYS,
        }
    }

    /// Month-equivalent of a period index: `ceil(period * 12 / 26)` for
    /// biweekly, identity for monthly.
    pub fn display_month(self, period: u32) -> u32 {
        match self {
            PaymentFrequency::Monthly => period,
            PaymentFrequency::Biweekly => (period * 12).div_ceil(26),
        }
    }

    /// Convert a whole number of elapsed months into elapsed periods.
    pub fn periods_from_months(self, months: u32) -> u32 {
        match self {
            PaymentFrequency::Monthly => months,
            PaymentFrequency::Biweekly => months * 26 / 12,
        }
    }
}

/// A single lump-sum principal payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneTimePayment {
    pub amount: Money,
    pub date: NaiveDate,
}

/// Loan description consumed by every engine stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    /// Principal borrowed.
    pub loan_amount: Money,
    /// Appraised value of the home, the LTV denominator.
    pub home_value: Money,
    pub down_payment: Money,
    /// Nominal annual interest rate (e.g. 0.035 = 3.5%).
    pub interest_rate: Rate,
    pub loan_term_years: u32,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    /// Recurring additional principal paid every period.
    #[serde(default)]
    pub extra_payment: Money,
    /// Apply the extra payment only to periods after today rather than from
    /// the first period.
    #[serde(default)]
    pub extra_payment_starts_now: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time_payment: Option<OneTimePayment>,
    pub purchase_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_age: Option<u32>,
    /// Annual PMI rate charged on the original loan amount.
    #[serde(default)]
    pub pmi_rate: Rate,
    /// "Today". When absent the purchase date is used, so no periods have
    /// elapsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<NaiveDate>,
}

impl LoanInput {
    /// Reject malformed or out-of-domain fields before any simulation runs.
    pub fn validate(&self) -> MortgageResult<()> {
        if self.home_value <= Decimal::ZERO {
            return Err(MortgageError::invalid(
                "home_value",
                "Home value must be positive",
            ));
        }
        if self.home_value > MAX_HOME_VALUE {
            return Err(MortgageError::invalid(
                "home_value",
                format!("Home value cannot exceed {MAX_HOME_VALUE}"),
            ));
        }
        if self.down_payment < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "down_payment",
                "Down payment cannot be negative",
            ));
        }
        if self.down_payment >= self.home_value {
            return Err(MortgageError::invalid(
                "down_payment",
                "Down payment must be less than the home value",
            ));
        }
        if self.loan_amount < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "loan_amount",
                "Loan amount cannot be negative",
            ));
        }
        if self.loan_amount > MAX_LOAN_AMOUNT {
            return Err(MortgageError::invalid(
                "loan_amount",
                format!("Loan amount cannot exceed {MAX_LOAN_AMOUNT}"),
            ));
        }
        if self.loan_amount > self.home_value - self.down_payment {
            return Err(MortgageError::invalid(
                "loan_amount",
                format!(
                    "Loan amount {} exceeds home value minus down payment ({})",
                    self.loan_amount,
                    self.home_value - self.down_payment
                ),
            ));
        }
        if self.interest_rate < Decimal::ZERO || self.interest_rate > MAX_INTEREST_RATE {
            return Err(MortgageError::invalid(
                "interest_rate",
                format!("Interest rate must be between 0 and {MAX_INTEREST_RATE}"),
            ));
        }
        if !SUPPORTED_LOAN_TERMS.contains(&self.loan_term_years) {
            return Err(MortgageError::invalid(
                "loan_term_years",
                format!(
                    "Unsupported loan term {}; expected one of {:?}",
                    self.loan_term_years, SUPPORTED_LOAN_TERMS
                ),
            ));
        }
        if self.extra_payment < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "extra_payment",
                "Extra payment cannot be negative",
            ));
        }
        if self.extra_payment > MAX_LOAN_AMOUNT {
            return Err(MortgageError::invalid(
                "extra_payment",
                format!("Extra payment cannot exceed {MAX_LOAN_AMOUNT}"),
            ));
        }
        if self.pmi_rate < Decimal::ZERO || self.pmi_rate > MAX_PMI_RATE {
            return Err(MortgageError::invalid(
                "pmi_rate",
                format!("PMI rate must be between 0 and {MAX_PMI_RATE}"),
            ));
        }
        if let Some(age) = self.current_age {
            if age == 0 || age > MAX_BORROWER_AGE {
                return Err(MortgageError::invalid(
                    "current_age",
                    format!("Current age must be between 1 and {MAX_BORROWER_AGE}"),
                ));
            }
        }

        let maturity = self.maturity_date()?;
        if self.as_of() >= maturity {
            return Err(MortgageError::invalid(
                "purchase_date",
                format!("Loan purchased on {} has already matured", self.purchase_date),
            ));
        }

        if let Some(otp) = &self.one_time_payment {
            if otp.amount <= Decimal::ZERO {
                return Err(MortgageError::invalid(
                    "one_time_payment.amount",
                    "One-time payment must be positive",
                ));
            }
            if otp.amount > MAX_LOAN_AMOUNT {
                return Err(MortgageError::invalid(
                    "one_time_payment.amount",
                    format!("One-time payment cannot exceed {MAX_LOAN_AMOUNT}"),
                ));
            }
            if otp.date < self.purchase_date {
                return Err(MortgageError::invalid(
                    "one_time_payment.date",
                    "One-time payment date cannot precede the purchase date",
                ));
            }
            if otp.date > maturity {
                return Err(MortgageError::invalid(
                    "one_time_payment.date",
                    format!("One-time payment date is after loan maturity ({maturity})"),
                ));
            }
        }

        Ok(())
    }

    /// Effective "today".
    pub fn as_of(&self) -> NaiveDate {
        self.as_of_date.unwrap_or(self.purchase_date)
    }

    /// Contractual number of periods for the chosen frequency.
    pub fn total_periods(&self) -> u32 {
        self.loan_term_years * self.payment_frequency.periods_per_year()
    }

    /// Scheduled final payment date with no extra payments.
    pub fn maturity_date(&self) -> MortgageResult<NaiveDate> {
        add_months(self.purchase_date, self.loan_term_years * 12)
    }

    /// Whole calendar months between purchase and today.
    pub fn months_elapsed(&self) -> u32 {
        months_between(self.purchase_date, self.as_of())
    }

    /// Periods already paid as of today.
    pub fn elapsed_periods(&self) -> u32 {
        self.payment_frequency
            .periods_from_months(self.months_elapsed())
    }

    /// Period in which the lump payment lands: days since purchase divided
    /// by the period length, floored. A payment on the purchase date itself
    /// lands in the first period.
    pub fn one_time_period(&self) -> Option<u32> {
        self.one_time_payment.as_ref().map(|otp| {
            let days = (otp.date - self.purchase_date).num_days().max(0);
            let index = (Decimal::from(days) / self.payment_frequency.period_days())
                .floor()
                .to_u32()
                .unwrap_or(0);
            index.max(1)
        })
    }

    /// Copy of this loan with a different recurring extra payment.
    pub fn with_extra_payment(&self, extra_payment: Money) -> LoanInput {
        LoanInput {
            extra_payment,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Date helpers
// ---------------------------------------------------------------------------

/// Whole calendar months from `start` to `end`; zero when `end` is not after
/// `start`.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

pub fn add_months(date: NaiveDate, months: u32) -> MortgageResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| MortgageError::DateError(format!("{date} + {months} months is out of range")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
