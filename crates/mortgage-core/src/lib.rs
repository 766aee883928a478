//! Fixed-rate mortgage amortisation engine.
//!
//! Every public operation is a pure function of a [`LoanInput`]: the same
//! input always produces the same schedule and summary figures, so callers
//! may evaluate loans concurrently without coordination.

pub mod amortization;
pub mod balance;
pub mod error;
pub mod loan;
pub mod payment;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use amortization::{amortize, calculate_mortgage, generate_schedule, AmortizationEntry, LoanOutput};
pub use error::MortgageError;
pub use loan::{LoanInput, OneTimePayment, PaymentFrequency};
pub use types::*;

/// Standard result type for all mortgage engine operations
pub type MortgageResult<T> = Result<T, MortgageError>;
