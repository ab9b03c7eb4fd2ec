/// Domain error type
///
/// Every value object and aggregate in [`crate::domain`] reports invariant
/// violations through [`DomainError`]. The HTTP layer maps these onto 4xx
/// responses; nothing here knows about transport.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Invariant violation raised by a value object or aggregate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Amount below zero where only non-negative values are allowed
    #[error("Amount must not be negative, got {0}")]
    NegativeAmount(Decimal),

    /// Amount that must be strictly positive (salaries, gross pay)
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount above what a money column can hold, or arithmetic that overflowed
    #[error("Amount must not exceed 9999999999.99")]
    AmountOutOfRange,

    /// Currency code outside the supported whitelist
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Arithmetic between two different currencies
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// Multiplication factor or percentage below zero
    #[error("Factor must not be negative, got {0}")]
    InvalidFactor(Decimal),

    /// Deductions total is larger than the gross amount
    #[error("Deductions ({deductions}) exceed gross salary ({gross})")]
    DeductionsExceedGross { gross: Decimal, deductions: Decimal },

    /// End date not after (or, for vacations, before) the start date
    #[error("Invalid date range: {start} to {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Date range longer than the allowed maximum
    #[error("Period of {days} days exceeds the maximum of {max} days")]
    PeriodTooLong { days: i64, max: i64 },

    /// Month outside 1..=12 or a year chrono cannot represent
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    /// Status string that names no known state
    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    /// Status transition that the state machine does not allow
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Malformed email address
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Empty or oversized name part
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Empty or oversized job title
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// Empty or oversized vacation/rejection reason
    #[error("Invalid reason: {0}")]
    InvalidReason(String),

    /// Employee has not served long enough to request vacation
    #[error("Employee is not eligible for vacation until {eligible_from}")]
    NotEligible { eligible_from: NaiveDate },

    /// Edit attempted on a record that already left the pending state
    #[error("{0} can no longer be modified")]
    Immutable(String),
}

impl DomainError {
    /// True for errors caused by the current lifecycle state rather than by bad input
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidTransition { .. } | DomainError::Immutable(_)
        )
    }
}
