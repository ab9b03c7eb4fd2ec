/// Lifecycle state machines for payrolls and vacation requests
///
/// ```text
/// payroll:   pending ──process──► processed ──pay──► paid
///               │                     │
///               └──────cancel─────────┴──► cancelled
///
/// vacation:  pending ──approve──► approved
///               └─────reject────► rejected
/// ```
///
/// Transitions consume the current value and return the next one, so a
/// status is never mutated in place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Payroll lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payroll_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PayrollStatus {
    Pending,
    Processed,
    Paid,
    Cancelled,
}

impl PayrollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayrollStatus::Pending => "pending",
            PayrollStatus::Processed => "processed",
            PayrollStatus::Paid => "paid",
            PayrollStatus::Cancelled => "cancelled",
        }
    }

    fn transition(self, to: PayrollStatus) -> DomainError {
        DomainError::InvalidTransition {
            from: self.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }

    /// pending → processed
    pub fn process(self) -> Result<Self, DomainError> {
        match self {
            PayrollStatus::Pending => Ok(PayrollStatus::Processed),
            other => Err(other.transition(PayrollStatus::Processed)),
        }
    }

    /// processed → paid
    pub fn pay(self) -> Result<Self, DomainError> {
        match self {
            PayrollStatus::Processed => Ok(PayrollStatus::Paid),
            other => Err(other.transition(PayrollStatus::Paid)),
        }
    }

    /// pending | processed → cancelled
    pub fn cancel(self) -> Result<Self, DomainError> {
        match self {
            PayrollStatus::Pending | PayrollStatus::Processed => Ok(PayrollStatus::Cancelled),
            other => Err(other.transition(PayrollStatus::Cancelled)),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, PayrollStatus::Pending)
    }

    /// No further transition possible
    pub fn is_final(&self) -> bool {
        matches!(self, PayrollStatus::Paid | PayrollStatus::Cancelled)
    }
}

impl Default for PayrollStatus {
    fn default() -> Self {
        PayrollStatus::Pending
    }
}

impl FromStr for PayrollStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PayrollStatus::Pending),
            "processed" => Ok(PayrollStatus::Processed),
            "paid" => Ok(PayrollStatus::Paid),
            "cancelled" => Ok(PayrollStatus::Cancelled),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vacation request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vacation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VacationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VacationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VacationStatus::Pending => "pending",
            VacationStatus::Approved => "approved",
            VacationStatus::Rejected => "rejected",
        }
    }

    fn decide(self, to: VacationStatus) -> Result<Self, DomainError> {
        match self {
            VacationStatus::Pending => Ok(to),
            other => Err(DomainError::InvalidTransition {
                from: other.as_str().to_string(),
                to: to.as_str().to_string(),
            }),
        }
    }

    /// pending → approved
    pub fn approve(self) -> Result<Self, DomainError> {
        self.decide(VacationStatus::Approved)
    }

    /// pending → rejected
    pub fn reject(self) -> Result<Self, DomainError> {
        self.decide(VacationStatus::Rejected)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, VacationStatus::Pending)
    }

    pub fn is_final(&self) -> bool {
        !self.is_pending()
    }
}

impl Default for VacationStatus {
    fn default() -> Self {
        VacationStatus::Pending
    }
}

impl FromStr for VacationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VacationStatus::Pending),
            "approved" => Ok(VacationStatus::Approved),
            "rejected" => Ok(VacationStatus::Rejected),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for VacationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PAYROLL: [PayrollStatus; 4] = [
        PayrollStatus::Pending,
        PayrollStatus::Processed,
        PayrollStatus::Paid,
        PayrollStatus::Cancelled,
    ];

    #[test]
    fn test_payroll_happy_path() {
        let status = PayrollStatus::default();
        let processed = status.process().unwrap();
        assert_eq!(processed, PayrollStatus::Processed);
        assert_eq!(processed.pay().unwrap(), PayrollStatus::Paid);
        // The original value is untouched
        assert_eq!(status, PayrollStatus::Pending);
    }

    #[test]
    fn test_payroll_only_legal_transitions_succeed() {
        for status in ALL_PAYROLL {
            assert_eq!(status.process().is_ok(), status == PayrollStatus::Pending);
            assert_eq!(status.pay().is_ok(), status == PayrollStatus::Processed);
            assert_eq!(status.cancel().is_ok(), !status.is_final());
        }
    }

    #[test]
    fn test_payroll_invalid_transition_error() {
        let err = PayrollStatus::Paid.process().unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                from: "paid".to_string(),
                to: "processed".to_string(),
            }
        );
    }

    #[test]
    fn test_vacation_transitions() {
        assert_eq!(
            VacationStatus::Pending.approve().unwrap(),
            VacationStatus::Approved
        );
        assert_eq!(
            VacationStatus::Pending.reject().unwrap(),
            VacationStatus::Rejected
        );
        assert!(VacationStatus::Approved.reject().is_err());
        assert!(VacationStatus::Rejected.approve().is_err());
        assert!(VacationStatus::Approved.approve().is_err());
        assert!(VacationStatus::Rejected.is_final());
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in ALL_PAYROLL {
            assert_eq!(status.as_str().parse::<PayrollStatus>().unwrap(), status);
        }
        assert!("archived".parse::<VacationStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&VacationStatus::Approved).unwrap(),
            "\"approved\""
        );
    }
}
