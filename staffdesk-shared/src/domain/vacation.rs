/// Vacation request aggregate
///
/// Requests are only accepted from employees past their eligibility window
/// (see [`Employee::is_eligible_for_vacation`]). A request can be edited
/// while pending and is then approved or rejected exactly once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::employee::Employee;
use super::period::VacationPeriod;
use super::status::VacationStatus;
use super::DomainError;

/// Maximum length of a request or rejection reason
pub const REASON_MAX_LEN: usize = 500;

fn validate_reason(reason: &str) -> Result<String, DomainError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidReason("reason must not be empty".to_string()));
    }
    if trimmed.chars().count() > REASON_MAX_LEN {
        return Err(DomainError::InvalidReason(format!(
            "reason must be at most {} characters",
            REASON_MAX_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Full state of a vacation request, used to rebuild one from storage
#[derive(Debug, Clone)]
pub struct VacationSnapshot {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub period: VacationPeriod,
    pub reason: String,
    pub status: VacationStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vacation {
    id: Uuid,
    employee_id: Uuid,
    period: VacationPeriod,
    reason: String,
    status: VacationStatus,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Vacation {
    /// New pending request; fails if the employee is not yet eligible on `today`
    pub fn request(
        employee: &Employee,
        period: VacationPeriod,
        reason: &str,
        today: NaiveDate,
    ) -> Result<Self, DomainError> {
        if !employee.is_eligible_for_vacation(today) {
            return Err(DomainError::NotEligible {
                eligible_from: employee.vacation_eligible_from(),
            });
        }
        let reason = validate_reason(reason)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            employee_id: employee.id(),
            period,
            reason,
            status: VacationStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn restore(snapshot: VacationSnapshot) -> Self {
        Self {
            id: snapshot.id,
            employee_id: snapshot.employee_id,
            period: snapshot.period,
            reason: snapshot.reason,
            status: snapshot.status,
            rejection_reason: snapshot.rejection_reason,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn employee_id(&self) -> Uuid {
        self.employee_id
    }

    pub fn period(&self) -> &VacationPeriod {
        &self.period
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn status(&self) -> VacationStatus {
        self.status
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn ensure_pending(&self) -> Result<(), DomainError> {
        if !self.status.is_pending() {
            return Err(DomainError::Immutable(format!(
                "Vacation in status {}",
                self.status
            )));
        }
        Ok(())
    }

    pub fn reschedule(&mut self, period: VacationPeriod) -> Result<(), DomainError> {
        self.ensure_pending()?;
        self.period = period;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn change_reason(&mut self, reason: &str) -> Result<(), DomainError> {
        self.ensure_pending()?;
        self.reason = validate_reason(reason)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn approve(&mut self) -> Result<(), DomainError> {
        self.status = self.status.approve()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Rejects the request; a blank reason is stored as none
    pub fn reject(&mut self, reason: Option<&str>) -> Result<(), DomainError> {
        let rejection_reason = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => Some(validate_reason(r)?),
            None => None,
        };
        self.status = self.status.reject()?;
        self.rejection_reason = rejection_reason;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Overlap with another request of the same employee that still counts
    pub fn conflicts_with(&self, other: &Vacation) -> bool {
        self.id != other.id
            && self.employee_id == other.employee_id
            && other.status != VacationStatus::Rejected
            && self.period.overlaps(&other.period)
    }
}
