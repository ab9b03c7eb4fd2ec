/// Employee aggregate
///
/// An employee is hired through [`Employee::hire`] and changed only through
/// its setters, each of which bumps `updated_at`. Persistence rebuilds an
/// employee from an [`EmployeeSnapshot`] without re-running the factory.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::identity::{Email, FullName, Position};
use super::money::Salary;

/// Months of service required before vacation can be requested
pub const VACATION_ELIGIBILITY_MONTHS: u32 = 3;

/// Full state of an employee, used to rebuild one from storage
#[derive(Debug, Clone)]
pub struct EmployeeSnapshot {
    pub id: Uuid,
    pub name: FullName,
    pub email: Email,
    pub position: Position,
    pub salary: Salary,
    pub hired_at: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    id: Uuid,
    name: FullName,
    email: Email,
    position: Position,
    salary: Salary,
    hired_at: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Employee {
    /// Creates a new employee with a fresh id
    pub fn hire(
        name: FullName,
        email: Email,
        position: Position,
        salary: Salary,
        hired_at: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            position,
            salary,
            hired_at,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn restore(snapshot: EmployeeSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name,
            email: snapshot.email,
            position: snapshot.position,
            salary: snapshot.salary,
            hired_at: snapshot.hired_at,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &FullName {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn salary(&self) -> &Salary {
        &self.salary
    }

    pub fn hired_at(&self) -> NaiveDate {
        self.hired_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn rename(&mut self, name: FullName) {
        self.name = name;
        self.touch();
    }

    pub fn change_email(&mut self, email: Email) {
        self.email = email;
        self.touch();
    }

    pub fn change_position(&mut self, position: Position) {
        self.position = position;
        self.touch();
    }

    pub fn change_salary(&mut self, salary: Salary) {
        self.salary = salary;
        self.touch();
    }

    pub fn change_hire_date(&mut self, hired_at: NaiveDate) {
        self.hired_at = hired_at;
        self.touch();
    }

    /// Completed months between the hire date and `today` (0 before hire)
    pub fn months_of_service(&self, today: NaiveDate) -> u32 {
        if today <= self.hired_at {
            return 0;
        }
        let mut months = (today.year() - self.hired_at.year()) * 12
            + today.month() as i32
            - self.hired_at.month() as i32;
        if today.day() < self.hired_at.day() {
            months -= 1;
        }
        months.max(0) as u32
    }

    /// First day a vacation request is accepted
    pub fn vacation_eligible_from(&self) -> NaiveDate {
        self.hired_at
            .checked_add_months(Months::new(VACATION_ELIGIBILITY_MONTHS))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn is_eligible_for_vacation(&self, today: NaiveDate) -> bool {
        today >= self.vacation_eligible_from()
    }
}
