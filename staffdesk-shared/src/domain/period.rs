/// Date range value objects
///
/// [`PayrollPeriod`] is the pay window of a payroll run and must span at
/// least two days (end strictly after start). [`VacationPeriod`] may be a
/// single day and spans at most [`MAX_VACATION_DAYS`]. Both bounds are
/// inclusive.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

use super::DomainError;

/// Length of a biweekly pay period in days
pub const BIWEEKLY_DAYS: i64 = 14;

/// Longest vacation a single request may cover, in calendar days
pub const MAX_VACATION_DAYS: i64 = 365;

fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Monday to Friday days between two inclusive bounds, in constant time
fn working_days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let days = inclusive_days(start, end);
    if days <= 0 {
        return 0;
    }
    let first = i64::from(start.weekday().num_days_from_monday());
    let remainder = (0..days % 7).filter(|offset| (first + offset) % 7 < 5).count() as i64;
    days / 7 * 5 + remainder
}

fn ranges_overlap(a: (NaiveDate, NaiveDate), b: (NaiveDate, NaiveDate)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// Pay window of a payroll run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl PayrollPeriod {
    /// Rejects `end <= start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Full calendar month
    pub fn for_month(year: i32, month: u32) -> Result<Self, DomainError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(DomainError::InvalidMonth { year, month })?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(DomainError::InvalidMonth { year, month })?;
        Self::new(start, end)
    }

    /// Calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Result<Self, DomainError> {
        Self::for_month(date.year(), date.month())
    }

    /// Fourteen days starting at `start`
    pub fn biweekly(start: NaiveDate) -> Result<Self, DomainError> {
        let end = start
            .checked_add_signed(Duration::days(BIWEEKLY_DAYS - 1))
            .ok_or(DomainError::InvalidDateRange { start, end: start })?;
        Self::new(start, end)
    }

    /// Biweekly period immediately after this one
    pub fn next_biweekly(&self) -> Result<Self, DomainError> {
        let start = self
            .end
            .succ_opt()
            .ok_or(DomainError::InvalidDateRange {
                start: self.start,
                end: self.end,
            })?;
        Self::biweekly(start)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days, both bounds included
    pub fn days(&self) -> i64 {
        inclusive_days(self.start, self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn overlaps(&self, other: &PayrollPeriod) -> bool {
        ranges_overlap((self.start, self.end), (other.start, other.end))
    }

    /// True if this is exactly one calendar month
    pub fn is_full_month(&self) -> bool {
        Self::month_of(self.start).map_or(false, |m| m == *self)
    }
}

/// Days an employee is away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl VacationPeriod {
    /// Rejects `end < start` and ranges longer than [`MAX_VACATION_DAYS`];
    /// a single day is allowed
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        let days = inclusive_days(start, end);
        if days > MAX_VACATION_DAYS {
            return Err(DomainError::PeriodTooLong {
                days,
                max: MAX_VACATION_DAYS,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> i64 {
        inclusive_days(self.start, self.end)
    }

    /// Monday to Friday days in the period
    pub fn working_days(&self) -> i64 {
        working_days_between(self.start, self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn overlaps(&self, other: &VacationPeriod) -> bool {
        ranges_overlap((self.start, self.end), (other.start, other.end))
    }
}
