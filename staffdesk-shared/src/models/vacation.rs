/// Vacation persistence record
///
/// # Schema
///
/// ```sql
/// CREATE TABLE vacations (
///     id UUID PRIMARY KEY,
///     employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
///     start_date DATE NOT NULL,
///     end_date DATE NOT NULL,
///     reason TEXT NOT NULL,
///     status vacation_status NOT NULL DEFAULT 'pending',
///     rejection_reason TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::period::VacationPeriod;
use crate::domain::status::VacationStatus;
use crate::domain::vacation::{Vacation, VacationSnapshot};
use crate::domain::DomainError;

const COLUMNS: &str = "id, employee_id, start_date, end_date, reason, status, \
                       rejection_reason, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VacationRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: VacationStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Collection filters; `None` fields are ignored
#[derive(Debug, Clone, Default)]
pub struct VacationFilter {
    pub employee_id: Option<Uuid>,
    pub status: Option<VacationStatus>,
}

impl VacationFilter {
    fn where_clause(&self, first_bind: usize) -> String {
        let mut clause = String::from(" WHERE TRUE");
        let mut idx = first_bind;

        if self.employee_id.is_some() {
            clause.push_str(&format!(" AND employee_id = ${}", idx));
            idx += 1;
        }
        if self.status.is_some() {
            clause.push_str(&format!(" AND status = ${}", idx));
        }

        clause
    }
}

impl VacationRecord {
    pub fn from_domain(vacation: &Vacation) -> Self {
        Self {
            id: vacation.id(),
            employee_id: vacation.employee_id(),
            start_date: vacation.period().start(),
            end_date: vacation.period().end(),
            reason: vacation.reason().to_string(),
            status: vacation.status(),
            rejection_reason: vacation.rejection_reason().map(str::to_string),
            created_at: vacation.created_at(),
            updated_at: vacation.updated_at(),
        }
    }

    pub fn into_domain(self) -> Result<Vacation, DomainError> {
        Ok(Vacation::restore(VacationSnapshot {
            id: self.id,
            employee_id: self.employee_id,
            period: VacationPeriod::new(self.start_date, self.end_date)?,
            reason: self.reason,
            status: self.status,
            rejection_reason: self.rejection_reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO vacations ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, VacationRecord>(&query)
            .bind(self.id)
            .bind(self.employee_id)
            .bind(self.start_date)
            .bind(self.end_date)
            .bind(&self.reason)
            .bind(self.status)
            .bind(&self.rejection_reason)
            .bind(self.created_at)
            .bind(self.updated_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vacations WHERE id = $1");
        sqlx::query_as::<_, VacationRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists requests, latest start date first
    pub async fn list(
        pool: &PgPool,
        filter: &VacationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vacations{} \
             ORDER BY start_date DESC, id LIMIT $1 OFFSET $2",
            filter.where_clause(3)
        );

        let mut q = sqlx::query_as::<_, VacationRecord>(&query)
            .bind(limit)
            .bind(offset);
        if let Some(employee_id) = filter.employee_id {
            q = q.bind(employee_id);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }

        q.fetch_all(pool).await
    }

    /// Every request of one employee in chronological order
    pub async fn list_for_employee(
        pool: &PgPool,
        employee_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vacations WHERE employee_id = $1 ORDER BY start_date, id"
        );
        sqlx::query_as::<_, VacationRecord>(&query)
            .bind(employee_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &VacationFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM vacations{}", filter.where_clause(1));

        let mut q = sqlx::query_as::<_, (i64,)>(&query);
        if let Some(employee_id) = filter.employee_id {
            q = q.bind(employee_id);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }

        let (count,) = q.fetch_one(pool).await?;
        Ok(count)
    }

    pub async fn update(&self, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE vacations
            SET start_date = $2, end_date = $3, reason = $4, status = $5,
                rejection_reason = $6, updated_at = $7
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, VacationRecord>(&query)
            .bind(self.id)
            .bind(self.start_date)
            .bind(self.end_date)
            .bind(&self.reason)
            .bind(self.status)
            .bind(&self.rejection_reason)
            .bind(self.updated_at)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vacations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
