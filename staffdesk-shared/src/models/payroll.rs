/// Payroll persistence record
///
/// # Schema
///
/// ```sql
/// CREATE TABLE payrolls (
///     id UUID PRIMARY KEY,
///     employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
///     period_start DATE NOT NULL,
///     period_end DATE NOT NULL,
///     gross_amount NUMERIC(12, 2) NOT NULL,
///     currency VARCHAR(3) NOT NULL,
///     taxes NUMERIC(12, 2) NOT NULL,
///     social_security NUMERIC(12, 2) NOT NULL,
///     health_insurance NUMERIC(12, 2) NOT NULL,
///     net_amount NUMERIC(12, 2) NOT NULL,
///     status payroll_status NOT NULL DEFAULT 'pending',
///     processed_at TIMESTAMPTZ,
///     paid_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `net_amount` is stored for reporting only; [`PayrollRecord::into_domain`]
/// recomputes it from gross and deductions.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::money::{Currency, Deductions, GrossSalary};
use crate::domain::payroll::{Payroll, PayrollSnapshot};
use crate::domain::period::PayrollPeriod;
use crate::domain::status::PayrollStatus;
use crate::domain::DomainError;

const COLUMNS: &str = "id, employee_id, period_start, period_end, gross_amount, currency, \
                       taxes, social_security, health_insurance, net_amount, status, \
                       processed_at, paid_at, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PayrollRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub gross_amount: Decimal,
    pub currency: String,
    pub taxes: Decimal,
    pub social_security: Decimal,
    pub health_insurance: Decimal,
    pub net_amount: Decimal,
    pub status: PayrollStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Collection filters; `None` fields are ignored
#[derive(Debug, Clone, Default)]
pub struct PayrollFilter {
    pub employee_id: Option<Uuid>,
    pub status: Option<PayrollStatus>,
}

impl PayrollFilter {
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

impl PayrollRecord {
    pub fn from_domain(payroll: &Payroll) -> Self {
        Self {
            id: payroll.id(),
            employee_id: payroll.employee_id(),
            period_start: payroll.period().start(),
            period_end: payroll.period().end(),
            gross_amount: payroll.gross().amount(),
            currency: payroll.gross().currency().code().to_string(),
            taxes: payroll.deductions().taxes().amount(),
            social_security: payroll.deductions().social_security().amount(),
            health_insurance: payroll.deductions().health_insurance().amount(),
            net_amount: payroll.net().amount(),
            status: payroll.status(),
            processed_at: payroll.processed_at(),
            paid_at: payroll.paid_at(),
            created_at: payroll.created_at(),
            updated_at: payroll.updated_at(),
        }
    }

    pub fn into_domain(self) -> Result<Payroll, DomainError> {
        let currency: Currency = self.currency.parse()?;
        Payroll::restore(PayrollSnapshot {
            id: self.id,
            employee_id: self.employee_id,
            period: PayrollPeriod::new(self.period_start, self.period_end)?,
            gross: GrossSalary::new(self.gross_amount, currency)?,
            deductions: Deductions::new(
                self.taxes,
                self.social_security,
                self.health_insurance,
                currency,
            )?,
            status: self.status,
            processed_at: self.processed_at,
            paid_at: self.paid_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO payrolls ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, PayrollRecord>(&query)
            .bind(self.id)
            .bind(self.employee_id)
            .bind(self.period_start)
            .bind(self.period_end)
            .bind(self.gross_amount)
            .bind(&self.currency)
            .bind(self.taxes)
            .bind(self.social_security)
            .bind(self.health_insurance)
            .bind(self.net_amount)
            .bind(self.status)
            .bind(self.processed_at)
            .bind(self.paid_at)
            .bind(self.created_at)
            .bind(self.updated_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payrolls WHERE id = $1");
        sqlx::query_as::<_, PayrollRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists payrolls, most recent period first
    pub async fn list(
        pool: &PgPool,
        filter: &PayrollFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payrolls{} \
             ORDER BY period_start DESC, id LIMIT $1 OFFSET $2",
            filter.where_clause(3)
        );

        let mut q = sqlx::query_as::<_, PayrollRecord>(&query)
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

    pub async fn count(pool: &PgPool, filter: &PayrollFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM payrolls{}", filter.where_clause(1));

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
            UPDATE payrolls
            SET period_start = $2, period_end = $3, gross_amount = $4, currency = $5,
                taxes = $6, social_security = $7, health_insurance = $8,
                net_amount = $9, status = $10, processed_at = $11, paid_at = $12,
                updated_at = $13
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, PayrollRecord>(&query)
            .bind(self.id)
            .bind(self.period_start)
            .bind(self.period_end)
            .bind(self.gross_amount)
            .bind(&self.currency)
            .bind(self.taxes)
            .bind(self.social_security)
            .bind(self.health_insurance)
            .bind(self.net_amount)
            .bind(self.status)
            .bind(self.processed_at)
            .bind(self.paid_at)
            .bind(self.updated_at)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payrolls WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::employee::tests::sample_employee;

    fn sample_payroll() -> Payroll {
        let employee = sample_employee(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        Payroll::for_employee(&employee, PayrollPeriod::for_month(2025, 3).unwrap()).unwrap()
    }

    #[test]
    fn test_domain_round_trip() {
        let mut payroll = sample_payroll();
        payroll.process().unwrap();

        let record = PayrollRecord::from_domain(&payroll);
        assert_eq!(record.status, PayrollStatus::Processed);
        assert_eq!(record.net_amount, Decimal::new(236250, 2));
        assert_eq!(record.into_domain().unwrap(), payroll);
    }

    #[test]
    fn test_into_domain_recomputes_net() {
        let payroll = sample_payroll();
        let mut record = PayrollRecord::from_domain(&payroll);
        record.net_amount = Decimal::new(1, 0);

        let restored = record.into_domain().unwrap();
        assert_eq!(restored.net().amount(), Decimal::new(236250, 2));
    }

    #[test]
    fn test_filter_clause() {
        let filter = PayrollFilter {
            employee_id: Some(Uuid::nil()),
            status: Some(PayrollStatus::Paid),
        };
        assert_eq!(
            filter.where_clause(3),
            " WHERE TRUE AND employee_id = $3 AND status = $4"
        );

        let only_status = PayrollFilter {
            status: Some(PayrollStatus::Pending),
            ..Default::default()
        };
        assert_eq!(only_status.where_clause(1), " WHERE TRUE AND status = $1");
    }
}
