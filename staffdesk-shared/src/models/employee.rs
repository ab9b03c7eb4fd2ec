/// Employee persistence record
///
/// Flat row mirroring [`Employee`]. Conversion goes through
/// [`EmployeeRecord::from_domain`] and [`EmployeeRecord::into_domain`], so
/// every row read back is re-validated by the domain constructors.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE employees (
///     id UUID PRIMARY KEY,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     email VARCHAR(180) NOT NULL,
///     position VARCHAR(100) NOT NULL,
///     salary_amount NUMERIC(12, 2) NOT NULL CHECK (salary_amount > 0),
///     salary_currency VARCHAR(3) NOT NULL,
///     hired_at DATE NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE UNIQUE INDEX employees_email_unique ON employees (LOWER(email));
/// ```
///
/// # Example
///
/// ```no_run
/// use staffdesk_shared::models::employee::{EmployeeFilter, EmployeeRecord};
/// use staffdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let engineers = EmployeeFilter {
///     position: Some("Engineer".to_string()),
///     ..Default::default()
/// };
/// for record in EmployeeRecord::list(&pool, &engineers, 30, 0).await? {
///     let employee = record.into_domain()?;
///     println!("{} <{}>", employee.name(), employee.email());
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::employee::{Employee, EmployeeSnapshot};
use crate::domain::identity::{Email, FullName, Position};
use crate::domain::money::Salary;
use crate::domain::DomainError;

const COLUMNS: &str = "id, first_name, last_name, email, position, salary_amount, \
                       salary_currency, hired_at, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EmployeeRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub salary_amount: Decimal,
    pub salary_currency: String,
    pub hired_at: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Collection filters; `None` fields are ignored
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    /// Case-insensitive exact match
    pub email: Option<String>,
    /// Case-insensitive substring match
    pub position: Option<String>,
}

impl EmployeeFilter {
    /// Appends `AND ...` clauses starting at bind index `first_bind`
    fn where_clause(&self, first_bind: usize) -> (String, Vec<String>) {
        let mut clause = String::from(" WHERE TRUE");
        let mut binds = Vec::new();
        let mut idx = first_bind;

        if let Some(email) = &self.email {
            clause.push_str(&format!(" AND LOWER(email) = LOWER(${})", idx));
            binds.push(email.trim().to_string());
            idx += 1;
        }
        if let Some(position) = &self.position {
            clause.push_str(&format!(" AND position ILIKE ${}", idx));
            binds.push(format!("%{}%", position.trim()));
        }

        (clause, binds)
    }
}

impl EmployeeRecord {
    pub fn from_domain(employee: &Employee) -> Self {
        Self {
            id: employee.id(),
            first_name: employee.name().first().to_string(),
            last_name: employee.name().last().to_string(),
            email: employee.email().as_str().to_string(),
            position: employee.position().title().to_string(),
            salary_amount: employee.salary().amount(),
            salary_currency: employee.salary().currency().code().to_string(),
            hired_at: employee.hired_at(),
            created_at: employee.created_at(),
            updated_at: employee.updated_at(),
        }
    }

    pub fn into_domain(self) -> Result<Employee, DomainError> {
        Ok(Employee::restore(EmployeeSnapshot {
            id: self.id,
            name: FullName::new(&self.first_name, &self.last_name)?,
            email: Email::new(&self.email)?,
            position: Position::new(&self.position)?,
            salary: Salary::parse(self.salary_amount, &self.salary_currency)?,
            hired_at: self.hired_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }

    /// Inserts the record
    ///
    /// # Errors
    ///
    /// A duplicate email fails with a database error on constraint
    /// `employees_email_unique`.
    pub async fn insert(&self, pool: &PgPool) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO employees ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, EmployeeRecord>(&query)
            .bind(self.id)
            .bind(&self.first_name)
            .bind(&self.last_name)
            .bind(&self.email)
            .bind(&self.position)
            .bind(self.salary_amount)
            .bind(&self.salary_currency)
            .bind(self.hired_at)
            .bind(self.created_at)
            .bind(self.updated_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, EmployeeRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive lookup
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, EmployeeRecord>(&query)
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// Lists employees ordered by last name, first name
    pub async fn list(
        pool: &PgPool,
        filter: &EmployeeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let (clause, binds) = filter.where_clause(3);
        let query = format!(
            "SELECT {COLUMNS} FROM employees{clause} \
             ORDER BY last_name, first_name, id LIMIT $1 OFFSET $2"
        );

        let mut q = sqlx::query_as::<_, EmployeeRecord>(&query)
            .bind(limit)
            .bind(offset);
        for value in binds {
            q = q.bind(value);
        }

        q.fetch_all(pool).await
    }

    pub async fn count(pool: &PgPool, filter: &EmployeeFilter) -> Result<i64, sqlx::Error> {
        let (clause, binds) = filter.where_clause(1);
        let query = format!("SELECT COUNT(*) FROM employees{clause}");

        let mut q = sqlx::query_as::<_, (i64,)>(&query);
        for value in binds {
            q = q.bind(value);
        }

        let (count,) = q.fetch_one(pool).await?;
        Ok(count)
    }

    /// Writes every mutable column; returns `None` if the row is gone
    pub async fn update(&self, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE employees
            SET first_name = $2, last_name = $3, email = $4, position = $5,
                salary_amount = $6, salary_currency = $7, hired_at = $8,
                updated_at = $9
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, EmployeeRecord>(&query)
            .bind(self.id)
            .bind(&self.first_name)
            .bind(&self.last_name)
            .bind(&self.email)
            .bind(&self.position)
            .bind(self.salary_amount)
            .bind(&self.salary_currency)
            .bind(self.hired_at)
            .bind(self.updated_at)
            .fetch_optional(pool)
            .await
    }

    /// Deletes the employee together with its payrolls and vacations
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
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

    #[test]
    fn test_domain_round_trip() {
        let employee = sample_employee(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let record = EmployeeRecord::from_domain(&employee);

        assert_eq!(record.salary_currency, "EUR");
        assert_eq!(record.salary_amount, Decimal::new(350000, 2));
        assert_eq!(record.into_domain().unwrap(), employee);
    }

    #[test]
    fn test_into_domain_rejects_corrupt_row() {
        let employee = sample_employee(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let mut record = EmployeeRecord::from_domain(&employee);
        record.salary_currency = "JPY".to_string();

        assert_eq!(
            record.into_domain().unwrap_err(),
            DomainError::UnsupportedCurrency("JPY".to_string())
        );
    }

    #[test]
    fn test_filter_clause() {
        let filter = EmployeeFilter {
            email: Some(" Jane@Example.com ".to_string()),
            position: Some("eng".to_string()),
        };
        let (clause, binds) = filter.where_clause(3);

        assert_eq!(
            clause,
            " WHERE TRUE AND LOWER(email) = LOWER($3) AND position ILIKE $4"
        );
        assert_eq!(binds, vec!["Jane@Example.com".to_string(), "%eng%".to_string()]);

        let (clause, binds) = EmployeeFilter::default().where_clause(1);
        assert_eq!(clause, " WHERE TRUE");
        assert!(binds.is_empty());
    }
}
