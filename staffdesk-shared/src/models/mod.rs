/// Database records for StaffDesk
///
/// Each record is a flat `sqlx::FromRow` row that converts to and from its
/// domain aggregate and carries the CRUD queries for its table.
///
/// # Models
///
/// - `employee`: employees
/// - `payroll`: payroll runs, one per employee and period
/// - `vacation`: vacation requests
/// - `user`: login accounts
///
/// # Example
///
/// ```no_run
/// use staffdesk_shared::models::employee::EmployeeRecord;
/// use staffdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// if let Some(record) = EmployeeRecord::find_by_id(&pool, id).await? {
///     let mut employee = record.into_domain()?;
///     employee.change_hire_date(chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
///     EmployeeRecord::from_domain(&employee).update(&pool).await?;
/// }
/// # Ok(())
/// # }
/// ```

pub mod employee;
pub mod payroll;
pub mod user;
pub mod vacation;
