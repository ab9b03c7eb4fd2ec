/// Domain layer for StaffDesk
///
/// Pure value objects and aggregates with no I/O. Everything here is
/// validated on construction and reports violations through [`DomainError`].
///
/// # Modules
///
/// - `money`: currencies, salaries, deductions
/// - `identity`: email, full name, position
/// - `period`: payroll and vacation date ranges
/// - `status`: payroll and vacation state machines
/// - `employee`, `payroll`, `vacation`, `user`: aggregates
///
/// # Example
///
/// ```
/// use staffdesk_shared::domain::{
///     employee::Employee,
///     identity::{Email, FullName, Position},
///     money::{Currency, Salary},
///     payroll::Payroll,
///     period::PayrollPeriod,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// # fn example() -> Result<(), staffdesk_shared::domain::DomainError> {
/// let employee = Employee::hire(
///     FullName::new("Jane", "Doe")?,
///     Email::new("jane@example.com")?,
///     Position::new("Engineer")?,
///     Salary::new(Decimal::new(3500, 0), Currency::Eur)?,
///     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
/// );
///
/// let mut payroll = Payroll::for_employee(&employee, PayrollPeriod::for_month(2025, 1)?)?;
/// payroll.process()?;
/// payroll.pay()?;
/// # Ok(())
/// # }
/// ```

pub mod employee;
pub mod error;
pub mod identity;
pub mod money;
pub mod payroll;
pub mod period;
pub mod status;
pub mod user;
pub mod vacation;

pub use error::DomainError;
