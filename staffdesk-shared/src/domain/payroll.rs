/// Payroll aggregate
///
/// A payroll pays one employee for one [`PayrollPeriod`]. The net amount is
/// always derived from gross and deductions; it is never set directly.
/// Amounts can be adjusted only while the payroll is pending.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::employee::Employee;
use super::money::{Deductions, GrossSalary, NetSalary};
use super::period::PayrollPeriod;
use super::status::PayrollStatus;
use super::DomainError;

/// Full state of a payroll, used to rebuild one from storage
#[derive(Debug, Clone)]
pub struct PayrollSnapshot {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub period: PayrollPeriod,
    pub gross: GrossSalary,
    pub deductions: Deductions,
    pub status: PayrollStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payroll {
    id: Uuid,
    employee_id: Uuid,
    period: PayrollPeriod,
    gross: GrossSalary,
    deductions: Deductions,
    net: NetSalary,
    status: PayrollStatus,
    processed_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Payroll {
    /// New pending payroll
    pub fn create(
        employee_id: Uuid,
        period: PayrollPeriod,
        gross: GrossSalary,
        deductions: Deductions,
    ) -> Result<Self, DomainError> {
        let net = NetSalary::compute(&gross, &deductions)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            employee_id,
            period,
            gross,
            deductions,
            net,
            status: PayrollStatus::Pending,
            processed_at: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Payroll paying the employee's salary with the default deduction rates
    pub fn for_employee(employee: &Employee, period: PayrollPeriod) -> Result<Self, DomainError> {
        let gross = employee.salary().to_gross();
        let deductions = Deductions::standard_for(&gross)?;
        Self::create(employee.id(), period, gross, deductions)
    }

    /// Rebuilds a payroll; the net amount is recomputed from gross and deductions
    pub fn restore(snapshot: PayrollSnapshot) -> Result<Self, DomainError> {
        let net = NetSalary::compute(&snapshot.gross, &snapshot.deductions)?;
        Ok(Self {
            id: snapshot.id,
            employee_id: snapshot.employee_id,
            period: snapshot.period,
            gross: snapshot.gross,
            deductions: snapshot.deductions,
            net,
            status: snapshot.status,
            processed_at: snapshot.processed_at,
            paid_at: snapshot.paid_at,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn employee_id(&self) -> Uuid {
        self.employee_id
    }

    pub fn period(&self) -> &PayrollPeriod {
        &self.period
    }

    pub fn gross(&self) -> &GrossSalary {
        &self.gross
    }

    pub fn deductions(&self) -> &Deductions {
        &self.deductions
    }

    pub fn net(&self) -> &NetSalary {
        &self.net
    }

    pub fn status(&self) -> PayrollStatus {
        self.status
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
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
                "Payroll in status {}",
                self.status
            )));
        }
        Ok(())
    }

    /// Replaces gross and deductions and recomputes the net (pending only)
    pub fn adjust(&mut self, gross: GrossSalary, deductions: Deductions) -> Result<(), DomainError> {
        self.ensure_pending()?;
        let net = NetSalary::compute(&gross, &deductions)?;
        self.gross = gross;
        self.deductions = deductions;
        self.net = net;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replaces the deductions and recomputes the net (pending only)
    pub fn set_deductions(&mut self, deductions: Deductions) -> Result<(), DomainError> {
        self.adjust(self.gross, deductions)
    }

    /// Moves the pay window (pending only)
    pub fn reschedule(&mut self, period: PayrollPeriod) -> Result<(), DomainError> {
        self.ensure_pending()?;
        self.period = period;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn process(&mut self) -> Result<(), DomainError> {
        self.status = self.status.process()?;
        let now = Utc::now();
        self.processed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn pay(&mut self) -> Result<(), DomainError> {
        self.status = self.status.pay()?;
        let now = Utc::now();
        self.paid_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.status = self.status.cancel()?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::employee::tests::sample_employee;
    use crate::domain::money::Currency;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn january() -> PayrollPeriod {
        PayrollPeriod::for_month(2025, 1).unwrap()
    }

    fn gross(amount: i64) -> GrossSalary {
        GrossSalary::new(Decimal::new(amount, 0), Currency::Eur).unwrap()
    }

    #[test]
    fn test_create_computes_net() {
        let deductions = Deductions::new(
            Decimal::new(500, 0),
            Decimal::new(200, 0),
            Decimal::new(100, 0),
            Currency::Eur,
        )
        .unwrap();

        let payroll = Payroll::create(Uuid::new_v4(), january(), gross(3000), deductions).unwrap();

        assert_eq!(payroll.status(), PayrollStatus::Pending);
        assert_eq!(payroll.net().amount(), Decimal::new(2200, 0));
        assert_eq!(
            payroll.net().amount(),
            payroll.gross().amount() - payroll.deductions().total().unwrap().amount()
        );
    }

    #[test]
    fn test_for_employee_uses_salary_and_standard_rates() {
        let employee = sample_employee(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let payroll = Payroll::for_employee(&employee, january()).unwrap();

        assert_eq!(payroll.employee_id(), employee.id());
        assert_eq!(payroll.gross().amount(), employee.salary().amount());
        assert_eq!(payroll.net().amount(), Decimal::new(236250, 2));
    }

    #[test]
    fn test_lifecycle_records_timestamps() {
        let mut payroll =
            Payroll::create(Uuid::new_v4(), january(), gross(1000), Deductions::none(Currency::Eur))
                .unwrap();

        assert!(payroll.pay().is_err());

        payroll.process().unwrap();
        assert!(payroll.processed_at().is_some());
        assert!(payroll.paid_at().is_none());

        payroll.pay().unwrap();
        assert_eq!(payroll.status(), PayrollStatus::Paid);
        assert!(payroll.paid_at().is_some());

        assert!(payroll.cancel().is_err());
        assert_eq!(payroll.status(), PayrollStatus::Paid);
    }

    #[test]
    fn test_adjust_only_while_pending() {
        let mut payroll =
            Payroll::create(Uuid::new_v4(), january(), gross(1000), Deductions::none(Currency::Eur))
                .unwrap();

        let deductions =
            Deductions::new(Decimal::new(100, 0), Decimal::ZERO, Decimal::ZERO, Currency::Eur)
                .unwrap();
        payroll.set_deductions(deductions).unwrap();
        assert_eq!(payroll.net().amount(), Decimal::new(900, 0));

        payroll.process().unwrap();
        let err = payroll.set_deductions(Deductions::none(Currency::Eur)).unwrap_err();
        assert!(matches!(err, DomainError::Immutable(_)));
        assert_eq!(payroll.net().amount(), Decimal::new(900, 0));
    }

    #[test]
    fn test_adjust_rejects_excessive_deductions() {
        let mut payroll =
            Payroll::create(Uuid::new_v4(), january(), gross(100), Deductions::none(Currency::Eur))
                .unwrap();
        let deductions =
            Deductions::new(Decimal::new(101, 0), Decimal::ZERO, Decimal::ZERO, Currency::Eur)
                .unwrap();

        assert!(payroll.set_deductions(deductions).is_err());
        assert_eq!(payroll.net().amount(), Decimal::new(100, 0));
    }
}
