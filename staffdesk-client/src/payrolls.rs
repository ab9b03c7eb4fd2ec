//! Payroll runs and their status transitions

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::types::{Collection, Page, Payroll, PayrollStatus};

pub const PAYROLLS_PATH: &str = "/api/payrolls";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionsForm {
    pub taxes: Decimal,
    pub social_security: Decimal,
    pub health_insurance: Decimal,
}

/// Body of create
///
/// Without `gross_amount` the employee's salary is used; without
/// `deductions` the server applies its standard rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollForm {
    pub employee: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deductions: Option<DeductionsForm>,
}

impl PayrollForm {
    pub fn new(employee: Uuid, period_start: NaiveDate, period_end: NaiveDate) -> Self {
        Self {
            employee,
            period_start,
            period_end,
            gross_amount: None,
            currency: None,
            deductions: None,
        }
    }

    fn check(&self) -> ClientResult<()> {
        if self.period_end <= self.period_start {
            return Err(ClientError::Validation {
                message: "Period end must be after period start".to_string(),
                fields: vec![],
            });
        }
        if matches!(self.gross_amount, Some(gross) if gross <= Decimal::ZERO) {
            return Err(ClientError::Validation {
                message: "Gross amount must be greater than zero".to_string(),
                fields: vec![],
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PayrollFilter {
    pub employee: Option<Uuid>,
    pub status: Option<PayrollStatus>,
}

#[derive(Debug, Clone)]
pub struct PayrollService {
    client: ApiClient,
}

impl PayrollService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        filter: &PayrollFilter,
        page: u32,
        per_page: u32,
    ) -> ClientResult<Page<Payroll>> {
        let mut query = vec![
            ("page".to_string(), page.max(1).to_string()),
            ("itemsPerPage".to_string(), per_page.max(1).to_string()),
        ];
        if let Some(employee) = filter.employee {
            query.push(("employee".to_string(), employee.to_string()));
        }
        if let Some(status) = filter.status {
            query.push(("status".to_string(), status.as_str().to_string()));
        }

        let collection: Collection<Payroll> = self.client.get_query(PAYROLLS_PATH, &query).await?;
        Ok(Page::from_collection(collection, page, per_page))
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<Payroll> {
        self.client.get(&format!("{}/{}", PAYROLLS_PATH, id)).await
    }

    pub async fn create(&self, form: &PayrollForm) -> ClientResult<Payroll> {
        form.check()?;
        self.client.post(PAYROLLS_PATH, form).await
    }

    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.client.delete(&format!("{}/{}", PAYROLLS_PATH, id)).await
    }

    /// pending → processed
    pub async fn process(&self, id: Uuid) -> ClientResult<Payroll> {
        self.transition(id, "process").await
    }

    /// processed → paid
    pub async fn pay(&self, id: Uuid) -> ClientResult<Payroll> {
        self.transition(id, "pay").await
    }

    pub async fn cancel(&self, id: Uuid) -> ClientResult<Payroll> {
        self.transition(id, "cancel").await
    }

    async fn transition(&self, id: Uuid, action: &str) -> ClientResult<Payroll> {
        self.client
            .post_empty(&format!("{}/{}/{}", PAYROLLS_PATH, id, action))
            .await
    }
}
