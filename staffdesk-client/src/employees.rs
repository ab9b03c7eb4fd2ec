//! Employee records

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::types::{Collection, Employee, Page};

pub const EMPLOYEES_PATH: &str = "/api/employees";

/// Currencies the API accepts for salaries
pub const CURRENCIES: [&str; 3] = ["EUR", "USD", "GBP"];

fn rejected(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        Err(rejected("positive", "Salary must be greater than zero"))
    }
}

fn supported_currency(code: &str) -> Result<(), ValidationError> {
    if CURRENCIES.contains(&code.trim().to_ascii_uppercase().as_str()) {
        Ok(())
    } else {
        Err(rejected("currency", "Currency must be EUR, USD or GBP"))
    }
}

/// Body of create and replace, checked before anything is sent
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeForm {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Position must be 1-100 characters"))]
    pub position: String,

    #[validate(custom(function = "positive_amount"))]
    pub salary_amount: Decimal,

    #[validate(custom(function = "supported_currency"))]
    pub salary_currency: String,

    pub hired_at: NaiveDate,
}

impl From<&Employee> for EmployeeForm {
    fn from(employee: &Employee) -> Self {
        Self {
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
            position: employee.position.clone(),
            salary_amount: employee.salary_amount,
            salary_currency: employee.salary_currency.clone(),
            hired_at: employee.hired_at,
        }
    }
}

/// Optional collection filters
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub email: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmployeeService {
    client: ApiClient,
}

impl EmployeeService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: u32, per_page: u32) -> ClientResult<Page<Employee>> {
        self.search(&EmployeeFilter::default(), page, per_page).await
    }

    pub async fn search(
        &self,
        filter: &EmployeeFilter,
        page: u32,
        per_page: u32,
    ) -> ClientResult<Page<Employee>> {
        let mut query = vec![
            ("page".to_string(), page.max(1).to_string()),
            ("itemsPerPage".to_string(), per_page.max(1).to_string()),
        ];
        if let Some(email) = &filter.email {
            query.push(("email".to_string(), email.clone()));
        }
        if let Some(position) = &filter.position {
            query.push(("position".to_string(), position.clone()));
        }

        let collection: Collection<Employee> = self.client.get_query(EMPLOYEES_PATH, &query).await?;
        Ok(Page::from_collection(collection, page, per_page))
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<Employee> {
        self.client.get(&format!("{}/{}", EMPLOYEES_PATH, id)).await
    }

    pub async fn create(&self, form: &EmployeeForm) -> ClientResult<Employee> {
        form.validate()?;
        self.client.post(EMPLOYEES_PATH, form).await
    }

    /// Replaces every field of the record
    pub async fn update(&self, id: Uuid, form: &EmployeeForm) -> ClientResult<Employee> {
        form.validate()?;
        self.client.put(&format!("{}/{}", EMPLOYEES_PATH, id), form).await
    }

    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.client.delete(&format!("{}/{}", EMPLOYEES_PATH, id)).await
    }
}
