/// Employee endpoints
///
/// # Endpoints
///
/// - `GET /api/employees` - Paginated list, filters `email` and `position`
/// - `POST /api/employees` - Hire an employee
/// - `GET /api/employees/:id` - Fetch one employee
/// - `PUT /api/employees/:id` - Replace every field
/// - `PATCH /api/employees/:id` - Change the given fields
/// - `DELETE /api/employees/:id` - Delete, cascading to payrolls and vacations
///
/// Request and response bodies use camelCase field names:
///
/// ```json
/// {
///   "firstName": "Jane",
///   "lastName": "Doe",
///   "email": "jane.doe@example.com",
///   "position": "Accountant",
///   "salaryAmount": "4200.00",
///   "salaryCurrency": "EUR",
///   "hiredAt": "2024-03-01"
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    routes::pagination::{Collection, PageQuery, Pagination},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use staffdesk_shared::{
    auth::middleware::AuthContext,
    domain::{
        employee::Employee,
        identity::{Email, FullName, Position},
        money::Salary,
    },
    models::employee::{EmployeeFilter, EmployeeRecord},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub position: String,
    pub salary_amount: Decimal,
    pub salary_currency: String,
    pub hired_at: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Employee> for EmployeeView {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id(),
            first_name: employee.name().first().to_string(),
            last_name: employee.name().last().to_string(),
            full_name: employee.name().full(),
            email: employee.email().to_string(),
            position: employee.position().to_string(),
            salary_amount: employee.salary().amount(),
            salary_currency: employee.salary().currency().to_string(),
            hired_at: employee.hired_at(),
            created_at: employee.created_at(),
            updated_at: employee.updated_at(),
        }
    }
}

/// Body of POST and PUT
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"), length(max = 180, message = "Email must be at most 180 characters"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Position must be 1-100 characters"))]
    pub position: String,

    pub salary_amount: Decimal,

    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub salary_currency: String,

    pub hired_at: NaiveDate,
}

/// Body of PATCH; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Position must be 1-100 characters"))]
    pub position: Option<String>,

    pub salary_amount: Option<Decimal>,

    pub salary_currency: Option<String>,

    pub hired_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub items_per_page: Option<u32>,
    pub email: Option<String>,
    pub position: Option<String>,
}

impl EmployeePatch {
    fn apply(self, employee: &mut Employee) -> ApiResult<()> {
        if self.first_name.is_some() || self.last_name.is_some() {
            let first = self.first_name.as_deref().unwrap_or(employee.name().first());
            let last = self.last_name.as_deref().unwrap_or(employee.name().last());
            employee.rename(FullName::new(first, last)?);
        }
        if let Some(email) = self.email {
            employee.change_email(Email::new(&email)?);
        }
        if let Some(position) = self.position {
            employee.change_position(Position::new(&position)?);
        }
        if self.salary_amount.is_some() || self.salary_currency.is_some() {
            let amount = self.salary_amount.unwrap_or(employee.salary().amount());
            let salary = match self.salary_currency {
                Some(currency) => Salary::parse(amount, &currency)?,
                None => Salary::new(amount, employee.salary().currency())?,
            };
            employee.change_salary(salary);
        }
        if let Some(hired_at) = self.hired_at {
            employee.change_hire_date(hired_at);
        }
        Ok(())
    }
}

impl From<EmployeeInput> for EmployeePatch {
    fn from(input: EmployeeInput) -> Self {
        Self {
            first_name: Some(input.first_name),
            last_name: Some(input.last_name),
            email: Some(input.email),
            position: Some(input.position),
            salary_amount: Some(input.salary_amount),
            salary_currency: Some(input.salary_currency),
            hired_at: Some(input.hired_at),
        }
    }
}

/// Loads an employee or fails with 404
pub async fn load_employee(pool: &PgPool, id: Uuid) -> ApiResult<Employee> {
    let record = EmployeeRecord::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;
    Ok(record.into_domain()?)
}

/// Fails with 400 when another employee already uses `email`
async fn ensure_email_free(pool: &PgPool, email: &Email, own_id: Option<Uuid>) -> ApiResult<()> {
    if let Some(existing) = EmployeeRecord::find_by_email(pool, email.as_str()).await? {
        if Some(existing.id) != own_id {
            return Err(ApiError::BadRequest("Email already exists".to_string()));
        }
    }
    Ok(())
}

/// `GET /api/employees`
pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeQuery>,
) -> ApiResult<Json<Collection<EmployeeView>>> {
    let pagination = Pagination::from(PageQuery {
        page: query.page,
        items_per_page: query.items_per_page,
    });
    let filter = EmployeeFilter {
        email: query.email.clone(),
        position: query.position.clone(),
    };

    let total = EmployeeRecord::count(&state.db, &filter).await?;
    let records = EmployeeRecord::list(&state.db, &filter, pagination.limit(), pagination.offset()).await?;
    let member = records
        .into_iter()
        .map(|r| r.into_domain().map(|e| EmployeeView::from(&e)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut filters = Vec::new();
    if let Some(email) = query.email {
        filters.push(("email", email));
    }
    if let Some(position) = query.position {
        filters.push(("position", position));
    }

    Ok(Json(Collection::new("/api/employees", &filters, pagination, total, member)))
}

/// `GET /api/employees/:id`
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EmployeeView>> {
    let employee = load_employee(&state.db, id).await?;
    Ok(Json(EmployeeView::from(&employee)))
}

/// `POST /api/employees`
///
/// # Errors
///
/// - `400 Bad Request`: email already used by another employee
/// - `422 Unprocessable Entity`: invalid field, e.g. a non-positive salary
pub async fn create_employee(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(input): ValidatedJson<EmployeeInput>,
) -> ApiResult<(StatusCode, Json<EmployeeView>)> {
    let employee = Employee::hire(
        FullName::new(&input.first_name, &input.last_name)?,
        Email::new(&input.email)?,
        Position::new(&input.position)?,
        Salary::parse(input.salary_amount, &input.salary_currency)?,
        input.hired_at,
    );
    ensure_email_free(&state.db, employee.email(), None).await?;

    EmployeeRecord::from_domain(&employee).insert(&state.db).await?;
    tracing::info!(employee_id = %employee.id(), created_by = %auth.user_id, "Employee created");

    Ok((StatusCode::CREATED, Json(EmployeeView::from(&employee))))
}

async fn save(state: &AppState, id: Uuid, patch: EmployeePatch) -> ApiResult<Json<EmployeeView>> {
    let mut employee = load_employee(&state.db, id).await?;
    patch.apply(&mut employee)?;
    ensure_email_free(&state.db, employee.email(), Some(id)).await?;

    EmployeeRecord::from_domain(&employee)
        .update(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;
    tracing::debug!(employee_id = %id, "Employee updated");

    Ok(Json(EmployeeView::from(&employee)))
}

/// `PUT /api/employees/:id`
pub async fn replace_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<EmployeeInput>,
) -> ApiResult<Json<EmployeeView>> {
    save(&state, id, input.into()).await
}

/// `PATCH /api/employees/:id`
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<EmployeePatch>,
) -> ApiResult<Json<EmployeeView>> {
    save(&state, id, patch).await
}

/// `DELETE /api/employees/:id`
pub async fn delete_employee(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !EmployeeRecord::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Employee"));
    }
    tracing::info!(employee_id = %id, deleted_by = %auth.user_id, "Employee deleted");
    Ok(StatusCode::NO_CONTENT)
}
