/// Vacation request endpoints
///
/// # Endpoints
///
/// - `GET /api/vacations` - Paginated list, filters `employee` and `status`
/// - `POST /api/vacations` - Request vacation (eligibility checked)
/// - `GET /api/vacations/:id`
/// - `PUT /api/vacations/:id` - Replace dates and reason (pending only)
/// - `PATCH /api/vacations/:id` - Change dates or reason (pending only)
/// - `DELETE /api/vacations/:id`
/// - `POST /api/vacations/:id/approve` - admin only
/// - `POST /api/vacations/:id/reject` - admin only, optional `{"reason": "..."}`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    routes::{
        employees::load_employee,
        pagination::{Collection, PageQuery, Pagination},
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use staffdesk_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    domain::{period::VacationPeriod, status::VacationStatus, vacation::Vacation},
    models::vacation::{VacationFilter, VacationRecord},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationView {
    pub id: Uuid,
    pub employee: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    pub working_days: i64,
    pub reason: String,
    pub status: VacationStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Vacation> for VacationView {
    fn from(vacation: &Vacation) -> Self {
        Self {
            id: vacation.id(),
            employee: vacation.employee_id(),
            start_date: vacation.period().start(),
            end_date: vacation.period().end(),
            days: vacation.period().days(),
            working_days: vacation.period().working_days(),
            reason: vacation.reason().to_string(),
            status: vacation.status(),
            rejection_reason: vacation.rejection_reason().map(str::to_string),
            created_at: vacation.created_at(),
            updated_at: vacation.updated_at(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VacationInput {
    pub employee: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,
}

/// Body of PATCH; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VacationPatch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectInput {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationQuery {
    pub page: Option<u32>,
    pub items_per_page: Option<u32>,
    pub employee: Option<Uuid>,
    pub status: Option<String>,
}

impl VacationPatch {
    fn apply(self, vacation: &mut Vacation) -> ApiResult<()> {
        if self.start_date.is_some() || self.end_date.is_some() {
            let period = VacationPeriod::new(
                self.start_date.unwrap_or(vacation.period().start()),
                self.end_date.unwrap_or(vacation.period().end()),
            )?;
            vacation.reschedule(period)?;
        }
        if let Some(reason) = self.reason {
            vacation.change_reason(&reason)?;
        }
        Ok(())
    }
}

async fn load_vacation(pool: &PgPool, id: Uuid) -> ApiResult<Vacation> {
    let record = VacationRecord::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Vacation"))?;
    Ok(record.into_domain()?)
}

async fn store(pool: &PgPool, vacation: &Vacation) -> ApiResult<()> {
    VacationRecord::from_domain(vacation)
        .update(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Vacation"))?;
    Ok(())
}

/// Logs requests of the same employee that overlap `vacation`
async fn warn_on_overlap(pool: &PgPool, vacation: &Vacation) -> ApiResult<()> {
    for record in VacationRecord::list_for_employee(pool, vacation.employee_id()).await? {
        let other = record.into_domain()?;
        if vacation.conflicts_with(&other) {
            tracing::warn!(
                vacation_id = %vacation.id(),
                overlaps = %other.id(),
                employee_id = %vacation.employee_id(),
                "Vacation overlaps an existing request"
            );
        }
    }
    Ok(())
}

/// `GET /api/vacations`
pub async fn list_vacations(
    State(state): State<AppState>,
    Query(query): Query<VacationQuery>,
) -> ApiResult<Json<Collection<VacationView>>> {
    let pagination = Pagination::from(PageQuery {
        page: query.page,
        items_per_page: query.items_per_page,
    });
    let status = query
        .status
        .as_deref()
        .map(|raw| {
            raw.parse::<VacationStatus>()
                .map_err(|e| ApiError::invalid("status", e.to_string()))
        })
        .transpose()?;
    let filter = VacationFilter {
        employee_id: query.employee,
        status,
    };

    let total = VacationRecord::count(&state.db, &filter).await?;
    let records = VacationRecord::list(&state.db, &filter, pagination.limit(), pagination.offset()).await?;
    let member = records
        .into_iter()
        .map(|r| r.into_domain().map(|v| VacationView::from(&v)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut filters = Vec::new();
    if let Some(employee) = query.employee {
        filters.push(("employee", employee.to_string()));
    }
    if let Some(status) = status {
        filters.push(("status", status.to_string()));
    }

    Ok(Json(Collection::new("/api/vacations", &filters, pagination, total, member)))
}

/// `GET /api/vacations/:id`
pub async fn get_vacation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<VacationView>> {
    let vacation = load_vacation(&state.db, id).await?;
    Ok(Json(VacationView::from(&vacation)))
}

/// `POST /api/vacations`
///
/// # Errors
///
/// - `422 Unprocessable Entity`: unknown employee, less than three months
///   of service, an inverted date range or one longer than a year
pub async fn create_vacation(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(input): ValidatedJson<VacationInput>,
) -> ApiResult<(StatusCode, Json<VacationView>)> {
    let employee = match load_employee(&state.db, input.employee).await {
        Err(ApiError::NotFound(_)) => {
            return Err(ApiError::invalid("employee", "Employee does not exist"));
        }
        other => other?,
    };
    let period = VacationPeriod::new(input.start_date, input.end_date)?;
    let vacation = Vacation::request(&employee, period, &input.reason, Utc::now().date_naive())?;

    warn_on_overlap(&state.db, &vacation).await?;
    VacationRecord::from_domain(&vacation).insert(&state.db).await?;
    tracing::info!(
        vacation_id = %vacation.id(),
        employee_id = %employee.id(),
        days = vacation.period().days(),
        requested_by = %auth.user_id,
        "Vacation requested"
    );

    Ok((StatusCode::CREATED, Json(VacationView::from(&vacation))))
}

async fn save(state: &AppState, id: Uuid, patch: VacationPatch) -> ApiResult<Json<VacationView>> {
    let mut vacation = load_vacation(&state.db, id).await?;
    patch.apply(&mut vacation)?;
    store(&state.db, &vacation).await?;
    Ok(Json(VacationView::from(&vacation)))
}

/// `PUT /api/vacations/:id`
pub async fn replace_vacation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<VacationInput>,
) -> ApiResult<Json<VacationView>> {
    let current = load_vacation(&state.db, id).await?;
    if current.employee_id() != input.employee {
        return Err(ApiError::invalid("employee", "A vacation cannot move to another employee"));
    }

    save(
        &state,
        id,
        VacationPatch {
            start_date: Some(input.start_date),
            end_date: Some(input.end_date),
            reason: Some(input.reason),
        },
    )
    .await
}

/// `PATCH /api/vacations/:id`
pub async fn update_vacation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<VacationPatch>,
) -> ApiResult<Json<VacationView>> {
    save(&state, id, patch).await
}

/// `DELETE /api/vacations/:id`
pub async fn delete_vacation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !VacationRecord::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Vacation"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/vacations/:id/approve`
pub async fn approve_vacation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<VacationView>> {
    require_admin(&auth)?;

    let mut vacation = load_vacation(&state.db, id).await?;
    vacation.approve()?;
    store(&state.db, &vacation).await?;

    tracing::info!(vacation_id = %id, approved_by = %auth.user_id, "Vacation approved");
    Ok(Json(VacationView::from(&vacation)))
}

/// `POST /api/vacations/:id/reject`
pub async fn reject_vacation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    body: Option<Json<RejectInput>>,
) -> ApiResult<Json<VacationView>> {
    require_admin(&auth)?;
    let reason = body.and_then(|Json(input)| input.reason);

    let mut vacation = load_vacation(&state.db, id).await?;
    vacation.reject(reason.as_deref())?;
    store(&state.db, &vacation).await?;

    tracing::info!(vacation_id = %id, rejected_by = %auth.user_id, "Vacation rejected");
    Ok(Json(VacationView::from(&vacation)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use staffdesk_shared::domain::{
        employee::Employee,
        identity::{Email, FullName, Position},
        money::{Currency, Salary},
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn vacation() -> Vacation {
        let employee = Employee::hire(
            FullName::new("Jane", "Doe").unwrap(),
            Email::new("jane@example.com").unwrap(),
            Position::new("Designer").unwrap(),
            Salary::new(Decimal::new(3000, 0), Currency::Eur).unwrap(),
            date(2024, 1, 1),
        );
        Vacation::request(
            &employee,
            VacationPeriod::new(date(2025, 7, 7), date(2025, 7, 13)).unwrap(),
            "Summer trip",
            date(2025, 6, 1),
        )
        .unwrap()
    }

    #[test]
    fn test_view_counts_days() {
        let value = serde_json::to_value(VacationView::from(&vacation())).unwrap();
        assert_eq!(value["startDate"], "2025-07-07");
        assert_eq!(value["days"], 7);
        assert_eq!(value["workingDays"], 5);
        assert_eq!(value["status"], "pending");
        assert!(value["rejectionReason"].is_null());
    }

    #[test]
    fn test_patch_only_while_pending() {
        let mut v = vacation();
        VacationPatch {
            end_date: Some(date(2025, 7, 9)),
            ..Default::default()
        }
        .apply(&mut v)
        .unwrap();
        assert_eq!(v.period().days(), 3);

        v.approve().unwrap();
        let err = VacationPatch {
            reason: Some("Changed my mind".to_string()),
            ..Default::default()
        }
        .apply(&mut v)
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_patch_rejects_end_before_start() {
        let mut v = vacation();
        let err = VacationPatch {
            end_date: Some(date(2025, 7, 1)),
            ..Default::default()
        }
        .apply(&mut v)
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
