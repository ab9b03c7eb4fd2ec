/// Payroll endpoints
///
/// # Endpoints
///
/// - `GET /api/payrolls` - Paginated list, filters `employee` and `status`
/// - `POST /api/payrolls` - Create a pending payroll
/// - `GET /api/payrolls/:id`
/// - `PATCH /api/payrolls/:id` - Adjust amounts or period (pending only)
/// - `DELETE /api/payrolls/:id`
/// - `POST /api/payrolls/:id/process` - pending -> processed
/// - `POST /api/payrolls/:id/pay` - processed -> paid
/// - `POST /api/payrolls/:id/cancel` - pending or processed -> cancelled
///
/// On creation `grossAmount` defaults to the employee's salary and
/// `deductions` to the standard rates. The net amount is always derived.
///
/// # Errors
///
/// - `409 Conflict`: illegal transition, or editing a non-pending payroll
/// - `422 Unprocessable Entity`: invalid period, amount or currency

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
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use staffdesk_shared::{
    auth::middleware::AuthContext,
    domain::{
        money::{Currency, Deductions, GrossSalary},
        payroll::Payroll,
        period::PayrollPeriod,
        status::PayrollStatus,
    },
    models::payroll::{PayrollFilter, PayrollRecord},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollView {
    pub id: Uuid,
    pub employee: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub gross_amount: Decimal,
    pub currency: String,
    pub taxes: Decimal,
    pub social_security: Decimal,
    pub health_insurance: Decimal,
    pub total_deductions: Decimal,
    pub net_amount: Decimal,
    pub status: PayrollStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Payroll> for PayrollView {
    fn from(payroll: &Payroll) -> Self {
        let deductions = payroll.deductions();
        Self {
            id: payroll.id(),
            employee: payroll.employee_id(),
            period_start: payroll.period().start(),
            period_end: payroll.period().end(),
            gross_amount: payroll.gross().amount(),
            currency: payroll.gross().currency().to_string(),
            taxes: deductions.taxes().amount(),
            social_security: deductions.social_security().amount(),
            health_insurance: deductions.health_insurance().amount(),
            total_deductions: payroll.gross().amount() - payroll.net().amount(),
            net_amount: payroll.net().amount(),
            status: payroll.status(),
            processed_at: payroll.processed_at(),
            paid_at: payroll.paid_at(),
            created_at: payroll.created_at(),
            updated_at: payroll.updated_at(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionsInput {
    pub taxes: Decimal,
    pub social_security: Decimal,
    pub health_insurance: Decimal,
}

impl DeductionsInput {
    fn into_domain(self, currency: Currency) -> ApiResult<Deductions> {
        Ok(Deductions::new(
            self.taxes,
            self.social_security,
            self.health_insurance,
            currency,
        )?)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayrollInput {
    pub employee: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub gross_amount: Option<Decimal>,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,
    pub deductions: Option<DeductionsInput>,
}

/// Body of PATCH; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayrollPatch {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub gross_amount: Option<Decimal>,
    pub deductions: Option<DeductionsInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollQuery {
    pub page: Option<u32>,
    pub items_per_page: Option<u32>,
    pub employee: Option<Uuid>,
    pub status: Option<String>,
}

impl PayrollPatch {
    fn apply(self, payroll: &mut Payroll) -> ApiResult<()> {
        if self.period_start.is_some() || self.period_end.is_some() {
            let period = PayrollPeriod::new(
                self.period_start.unwrap_or(payroll.period().start()),
                self.period_end.unwrap_or(payroll.period().end()),
            )?;
            payroll.reschedule(period)?;
        }

        if self.gross_amount.is_some() || self.deductions.is_some() {
            let currency = payroll.gross().currency();
            let gross = match self.gross_amount {
                Some(amount) => GrossSalary::new(amount, currency)?,
                None => *payroll.gross(),
            };
            let deductions = match self.deductions {
                Some(input) => input.into_domain(currency)?,
                // Standard rates on the new gross
                None => Deductions::standard_for(&gross)?,
            };
            payroll.adjust(gross, deductions)?;
        }
        Ok(())
    }
}

fn parse_status(raw: &str) -> ApiResult<PayrollStatus> {
    raw.parse::<PayrollStatus>()
        .map_err(|e| ApiError::invalid("status", e.to_string()))
}

async fn load_payroll(pool: &PgPool, id: Uuid) -> ApiResult<Payroll> {
    let record = PayrollRecord::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payroll"))?;
    Ok(record.into_domain()?)
}

async fn store(pool: &PgPool, payroll: &Payroll) -> ApiResult<()> {
    PayrollRecord::from_domain(payroll)
        .update(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Payroll"))?;
    Ok(())
}

/// `GET /api/payrolls`
pub async fn list_payrolls(
    State(state): State<AppState>,
    Query(query): Query<PayrollQuery>,
) -> ApiResult<Json<Collection<PayrollView>>> {
    let pagination = Pagination::from(PageQuery {
        page: query.page,
        items_per_page: query.items_per_page,
    });
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let filter = PayrollFilter {
        employee_id: query.employee,
        status,
    };

    let total = PayrollRecord::count(&state.db, &filter).await?;
    let records = PayrollRecord::list(&state.db, &filter, pagination.limit(), pagination.offset()).await?;
    let member = records
        .into_iter()
        .map(|r| r.into_domain().map(|p| PayrollView::from(&p)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut filters = Vec::new();
    if let Some(employee) = query.employee {
        filters.push(("employee", employee.to_string()));
    }
    if let Some(status) = status {
        filters.push(("status", status.to_string()));
    }

    Ok(Json(Collection::new("/api/payrolls", &filters, pagination, total, member)))
}

/// `GET /api/payrolls/:id`
pub async fn get_payroll(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PayrollView>> {
    let payroll = load_payroll(&state.db, id).await?;
    Ok(Json(PayrollView::from(&payroll)))
}

/// `POST /api/payrolls`
pub async fn create_payroll(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(input): ValidatedJson<PayrollInput>,
) -> ApiResult<(StatusCode, Json<PayrollView>)> {
    let employee = match load_employee(&state.db, input.employee).await {
        Err(ApiError::NotFound(_)) => {
            return Err(ApiError::invalid("employee", "Employee does not exist"));
        }
        other => other?,
    };
    let period = PayrollPeriod::new(input.period_start, input.period_end)?;

    let currency = match input.currency.as_deref() {
        Some(code) => code.parse::<Currency>()?,
        None => employee.salary().currency(),
    };
    let gross = match input.gross_amount {
        Some(amount) => GrossSalary::new(amount, currency)?,
        None if currency == employee.salary().currency() => employee.salary().to_gross(),
        None => {
            return Err(ApiError::invalid(
                "grossAmount",
                "grossAmount is required when the currency differs from the salary currency",
            ));
        }
    };
    let deductions = match input.deductions {
        Some(d) => d.into_domain(currency)?,
        None => Deductions::standard_for(&gross)?,
    };

    let payroll = Payroll::create(employee.id(), period, gross, deductions)?;
    PayrollRecord::from_domain(&payroll).insert(&state.db).await?;
    tracing::info!(
        payroll_id = %payroll.id(),
        employee_id = %employee.id(),
        net = %payroll.net().amount(),
        created_by = %auth.user_id,
        "Payroll created"
    );

    Ok((StatusCode::CREATED, Json(PayrollView::from(&payroll))))
}

/// `PATCH /api/payrolls/:id`
pub async fn update_payroll(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<PayrollPatch>,
) -> ApiResult<Json<PayrollView>> {
    let mut payroll = load_payroll(&state.db, id).await?;
    patch.apply(&mut payroll)?;
    store(&state.db, &payroll).await?;
    Ok(Json(PayrollView::from(&payroll)))
}

/// `DELETE /api/payrolls/:id`
pub async fn delete_payroll(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !PayrollRecord::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Payroll"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn transition(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
    step: fn(&mut Payroll) -> Result<(), staffdesk_shared::domain::DomainError>,
) -> ApiResult<Json<PayrollView>> {
    let mut payroll = load_payroll(&state.db, id).await?;
    let from = payroll.status();
    step(&mut payroll)?;
    store(&state.db, &payroll).await?;

    tracing::info!(
        payroll_id = %id,
        from = %from,
        to = %payroll.status(),
        by = %auth.user_id,
        "Payroll status changed"
    );
    Ok(Json(PayrollView::from(&payroll)))
}

/// `POST /api/payrolls/:id/process`
pub async fn process_payroll(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PayrollView>> {
    transition(&state, &auth, id, Payroll::process).await
}

/// `POST /api/payrolls/:id/pay`
pub async fn pay_payroll(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PayrollView>> {
    transition(&state, &auth, id, Payroll::pay).await
}

/// `POST /api/payrolls/:id/cancel`
pub async fn cancel_payroll(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PayrollView>> {
    transition(&state, &auth, id, Payroll::cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payroll() -> Payroll {
        let gross = GrossSalary::new(Decimal::new(4000, 0), Currency::Eur).unwrap();
        Payroll::create(
            Uuid::new_v4(),
            PayrollPeriod::for_month(2025, 5).unwrap(),
            gross,
            Deductions::standard_for(&gross).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_view_fields() {
        let value = serde_json::to_value(PayrollView::from(&payroll())).unwrap();
        assert_eq!(value["periodStart"], "2025-05-01");
        assert_eq!(value["periodEnd"], "2025-05-31");
        assert_eq!(value["status"], "pending");
        assert_eq!(value["currency"], "EUR");
        let net: Decimal = value["netAmount"].as_str().unwrap().parse().unwrap();
        assert_eq!(net, Decimal::new(2700, 0));
        assert!(value["processedAt"].is_null());
    }

    #[test]
    fn test_patch_deductions_recomputes_net() {
        let mut p = payroll();
        PayrollPatch {
            deductions: Some(DeductionsInput {
                taxes: Decimal::new(1000, 0),
                social_security: Decimal::ZERO,
                health_insurance: Decimal::ZERO,
            }),
            ..Default::default()
        }
        .apply(&mut p)
        .unwrap();

        assert_eq!(p.net().amount(), Decimal::new(3000, 0));
    }

    #[test]
    fn test_patch_after_processing_conflicts() {
        let mut p = payroll();
        p.process().unwrap();

        let err = PayrollPatch {
            gross_amount: Some(Decimal::new(5000, 0)),
            ..Default::default()
        }
        .apply(&mut p)
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_patch_rejects_inverted_period() {
        let mut p = payroll();
        let err = PayrollPatch {
            period_end: NaiveDate::from_ymd_opt(2025, 4, 1),
            ..Default::default()
        }
        .apply(&mut p)
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!(parse_status("paid").unwrap(), PayrollStatus::Paid);
        assert_eq!(
            parse_status("bogus").unwrap_err().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
