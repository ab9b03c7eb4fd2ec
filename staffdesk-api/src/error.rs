/// Error handling for the API server
///
/// Every handler returns `Result<T, ApiError>`; the error converts itself
/// into a JSON body of the form `{error, message, details?}` with the
/// matching status code.
///
/// # Example
///
/// ```
/// use staffdesk_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(found: bool) -> ApiResult<Json<serde_json::Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Employee not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use staffdesk_shared::{
    auth::{
        authorization::AuthzError, jwt::JwtError, middleware::AuthError, password::PasswordError,
    },
    domain::DomainError,
};
use std::fmt;

/// Unique constraints whose violation means "email already taken"
const EMAIL_CONSTRAINTS: &[&str] = &["employees_email_unique", "users_email_unique"];

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// 400, also used for duplicate emails
    BadRequest(String),

    /// 401
    Unauthorized(String),

    /// 403
    Forbidden(String),

    /// 404
    NotFound(String),

    /// 409, e.g. paying a cancelled payroll
    Conflict(String),

    /// 422 with one entry per offending field
    ValidationError(Vec<ValidationErrorDetail>),

    /// 500; the message is logged, never returned
    InternalError(String),

    /// 503
    ServiceUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine readable code, e.g. `validation_error`
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// 422 for a single field
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    pub fn not_found(resource: &str) -> Self {
        ApiError::NotFound(format!("{} not found", resource))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg, None),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}

/// Field a domain error is reported against
fn domain_error_field(err: &DomainError) -> &'static str {
    match err {
        DomainError::NegativeAmount(_)
        | DomainError::NonPositiveAmount(_)
        | DomainError::AmountOutOfRange
        | DomainError::InvalidFactor(_)
        | DomainError::DeductionsExceedGross { .. } => "amount",
        DomainError::UnsupportedCurrency(_) | DomainError::CurrencyMismatch { .. } => "currency",
        DomainError::InvalidDateRange { .. }
        | DomainError::PeriodTooLong { .. }
        | DomainError::InvalidMonth { .. } => "period",
        DomainError::UnknownStatus(_)
        | DomainError::InvalidTransition { .. }
        | DomainError::Immutable(_) => "status",
        DomainError::InvalidEmail(_) => "email",
        DomainError::InvalidName(_) => "name",
        DomainError::InvalidPosition(_) => "position",
        DomainError::InvalidReason(_) => "reason",
        DomainError::NotEligible { .. } => "employee",
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        if err.is_state_conflict() {
            return ApiError::Conflict(err.to_string());
        }
        ApiError::invalid(domain_error_field(&err), err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.constraint() {
                Some(constraint) if EMAIL_CONSTRAINTS.contains(&constraint) => {
                    ApiError::BadRequest("Email already exists".to_string())
                }
                Some(constraint) if db_err.is_foreign_key_violation() => {
                    ApiError::invalid("employee", format!("Unknown reference ({})", constraint))
                }
                Some(constraint) => {
                    ApiError::Conflict(format!("Constraint violation: {}", constraint))
                }
                None => ApiError::InternalError(format!("Database error: {}", db_err)),
            },
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(format!("Token creation failed: {}", msg)),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            other => ApiError::Unauthorized(format!("Invalid token: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use staffdesk_shared::domain::user::Role;
    use validator::Validate;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::not_found("Employee");
        assert_eq!(err.to_string(), "Not found: Employee not found");
    }

    #[test]
    fn test_domain_errors_map_to_422_or_409() {
        let err: ApiError = DomainError::NegativeAmount(Decimal::NEGATIVE_ONE).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        match err {
            ApiError::ValidationError(details) => assert_eq!(details[0].field, "amount"),
            other => panic!("unexpected {:?}", other),
        }

        let err: ApiError = DomainError::AmountOutOfRange.into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        match err {
            ApiError::ValidationError(details) => assert_eq!(details[0].field, "amount"),
            other => panic!("unexpected {:?}", other),
        }

        let err: ApiError = DomainError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err: ApiError = DomainError::PeriodTooLong { days: 400, max: 365 }.into();
        match err {
            ApiError::ValidationError(details) => assert_eq!(details[0].field, "period"),
            other => panic!("unexpected {:?}", other),
        }

        let err: ApiError = DomainError::InvalidTransition {
            from: "paid".to_string(),
            to: "processed".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_auth_errors() {
        let err: ApiError = AuthError::MissingCredentials.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err: ApiError = AuthzError::MissingRole(Role::Admin).into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err: ApiError = JwtError::Expired.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[derive(Validate)]
    struct Form {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_validator_errors_become_details() {
        let form = Form {
            email: "nope".to_string(),
            name: String::new(),
        };
        let err: ApiError = form.validate().unwrap_err().into();

        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(details.len(), 2);
                assert_eq!(details[0].field, "email");
                assert_eq!(details[0].message, "Invalid email format");
                assert_eq!(details[1].field, "name");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = ApiError::InternalError("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
