//! Client error types
//!
//! Every failure maps to one of five kinds, each with a stable code:
//!
//! | Kind           | Code               | Raised for                          |
//! |----------------|--------------------|-------------------------------------|
//! | `Network`      | `NETWORK_ERROR`    | connection failures, timeouts       |
//! | `NotFound`     | `NOT_FOUND`        | 404                                 |
//! | `Validation`   | `VALIDATION_ERROR` | 400, 422, client-side form checks   |
//! | `Unauthorized` | `UNAUTHORIZED`     | 401, 403, failed token refresh      |
//! | `Server`       | `SERVER_ERROR`     | 5xx, 409, unreadable responses      |

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// One invalid field reported by the API or by form validation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Client error type
///
/// Cloneable so one refresh failure can be handed to every waiting request.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Request never got a response
    #[error("Network error: {0}")]
    Network(String),

    /// Missing, expired or rejected credentials
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// Authenticated but lacking a role
    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    /// Request conflicts with the resource state, e.g. paying a pending payroll
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Token storage error: {0}")]
    Storage(String),
}

/// Coarse classification of a [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    NotFound,
    Validation,
    Unauthorized,
    Server,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Server => "SERVER_ERROR",
        }
    }
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Vec<FieldError>>,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Unauthorized(_) | ClientError::Forbidden(_) => ErrorKind::Unauthorized,
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::Conflict(_)
            | ClientError::Server { .. }
            | ClientError::InvalidResponse(_)
            | ClientError::Storage(_) => ErrorKind::Server,
        }
    }

    /// Stable code of [`Self::kind`], e.g. `NETWORK_ERROR`
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Field errors of a validation failure; empty otherwise
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ClientError::Validation { fields, .. } => fields,
            _ => &[],
        }
    }

    /// Builds the error for a non-success response
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Request failed").to_string()
                } else {
                    body.to_string()
                }
            });

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation {
                message,
                fields: parsed.and_then(|b| b.details).unwrap_or_default(),
            },
            _ => ClientError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        ClientError::Validation {
            message: "Form validation failed".to_string(),
            fields,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let cases = [
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
            (StatusCode::NOT_FOUND, "NOT_FOUND"),
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            (StatusCode::CONFLICT, "SERVER_ERROR"),
            (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR"),
            (StatusCode::SERVICE_UNAVAILABLE, "SERVER_ERROR"),
        ];
        for (status, code) in cases {
            assert_eq!(ClientError::from_response(status, "").code(), code, "{}", status);
        }
        assert_eq!(ClientError::Network("refused".into()).code(), "NETWORK_ERROR");
    }

    #[test]
    fn test_api_error_body_is_parsed() {
        let body = r#"{
            "error": "validation_error",
            "message": "Request validation failed",
            "details": [{"field": "email", "message": "Invalid email format"}]
        }"#;
        let err = ClientError::from_response(StatusCode::UNPROCESSABLE_ENTITY, body);

        assert_eq!(err.to_string(), "Validation error: Request validation failed");
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].field, "email");
    }

    #[test]
    fn test_plain_text_body_becomes_message() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            ClientError::Server { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_body_uses_reason_phrase() {
        let err = ClientError::from_response(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "Not found: Not Found");
    }
}
