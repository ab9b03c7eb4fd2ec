/// JSON body extractor with declarative validation
///
/// `ValidatedJson<T>` deserializes the body like `axum::Json` and then runs
/// `T::validate()`. Malformed JSON becomes a 400, a body that parses but
/// has wrong or missing fields becomes a 422, and so do validator failures.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                tracing::debug!(error = %err.body_text(), "JSON data error");
                ApiError::invalid("body", err.body_text())
            }
            JsonRejection::JsonSyntaxError(err) => {
                ApiError::BadRequest(format!("Invalid JSON syntax: {}", err.body_text()))
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::BadRequest("Content-Type must be application/json".to_string())
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
