/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/login_check` - Credentials in, token pair out
/// - `POST /api/auth/login` - Token pair plus the user and a message
/// - `POST /api/auth/refresh` - Exchange a refresh token for a new pair
/// - `GET /api/auth/me` - The authenticated user
///
/// Login and refresh are public; `me` needs an access token.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    routes::users::{load_user, UserView},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use staffdesk_shared::{
    auth::{
        jwt::{self, TokenPair},
        middleware::AuthContext,
        password,
    },
    domain::user::User,
    models::user::UserRecord,
};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// `username` is accepted as an alias
    #[serde(alias = "username")]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: UserView,
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Checks credentials and records the login
async fn verify_credentials(state: &AppState, req: &LoginRequest) -> ApiResult<User> {
    let record = UserRecord::find_by_email(&state.db, req.email.trim())
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;
    let mut user = record.into_domain()?;

    if !password::verify_password(&req.password, user.password_hash())? {
        tracing::debug!(user_id = %user.id(), "Password mismatch");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }
    if !user.is_active() {
        return Err(ApiError::Unauthorized("Account is disabled".to_string()));
    }

    UserRecord::update_last_login(&state.db, user.id()).await?;
    user.record_login();
    tracing::info!(user_id = %user.id(), "User logged in");

    Ok(user)
}

/// `POST /api/login_check`
///
/// ```text
/// { "username": "admin@staffdesk.test", "password": "..." }
/// ```
///
/// Response: `{"token": "eyJ...", "refresh_token": "eyJ..."}`
pub async fn login_check(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let user = verify_credentials(&state, &req).await?;
    let pair = jwt::issue_token_pair(&user, state.jwt_secret(), &state.config.jwt.ttl)?;
    Ok(Json(pair))
}

/// `POST /api/auth/login`
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email, wrong password or inactive account
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = verify_credentials(&state, &req).await?;
    let pair = jwt::issue_token_pair(&user, state.jwt_secret(), &state.config.jwt.ttl)?;

    Ok(Json(LoginResponse {
        token: pair.token,
        refresh_token: pair.refresh_token,
        user: UserView::from(&user),
        message: "Login successful".to_string(),
    }))
}

/// `POST /api/auth/refresh`
///
/// The user must still exist and be active; roles are re-read so the new
/// access token reflects any change since the last login.
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let user = match load_user(&state.db, claims.sub).await {
        Err(ApiError::NotFound(_)) => {
            return Err(ApiError::Unauthorized("User no longer exists".to_string()));
        }
        other => other?,
    };
    if !user.is_active() {
        return Err(ApiError::Unauthorized("Account is disabled".to_string()));
    }

    tracing::debug!(user_id = %user.id(), "Token refreshed");
    let pair = jwt::issue_token_pair(&user, state.jwt_secret(), &state.config.jwt.ttl)?;
    Ok(Json(pair))
}

/// `GET /api/auth/me`
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<UserView>> {
    let user = match load_user(&state.db, auth.user_id).await {
        Err(ApiError::NotFound(_)) => {
            return Err(ApiError::Unauthorized("User no longer exists".to_string()));
        }
        other => other?,
    };
    Ok(Json(UserView::from(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_accepts_username_alias() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"admin@staffdesk.test","password":"x"}"#).unwrap();
        assert_eq!(req.email, "admin@staffdesk.test");

        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"user@staffdesk.test","password":"x"}"#).unwrap();
        assert_eq!(req.email, "user@staffdesk.test");
    }

    #[test]
    fn test_empty_credentials_fail_validation() {
        let req = LoginRequest {
            email: String::new(),
            password: String::new(),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }
}
