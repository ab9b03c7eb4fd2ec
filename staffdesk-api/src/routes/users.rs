/// User account endpoints (admin only)
///
/// # Endpoints
///
/// - `GET /api/users`
/// - `POST /api/users`
/// - `GET /api/users/:id`
/// - `PUT /api/users/:id`
/// - `PATCH /api/users/:id`
/// - `DELETE /api/users/:id`
///
/// Passwords are hashed before they are stored and the hash never appears
/// in a response.

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
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use staffdesk_shared::{
    auth::{
        authorization::require_admin,
        middleware::AuthContext,
        password::{hash_password, validate_password_strength},
    },
    domain::{
        identity::Email,
        user::{Role, User},
    },
    models::user::UserRecord,
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().to_string(),
            roles: user.roles().to_vec(),
            is_active: user.is_active(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
            last_login_at: user.last_login_at(),
        }
    }
}

/// Body of POST and PUT
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(default)]
    pub roles: Vec<Role>,

    pub is_active: Option<bool>,
}

/// Body of PATCH; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub password: Option<String>,

    pub roles: Option<Vec<Role>>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub page: Option<u32>,
    pub items_per_page: Option<u32>,
}

fn checked_hash(password: &str) -> ApiResult<String> {
    validate_password_strength(password).map_err(|e| ApiError::invalid("password", e))?;
    Ok(hash_password(password)?)
}

impl UserPatch {
    fn apply(self, user: &mut User) -> ApiResult<()> {
        if let Some(email) = self.email {
            user.change_email(Email::new(&email)?);
        }
        if let Some(password) = self.password {
            user.change_password_hash(checked_hash(&password)?);
        }
        if let Some(roles) = self.roles {
            user.set_roles(roles);
        }
        match self.is_active {
            Some(true) => user.activate(),
            Some(false) => user.deactivate(),
            None => {}
        }
        Ok(())
    }
}

impl From<UserInput> for UserPatch {
    fn from(input: UserInput) -> Self {
        Self {
            email: Some(input.email),
            password: Some(input.password),
            roles: Some(input.roles),
            is_active: Some(input.is_active.unwrap_or(true)),
        }
    }
}

pub async fn load_user(pool: &PgPool, id: Uuid) -> ApiResult<User> {
    let record = UserRecord::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(record.into_domain()?)
}

async fn ensure_email_free(pool: &PgPool, email: &Email, own_id: Option<Uuid>) -> ApiResult<()> {
    if let Some(existing) = UserRecord::find_by_email(pool, email.as_str()).await? {
        if Some(existing.id) != own_id {
            return Err(ApiError::BadRequest("Email already exists".to_string()));
        }
    }
    Ok(())
}

/// `GET /api/users`
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Collection<UserView>>> {
    require_admin(&auth)?;
    let pagination = Pagination::from(PageQuery {
        page: query.page,
        items_per_page: query.items_per_page,
    });

    let total = UserRecord::count(&state.db).await?;
    let records = UserRecord::list(&state.db, pagination.limit(), pagination.offset()).await?;
    let member = records
        .into_iter()
        .map(|r| r.into_domain().map(|u| UserView::from(&u)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(Collection::new("/api/users", &[], pagination, total, member)))
}

/// `GET /api/users/:id`
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserView>> {
    require_admin(&auth)?;
    let user = load_user(&state.db, id).await?;
    Ok(Json(UserView::from(&user)))
}

/// `POST /api/users`
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(input): ValidatedJson<UserInput>,
) -> ApiResult<(StatusCode, Json<UserView>)> {
    require_admin(&auth)?;

    let email = Email::new(&input.email)?;
    let mut user = User::register(email, checked_hash(&input.password)?, input.roles);
    if input.is_active == Some(false) {
        user.deactivate();
    }
    ensure_email_free(&state.db, user.email(), None).await?;

    UserRecord::from_domain(&user).insert(&state.db).await?;
    tracing::info!(user_id = %user.id(), created_by = %auth.user_id, "User created");

    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

async fn save(state: &AppState, id: Uuid, patch: UserPatch) -> ApiResult<Json<UserView>> {
    let mut user = load_user(&state.db, id).await?;
    patch.apply(&mut user)?;
    ensure_email_free(&state.db, user.email(), Some(id)).await?;

    UserRecord::from_domain(&user)
        .update(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(UserView::from(&user)))
}

/// `PUT /api/users/:id`
pub async fn replace_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<UserInput>,
) -> ApiResult<Json<UserView>> {
    require_admin(&auth)?;
    save(&state, id, input.into()).await
}

/// `PATCH /api/users/:id`
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<UserPatch>,
) -> ApiResult<Json<UserView>> {
    require_admin(&auth)?;
    save(&state, id, patch).await
}

/// `DELETE /api/users/:id`
///
/// Admins cannot delete their own account.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;
    if auth.user_id == id {
        return Err(ApiError::BadRequest("Cannot delete your own account".to_string()));
    }

    if !UserRecord::delete(&state.db, id).await? {
        return Err(ApiError::not_found("User"));
    }
    tracing::info!(user_id = %id, deleted_by = %auth.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::register(
            Email::new("jane@example.com").unwrap(),
            "$argon2id$placeholder".to_string(),
            vec![],
        )
    }

    #[test]
    fn test_view_hides_password_hash() {
        let value = serde_json::to_value(UserView::from(&user())).unwrap();
        assert_eq!(value["email"], "jane@example.com");
        assert_eq!(value["roles"], serde_json::json!(["ROLE_USER"]));
        assert_eq!(value["isActive"], true);
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn test_patch_roles_and_active_flag() {
        let mut u = user();
        UserPatch {
            roles: Some(vec![Role::Admin]),
            is_active: Some(false),
            ..Default::default()
        }
        .apply(&mut u)
        .unwrap();

        assert!(u.is_admin());
        assert!(u.has_role(Role::User));
        assert!(!u.is_active());
    }

    #[test]
    fn test_weak_password_is_rejected() {
        let mut u = user();
        let err = UserPatch {
            password: Some("short".to_string()),
            ..Default::default()
        }
        .apply(&mut u)
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(u.password_hash(), "$argon2id$placeholder");
    }
}
