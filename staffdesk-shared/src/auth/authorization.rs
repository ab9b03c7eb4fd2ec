/// Role checks
///
/// Two roles exist: every authenticated user holds `ROLE_USER`, and
/// `ROLE_ADMIN` unlocks status transitions of vacation requests and user
/// management.
///
/// # Example
///
/// ```
/// use staffdesk_shared::auth::authorization::{require_role, AuthzError};
/// use staffdesk_shared::auth::middleware::AuthContext;
/// use staffdesk_shared::domain::user::Role;
/// use uuid::Uuid;
///
/// let auth = AuthContext {
///     user_id: Uuid::new_v4(),
///     email: "jane@example.com".to_string(),
///     roles: vec![Role::User],
/// };
/// assert!(require_role(&auth, Role::User).is_ok());
/// assert!(matches!(require_role(&auth, Role::Admin), Err(AuthzError::MissingRole(Role::Admin))));
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::domain::user::Role;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("Missing required role {0}")]
    MissingRole(Role),

    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

pub fn require_role(auth: &AuthContext, role: Role) -> Result<(), AuthzError> {
    if !auth.has_role(role) {
        tracing::debug!(user_id = %auth.user_id, role = %role, "Role check failed");
        return Err(AuthzError::MissingRole(role));
    }
    Ok(())
}

pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    require_role(auth, Role::Admin)
}

/// Passes for the user themselves or any admin
pub fn require_self_or_admin(auth: &AuthContext, user_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id == user_id || auth.is_admin() {
        return Ok(());
    }
    Err(AuthzError::NotAuthorized)
}
