/// User persistence record
///
/// Users only authenticate; they are not linked to employees. Passwords
/// are stored as Argon2id hashes, never in plaintext.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     email VARCHAR(180) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     roles TEXT[] NOT NULL DEFAULT ARRAY['ROLE_USER'],
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// CREATE UNIQUE INDEX users_email_unique ON users (LOWER(email));
/// ```
///
/// # Example
///
/// ```no_run
/// use staffdesk_shared::domain::identity::Email;
/// use staffdesk_shared::domain::user::{Role, User};
/// use staffdesk_shared::models::user::UserRecord;
/// use staffdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::register(
///     Email::new("admin@example.com")?,
///     "$argon2id$...".to_string(),
///     vec![Role::Admin],
/// );
/// UserRecord::from_domain(&user).insert(&pool).await?;
///
/// let found = UserRecord::find_by_email(&pool, "ADMIN@example.com").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::identity::Email;
use crate::domain::user::{Role, User, UserSnapshot};
use crate::domain::DomainError;

const COLUMNS: &str =
    "id, email, password_hash, roles, is_active, created_at, updated_at, last_login_at";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn from_domain(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().as_str().to_string(),
            password_hash: user.password_hash().to_string(),
            roles: user.roles().iter().map(|r| r.as_str().to_string()).collect(),
            is_active: user.is_active(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
            last_login_at: user.last_login_at(),
        }
    }

    /// Unknown role strings are skipped
    pub fn into_domain(self) -> Result<User, DomainError> {
        let roles = self
            .roles
            .iter()
            .filter_map(|r| match r.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!(user_id = %self.id, error = %e, "Ignoring stored role");
                    None
                }
            })
            .collect();

        Ok(User::restore(UserSnapshot {
            id: self.id,
            email: Email::new(&self.email)?,
            password_hash: self.password_hash,
            roles,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_login_at: self.last_login_at,
        }))
    }

    /// Inserts the record
    ///
    /// # Errors
    ///
    /// A duplicate email fails with a database error on constraint
    /// `users_email_unique`.
    pub async fn insert(&self, pool: &PgPool) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, UserRecord>(&query)
            .bind(self.id)
            .bind(&self.email)
            .bind(&self.password_hash)
            .bind(&self.roles)
            .bind(self.is_active)
            .bind(self.created_at)
            .bind(self.updated_at)
            .bind(self.last_login_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive lookup
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, UserRecord>(&query)
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// Lists users, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users ORDER BY created_at DESC, id LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, UserRecord>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    pub async fn update(&self, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, roles = $4, is_active = $5,
                updated_at = $6, last_login_at = $7
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, UserRecord>(&query)
            .bind(self.id)
            .bind(&self.email)
            .bind(&self.password_hash)
            .bind(&self.roles)
            .bind(self.is_active)
            .bind(self.updated_at)
            .bind(self.last_login_at)
            .fetch_optional(pool)
            .await
    }

    /// Sets `last_login_at` to now; called after successful authentication
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::register(
            Email::new("admin@example.com").unwrap(),
            "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA".to_string(),
            vec![Role::Admin],
        )
    }

    #[test]
    fn test_domain_round_trip() {
        let mut user = sample_user();
        user.record_login();

        let record = UserRecord::from_domain(&user);
        assert_eq!(record.roles, vec!["ROLE_USER", "ROLE_ADMIN"]);
        assert_eq!(record.into_domain().unwrap(), user);
    }

    #[test]
    fn test_unknown_roles_are_dropped() {
        let mut record = UserRecord::from_domain(&sample_user());
        record.roles = vec!["ROLE_SUPERUSER".to_string()];

        let user = record.into_domain().unwrap();
        assert_eq!(user.roles(), &[Role::User]);
    }
}
