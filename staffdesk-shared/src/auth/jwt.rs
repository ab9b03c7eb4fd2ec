/// JWT issuing and validation
///
/// Tokens are HS256-signed and carry the user's id, email and roles so the
/// API can authorize requests without a database round trip. Access tokens
/// authenticate requests; refresh tokens are only accepted by the refresh
/// endpoint.
///
/// # Example
///
/// ```
/// use staffdesk_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use staffdesk_shared::domain::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-of-at-least-thirty-two-bytes";
/// let claims = Claims::new(Uuid::new_v4(), "jane@example.com", vec![Role::User], TokenType::Access);
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_access_token(&token, secret)?;
/// assert_eq!(validated.email, "jane@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::{Role, User};

/// `iss` claim of every token
pub const ISSUER: &str = "staffdesk";

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token issuer")]
    InvalidIssuer,

    #[error("Expected {expected} token, got {actual} token")]
    WrongTokenType {
        expected: TokenType,
        actual: TokenType,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifetimes of issued tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenTtl {
    /// One hour for access tokens, thirty days for refresh tokens
    fn default() -> Self {
        Self {
            access: Duration::hours(1),
            refresh: Duration::days(30),
        }
    }
}

impl TokenTtl {
    pub fn for_type(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access,
            TokenType::Refresh => self.refresh,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub token_type: TokenType,
}

impl Claims {
    /// Claims expiring after the default lifetime of `token_type`
    pub fn new(user_id: Uuid, email: &str, roles: Vec<Role>, token_type: TokenType) -> Self {
        let expires_in = TokenTtl::default().for_type(token_type);
        Self::with_expiration(user_id, email, roles, token_type, expires_in)
    }

    pub fn with_expiration(
        user_id: Uuid,
        email: &str,
        roles: Vec<Role>,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email: email.to_string(),
            roles,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    pub fn for_user(user: &User, token_type: TokenType, ttl: &TokenTtl) -> Self {
        Self::with_expiration(
            user.id(),
            user.email().as_str(),
            user.roles().to_vec(),
            token_type,
            ttl.for_type(token_type),
        )
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn time_until_expiration(&self) -> Option<Duration> {
        let remaining = self.exp - Utc::now().timestamp();
        (remaining > 0).then(|| Duration::seconds(remaining))
    }
}

/// Access and refresh token issued together at login and refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Issues a fresh access and refresh token for `user`
pub fn issue_token_pair(user: &User, secret: &str, ttl: &TokenTtl) -> Result<TokenPair, JwtError> {
    Ok(TokenPair {
        token: create_token(&Claims::for_user(user, TokenType::Access, ttl), secret)?,
        refresh_token: create_token(&Claims::for_user(user, TokenType::Refresh, ttl), secret)?,
    })
}

/// Checks signature, expiry, not-before and issuer
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_nbf = true;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
            _ => JwtError::ValidationError(e.to_string()),
        })
}

fn expect_type(claims: Claims, expected: TokenType) -> Result<Claims, JwtError> {
    if claims.token_type != expected {
        return Err(JwtError::WrongTokenType {
            expected,
            actual: claims.token_type,
        });
    }
    Ok(claims)
}

pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    expect_type(validate_token(token, secret)?, TokenType::Access)
}

pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    expect_type(validate_token(token, secret)?, TokenType::Refresh)
}
