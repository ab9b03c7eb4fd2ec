//! Login state on top of [`ApiClient`]

use chrono::Duration;
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::store::StoredSession;
use crate::token;
use crate::types::{LoginResponse, User};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const ME_PATH: &str = "/api/auth/me";

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    client: ApiClient,
}

impl AuthSession {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Exchanges credentials for tokens and stores the session
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation {
                message: "Email and password are required".to_string(),
                fields: vec![],
            });
        }

        let response: LoginResponse = self
            .client
            .post_public(LOGIN_PATH, &Credentials { email: email.trim(), password })
            .await?;

        let session = StoredSession::new(response.token, Some(response.refresh_token))
            .with_user(response.user.clone());
        self.client.store().save(&session).await?;
        tracing::info!(user_id = %response.user.id, "Logged in");

        Ok(response.user)
    }

    /// Forgets the session; the server keeps no login state
    pub async fn logout(&self) -> ClientResult<()> {
        self.client.store().clear().await?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// User saved at login, without asking the server
    pub async fn current_user(&self) -> ClientResult<Option<User>> {
        Ok(self.client.store().load().await?.and_then(|s| s.user))
    }

    /// True when an access token is stored and not yet expired
    pub async fn is_authenticated(&self) -> bool {
        match self.client.store().load().await {
            Ok(Some(session)) => !token::is_expired(&session.token, Duration::zero()),
            _ => false,
        }
    }

    /// Asks the server who the token belongs to and stores the answer
    pub async fn fetch_current_user(&self) -> ClientResult<User> {
        let user: User = self.client.get(ME_PATH).await?;
        if let Some(session) = self.client.store().load().await? {
            self.client.store().save(&session.with_user(user.clone())).await?;
        }
        Ok(user)
    }

    /// Resumes a stored session, e.g. at startup
    ///
    /// An expired access token is refreshed when a refresh token is stored;
    /// otherwise the stale session is dropped.
    pub async fn restore(&self) -> ClientResult<Option<User>> {
        let Some(session) = self.client.store().load().await? else {
            return Ok(None);
        };

        if token::is_expired(&session.token, Duration::zero()) {
            if session.refresh_token.is_none() {
                tracing::debug!("Stored session expired");
                self.client.store().clear().await?;
                return Ok(None);
            }
            match self.client.refresh().await {
                Ok(_) => {}
                Err(ClientError::Unauthorized(_)) => return Ok(None),
                Err(e) => return Err(e),
            }
        }

        match session.user {
            Some(user) if !token::is_expired(&session.token, Duration::zero()) => Ok(Some(user)),
            _ => self.fetch_current_user().await.map(Some),
        }
    }
}
