//! HTTP transport with bearer authentication
//!
//! Every request carries the stored access token. When the API answers 401
//! and a refresh token is stored, the client refreshes once and replays the
//! request:
//!
//! ```text
//! request A ──401──┐
//!                  ├── one POST /api/auth/refresh ──► A and B replayed
//! request B ──401──┘
//! ```
//!
//! All requests that fail while a refresh is running wait for that same
//! refresh. If it fails, every waiter gets [`ClientError::Unauthorized`] and
//! the stored session is cleared.

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::{ClientError, ClientResult};
use crate::store::TokenStore;
use crate::types::TokenPair;

pub const REFRESH_PATH: &str = "/api/auth/refresh";

type RefreshFuture = Shared<BoxFuture<'static, ClientResult<String>>>;

struct Inner {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    refreshing: Mutex<Option<RefreshFuture>>,
}

impl Inner {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Cheap to clone; clones share the session and the in-flight refresh
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

/// A request that can be sent again after a refresh
struct Outgoing<'a> {
    method: Method,
    path: &'a str,
    query: &'a [(String, String)],
    body: Option<Value>,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_http(http, base_url, store))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                store,
                refreshing: Mutex::new(None),
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.inner.store
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.get_query(path, &[]).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ClientResult<T> {
        let response = self
            .execute(Outgoing {
                method: Method::GET,
                path,
                query,
                body: None,
            })
            .await?;
        decode(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send_json(Method::POST, path, Some(serde_json::to_value(body)?)).await
    }

    /// POST without a body, used by the state transition endpoints
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send_json(Method::POST, path, None).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send_json(Method::PUT, path, Some(serde_json::to_value(body)?)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send_json(Method::PATCH, path, Some(serde_json::to_value(body)?)).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.execute(Outgoing {
            method: Method::DELETE,
            path,
            query: &[],
            body: None,
        })
        .await?;
        Ok(())
    }

    /// POST without credentials and without refresh handling
    pub async fn post_public<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .inner
            .http
            .post(self.inner.url(path))
            .json(body)
            .send()
            .await?;
        decode(check(response).await?).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<T> {
        let response = self
            .execute(Outgoing {
                method,
                path,
                query: &[],
                body,
            })
            .await?;
        decode(response).await
    }

    async fn stored_token(&self) -> ClientResult<Option<String>> {
        Ok(self.inner.store.load().await?.map(|s| s.token))
    }

    async fn send_once(
        &self,
        request: &Outgoing<'_>,
        token: Option<&str>,
    ) -> ClientResult<reqwest::Response> {
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), self.inner.url(request.path));
        if !request.query.is_empty() {
            builder = builder.query(request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder.send().await?)
    }

    /// Sends `request`, refreshing and replaying once on 401
    async fn execute(&self, request: Outgoing<'_>) -> ClientResult<reqwest::Response> {
        let sent_with = self.stored_token().await?;
        let response = self.send_once(&request, sent_with.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return check(response).await;
        }
        let Some(sent_with) = sent_with else {
            return check(response).await;
        };

        let token = self.refresh_after(Some(&sent_with)).await?;

        tracing::debug!(method = %request.method, path = request.path, "Replaying request with new token");
        let replayed = self.send_once(&request, Some(&token)).await?;
        check(replayed).await
    }

    /// Joins the running refresh or starts one
    pub async fn refresh(&self) -> ClientResult<String> {
        self.refresh_after(None).await
    }

    /// Like [`refresh`](Self::refresh), but returns the stored token without
    /// a new exchange when it no longer equals `rejected`
    pub async fn refresh_after(&self, rejected: Option<&str>) -> ClientResult<String> {
        let shared = {
            let mut slot = self.inner.refreshing.lock().await;
            match slot.as_ref() {
                Some(running) => running.clone(),
                None => {
                    // A refresh that completed before the lock was taken
                    // has already rotated the token
                    if let Some(rejected) = rejected {
                        if let Some(current) = self.stored_token().await? {
                            if current != rejected {
                                return Ok(current);
                            }
                        }
                    }
                    let started = refresh_session(self.inner.clone()).boxed().shared();
                    *slot = Some(started.clone());
                    started
                }
            }
        };

        let result = shared.clone().await;

        let mut slot = self.inner.refreshing.lock().await;
        if matches!(slot.as_ref(), Some(running) if running.ptr_eq(&shared)) {
            *slot = None;
        }
        result
    }
}

/// Exchanges the stored refresh token for a new pair
async fn refresh_session(inner: Arc<Inner>) -> ClientResult<String> {
    match exchange_refresh_token(&inner).await {
        Ok(token) => {
            tracing::info!("Access token refreshed");
            Ok(token)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Token refresh failed, clearing session");
            if let Err(clear_err) = inner.store.clear().await {
                tracing::error!(error = %clear_err, "Failed to clear session");
            }
            Err(ClientError::Unauthorized(format!("Session expired: {}", e)))
        }
    }
}

async fn exchange_refresh_token(inner: &Inner) -> ClientResult<String> {
    let mut session = inner
        .store
        .load()
        .await?
        .ok_or_else(|| ClientError::Unauthorized("No session".to_string()))?;
    let refresh_token = session
        .refresh_token
        .clone()
        .ok_or_else(|| ClientError::Unauthorized("No refresh token".to_string()))?;

    let response = inner
        .http
        .post(inner.url(REFRESH_PATH))
        .json(&serde_json::json!({ "refresh_token": refresh_token }))
        .send()
        .await?;
    let pair: TokenPair = decode(check(response).await?).await?;

    session.token = pair.token.clone();
    session.refresh_token = Some(pair.refresh_token);
    inner.store.save(&session).await?;

    Ok(pair.token)
}

/// Turns non-success responses into errors
async fn check(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::from_response(status, &body))
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
