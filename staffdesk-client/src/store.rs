//! Session persistence
//!
//! [`TokenStore`] abstracts where the access token, refresh token and the
//! signed-in user live between requests and between runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::{ClientError, ClientResult};
use crate::types::User;

/// Everything the client keeps after a login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl StoredSession {
    pub fn new(token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token,
            user: None,
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> ClientResult<Option<StoredSession>>;
    async fn save(&self, session: &StoredSession) -> ClientResult<()>;
    async fn clear(&self) -> ClientResult<()>;
}

/// Keeps the session for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: RwLock<Option<StoredSession>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> ClientResult<Option<StoredSession>> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &StoredSession) -> ClientResult<()> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        *self.session.write().await = None;
        Ok(())
    }
}

/// Keeps the session as a JSON file
///
/// A missing file means no session. An unreadable file is reported once
/// and treated as no session.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(path: &Path, err: impl std::fmt::Display) -> ClientError {
    ClientError::Storage(format!("{}: {}", path.display(), err))
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> ClientResult<Option<StoredSession>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(&self.path, e)),
        };

        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &StoredSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| storage_error(parent, e))?;
            }
        }
        let json = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| storage_error(&self.path, e))
    }

    async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("staffdesk-client-{}", uuid::Uuid::new_v4()))
            .join("session.json")
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert!(store.load().await.unwrap().is_none());

        let session = StoredSession::new("access", Some("refresh".to_string()));
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let path = temp_path();
        let store = FileTokenStore::new(&path);
        assert!(store.load().await.unwrap().is_none());

        let session = StoredSession::new("access", None);
        store.save(&session).await.unwrap();
        assert!(path.exists());

        // A second store over the same file sees the session
        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.load().await.unwrap(), Some(session));

        reopened.clear().await.unwrap();
        assert!(!path.exists());
        reopened.clear().await.unwrap();

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_file_store_ignores_corrupt_file() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(store.load().await.unwrap().is_none());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
