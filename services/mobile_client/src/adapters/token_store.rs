//! services/mobile_client/src/adapters/token_store.rs
//!
//! Session token storage. `FileTokenStore` keeps the token in a small JSON
//! file so it survives restarts; `MemoryTokenStore` lives only as long as
//! the process.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use coach_core::domain::SessionToken;
use coach_core::ports::{PortError, PortResult, TokenStore};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

#[derive(Serialize, Deserialize)]
struct StoredSession {
    access_token: SessionToken,
}

//=========================================================================================
// File-backed Store
//=========================================================================================

/// Persists the token as `{"access_token": "..."}` at a fixed path.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> PortResult<Option<SessionToken>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PortError::Storage(e.to_string())),
        };
        let stored: StoredSession =
            serde_json::from_slice(&raw).map_err(|e| PortError::Storage(e.to_string()))?;
        Ok(Some(stored.access_token))
    }

    async fn set(&self, token: &SessionToken) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Storage(e.to_string()))?;
        }
        let stored = StoredSession {
            access_token: token.clone(),
        };
        let raw = serde_json::to_vec(&stored).map_err(|e| PortError::Unexpected(e.to_string()))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))
    }

    async fn clear(&self) -> PortResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Storage(e.to_string())),
        }
    }
}

//=========================================================================================
// In-memory Store
//=========================================================================================

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SessionToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> PortResult<Option<SessionToken>> {
        Ok(self.token.lock().await.clone())
    }

    async fn set(&self, token: &SessionToken) -> PortResult<()> {
        *self.token.lock().await = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        *self.token.lock().await = None;
        Ok(())
    }
}
