//! services/mobile_client/src/interaction/session_token.rs
//!
//! The process-wide session token. Writers are enumerable: sign-in sets it,
//! sign-out clears it, and a 401 invalidates the exact token that was
//! rejected.

use std::sync::Arc;

use coach_core::domain::SessionToken;
use coach_core::ports::{PortError, PortResult, TokenStore};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Cached view of the durable token, kept in step with the store.
pub struct SessionTokens {
    current: Mutex<Option<SessionToken>>,
    store: Arc<dyn TokenStore>,
}

impl SessionTokens {
    /// Reads whatever token survived the last run.
    ///
    /// An unreadable stored token is discarded and the client starts signed
    /// out, so sign-in stays possible.
    pub async fn load(store: Arc<dyn TokenStore>) -> PortResult<Self> {
        let current = match store.get().await {
            Ok(current) => current,
            Err(PortError::Storage(e)) => {
                warn!("Stored session token is unreadable, starting signed out: {}", e);
                if let Err(e) = store.clear().await {
                    warn!("Failed to discard the unreadable session token: {}", e);
                }
                None
            }
            Err(e) => return Err(e),
        };
        info!(signed_in = current.is_some(), "Session token loaded.");
        Ok(Self {
            current: Mutex::new(current),
            store,
        })
    }

    pub async fn get(&self) -> Option<SessionToken> {
        self.current.lock().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.current.lock().await.is_some()
    }

    /// Stores a freshly issued token.
    pub async fn set(&self, token: SessionToken) -> PortResult<()> {
        let mut current = self.current.lock().await;
        self.store.set(&token).await?;
        *current = Some(token);
        info!("Session token stored.");
        Ok(())
    }

    /// Explicit sign-out.
    pub async fn clear(&self) -> PortResult<()> {
        let mut current = self.current.lock().await;
        self.store.clear().await?;
        *current = None;
        info!("Session token cleared.");
        Ok(())
    }

    /// Discards `rejected` if it is still the current token.
    ///
    /// Returns `true` when this call removed it. Concurrent 401s for the same
    /// token serialize on the lock, so only the first one touches the store.
    pub async fn invalidate(&self, rejected: &SessionToken) -> PortResult<bool> {
        let mut current = self.current.lock().await;
        if current.as_ref() != Some(rejected) {
            return Ok(false);
        }
        self.store.clear().await?;
        *current = None;
        info!("Session token invalidated after 401.");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FileTokenStore, MemoryTokenStore};

    #[tokio::test]
    async fn invalidate_only_removes_the_rejected_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let tokens = SessionTokens::load(store.clone()).await.unwrap();
        tokens.set(SessionToken::new("new")).await.unwrap();

        // A 401 for an older token must not sign the user out.
        assert!(!tokens.invalidate(&SessionToken::new("old")).await.unwrap());
        assert_eq!(tokens.get().await, Some(SessionToken::new("new")));

        assert!(tokens.invalidate(&SessionToken::new("new")).await.unwrap());
        assert_eq!(tokens.get().await, None);
        assert_eq!(store.get().await.unwrap(), None);

        assert!(!tokens.invalidate(&SessionToken::new("new")).await.unwrap());
    }

    #[tokio::test]
    async fn load_picks_up_the_durable_token() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(&SessionToken::new("saved")).await.unwrap();

        let tokens = SessionTokens::load(store).await.unwrap();
        assert!(tokens.is_signed_in().await);
        tokens.clear().await.unwrap();
        assert!(!tokens.is_signed_in().await);
    }

    #[tokio::test]
    async fn unreadable_token_file_starts_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"{\"access_tok").await.unwrap();
        let store = Arc::new(FileTokenStore::new(&path));

        let tokens = SessionTokens::load(store.clone()).await.unwrap();

        assert!(!tokens.is_signed_in().await);
        assert!(!path.exists());
        tokens.set(SessionToken::new("fresh")).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(SessionToken::new("fresh")));
    }
}
