//! In-memory action token store, used by tests and embedded runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use gatehouse_core::result::AppResult;
use gatehouse_entity::token::ActionToken;

use super::store::ActionTokenStore;

/// Mutex-guarded map of token string → action token.
#[derive(Debug, Default)]
pub struct MemoryActionTokenStore {
    tokens: Mutex<HashMap<String, ActionToken>>,
}

impl MemoryActionTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActionTokenStore for MemoryActionTokenStore {
    async fn insert(&self, token: ActionToken) -> AppResult<()> {
        self.tokens.lock().await.insert(token.token.clone(), token);
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ActionToken>> {
        Ok(self.tokens.lock().await.get(token).cloned())
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        Ok(self.tokens.lock().await.remove(token).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.expires_at >= now);
        Ok((before - tokens.len()) as u64)
    }
}
