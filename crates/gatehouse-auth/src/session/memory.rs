//! In-memory session store.
//!
//! Used by tests and embedded runs; the replace-then-insert invariant is
//! held under one lock instead of a database transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_entity::session::Session;

use super::store::SessionStore;

/// Mutex-guarded map of token → session.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions (expired ones included until swept).
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn replace_for_account(&self, session: Session) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_account_id != session.user_account_id);
        let deleted = (before - sessions.len()) as u64;
        sessions.insert(session.token.clone(), session);
        Ok(deleted)
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Session>> {
        Ok(self.sessions.lock().await.get(token).cloned())
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        Ok(self.sessions.lock().await.remove(token).is_some())
    }

    async fn delete_all_by_account(&self, account_id: Uuid) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_account_id != account_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expiration_date >= now);
        Ok((before - sessions.len()) as u64)
    }
}
