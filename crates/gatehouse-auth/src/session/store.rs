//! Session persistence seam and its PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_database::repositories::session::SessionRepository;
use gatehouse_entity::session::Session;

/// Abstracts session persistence operations.
///
/// Implementations must make [`SessionStore::replace_for_account`]
/// atomic: delete-before-insert in one transaction (or under one lock),
/// so a crash cannot leave two live sessions for one account.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Delete every session of the account, insert the new one, and
    /// return the number of prior sessions deleted.
    async fn replace_for_account(&self, session: Session) -> AppResult<u64>;

    /// Exact lookup by token string.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Session>>;

    /// Delete one session by token. `true` if a row was deleted.
    async fn delete_by_token(&self, token: &str) -> AppResult<bool>;

    /// Delete every session of one account.
    async fn delete_all_by_account(&self, account_id: Uuid) -> AppResult<u64>;

    /// Delete every session expired at `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// PostgreSQL-backed session store delegating to the repository.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    repo: SessionRepository,
}

impl PgSessionStore {
    /// Create a new store over the session repository.
    pub fn new(repo: SessionRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn replace_for_account(&self, session: Session) -> AppResult<u64> {
        self.repo.replace_for_account(&session).await
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Session>> {
        self.repo.find_by_token(token).await
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        self.repo.delete_by_token(token).await
    }

    async fn delete_all_by_account(&self, account_id: Uuid) -> AppResult<u64> {
        self.repo.delete_all_by_account(account_id).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.repo.delete_expired(now).await
    }
}
