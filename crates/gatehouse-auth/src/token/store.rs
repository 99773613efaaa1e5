//! Action token persistence seam and its PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gatehouse_core::result::AppResult;
use gatehouse_database::repositories::action_token::ActionTokenRepository;
use gatehouse_entity::token::ActionToken;

/// Abstracts action token persistence operations.
#[async_trait]
pub trait ActionTokenStore: Send + Sync + 'static {
    /// Persist a newly issued token.
    async fn insert(&self, token: ActionToken) -> AppResult<()>;

    /// Exact lookup by opaque token string.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<ActionToken>>;

    /// Delete a token. `true` if a row was deleted.
    async fn delete_by_token(&self, token: &str) -> AppResult<bool>;

    /// Delete every token expired at `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// PostgreSQL-backed action token store delegating to the repository.
#[derive(Debug, Clone)]
pub struct PgActionTokenStore {
    repo: ActionTokenRepository,
}

impl PgActionTokenStore {
    /// Create a new store over the action token repository.
    pub fn new(repo: ActionTokenRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ActionTokenStore for PgActionTokenStore {
    async fn insert(&self, token: ActionToken) -> AppResult<()> {
        self.repo.insert(&token).await
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ActionToken>> {
        self.repo.find_by_token(token).await
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        self.repo.delete_by_token(token).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.repo.delete_expired(now).await
    }
}
