//! Session repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_entity::session::Session;

use super::map_db_error;

/// Repository for session persistence.
///
/// The one-live-session-per-account invariant is enforced here by
/// [`SessionRepository::replace_for_account`], which deletes and inserts
/// inside a single transaction.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete every session of the account, then insert the new one.
    ///
    /// Returns the number of prior sessions deleted. Runs in one
    /// transaction so a crash cannot leave two live sessions.
    pub async fn replace_for_account(&self, session: &Session) -> AppResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin session transaction", e))?;

        let deleted = sqlx::query("DELETE FROM sessions WHERE user_account_id = $1")
            .bind(session.user_account_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to delete prior sessions", e))?
            .rows_affected();

        sqlx::query(
            "INSERT INTO sessions (token, user_account_id, login_date, expiration_date) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.token)
        .bind(session.user_account_id)
        .bind(session.login_date)
        .bind(session.expiration_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to insert session", e))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit session transaction", e))?;

        Ok(deleted)
    }

    /// Find a session by its token string.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find session by token", e))
    }

    /// Delete one session by token. Returns `true` if a row was deleted.
    pub async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to delete session", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session of one account.
    pub async fn delete_all_by_account(&self, account_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_account_id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to delete account sessions", e))?;
        Ok(result.rows_affected())
    }

    /// Delete every session whose expiry is in the past.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expiration_date < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to delete expired sessions", e))?;
        Ok(result.rows_affected())
    }
}
