//! Action token repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_entity::token::{ActionToken, ActionTypeSet};

use super::map_db_error;

/// Raw row shape; the bit mask column is converted on the way out.
#[derive(Debug, FromRow)]
struct ActionTokenRow {
    token: String,
    action_types: i32,
    email: String,
    user_id: Option<Uuid>,
    role_ids: Vec<Uuid>,
    organisation_id: Option<Uuid>,
    establishment_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<ActionTokenRow> for ActionToken {
    fn from(row: ActionTokenRow) -> Self {
        Self {
            token: row.token,
            types: ActionTypeSet::from_bits(row.action_types),
            email: row.email,
            user_id: row.user_id,
            role_ids: row.role_ids,
            organisation_id: row.organisation_id,
            establishment_id: row.establishment_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Repository for one-shot action tokens.
#[derive(Debug, Clone)]
pub struct ActionTokenRepository {
    pool: PgPool,
}

impl ActionTokenRepository {
    /// Create a new action token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a newly issued token.
    pub async fn insert(&self, token: &ActionToken) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO action_tokens \
             (token, action_types, email, user_id, role_ids, organisation_id, establishment_id, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&token.token)
        .bind(token.types.bits())
        .bind(&token.email)
        .bind(token.user_id)
        .bind(&token.role_ids)
        .bind(token.organisation_id)
        .bind(token.establishment_id)
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to insert action token", e))?;
        Ok(())
    }

    /// Find a token by its opaque string.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<ActionToken>> {
        let row =
            sqlx::query_as::<_, ActionTokenRow>("SELECT * FROM action_tokens WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_db_error("Failed to find action token", e))?;
        Ok(row.map(ActionToken::from))
    }

    /// Delete (revoke) a token. Returns `true` if a row was deleted.
    pub async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM action_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to delete action token", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every expired token.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM action_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to delete expired action tokens", e))?;
        Ok(result.rows_affected())
    }
}
