//! Establishment repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::account::CascadeOutcome;
use gatehouse_entity::establishment::Establishment;

use super::map_db_error;

/// Repository for establishments.
#[derive(Debug, Clone)]
pub struct EstablishmentRepository {
    pool: PgPool,
}

impl EstablishmentRepository {
    /// Create a new establishment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an establishment inside an organisation.
    pub async fn create(&self, organisation_id: Uuid, name: &str) -> AppResult<Establishment> {
        sqlx::query_as::<_, Establishment>(
            "INSERT INTO establishments (id, organisation_id, name) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(organisation_id)
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to create establishment", e))
    }

    /// Re-enable one establishment. Never cascades to accounts or users.
    pub async fn enable(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE establishments SET enabled = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to enable establishment", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Disable an establishment, all its enabled accounts, and every user
    /// left with no enabled account. Runs in one transaction.
    pub async fn disable_cascade(&self, id: Uuid) -> AppResult<CascadeOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin disable transaction", e))?;

        let disabled = sqlx::query("UPDATE establishments SET enabled = FALSE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to disable establishment", e))?
            .rows_affected();

        if disabled == 0 {
            return Err(AppError::not_found(format!(
                "Establishment {id} not found"
            )));
        }

        let accounts_disabled = sqlx::query(
            "UPDATE user_accounts SET enabled = FALSE \
             WHERE establishment_id = $1 AND enabled",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to disable establishment accounts", e))?
        .rows_affected();

        let users_disabled = sqlx::query(
            "UPDATE users SET enabled = FALSE, updated_at = NOW() \
             WHERE enabled \
             AND EXISTS (SELECT 1 FROM user_accounts ua \
                         WHERE ua.user_id = users.id AND ua.establishment_id = $1) \
             AND NOT EXISTS (SELECT 1 FROM user_accounts ua \
                             WHERE ua.user_id = users.id AND ua.enabled)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to cascade user disable", e))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit disable transaction", e))?;

        Ok(CascadeOutcome {
            accounts_disabled,
            users_disabled,
        })
    }
}
