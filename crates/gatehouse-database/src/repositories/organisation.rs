//! Organisation repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::account::CascadeOutcome;
use gatehouse_entity::organisation::Organisation;

use super::map_db_error;

/// Repository for organisations.
#[derive(Debug, Clone)]
pub struct OrganisationRepository {
    pool: PgPool,
}

impl OrganisationRepository {
    /// Create a new organisation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an organisation by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Organisation>> {
        sqlx::query_as::<_, Organisation>("SELECT * FROM organisations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find organisation", e))
    }

    /// Create an organisation. A duplicate name is a conflict.
    pub async fn create(&self, name: &str) -> AppResult<Organisation> {
        sqlx::query_as::<_, Organisation>(
            "INSERT INTO organisations (id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to create organisation", e))
    }

    /// Re-enable one organisation. Never cascades to accounts or users.
    pub async fn enable(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE organisations SET enabled = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to enable organisation", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Disable an organisation, all its enabled accounts, and every user
    /// left with no enabled account. Runs in one transaction.
    pub async fn disable_cascade(&self, id: Uuid) -> AppResult<CascadeOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin disable transaction", e))?;

        let disabled = sqlx::query("UPDATE organisations SET enabled = FALSE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to disable organisation", e))?
            .rows_affected();

        if disabled == 0 {
            return Err(AppError::not_found(format!("Organisation {id} not found")));
        }

        let accounts_disabled = sqlx::query(
            "UPDATE user_accounts SET enabled = FALSE \
             WHERE organisation_id = $1 AND enabled",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to disable organisation accounts", e))?
        .rows_affected();

        let users_disabled = sqlx::query(
            "UPDATE users SET enabled = FALSE, updated_at = NOW() \
             WHERE enabled \
             AND EXISTS (SELECT 1 FROM user_accounts ua \
                         WHERE ua.user_id = users.id AND ua.organisation_id = $1) \
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
