//! User repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_entity::scope::{AuthScope, ScopeFilter};
use gatehouse_entity::user::User;

use super::map_db_error;

/// Repository for user identity rows.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find user", e))
    }

    /// Find a user by email (stored lowercase).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find user by email", e))
    }

    /// Find a user by ID under the caller's authorization scope.
    ///
    /// A scoped filter whose identifier is absent selects nothing; the
    /// query is not even issued.
    pub async fn find_by_id_scoped(
        &self,
        id: Uuid,
        scope: Option<&AuthScope>,
    ) -> AppResult<Option<User>> {
        let Some(scope) = scope else {
            return self.find_by_id(id).await;
        };

        match scope.filter {
            ScopeFilter::Unrestricted => self.find_by_id(id).await,
            ScopeFilter::User(own_id) => {
                sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND id = $2")
                    .bind(id)
                    .bind(own_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| map_db_error("Failed to find user (own scope)", e))
            }
            ScopeFilter::Organisation(Some(org_id)) => {
                sqlx::query_as::<_, User>(
                    "SELECT * FROM users WHERE id = $1 AND EXISTS \
                     (SELECT 1 FROM user_accounts ua WHERE ua.user_id = users.id \
                      AND ua.organisation_id = $2)",
                )
                .bind(id)
                .bind(org_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_db_error("Failed to find user (organisation scope)", e))
            }
            ScopeFilter::Establishment(Some(est_id)) => {
                sqlx::query_as::<_, User>(
                    "SELECT * FROM users WHERE id = $1 AND EXISTS \
                     (SELECT 1 FROM user_accounts ua WHERE ua.user_id = users.id \
                      AND ua.establishment_id = $2)",
                )
                .bind(id)
                .bind(est_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_db_error("Failed to find user (establishment scope)", e))
            }
            ScopeFilter::Organisation(None) | ScopeFilter::Establishment(None) => Ok(None),
        }
    }

    /// Replace the user's password digest.
    pub async fn set_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to set password", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the user's email address, marking it validated (the flow
    /// that calls this has just proven control of the new address).
    pub async fn set_email(&self, user_id: Uuid, email: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET email = $2, email_validated_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(email.trim().to_lowercase())
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to set email", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Stamp the email as validated.
    pub async fn mark_email_validated(&self, user_id: Uuid) -> AppResult<bool> {
        self.stamp(user_id, "email_validated_at").await
    }

    /// Stamp the terms of service as accepted.
    pub async fn mark_terms_accepted(&self, user_id: Uuid) -> AppResult<bool> {
        self.stamp(user_id, "terms_accepted_at").await
    }

    /// Stamp the privacy policy as accepted.
    pub async fn mark_privacy_accepted(&self, user_id: Uuid) -> AppResult<bool> {
        self.stamp(user_id, "privacy_accepted_at").await
    }

    async fn stamp(&self, user_id: Uuid, column: &str) -> AppResult<bool> {
        // Column names come from the fixed list above, never from input.
        let sql = format!("UPDATE users SET {column} = NOW(), updated_at = NOW() WHERE id = $1");
        let result = sqlx::query(&sql)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to stamp user column", e))?;
        Ok(result.rows_affected() > 0)
    }
}
