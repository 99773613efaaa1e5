//! Claim repository implementation.
//!
//! Claims are stored by their canonical string and never mutated; rows
//! are seeded once and referenced by roles.

use std::str::FromStr;

use sqlx::PgPool;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::claim::Claim;

use super::map_db_error;

/// Repository for the seeded claim catalogue.
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

impl ClaimRepository {
    /// Create a new claim repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every registered claim.
    pub async fn list(&self) -> AppResult<Vec<Claim>> {
        let rows: Vec<String> = sqlx::query_scalar("SELECT claim FROM claims ORDER BY claim")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to list claims", e))?;

        rows.iter()
            .map(|s| {
                Claim::from_str(s)
                    .map_err(|e| AppError::internal(format!("Corrupt stored claim: {e}")))
            })
            .collect()
    }

}
