//! Role repository implementation.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::claim::Claim;
use gatehouse_entity::role::{CreateRole, Role};

use super::map_db_error;

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct RoleClaimRow {
    role_id: Uuid,
    claim: String,
}

/// Repository for roles and their claim attachments.
///
/// Role names are identity: unique, case-insensitive, stored lowercase.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find every role matching one of the given names. Unknown names are
    /// simply absent from the result.
    pub async fn find_by_names(&self, names: &[String]) -> AppResult<Vec<Role>> {
        let lowered: Vec<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT * FROM roles WHERE name = ANY($1) ORDER BY name",
        )
        .bind(&lowered)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to find roles by name", e))?;
        self.attach_claims(rows).await
    }

    /// Find every role matching one of the given ids.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT * FROM roles WHERE id = ANY($1) ORDER BY name",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to find roles by id", e))?;
        self.attach_claims(rows).await
    }

    /// List every role.
    pub async fn list(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>("SELECT * FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to list roles", e))?;
        self.attach_claims(rows).await
    }

    /// Create a role with its claims. A duplicate name is a conflict.
    pub async fn create(&self, data: &CreateRole) -> AppResult<Role> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin role transaction", e))?;

        let row = sqlx::query_as::<_, RoleRow>(
            "INSERT INTO roles (id, name, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.name.trim().to_lowercase())
        .bind(&data.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to create role", e))?;

        Self::attach(&mut tx, row.id, &data.claims).await?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit role transaction", e))?;

        Ok(Role {
            id: row.id,
            name: row.name,
            description: row.description,
            claims: data.claims.clone(),
            created_at: row.created_at,
        })
    }

    /// Replace a role's description and claim set.
    pub async fn update(&self, id: Uuid, data: &CreateRole) -> AppResult<Role> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin role transaction", e))?;

        let row = sqlx::query_as::<_, RoleRow>(
            "UPDATE roles SET name = $2, description = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(data.name.trim().to_lowercase())
        .bind(&data.description)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to update role", e))?
        .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;

        sqlx::query("DELETE FROM role_claims WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to clear role claims", e))?;

        Self::attach(&mut tx, id, &data.claims).await?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit role transaction", e))?;

        Ok(Role {
            id: row.id,
            name: row.name,
            description: row.description,
            claims: data.claims.clone(),
            created_at: row.created_at,
        })
    }

    /// Delete a role. Returns `true` if a row was deleted.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to delete role", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn attach(
        tx: &mut Transaction<'_, Postgres>,
        role_id: Uuid,
        claims: &[Claim],
    ) -> AppResult<()> {
        for claim in claims {
            let canonical = claim.to_string();
            sqlx::query("INSERT INTO claims (claim) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(&canonical)
                .execute(&mut **tx)
                .await
                .map_err(|e| map_db_error("Failed to register claim", e))?;
            sqlx::query("INSERT INTO role_claims (role_id, claim) VALUES ($1, $2)")
                .bind(role_id)
                .bind(&canonical)
                .execute(&mut **tx)
                .await
                .map_err(|e| map_db_error("Failed to attach claim", e))?;
        }
        Ok(())
    }

    async fn attach_claims(&self, rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let claim_rows = sqlx::query_as::<_, RoleClaimRow>(
            "SELECT role_id, claim FROM role_claims WHERE role_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to load role claims", e))?;

        let mut by_role: HashMap<Uuid, Vec<Claim>> = HashMap::new();
        for row in claim_rows {
            let claim = Claim::from_str(&row.claim)
                .map_err(|e| AppError::internal(format!("Corrupt stored claim: {e}")))?;
            by_role.entry(row.role_id).or_default().push(claim);
        }

        Ok(rows
            .into_iter()
            .map(|row| Role {
                claims: by_role.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                description: row.description,
                created_at: row.created_at,
            })
            .collect())
    }
}
