//! User account repository implementation.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::account::{AccountGrants, CascadeOutcome, CreateUserAccount, UserAccount};
use gatehouse_entity::claim::Claim;
use gatehouse_entity::role::Role;
use gatehouse_entity::user::{CreateUser, User};

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

/// Repository for user accounts and their role attachments.
#[derive(Debug, Clone)]
pub struct UserAccountRepository {
    pool: PgPool,
}

impl UserAccountRepository {
    /// Create a new user account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load an account together with its user and Role→Claim closure.
    pub async fn find_grants(&self, account_id: Uuid) -> AppResult<Option<AccountGrants>> {
        let account = sqlx::query_as::<_, UserAccount>(
            "SELECT * FROM user_accounts WHERE id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to find account", e))?;

        let Some(account) = account else {
            return Ok(None);
        };

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(account.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to load account user", e))?;

        let role_rows = sqlx::query_as::<_, RoleRow>(
            "SELECT r.id, r.name, r.description, r.created_at FROM roles r \
             JOIN account_roles ar ON ar.role_id = r.id \
             WHERE ar.user_account_id = $1 ORDER BY r.name",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to load account roles", e))?;

        let role_ids: Vec<Uuid> = role_rows.iter().map(|r| r.id).collect();
        let claim_rows = sqlx::query_as::<_, RoleClaimRow>(
            "SELECT role_id, claim FROM role_claims WHERE role_id = ANY($1)",
        )
        .bind(&role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to load role claims", e))?;

        let mut claims_by_role: HashMap<Uuid, Vec<Claim>> = HashMap::new();
        for row in claim_rows {
            let claim = Claim::from_str(&row.claim)
                .map_err(|e| AppError::internal(format!("Corrupt stored claim: {e}")))?;
            claims_by_role.entry(row.role_id).or_default().push(claim);
        }

        let roles = role_rows
            .into_iter()
            .map(|row| Role {
                claims: claims_by_role.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                description: row.description,
                created_at: row.created_at,
            })
            .collect();

        Ok(Some(AccountGrants {
            account,
            user,
            roles,
        }))
    }

    /// List every account owned by one user.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<UserAccount>> {
        sqlx::query_as::<_, UserAccount>(
            "SELECT * FROM user_accounts WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to list user accounts", e))
    }

    /// Select the account a user logs into: the first enabled account,
    /// optionally restricted to one organisation.
    pub async fn find_for_login(
        &self,
        user_id: Uuid,
        organisation_id: Option<Uuid>,
    ) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserAccount>(
            "SELECT * FROM user_accounts WHERE user_id = $1 AND enabled \
             AND ($2::uuid IS NULL OR organisation_id = $2) \
             ORDER BY created_at ASC LIMIT 1",
        )
        .bind(user_id)
        .bind(organisation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to find login account", e))
    }

    /// Create an account for an existing user, attaching roles, in one
    /// transaction.
    pub async fn create(&self, data: &CreateUserAccount) -> AppResult<UserAccount> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin account transaction", e))?;

        let account = Self::insert_account(&mut tx, data).await?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit account transaction", e))?;

        Ok(account)
    }

    /// Create a user and their first account in one transaction.
    pub async fn create_with_user(
        &self,
        user: &CreateUser,
        organisation_id: Option<Uuid>,
        establishment_id: Option<Uuid>,
        role_ids: &[Uuid],
    ) -> AppResult<(User, UserAccount)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin signup transaction", e))?;

        let validated_at = if user.email_validated {
            Some(Utc::now())
        } else {
            None
        };

        let created_user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, email_validated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user.email.trim().to_lowercase())
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(validated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to create user", e))?;

        let account = Self::insert_account(
            &mut tx,
            &CreateUserAccount {
                user_id: created_user.id,
                organisation_id,
                establishment_id,
                role_ids: role_ids.to_vec(),
            },
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit signup transaction", e))?;

        Ok((created_user, account))
    }

    async fn insert_account(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        data: &CreateUserAccount,
    ) -> AppResult<UserAccount> {
        let account = sqlx::query_as::<_, UserAccount>(
            "INSERT INTO user_accounts (id, user_id, organisation_id, establishment_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.organisation_id)
        .bind(data.establishment_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_db_error("Failed to create account", e))?;

        for role_id in &data.role_ids {
            sqlx::query(
                "INSERT INTO account_roles (user_account_id, role_id) VALUES ($1, $2)",
            )
            .bind(account.id)
            .bind(role_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_db_error("Failed to attach role", e))?;
        }

        Ok(account)
    }

    /// Re-enable one account. Never cascades.
    pub async fn enable(&self, account_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE user_accounts SET enabled = TRUE WHERE id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to enable account", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Disable one account, cascading to the underlying user when this
    /// was their last enabled account. Runs in one transaction.
    pub async fn disable_cascade(&self, account_id: Uuid) -> AppResult<CascadeOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin disable transaction", e))?;

        let user_id: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM user_accounts WHERE id = $1")
                .bind(account_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_db_error("Failed to load account", e))?;

        let Some(user_id) = user_id else {
            return Err(AppError::not_found(format!(
                "Account {account_id} not found"
            )));
        };

        let accounts_disabled = sqlx::query(
            "UPDATE user_accounts SET enabled = FALSE WHERE id = $1 AND enabled",
        )
        .bind(account_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to disable account", e))?
        .rows_affected();

        let users_disabled = sqlx::query(
            "UPDATE users SET enabled = FALSE, updated_at = NOW() \
             WHERE id = $1 AND enabled AND NOT EXISTS \
             (SELECT 1 FROM user_accounts ua WHERE ua.user_id = $1 AND ua.enabled)",
        )
        .bind(user_id)
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
