//! The directory seam: users, accounts, roles, and tenancy mutations.
//!
//! Services depend on this trait rather than concrete repositories so
//! custom backends can replace the default PostgreSQL implementation by
//! composition, and so the flows are testable against the in-memory
//! implementation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_entity::account::{CascadeOutcome, CreateUserAccount, UserAccount};
use gatehouse_entity::role::Role;
use gatehouse_entity::scope::AuthScope;
use gatehouse_entity::user::{CreateUser, User};

pub use memory::MemoryDirectory;
pub use postgres::PgDirectory;

/// Account shape for [`Directory::create_user_with_account`], before a
/// user id exists.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    /// Organisation membership, if any.
    pub organisation_id: Option<Uuid>,
    /// Establishment membership, if any.
    pub establishment_id: Option<Uuid>,
    /// Roles to attach.
    pub role_ids: Vec<Uuid>,
}

/// Reads and mutations over the identity/tenancy graph.
///
/// Multi-entity mutations (user + account creation, disable cascades)
/// are atomic in every implementation: one transaction in PostgreSQL,
/// one lock in memory.
#[async_trait]
pub trait Directory: Send + Sync + 'static {
    /// Find a user by id.
    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by id under the caller's authorization scope. An
    /// unset scope means an unscoped (trusted, internal) read.
    async fn user_by_id_scoped(
        &self,
        id: Uuid,
        scope: Option<&AuthScope>,
    ) -> AppResult<Option<User>>;

    /// Select the account a user logs into: first enabled, optionally
    /// restricted to one organisation.
    async fn login_account(
        &self,
        user_id: Uuid,
        organisation_id: Option<Uuid>,
    ) -> AppResult<Option<UserAccount>>;

    /// Resolve roles by name; unknown names are absent from the result.
    async fn roles_by_names(&self, names: &[String]) -> AppResult<Vec<Role>>;

    /// Resolve roles by id; unknown ids are absent from the result.
    async fn roles_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Role>>;

    /// Create a user and their first account atomically.
    async fn create_user_with_account(
        &self,
        user: CreateUser,
        account: NewAccount,
    ) -> AppResult<(User, UserAccount)>;

    /// Create an additional account for an existing user.
    async fn add_account(&self, account: CreateUserAccount) -> AppResult<UserAccount>;

    /// Replace a user's password digest.
    async fn set_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Replace a user's email address (proven by the calling flow).
    async fn set_email(&self, user_id: Uuid, email: &str) -> AppResult<()>;

    /// Stamp the email as validated.
    async fn mark_email_validated(&self, user_id: Uuid) -> AppResult<()>;

    /// Stamp the terms of service as accepted.
    async fn mark_terms_accepted(&self, user_id: Uuid) -> AppResult<()>;

    /// Stamp the privacy policy as accepted.
    async fn mark_privacy_accepted(&self, user_id: Uuid) -> AppResult<()>;

    /// Disable one account; disables the underlying user when it was
    /// their last enabled account.
    async fn disable_account(&self, account_id: Uuid) -> AppResult<CascadeOutcome>;

    /// Re-enable one account. Never cascades.
    async fn enable_account(&self, account_id: Uuid) -> AppResult<()>;

    /// Disable an establishment and cascade over its accounts and their
    /// users.
    async fn disable_establishment(&self, id: Uuid) -> AppResult<CascadeOutcome>;

    /// Re-enable an establishment. Never cascades.
    async fn enable_establishment(&self, id: Uuid) -> AppResult<()>;

    /// Disable an organisation and cascade over its accounts and their
    /// users.
    async fn disable_organisation(&self, id: Uuid) -> AppResult<CascadeOutcome>;

    /// Re-enable an organisation. Never cascades.
    async fn enable_organisation(&self, id: Uuid) -> AppResult<()>;
}
