//! Seam for loading accounts with their authorization closure.

use async_trait::async_trait;
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_entity::account::{AccountGrants, UserAccount};

/// Loads an account together with its user and Role→Claim closure.
///
/// The gate and the session manager depend on this trait rather than a
/// concrete repository so they can be exercised against any backing
/// store; the service crate's directory implementations provide the
/// production and in-memory versions.
#[async_trait]
pub trait AccountSource: Send + Sync + 'static {
    /// Load the grants of one account, or `None` if it does not exist.
    async fn account_grants(&self, account_id: Uuid) -> AppResult<Option<AccountGrants>>;

    /// List every account owned by one user.
    async fn accounts_of_user(&self, user_id: Uuid) -> AppResult<Vec<UserAccount>>;
}
