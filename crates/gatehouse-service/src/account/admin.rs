//! Administrative enable/disable with cascade rules.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_entity::account::CascadeOutcome;

use crate::directory::Directory;

/// Enable/disable operations over accounts, organisations, and
/// establishments. Disabling cascades; enabling never does.
#[derive(Clone)]
pub struct AccountAdminService {
    directory: Arc<dyn Directory>,
}

impl std::fmt::Debug for AccountAdminService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountAdminService").finish()
    }
}

impl AccountAdminService {
    /// Create a new admin service.
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Disable one account (and its user when it was the last enabled
    /// account).
    pub async fn disable_account(&self, account_id: Uuid) -> AppResult<CascadeOutcome> {
        let outcome = self.directory.disable_account(account_id).await?;
        info!(
            account_id = %account_id,
            users_disabled = outcome.users_disabled,
            "Account disabled"
        );
        Ok(outcome)
    }

    /// Re-enable one account. The underlying user stays as it is.
    pub async fn enable_account(&self, account_id: Uuid) -> AppResult<()> {
        self.directory.enable_account(account_id).await
    }

    /// Disable an establishment and everything under it.
    pub async fn disable_establishment(&self, id: Uuid) -> AppResult<CascadeOutcome> {
        let outcome = self.directory.disable_establishment(id).await?;
        info!(
            establishment_id = %id,
            accounts_disabled = outcome.accounts_disabled,
            users_disabled = outcome.users_disabled,
            "Establishment disabled"
        );
        Ok(outcome)
    }

    /// Re-enable an establishment. Its accounts and users stay disabled.
    pub async fn enable_establishment(&self, id: Uuid) -> AppResult<()> {
        self.directory.enable_establishment(id).await
    }

    /// Disable an organisation and everything under it.
    pub async fn disable_organisation(&self, id: Uuid) -> AppResult<CascadeOutcome> {
        let outcome = self.directory.disable_organisation(id).await?;
        info!(
            organisation_id = %id,
            accounts_disabled = outcome.accounts_disabled,
            users_disabled = outcome.users_disabled,
            "Organisation disabled"
        );
        Ok(outcome)
    }

    /// Re-enable an organisation. Its accounts and users stay disabled.
    pub async fn enable_organisation(&self, id: Uuid) -> AppResult<()> {
        self.directory.enable_organisation(id).await
    }
}
