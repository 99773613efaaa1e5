//! PostgreSQL-backed directory over the entity repositories.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_auth::account::AccountSource;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_database::repositories::establishment::EstablishmentRepository;
use gatehouse_database::repositories::organisation::OrganisationRepository;
use gatehouse_database::repositories::role::RoleRepository;
use gatehouse_database::repositories::user::UserRepository;
use gatehouse_database::repositories::user_account::UserAccountRepository;
use gatehouse_entity::account::{
    AccountGrants, CascadeOutcome, CreateUserAccount, UserAccount,
};
use gatehouse_entity::role::Role;
use gatehouse_entity::scope::AuthScope;
use gatehouse_entity::user::{CreateUser, User};

use super::{Directory, NewAccount};

/// The default, PostgreSQL-backed directory.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    users: UserRepository,
    accounts: UserAccountRepository,
    roles: RoleRepository,
    organisations: OrganisationRepository,
    establishments: EstablishmentRepository,
}

impl PgDirectory {
    /// Build the directory and its repositories over one pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            accounts: UserAccountRepository::new(pool.clone()),
            roles: RoleRepository::new(pool.clone()),
            organisations: OrganisationRepository::new(pool.clone()),
            establishments: EstablishmentRepository::new(pool),
        }
    }

    fn found(updated: bool, what: &str) -> AppResult<()> {
        if updated {
            Ok(())
        } else {
            Err(AppError::not_found(format!("{what} not found")))
        }
    }
}

#[async_trait]
impl Directory for PgDirectory {
    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn user_by_id_scoped(
        &self,
        id: Uuid,
        scope: Option<&AuthScope>,
    ) -> AppResult<Option<User>> {
        self.users.find_by_id_scoped(id, scope).await
    }

    async fn login_account(
        &self,
        user_id: Uuid,
        organisation_id: Option<Uuid>,
    ) -> AppResult<Option<UserAccount>> {
        self.accounts.find_for_login(user_id, organisation_id).await
    }

    async fn roles_by_names(&self, names: &[String]) -> AppResult<Vec<Role>> {
        self.roles.find_by_names(names).await
    }

    async fn roles_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Role>> {
        self.roles.find_by_ids(ids).await
    }

    async fn create_user_with_account(
        &self,
        user: CreateUser,
        account: NewAccount,
    ) -> AppResult<(User, UserAccount)> {
        self.accounts
            .create_with_user(
                &user,
                account.organisation_id,
                account.establishment_id,
                &account.role_ids,
            )
            .await
    }

    async fn add_account(&self, account: CreateUserAccount) -> AppResult<UserAccount> {
        self.accounts.create(&account).await
    }

    async fn set_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        Self::found(self.users.set_password(user_id, password_hash).await?, "User")
    }

    async fn set_email(&self, user_id: Uuid, email: &str) -> AppResult<()> {
        Self::found(self.users.set_email(user_id, email).await?, "User")
    }

    async fn mark_email_validated(&self, user_id: Uuid) -> AppResult<()> {
        Self::found(self.users.mark_email_validated(user_id).await?, "User")
    }

    async fn mark_terms_accepted(&self, user_id: Uuid) -> AppResult<()> {
        Self::found(self.users.mark_terms_accepted(user_id).await?, "User")
    }

    async fn mark_privacy_accepted(&self, user_id: Uuid) -> AppResult<()> {
        Self::found(self.users.mark_privacy_accepted(user_id).await?, "User")
    }

    async fn disable_account(&self, account_id: Uuid) -> AppResult<CascadeOutcome> {
        self.accounts.disable_cascade(account_id).await
    }

    async fn enable_account(&self, account_id: Uuid) -> AppResult<()> {
        Self::found(self.accounts.enable(account_id).await?, "Account")
    }

    async fn disable_establishment(&self, id: Uuid) -> AppResult<CascadeOutcome> {
        self.establishments.disable_cascade(id).await
    }

    async fn enable_establishment(&self, id: Uuid) -> AppResult<()> {
        Self::found(self.establishments.enable(id).await?, "Establishment")
    }

    async fn disable_organisation(&self, id: Uuid) -> AppResult<CascadeOutcome> {
        self.organisations.disable_cascade(id).await
    }

    async fn enable_organisation(&self, id: Uuid) -> AppResult<()> {
        Self::found(self.organisations.enable(id).await?, "Organisation")
    }
}

#[async_trait]
impl AccountSource for PgDirectory {
    async fn account_grants(&self, account_id: Uuid) -> AppResult<Option<AccountGrants>> {
        self.accounts.find_grants(account_id).await
    }

    async fn accounts_of_user(&self, user_id: Uuid) -> AppResult<Vec<UserAccount>> {
        self.accounts.find_by_user(user_id).await
    }
}
