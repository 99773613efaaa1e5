//! In-memory directory.
//!
//! Backs the flow tests and embedded runs. Multi-entity mutations hold
//! the single state lock for their whole duration, mirroring the
//! transactional atomicity of the PostgreSQL implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use gatehouse_auth::account::AccountSource;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::account::{
    AccountGrants, CascadeOutcome, CreateUserAccount, UserAccount,
};
use gatehouse_entity::claim::Claim;
use gatehouse_entity::establishment::Establishment;
use gatehouse_entity::organisation::Organisation;
use gatehouse_entity::role::Role;
use gatehouse_entity::scope::{AuthScope, ScopeFilter};
use gatehouse_entity::user::{CreateUser, User};

use super::{Directory, NewAccount};

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    accounts: HashMap<Uuid, UserAccount>,
    account_roles: HashMap<Uuid, Vec<Uuid>>,
    roles: HashMap<Uuid, Role>,
    organisations: HashMap<Uuid, Organisation>,
    establishments: HashMap<Uuid, Establishment>,
}

impl State {
    fn user_in_scope(&self, user: &User, scope: &AuthScope) -> bool {
        match scope.filter {
            ScopeFilter::Unrestricted => true,
            ScopeFilter::User(own_id) => user.id == own_id,
            ScopeFilter::Organisation(Some(org_id)) => self
                .accounts
                .values()
                .any(|a| a.user_id == user.id && a.organisation_id == Some(org_id)),
            ScopeFilter::Establishment(Some(est_id)) => self
                .accounts
                .values()
                .any(|a| a.user_id == user.id && a.establishment_id == Some(est_id)),
            ScopeFilter::Organisation(None) | ScopeFilter::Establishment(None) => false,
        }
    }

    /// Disable every user left with no enabled account among `user_ids`.
    fn cascade_users(&mut self, user_ids: &[Uuid]) -> u64 {
        let mut disabled = 0;
        for user_id in user_ids {
            let any_enabled = self
                .accounts
                .values()
                .any(|a| a.user_id == *user_id && a.enabled);
            if any_enabled {
                continue;
            }
            if let Some(user) = self.users.get_mut(user_id) {
                if user.enabled {
                    user.enabled = false;
                    user.updated_at = Utc::now();
                    disabled += 1;
                }
            }
        }
        disabled
    }

    fn insert_account(&mut self, data: CreateUserAccount) -> UserAccount {
        let account = UserAccount {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            organisation_id: data.organisation_id,
            establishment_id: data.establishment_id,
            enabled: true,
            created_at: Utc::now(),
        };
        self.account_roles.insert(account.id, data.role_ids);
        self.accounts.insert(account.id, account.clone());
        account
    }
}

/// Mutex-guarded in-memory directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    state: Mutex<State>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a role (seeding helper).
    pub async fn add_role(&self, name: &str, claims: &[Claim]) -> Role {
        let role = Role {
            id: Uuid::new_v4(),
            name: name.trim().to_lowercase(),
            description: None,
            claims: claims.to_vec(),
            created_at: Utc::now(),
        };
        self.state
            .lock()
            .await
            .roles
            .insert(role.id, role.clone());
        role
    }

    /// Register an organisation (seeding helper).
    pub async fn add_organisation(&self, name: &str) -> Organisation {
        let organisation = Organisation {
            id: Uuid::new_v4(),
            name: name.to_string(),
            enabled: true,
            created_at: Utc::now(),
        };
        self.state
            .lock()
            .await
            .organisations
            .insert(organisation.id, organisation.clone());
        organisation
    }

    /// Register an establishment (seeding helper).
    pub async fn add_establishment(&self, organisation_id: Uuid, name: &str) -> Establishment {
        let establishment = Establishment {
            id: Uuid::new_v4(),
            organisation_id,
            name: name.to_string(),
            enabled: true,
            created_at: Utc::now(),
        };
        self.state
            .lock()
            .await
            .establishments
            .insert(establishment.id, establishment.clone());
        establishment
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn user_by_id_scoped(
        &self,
        id: Uuid,
        scope: Option<&AuthScope>,
    ) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        let Some(user) = state.users.get(&id) else {
            return Ok(None);
        };
        match scope {
            Some(scope) if !state.user_in_scope(user, scope) => Ok(None),
            _ => Ok(Some(user.clone())),
        }
    }

    async fn login_account(
        &self,
        user_id: Uuid,
        organisation_id: Option<Uuid>,
    ) -> AppResult<Option<UserAccount>> {
        let state = self.state.lock().await;
        let mut candidates: Vec<&UserAccount> = state
            .accounts
            .values()
            .filter(|a| {
                a.user_id == user_id
                    && a.enabled
                    && organisation_id
                        .map(|org| a.organisation_id == Some(org))
                        .unwrap_or(true)
            })
            .collect();
        candidates.sort_by_key(|a| (a.created_at, a.id));
        Ok(candidates.first().map(|a| (*a).clone()))
    }

    async fn roles_by_names(&self, names: &[String]) -> AppResult<Vec<Role>> {
        let wanted: Vec<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();
        Ok(self
            .state
            .lock()
            .await
            .roles
            .values()
            .filter(|r| wanted.contains(&r.name))
            .cloned()
            .collect())
    }

    async fn roles_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Role>> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.roles.get(id).cloned())
            .collect())
    }

    async fn create_user_with_account(
        &self,
        user: CreateUser,
        account: NewAccount,
    ) -> AppResult<(User, UserAccount)> {
        let mut state = self.state.lock().await;
        let email = user.email.trim().to_lowercase();
        if state.users.values().any(|u| u.email == email) {
            return Err(AppError::conflict(format!(
                "A user with email '{email}' already exists"
            )));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            enabled: true,
            email_validated_at: user.email_validated.then_some(now),
            terms_accepted_at: None,
            privacy_accepted_at: None,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.id, created.clone());

        let created_account = state.insert_account(CreateUserAccount {
            user_id: created.id,
            organisation_id: account.organisation_id,
            establishment_id: account.establishment_id,
            role_ids: account.role_ids,
        });

        Ok((created, created_account))
    }

    async fn add_account(&self, account: CreateUserAccount) -> AppResult<UserAccount> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&account.user_id) {
            return Err(AppError::not_found(format!(
                "User {} not found",
                account.user_id
            )));
        }
        Ok(state.insert_account(account))
    }

    async fn set_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        self.update_user(user_id, |u| u.password_hash = password_hash.to_string())
            .await
    }

    async fn set_email(&self, user_id: Uuid, email: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        self.update_user(user_id, move |u| {
            u.email = email;
            u.email_validated_at = Some(Utc::now());
        })
        .await
    }

    async fn mark_email_validated(&self, user_id: Uuid) -> AppResult<()> {
        self.update_user(user_id, |u| u.email_validated_at = Some(Utc::now()))
            .await
    }

    async fn mark_terms_accepted(&self, user_id: Uuid) -> AppResult<()> {
        self.update_user(user_id, |u| u.terms_accepted_at = Some(Utc::now()))
            .await
    }

    async fn mark_privacy_accepted(&self, user_id: Uuid) -> AppResult<()> {
        self.update_user(user_id, |u| u.privacy_accepted_at = Some(Utc::now()))
            .await
    }

    async fn disable_account(&self, account_id: Uuid) -> AppResult<CascadeOutcome> {
        let mut state = self.state.lock().await;
        let Some(account) = state.accounts.get_mut(&account_id) else {
            return Err(AppError::not_found(format!(
                "Account {account_id} not found"
            )));
        };

        let user_id = account.user_id;
        let accounts_disabled = if account.enabled {
            account.enabled = false;
            1
        } else {
            0
        };
        let users_disabled = state.cascade_users(&[user_id]);

        Ok(CascadeOutcome {
            accounts_disabled,
            users_disabled,
        })
    }

    async fn enable_account(&self, account_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        match state.accounts.get_mut(&account_id) {
            Some(account) => {
                account.enabled = true;
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "Account {account_id} not found"
            ))),
        }
    }

    async fn disable_establishment(&self, id: Uuid) -> AppResult<CascadeOutcome> {
        let mut state = self.state.lock().await;
        match state.establishments.get_mut(&id) {
            Some(establishment) => establishment.enabled = false,
            None => {
                return Err(AppError::not_found(format!(
                    "Establishment {id} not found"
                )));
            }
        }

        let mut touched_users = Vec::new();
        let mut accounts_disabled = 0;
        for account in state.accounts.values_mut() {
            if account.establishment_id == Some(id) && account.enabled {
                account.enabled = false;
                accounts_disabled += 1;
                touched_users.push(account.user_id);
            }
        }
        let users_disabled = state.cascade_users(&touched_users);

        Ok(CascadeOutcome {
            accounts_disabled,
            users_disabled,
        })
    }

    async fn enable_establishment(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        match state.establishments.get_mut(&id) {
            Some(establishment) => {
                establishment.enabled = true;
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "Establishment {id} not found"
            ))),
        }
    }

    async fn disable_organisation(&self, id: Uuid) -> AppResult<CascadeOutcome> {
        let mut state = self.state.lock().await;
        match state.organisations.get_mut(&id) {
            Some(organisation) => organisation.enabled = false,
            None => {
                return Err(AppError::not_found(format!(
                    "Organisation {id} not found"
                )));
            }
        }

        let mut touched_users = Vec::new();
        let mut accounts_disabled = 0;
        for account in state.accounts.values_mut() {
            if account.organisation_id == Some(id) && account.enabled {
                account.enabled = false;
                accounts_disabled += 1;
                touched_users.push(account.user_id);
            }
        }
        let users_disabled = state.cascade_users(&touched_users);

        Ok(CascadeOutcome {
            accounts_disabled,
            users_disabled,
        })
    }

    async fn enable_organisation(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        match state.organisations.get_mut(&id) {
            Some(organisation) => {
                organisation.enabled = true;
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "Organisation {id} not found"
            ))),
        }
    }
}

impl MemoryDirectory {
    async fn update_user(
        &self,
        user_id: Uuid,
        apply: impl FnOnce(&mut User) + Send,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        match state.users.get_mut(&user_id) {
            Some(user) => {
                apply(user);
                user.updated_at = Utc::now();
                Ok(())
            }
            None => Err(AppError::not_found(format!("User {user_id} not found"))),
        }
    }
}

#[async_trait]
impl AccountSource for MemoryDirectory {
    async fn account_grants(&self, account_id: Uuid) -> AppResult<Option<AccountGrants>> {
        let state = self.state.lock().await;
        let Some(account) = state.accounts.get(&account_id) else {
            return Ok(None);
        };
        let user = state
            .users
            .get(&account.user_id)
            .cloned()
            .ok_or_else(|| AppError::internal("Account references a missing user"))?;
        let roles = state
            .account_roles
            .get(&account_id)
            .into_iter()
            .flatten()
            .filter_map(|role_id| state.roles.get(role_id).cloned())
            .collect();

        Ok(Some(AccountGrants {
            account: account.clone(),
            user,
            roles,
        }))
    }

    async fn accounts_of_user(&self, user_id: Uuid) -> AppResult<Vec<UserAccount>> {
        Ok(self
            .state
            .lock()
            .await
            .accounts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}
