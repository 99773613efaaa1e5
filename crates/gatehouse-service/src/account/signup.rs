//! Public sign-up flow.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use gatehouse_auth::password::PasswordHasher;
use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::account::UserAccount;
use gatehouse_entity::client::Client;
use gatehouse_entity::user::{CreateUser, User};

use crate::directory::{Directory, NewAccount};

use super::email::EmailFlowService;
use super::password::check_password_policy;

/// A public sign-up request.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    /// Email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// First name (optional).
    pub first_name: Option<String>,
    /// Last name (optional).
    pub last_name: Option<String>,
    /// Organisation to join, if the client scopes sign-ups to one.
    pub organisation_id: Option<Uuid>,
}

/// Creates self-service users with the configured default roles.
#[derive(Clone)]
pub struct SignupService {
    directory: Arc<dyn Directory>,
    emails: Arc<EmailFlowService>,
    hasher: Arc<PasswordHasher>,
    auth_config: AuthConfig,
}

impl std::fmt::Debug for SignupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupService").finish()
    }
}

impl SignupService {
    /// Create a new sign-up service.
    pub fn new(
        directory: Arc<dyn Directory>,
        emails: Arc<EmailFlowService>,
        hasher: Arc<PasswordHasher>,
        auth_config: AuthConfig,
    ) -> Self {
        Self {
            directory,
            emails,
            hasher,
            auth_config,
        }
    }

    /// Create a user with the configured sign-up roles and send the
    /// email-validation token. A duplicate email is a conflict.
    pub async fn signup(
        &self,
        client: &Client,
        request: SignupRequest,
    ) -> AppResult<(User, UserAccount)> {
        check_password_policy(&self.auth_config, &request.password)?;

        if self.directory.user_by_email(&request.email).await?.is_some() {
            return Err(AppError::conflict("A user with this email already exists"));
        }

        let roles = self
            .directory
            .roles_by_names(&self.auth_config.signup_roles)
            .await?;

        let password_hash = self.hasher.hash_password(&request.password)?;
        let (user, account) = self
            .directory
            .create_user_with_account(
                CreateUser {
                    email: request.email,
                    password_hash,
                    first_name: request.first_name,
                    last_name: request.last_name,
                    email_validated: false,
                },
                NewAccount {
                    organisation_id: request.organisation_id,
                    establishment_id: None,
                    role_ids: roles.iter().map(|r| r.id).collect(),
                },
            )
            .await?;

        self.emails.send_validation(client, &user.email).await?;
        info!(user_id = %user.id, "Sign-up");

        Ok((user, account))
    }
}
