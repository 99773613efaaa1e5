//! Password flows: reset by token, authenticated change.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use gatehouse_auth::password::PasswordHasher;
use gatehouse_auth::session::SessionManager;
use gatehouse_auth::token::{ActionTokenService, ValidateActionToken};
use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::client::Client;
use gatehouse_entity::token::{ActionType, ActionTypeSet, CreateActionToken};
use gatehouse_entity::user::User;

use crate::directory::Directory;
use crate::link::ActionLinkBuilder;
use crate::mailer::Mailer;

use super::deliver;

/// Minimum-length password policy from configuration.
pub(crate) fn check_password_policy(config: &AuthConfig, password: &str) -> AppResult<()> {
    if password.len() < config.password_min_length {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            config.password_min_length
        )));
    }
    Ok(())
}

/// A token-gated password reset.
#[derive(Debug, Clone)]
pub struct ResetPassword {
    /// The reset token.
    pub token: String,
    /// The email the token was issued for.
    pub email: String,
    /// The new password.
    pub new_password: String,
}

/// Password reset and change flows.
#[derive(Clone)]
pub struct PasswordService {
    directory: Arc<dyn Directory>,
    tokens: Arc<ActionTokenService>,
    sessions: Arc<SessionManager>,
    hasher: Arc<PasswordHasher>,
    links: Arc<ActionLinkBuilder>,
    mailer: Arc<dyn Mailer>,
    auth_config: AuthConfig,
}

impl std::fmt::Debug for PasswordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordService").finish()
    }
}

impl PasswordService {
    /// Create a new password service.
    pub fn new(
        directory: Arc<dyn Directory>,
        tokens: Arc<ActionTokenService>,
        sessions: Arc<SessionManager>,
        hasher: Arc<PasswordHasher>,
        links: Arc<ActionLinkBuilder>,
        mailer: Arc<dyn Mailer>,
        auth_config: AuthConfig,
    ) -> Self {
        Self {
            directory,
            tokens,
            sessions,
            hasher,
            links,
            mailer,
            auth_config,
        }
    }

    /// Issue a reset token for the email, when a matching user exists.
    ///
    /// An unknown email succeeds identically: responding differently
    /// would let callers probe which addresses are registered.
    pub async fn send_reset(&self, client: &Client, email: &str) -> AppResult<()> {
        let Some(user) = self.directory.user_by_email(email).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = self
            .tokens
            .create(
                Some(client),
                CreateActionToken {
                    types: ActionTypeSet::only(ActionType::ResetPassword),
                    email: user.email.clone(),
                    user_id: Some(user.id),
                    role_ids: vec![],
                    organisation_id: None,
                    establishment_id: None,
                    expires_in_hours: None,
                },
            )
            .await?;

        deliver(
            &self.mailer,
            &self.links,
            client,
            ActionType::ResetPassword,
            &token,
        )
        .await
    }

    /// Apply a token-gated reset, then log the user out everywhere.
    ///
    /// A rejected new password leaves the token unconsumed so the user
    /// can retry with the same link.
    pub async fn reset(&self, request: ResetPassword) -> AppResult<()> {
        let token = self
            .tokens
            .validate(
                &ValidateActionToken {
                    token: request.token,
                    email: request.email,
                },
                ActionTypeSet::only(ActionType::ResetPassword),
            )
            .await?;

        check_password_policy(&self.auth_config, &request.new_password)?;
        let user = self.token_user(&token.user_id, &token.email).await?;

        let password_hash = self.hasher.hash_password(&request.new_password)?;
        self.directory.set_password(user.id, &password_hash).await?;
        self.tokens.revoke(&token.token).await?;

        let dropped = self.sessions.delete_all_by_user(user.id).await?;
        info!(user_id = %user.id, dropped_sessions = dropped, "Password reset");

        Ok(())
    }

    /// Change the password of an authenticated user.
    pub async fn change(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .directory
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !self
            .hasher
            .verify_password(current_password, &user.password_hash)?
        {
            return Err(AppError::unauthorized("Current password is incorrect"));
        }

        check_password_policy(&self.auth_config, new_password)?;
        let password_hash = self.hasher.hash_password(new_password)?;
        self.directory.set_password(user.id, &password_hash).await?;
        info!(user_id = %user.id, "Password changed");

        Ok(())
    }

    async fn token_user(&self, user_id: &Option<Uuid>, email: &str) -> AppResult<User> {
        let user = match user_id {
            Some(id) => self.directory.user_by_id(*id).await?,
            None => self.directory.user_by_email(email).await?,
        };
        user.ok_or_else(|| AppError::not_found("User not found"))
    }
}
