//! Email flows: validation and change of address.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use gatehouse_auth::token::{ActionTokenService, ValidateActionToken};
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::client::Client;
use gatehouse_entity::token::{ActionType, ActionTypeSet, CreateActionToken};

use crate::directory::Directory;
use crate::link::ActionLinkBuilder;
use crate::mailer::Mailer;

use super::deliver;

/// A token presented back by an email flow.
#[derive(Debug, Clone)]
pub struct EmailTokenRequest {
    /// The action token.
    pub token: String,
    /// The email the token was issued for.
    pub email: String,
}

/// Email validation and change-of-address flows.
#[derive(Clone)]
pub struct EmailFlowService {
    directory: Arc<dyn Directory>,
    tokens: Arc<ActionTokenService>,
    links: Arc<ActionLinkBuilder>,
    mailer: Arc<dyn Mailer>,
}

impl std::fmt::Debug for EmailFlowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailFlowService").finish()
    }
}

impl EmailFlowService {
    /// Create a new email flow service.
    pub fn new(
        directory: Arc<dyn Directory>,
        tokens: Arc<ActionTokenService>,
        links: Arc<ActionLinkBuilder>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            directory,
            tokens,
            links,
            mailer,
        }
    }

    /// Issue a validation token for the address, when a matching user
    /// exists. Unknown addresses succeed identically (no enumeration).
    pub async fn send_validation(&self, client: &Client, email: &str) -> AppResult<()> {
        let Some(user) = self.directory.user_by_email(email).await? else {
            debug!("Email validation requested for unknown email");
            return Ok(());
        };

        let token = self
            .tokens
            .create(
                Some(client),
                CreateActionToken {
                    types: ActionTypeSet::only(ActionType::ValidateEmail),
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
            ActionType::ValidateEmail,
            &token,
        )
        .await
    }

    /// Consume a validation token, stamping the address as proven.
    pub async fn validate(&self, request: EmailTokenRequest) -> AppResult<()> {
        let token = self
            .tokens
            .validate(
                &ValidateActionToken {
                    token: request.token,
                    email: request.email,
                },
                ActionTypeSet::only(ActionType::ValidateEmail),
            )
            .await?;

        let user_id = self.token_user_id(&token.user_id, &token.email).await?;
        self.directory.mark_email_validated(user_id).await?;
        self.tokens.revoke(&token.token).await?;
        info!(user_id = %user_id, "Email validated");

        Ok(())
    }

    /// Issue a change-of-address token, sent to the **new** address.
    pub async fn request_change(
        &self,
        client: &Client,
        user_id: Uuid,
        new_email: &str,
    ) -> AppResult<()> {
        if self.directory.user_by_id(user_id).await?.is_none() {
            return Err(AppError::not_found("User not found"));
        }
        if self.directory.user_by_email(new_email).await?.is_some() {
            return Err(AppError::conflict("Email address already in use"));
        }

        let token = self
            .tokens
            .create(
                Some(client),
                CreateActionToken {
                    types: ActionTypeSet::only(ActionType::ChangeEmail),
                    email: new_email.to_string(),
                    user_id: Some(user_id),
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
            ActionType::ChangeEmail,
            &token,
        )
        .await
    }

    /// Consume a change-of-address token, applying the new address.
    pub async fn confirm_change(&self, request: EmailTokenRequest) -> AppResult<()> {
        let token = self
            .tokens
            .validate(
                &ValidateActionToken {
                    token: request.token,
                    email: request.email,
                },
                ActionTypeSet::only(ActionType::ChangeEmail),
            )
            .await?;

        let user_id = token.user_id.ok_or_else(|| {
            AppError::validation("Change-email token does not reference a user")
        })?;

        self.directory.set_email(user_id, &token.email).await?;
        self.tokens.revoke(&token.token).await?;
        info!(user_id = %user_id, "Email changed");

        Ok(())
    }

    async fn token_user_id(&self, user_id: &Option<Uuid>, email: &str) -> AppResult<Uuid> {
        if let Some(id) = user_id {
            return Ok(*id);
        }
        self.directory
            .user_by_email(email)
            .await?
            .map(|u| u.id)
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
