//! Terms of service and privacy policy acceptance.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use gatehouse_auth::token::{ActionTokenService, ValidateActionToken};
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::token::{ActionType, ActionTypeSet};

use crate::directory::Directory;

use super::email::EmailTokenRequest;

/// Token-gated acceptance of terms and privacy policy.
#[derive(Clone)]
pub struct TermsService {
    directory: Arc<dyn Directory>,
    tokens: Arc<ActionTokenService>,
}

impl std::fmt::Debug for TermsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermsService").finish()
    }
}

impl TermsService {
    /// Create a new terms service.
    pub fn new(directory: Arc<dyn Directory>, tokens: Arc<ActionTokenService>) -> Self {
        Self { directory, tokens }
    }

    /// Consume a token authorizing terms acceptance.
    pub async fn accept_terms(&self, request: EmailTokenRequest) -> AppResult<()> {
        let (user_id, token) = self
            .validate(request, ActionTypeSet::only(ActionType::AcceptTerms))
            .await?;
        self.directory.mark_terms_accepted(user_id).await?;
        self.tokens.revoke(&token).await?;
        info!(user_id = %user_id, "Terms accepted");
        Ok(())
    }

    /// Consume a token authorizing privacy policy acceptance.
    pub async fn accept_privacy_policy(&self, request: EmailTokenRequest) -> AppResult<()> {
        let (user_id, token) = self
            .validate(request, ActionTypeSet::only(ActionType::AcceptPrivacyPolicy))
            .await?;
        self.directory.mark_privacy_accepted(user_id).await?;
        self.tokens.revoke(&token).await?;
        info!(user_id = %user_id, "Privacy policy accepted");
        Ok(())
    }

    async fn validate(
        &self,
        request: EmailTokenRequest,
        required: ActionTypeSet,
    ) -> AppResult<(Uuid, String)> {
        let token = self
            .tokens
            .validate(
                &ValidateActionToken {
                    token: request.token,
                    email: request.email,
                },
                required,
            )
            .await?;

        let user_id = match token.user_id {
            Some(id) => id,
            None => self
                .directory
                .user_by_email(&token.email)
                .await?
                .map(|u| u.id)
                .ok_or_else(|| AppError::not_found("User not found"))?,
        };

        Ok((user_id, token.token))
    }
}
