//! Invitation flow: administrative send, public accept.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use gatehouse_auth::password::PasswordHasher;
use gatehouse_auth::token::{ActionTokenService, ValidateActionToken};
use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::account::CreateUserAccount;
use gatehouse_entity::client::Client;
use gatehouse_entity::token::{ActionToken, ActionType, ActionTypeSet, CreateActionToken};
use gatehouse_entity::user::CreateUser;

use crate::directory::{Directory, NewAccount};
use crate::link::ActionLinkBuilder;
use crate::mailer::Mailer;

use super::access::{AccessService, LoginResult};
use super::deliver;
use super::password::check_password_policy;

/// An administrative invitation request.
#[derive(Debug, Clone)]
pub struct InviteRequest {
    /// Email address to invite.
    pub email: String,
    /// Role names to pre-assign on acceptance.
    pub role_names: Vec<String>,
    /// Organisation the created account will belong to.
    pub organisation_id: Option<Uuid>,
    /// Establishment the created account will belong to.
    pub establishment_id: Option<Uuid>,
}

/// A public invitation acceptance.
#[derive(Debug, Clone)]
pub struct AcceptInvitation {
    /// The invitation token.
    pub token: String,
    /// The invited email, restated by the presenter.
    pub email: String,
    /// The chosen password.
    pub password: String,
    /// First name (optional).
    pub first_name: Option<String>,
    /// Last name (optional).
    pub last_name: Option<String>,
}

/// Issues and consumes invitation tokens.
#[derive(Clone)]
pub struct InvitationService {
    directory: Arc<dyn Directory>,
    tokens: Arc<ActionTokenService>,
    access: Arc<AccessService>,
    hasher: Arc<PasswordHasher>,
    links: Arc<ActionLinkBuilder>,
    mailer: Arc<dyn Mailer>,
    auth_config: AuthConfig,
}

impl std::fmt::Debug for InvitationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvitationService").finish()
    }
}

impl InvitationService {
    /// Create a new invitation service.
    pub fn new(
        directory: Arc<dyn Directory>,
        tokens: Arc<ActionTokenService>,
        access: Arc<AccessService>,
        hasher: Arc<PasswordHasher>,
        links: Arc<ActionLinkBuilder>,
        mailer: Arc<dyn Mailer>,
        auth_config: AuthConfig,
    ) -> Self {
        Self {
            directory,
            tokens,
            access,
            hasher,
            links,
            mailer,
            auth_config,
        }
    }

    /// Issue an invitation token and hand it to the mailer.
    ///
    /// The token bundles `invite` with `validate_email`: accepting it
    /// both creates the account and proves the address.
    pub async fn send(&self, client: &Client, request: InviteRequest) -> AppResult<ActionToken> {
        let roles = self.directory.roles_by_names(&request.role_names).await?;
        if roles.len() != request.role_names.len() {
            return Err(AppError::not_found("Unknown role in invitation"));
        }

        let existing_user = self.directory.user_by_email(&request.email).await?;

        let token = self
            .tokens
            .create(
                Some(client),
                CreateActionToken {
                    types: ActionType::Invite | ActionType::ValidateEmail,
                    email: request.email,
                    user_id: existing_user.map(|u| u.id),
                    role_ids: roles.iter().map(|r| r.id).collect(),
                    organisation_id: request.organisation_id,
                    establishment_id: request.establishment_id,
                    expires_in_hours: None,
                },
            )
            .await?;

        deliver(&self.mailer, &self.links, client, ActionType::Invite, &token).await?;
        info!(email = %token.email, "Invitation sent");

        Ok(token)
    }

    /// Accept an invitation: validate the token, create (or extend) the
    /// user, revoke the token, and open a fresh session.
    pub async fn accept(&self, request: AcceptInvitation) -> AppResult<LoginResult> {
        let token = self
            .tokens
            .validate(
                &ValidateActionToken {
                    token: request.token,
                    email: request.email,
                },
                ActionTypeSet::only(ActionType::Invite),
            )
            .await?;

        check_password_policy(&self.auth_config, &request.password)?;
        let password_hash = self.hasher.hash_password(&request.password)?;

        let (user, account) = match token.user_id {
            // Invitation for an existing user: add an account.
            Some(user_id) => {
                let user = self
                    .directory
                    .user_by_id(user_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Invited user no longer exists"))?;
                let account = self
                    .directory
                    .add_account(CreateUserAccount {
                        user_id,
                        organisation_id: token.organisation_id,
                        establishment_id: token.establishment_id,
                        role_ids: token.role_ids.clone(),
                    })
                    .await?;
                (user, account)
            }
            // Fresh signup from the invitation.
            None => {
                self.directory
                    .create_user_with_account(
                        CreateUser {
                            email: token.email.clone(),
                            password_hash,
                            first_name: request.first_name,
                            last_name: request.last_name,
                            email_validated: token.types.contains(ActionType::ValidateEmail),
                        },
                        NewAccount {
                            organisation_id: token.organisation_id,
                            establishment_id: token.establishment_id,
                            role_ids: token.role_ids.clone(),
                        },
                    )
                    .await?
            }
        };

        // Consume only after the guarded mutation succeeded.
        self.tokens.revoke(&token.token).await?;
        info!(user_id = %user.id, account_id = %account.id, "Invitation accepted");

        self.access.issue_session(user, account).await
    }
}
