//! Login and logout flows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use gatehouse_auth::jwt::JwtEncoder;
use gatehouse_auth::password::PasswordHasher;
use gatehouse_auth::session::SessionManager;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::account::UserAccount;
use gatehouse_entity::session::Session;
use gatehouse_entity::user::User;

use crate::directory::Directory;

/// Result of a successful login or invitation acceptance.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// The authenticated user.
    pub user: User,
    /// The account the session was opened on.
    pub account: UserAccount,
    /// The created session.
    pub session: Session,
    /// The signed bearer credential.
    pub token: String,
    /// Credential expiry.
    pub token_expires_at: DateTime<Utc>,
}

/// Email + password authentication and session teardown.
#[derive(Clone)]
pub struct AccessService {
    directory: Arc<dyn Directory>,
    sessions: Arc<SessionManager>,
    encoder: Arc<JwtEncoder>,
    hasher: Arc<PasswordHasher>,
}

impl std::fmt::Debug for AccessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessService").finish()
    }
}

impl AccessService {
    /// Create a new access service.
    pub fn new(
        directory: Arc<dyn Directory>,
        sessions: Arc<SessionManager>,
        encoder: Arc<JwtEncoder>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            directory,
            sessions,
            encoder,
            hasher,
        }
    }

    /// Authenticate with email + password and open a session.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller. An optional organisation id picks the account to log into
    /// when the user has several.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        organisation_id: Option<Uuid>,
    ) -> AppResult<LoginResult> {
        let invalid = || AppError::unauthorized("Invalid credentials");

        let user = self
            .directory
            .user_by_email(email)
            .await?
            .ok_or_else(invalid)?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(invalid());
        }

        if !user.enabled {
            return Err(AppError::unauthorized("Account is disabled"));
        }

        let account = self
            .directory
            .login_account(user.id, organisation_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("No enabled account for this user"))?;

        let result = self.issue_session(user, account).await?;
        info!(user_id = %result.user.id, account_id = %result.account.id, "Login");
        Ok(result)
    }

    /// Issue a fresh credential and session for an already-verified
    /// user/account pair (login, invitation acceptance).
    pub async fn issue_session(
        &self,
        user: User,
        account: UserAccount,
    ) -> AppResult<LoginResult> {
        let (token, token_expires_at) = self.encoder.generate(account.id, &user.email)?;
        let session = self.sessions.create(&token, account.id).await?;

        Ok(LoginResult {
            user,
            account,
            session,
            token,
            token_expires_at,
        })
    }

    /// Delete the session behind one credential (logout). `true` when a
    /// session existed.
    pub async fn logout(&self, token: &str) -> AppResult<bool> {
        self.sessions.delete_by_token(token).await
    }

    /// Delete every session across all accounts of the user.
    pub async fn logout_all(&self, user_id: Uuid) -> AppResult<u64> {
        self.sessions.delete_all_by_user(user_id).await
    }
}
