//! Response body shapes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use gatehouse_entity::account::CascadeOutcome;
use gatehouse_entity::user::User;

/// Successful login or invitation acceptance.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The signed bearer credential.
    pub token: String,
    /// Credential expiry.
    pub expires_at: DateTime<Utc>,
    /// The account the session was opened on.
    pub account_id: Uuid,
    /// The authenticated user (password digest never serialized).
    pub user: User,
}

/// Issued invitation summary. The token itself travels by mail.
#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    /// Invited email.
    pub email: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

/// Cascade outcome of a disable operation.
#[derive(Debug, Serialize)]
pub struct CascadeResponse {
    /// Accounts flipped to disabled.
    pub accounts_disabled: u64,
    /// Users flipped to disabled.
    pub users_disabled: u64,
}

impl From<CascadeOutcome> for CascadeResponse {
    fn from(outcome: CascadeOutcome) -> Self {
        Self {
            accounts_disabled: outcome.accounts_disabled,
            users_disabled: outcome.users_disabled,
        }
    }
}
