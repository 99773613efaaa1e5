//! User account entity model (the authenticating/authorizing unit).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use chrono::{DateTime, Utc};

use crate::claim::Claim;
use crate::role::Role;
use crate::user::User;

/// One authorization context of a user.
///
/// A user may hold several accounts (e.g. one per organisation); each
/// carries its own roles and enabled flag. Sessions reference accounts,
/// not users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    /// Unique account identifier.
    pub id: Uuid,
    /// The underlying user.
    pub user_id: Uuid,
    /// The organisation this account belongs to, if any.
    pub organisation_id: Option<Uuid>,
    /// The establishment this account belongs to, if any.
    pub establishment_id: Option<Uuid>,
    /// Whether the account may be used.
    pub enabled: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserAccount {
    /// The underlying user.
    pub user_id: Uuid,
    /// Organisation membership, if any.
    pub organisation_id: Option<Uuid>,
    /// Establishment membership, if any.
    pub establishment_id: Option<Uuid>,
    /// Roles to attach.
    pub role_ids: Vec<Uuid>,
}

/// What a disable cascade touched.
///
/// Disabling cascades downward (establishment → accounts → users with no
/// other enabled account); enabling never cascades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    /// Accounts flipped to disabled.
    pub accounts_disabled: u64,
    /// Users flipped to disabled because their last enabled account went.
    pub users_disabled: u64,
}

/// An account loaded together with its user and Role→Claim closure.
///
/// This is the shape the auth gate and the scope resolver work on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountGrants {
    /// The account itself.
    pub account: UserAccount,
    /// The underlying user.
    pub user: User,
    /// The account's roles, each with its claims loaded.
    pub roles: Vec<Role>,
}

impl AccountGrants {
    /// The accumulated claim set across every role on the account.
    pub fn held_claims(&self) -> HashSet<Claim> {
        self.roles
            .iter()
            .flat_map(|role| role.claims.iter().cloned())
            .collect()
    }

    /// Whether both the account and its underlying user are enabled.
    pub fn is_enabled(&self) -> bool {
        self.account.enabled && self.user.enabled
    }
}
