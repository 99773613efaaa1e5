//! Action token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action_type::ActionTypeSet;

/// A single-use credential gating sensitive account-state transitions.
///
/// Tokens are issued with an absolute expiry, validated against the
/// presenting request, and deleted (revoked) once the guarded mutation
/// has completed. An expired or already-revoked token is always rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionToken {
    /// Opaque unguessable token string (primary key).
    pub token: String,
    /// The action types this token authorizes.
    pub types: ActionTypeSet,
    /// The email address the token is bound to.
    pub email: String,
    /// The existing user this token targets, if any. When absent the
    /// token is usable by any matching signup.
    pub user_id: Option<Uuid>,
    /// Roles to pre-assign on account creation (invite flow only).
    pub role_ids: Vec<Uuid>,
    /// Organisation hint for the created account (invite flow only).
    pub organisation_id: Option<Uuid>,
    /// Establishment hint for the created account (invite flow only).
    pub establishment_id: Option<Uuid>,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

impl ActionToken {
    /// Check whether the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Check whether the token's email matches, case-insensitively.
    pub fn email_matches(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

/// Data required to issue a new action token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActionToken {
    /// The action types to authorize (at least one).
    pub types: ActionTypeSet,
    /// The email address to bind the token to.
    pub email: String,
    /// The existing user the token targets, if any.
    pub user_id: Option<Uuid>,
    /// Roles to pre-assign on account creation (invite flow only).
    pub role_ids: Vec<Uuid>,
    /// Organisation hint (invite flow only).
    pub organisation_id: Option<Uuid>,
    /// Establishment hint (invite flow only).
    pub establishment_id: Option<Uuid>,
    /// Explicit validity in hours. When absent, the maximum configured
    /// validity across all requested action types applies.
    pub expires_in_hours: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ActionType;
    use chrono::Duration;

    fn token(expires_at: DateTime<Utc>) -> ActionToken {
        ActionToken {
            token: "opaque".to_string(),
            types: ActionTypeSet::only(ActionType::ResetPassword),
            email: "Bob@Example.com".to_string(),
            user_id: None,
            role_ids: vec![],
            organisation_id: None,
            establishment_id: None,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_expiry() {
        assert!(token(Utc::now() - Duration::seconds(1)).is_expired());
        assert!(!token(Utc::now() + Duration::hours(1)).is_expired());
    }

    #[test]
    fn test_email_match_is_case_insensitive() {
        let t = token(Utc::now() + Duration::hours(1));
        assert!(t.email_matches("bob@example.com"));
        assert!(t.email_matches(" BOB@EXAMPLE.COM "));
        assert!(!t.email_matches("alice@example.com"));
    }
}
