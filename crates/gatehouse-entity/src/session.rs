//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An active login, keyed by the bearer token string itself.
///
/// At most one live session exists per account: creating a new session
/// deletes every prior one for that account. A session is active iff
/// `now < expiration_date`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// The bearer token string (primary key, 1:1 with the credential).
    pub token: String,
    /// The account this session belongs to.
    pub user_account_id: Uuid,
    /// When the session was created (login time).
    pub login_date: DateTime<Utc>,
    /// Absolute expiry.
    pub expiration_date: DateTime<Utc>,
}

impl Session {
    /// Check whether the session is still active.
    pub fn is_active(&self) -> bool {
        Utc::now() < self.expiration_date
    }

    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        !self.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_active_tracks_expiration() {
        let mut session = Session {
            token: "t".to_string(),
            user_account_id: Uuid::new_v4(),
            login_date: Utc::now(),
            expiration_date: Utc::now() + Duration::hours(1),
        };
        assert!(session.is_active());

        session.expiration_date = Utc::now() - Duration::seconds(1);
        assert!(session.is_expired());
    }
}
