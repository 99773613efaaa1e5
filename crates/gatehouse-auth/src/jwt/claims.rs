//! JWT claims payload embedded in every bearer credential.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims payload.
///
/// The credential's signature and expiry are verified independently of
/// the session window; both must hold for a request to pass the gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the user account ID this credential authenticates.
    pub sub: Uuid,
    /// The account's email at issuance time.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique credential ID.
    pub jti: Uuid,
}

impl Claims {
    /// The account this credential authenticates.
    pub fn account_id(&self) -> Uuid {
        self.sub
    }

    /// Checks whether this credential has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
