//! User entity model (the underlying identity).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The underlying identity behind one or more user accounts.
///
/// A user authenticates with email + password; authorization state
/// (roles, organisation, establishment) lives on [`crate::UserAccount`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Email address (unique, stored lowercase).
    pub email: String,
    /// Argon2 password digest.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// First name (optional).
    pub first_name: Option<String>,
    /// Last name (optional).
    pub last_name: Option<String>,
    /// Whether the user may authenticate at all.
    pub enabled: bool,
    /// When the email address was proven, if ever.
    pub email_validated_at: Option<DateTime<Utc>>,
    /// When the terms of service were accepted, if ever.
    pub terms_accepted_at: Option<DateTime<Utc>>,
    /// When the privacy policy was accepted, if ever.
    pub privacy_accepted_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// First name (optional).
    pub first_name: Option<String>,
    /// Last name (optional).
    pub last_name: Option<String>,
    /// Whether the email is already proven (invite flow).
    pub email_validated: bool,
}
