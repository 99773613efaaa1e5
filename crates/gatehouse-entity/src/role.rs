//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::claim::Claim;

/// A named, described set of claims.
///
/// A role's identity is its name, case-insensitive and stored lowercase.
/// Claims are referenced by canonical string, never owned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique role identifier.
    pub id: Uuid,
    /// Role name (unique, lowercase).
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// The claims this role grants.
    pub claims: Vec<Claim>,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    /// Role name (normalized to lowercase).
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// The claims to grant.
    pub claims: Vec<Claim>,
}
