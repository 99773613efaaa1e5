//! Establishment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A site within an organisation; the narrowest shared visibility scope.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Establishment {
    /// Unique establishment identifier.
    pub id: Uuid,
    /// The owning organisation.
    pub organisation_id: Uuid,
    /// Establishment name.
    pub name: String,
    /// Whether the establishment is active.
    pub enabled: bool,
    /// When the establishment was created.
    pub created_at: DateTime<Utc>,
}
