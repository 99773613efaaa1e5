//! Organisation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tenant organisation grouping establishments and accounts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organisation {
    /// Unique organisation identifier.
    pub id: Uuid,
    /// Organisation name (unique).
    pub name: String,
    /// Whether the organisation is active.
    pub enabled: bool,
    /// When the organisation was created.
    pub created_at: DateTime<Utc>,
}
