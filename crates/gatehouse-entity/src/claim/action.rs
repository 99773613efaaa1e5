//! Claim action enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatehouse_core::AppError;

/// Actions a claim can authorize on a protected resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimAction {
    /// Create a resource.
    Create,
    /// Read a resource.
    Read,
    /// Update a resource.
    Update,
    /// Delete a resource.
    Delete,
    /// Enable a disabled resource.
    Enable,
    /// Disable an enabled resource.
    Disable,
    /// Full management, including administrative operations.
    Manage,
}

impl ClaimAction {
    /// Return the action as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Manage => "manage",
        }
    }
}

impl fmt::Display for ClaimAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClaimAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            "manage" => Ok(Self::Manage),
            _ => Err(AppError::validation(format!(
                "Invalid claim action: '{s}'"
            ))),
        }
    }
}
