//! Claim scope enumeration and its permissiveness ordering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatehouse_core::AppError;

/// Data-visibility breadth granted by a claim.
///
/// Scopes form a fixed hierarchy ordered by permissiveness:
/// Any > Organisation > Establishment > Own. The derived `Ord` follows
/// declaration order, so `max()` picks the most permissive scope.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ClaimScope {
    /// Only the caller's own record.
    Own,
    /// Rows belonging to the caller's establishment.
    Establishment,
    /// Rows belonging to the caller's organisation.
    Organisation,
    /// Every row, unfiltered.
    Any,
}

impl ClaimScope {
    /// Return the permissiveness rank (higher = broader).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Any => 4,
            Self::Organisation => 3,
            Self::Establishment => 2,
            Self::Own => 1,
        }
    }

    /// Return the scope as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Organisation => "organisation",
            Self::Establishment => "establishment",
            Self::Own => "own",
        }
    }
}

impl fmt::Display for ClaimScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClaimScope {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "organisation" => Ok(Self::Organisation),
            "establishment" => Ok(Self::Establishment),
            "own" => Ok(Self::Own),
            _ => Err(AppError::validation(format!("Invalid claim scope: '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissiveness_ordering() {
        assert!(ClaimScope::Any > ClaimScope::Organisation);
        assert!(ClaimScope::Organisation > ClaimScope::Establishment);
        assert!(ClaimScope::Establishment > ClaimScope::Own);
        assert_eq!(
            ClaimScope::Own.max(ClaimScope::Organisation),
            ClaimScope::Organisation
        );
    }

    #[test]
    fn test_rank() {
        assert_eq!(ClaimScope::Any.rank(), 4);
        assert_eq!(ClaimScope::Own.rank(), 1);
    }
}
