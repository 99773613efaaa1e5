//! The claim triple and its canonical string form.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use gatehouse_core::AppError;

use super::action::ClaimAction;
use super::scope::ClaimScope;

/// An immutable `(action, scope, resource)` permission triple.
///
/// The canonical string form `"action:scope:resource"` (lowercase,
/// colon-joined) is the identity of a claim for storage and comparison.
/// Claims serialize to and deserialize from that string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Claim {
    action: ClaimAction,
    scope: ClaimScope,
    resource: String,
}

impl Claim {
    /// Build a claim from its parts. The resource is normalized to
    /// lowercase so equal claims always compare equal.
    pub fn new(action: ClaimAction, scope: ClaimScope, resource: impl Into<String>) -> Self {
        Self {
            action,
            scope,
            resource: resource.into().trim().to_lowercase(),
        }
    }

    /// The sentinel administrator claim. Holding it passes every claim
    /// gate unconditionally.
    pub fn administrator() -> Self {
        Self::new(ClaimAction::Manage, ClaimScope::Any, "all")
    }

    /// The authorized action.
    pub fn action(&self) -> ClaimAction {
        self.action
    }

    /// The granted scope.
    pub fn scope(&self) -> ClaimScope {
        self.scope
    }

    /// The protected resource name (lowercase plural noun).
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Whether this claim applies to the given action/resource pair,
    /// regardless of scope.
    pub fn applies_to(&self, action: ClaimAction, resource: &str) -> bool {
        self.action == action && self.resource == resource
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.action, self.scope, self.resource)
    }
}

impl FromStr for Claim {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (action, scope, resource) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(action), Some(scope), Some(resource), None) => (action, scope, resource),
            _ => {
                return Err(AppError::validation(format!(
                    "Invalid claim format: '{s}' (expected 'action:scope:resource')"
                )));
            }
        };

        let resource = resource.trim();
        if resource.is_empty() {
            return Err(AppError::validation(format!(
                "Invalid claim format: '{s}' (empty resource)"
            )));
        }

        Ok(Self::new(
            ClaimAction::from_str(action)?,
            ClaimScope::from_str(scope)?,
            resource,
        ))
    }
}

impl Serialize for Claim {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Claim {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Claim::from_str(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for s in [
            "read:any:users",
            "create:organisation:sessions",
            "disable:establishment:accounts",
            "update:own:users",
            "manage:any:all",
        ] {
            let claim: Claim = s.parse().unwrap();
            assert_eq!(claim.to_string(), s);
        }
    }

    #[test]
    fn test_parse_normalizes_case() {
        let claim: Claim = "READ:Any:Users".parse().unwrap();
        assert_eq!(claim.to_string(), "read:any:users");
        assert_eq!(claim, Claim::new(ClaimAction::Read, ClaimScope::Any, "users"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("read:any".parse::<Claim>().is_err());
        assert!("read:any:users:extra".parse::<Claim>().is_err());
        assert!("look:any:users".parse::<Claim>().is_err());
        assert!("read:galaxy:users".parse::<Claim>().is_err());
        assert!("read:any:".parse::<Claim>().is_err());
        assert!("".parse::<Claim>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let claim: Claim = "read:any:users".parse().unwrap();
        let json = serde_json::to_string(&claim).unwrap();
        assert_eq!(json, "\"read:any:users\"");
        let back: Claim = serde_json::from_str(&json).unwrap();
        assert_eq!(back, claim);
    }

    #[test]
    fn test_applies_to_ignores_scope() {
        let claim = Claim::new(ClaimAction::Read, ClaimScope::Own, "users");
        assert!(claim.applies_to(ClaimAction::Read, "users"));
        assert!(!claim.applies_to(ClaimAction::Update, "users"));
        assert!(!claim.applies_to(ClaimAction::Read, "sessions"));
    }
}
