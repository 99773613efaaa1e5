//! Declaration of the claims an endpoint requires.

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::claim::{Claim, ClaimAction, ClaimScope};

/// The claims an endpoint declares, checked at declaration time to share
/// one `(action, resource)` pair so scope resolution is well defined.
#[derive(Debug, Clone)]
pub struct RequiredClaims {
    action: ClaimAction,
    resource: String,
    claims: Vec<Claim>,
}

impl RequiredClaims {
    /// Build from an explicit claim list.
    ///
    /// Fails when the list is empty or mixes `(action, resource)` pairs —
    /// that is a wiring error, caught when the route is declared rather
    /// than per request.
    pub fn new(claims: Vec<Claim>) -> AppResult<Self> {
        let first = claims.first().ok_or_else(|| {
            AppError::configuration("An endpoint must declare at least one required claim")
        })?;

        let action = first.action();
        let resource = first.resource().to_string();

        for claim in &claims {
            if !claim.applies_to(action, &resource) {
                return Err(AppError::configuration(format!(
                    "Declared claims mix pairs: expected '{action}' on '{resource}', got '{claim}'"
                )));
            }
        }

        Ok(Self {
            action,
            resource,
            claims,
        })
    }

    /// Declare one action on one resource, accepted at every scope level.
    pub fn at_any_level(action: ClaimAction, resource: &str) -> Self {
        let claims = [
            ClaimScope::Any,
            ClaimScope::Organisation,
            ClaimScope::Establishment,
            ClaimScope::Own,
        ]
        .into_iter()
        .map(|scope| Claim::new(action, scope, resource))
        .collect();

        Self {
            action,
            resource: resource.trim().to_lowercase(),
            claims,
        }
    }

    /// The shared action.
    pub fn action(&self) -> ClaimAction {
        self.action
    }

    /// The shared resource.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The declared claims.
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_mixed_pairs() {
        let claims = vec![
            "read:any:users".parse().unwrap(),
            "read:own:sessions".parse().unwrap(),
        ];
        assert!(RequiredClaims::new(claims).is_err());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(RequiredClaims::new(vec![]).is_err());
    }

    #[test]
    fn test_accepts_scope_ladder() {
        let claims = vec![
            "read:any:users".parse().unwrap(),
            "read:organisation:users".parse().unwrap(),
            "read:own:users".parse().unwrap(),
        ];
        let required = RequiredClaims::new(claims).unwrap();
        assert_eq!(required.action(), ClaimAction::Read);
        assert_eq!(required.resource(), "users");
        assert_eq!(required.claims().len(), 3);
    }
}
