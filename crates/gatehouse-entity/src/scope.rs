//! The per-request computed authorization scope.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::claim::{ClaimAction, ClaimScope};

/// The concrete row filter derived from a resolved scope.
///
/// At most one identifier applies. An absent identifier on a scoped
/// variant means the caller's account carries no organisation or
/// establishment — such a filter selects **nothing**, never everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ScopeFilter {
    /// No filter; every row is visible.
    Unrestricted,
    /// Rows belonging to the caller's organisation.
    Organisation(Option<Uuid>),
    /// Rows belonging to the caller's establishment.
    Establishment(Option<Uuid>),
    /// Only rows belonging to the caller's own user.
    User(Uuid),
}

/// The computed, request-lifetime authorization scope for one
/// action/resource pair.
///
/// Computed once per request after the claim gate passes, carried on the
/// request context, consulted by every scoped read/write downstream, and
/// discarded at request end. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthScope {
    /// The action the caller was gated on.
    pub action: ClaimAction,
    /// The resolved (most permissive) scope level.
    pub scope: ClaimScope,
    /// The protected resource name.
    pub resource: String,
    /// The concrete row filter to enforce.
    pub filter: ScopeFilter,
}

impl AuthScope {
    /// Whether this scope imposes no row filter at all.
    pub fn is_unrestricted(&self) -> bool {
        matches!(self.filter, ScopeFilter::Unrestricted)
    }

    /// Whether this scope can never match any row (a scoped filter whose
    /// identifier is absent on the caller's account).
    pub fn selects_nothing(&self) -> bool {
        matches!(
            self.filter,
            ScopeFilter::Organisation(None) | ScopeFilter::Establishment(None)
        )
    }

    /// The organisation filter id, if this scope filters by organisation.
    pub fn organisation_id(&self) -> Option<Uuid> {
        match self.filter {
            ScopeFilter::Organisation(id) => id,
            _ => None,
        }
    }

    /// The establishment filter id, if this scope filters by establishment.
    pub fn establishment_id(&self) -> Option<Uuid> {
        match self.filter {
            ScopeFilter::Establishment(id) => id,
            _ => None,
        }
    }

    /// The user filter id, if this scope filters by the caller's own user.
    pub fn user_id(&self) -> Option<Uuid> {
        match self.filter {
            ScopeFilter::User(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selects_nothing_on_absent_id() {
        let scope = AuthScope {
            action: ClaimAction::Read,
            scope: ClaimScope::Organisation,
            resource: "users".to_string(),
            filter: ScopeFilter::Organisation(None),
        };
        assert!(scope.selects_nothing());
        assert!(!scope.is_unrestricted());

        let scope = AuthScope {
            filter: ScopeFilter::Organisation(Some(Uuid::new_v4())),
            ..scope
        };
        assert!(!scope.selects_nothing());
    }
}
