//! Translates the claims a caller holds into one enforceable [`AuthScope`].

use std::collections::HashSet;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::account::UserAccount;
use gatehouse_entity::claim::{Claim, ClaimAction, ClaimScope};
use gatehouse_entity::scope::{AuthScope, ScopeFilter};

/// The most permissive scope the caller holds for one action/resource
/// pair.
///
/// Callers must already be known to hold at least one qualifying claim
/// (the claim gate ran first); finding none here is a server-side fault,
/// not a client error.
pub fn most_permissive_scope(
    held: &HashSet<Claim>,
    action: ClaimAction,
    resource: &str,
) -> AppResult<ClaimScope> {
    held.iter()
        .filter(|claim| claim.applies_to(action, resource))
        .map(|claim| claim.scope())
        .max()
        .ok_or_else(|| {
            AppError::internal(format!(
                "No matching scope: caller holds no '{action}' claim on '{resource}' \
                 after passing the claim gate"
            ))
        })
}

/// Build the concrete row filter for a resolved scope level.
///
/// For organisation/establishment scopes the account may carry no such
/// id; the resulting filter then selects nothing rather than everything.
pub fn build_scope(
    account: &UserAccount,
    action: ClaimAction,
    scope: ClaimScope,
    resource: &str,
) -> AuthScope {
    let filter = match scope {
        ClaimScope::Any => ScopeFilter::Unrestricted,
        ClaimScope::Organisation => ScopeFilter::Organisation(account.organisation_id),
        ClaimScope::Establishment => ScopeFilter::Establishment(account.establishment_id),
        ClaimScope::Own => ScopeFilter::User(account.user_id),
    };

    AuthScope {
        action,
        scope,
        resource: resource.to_string(),
        filter,
    }
}

/// Compose [`most_permissive_scope`] and [`build_scope`].
pub fn resolve(
    account: &UserAccount,
    held: &HashSet<Claim>,
    action: ClaimAction,
    resource: &str,
) -> AppResult<AuthScope> {
    let scope = most_permissive_scope(held, action, resource)?;
    Ok(build_scope(account, action, scope, resource))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatehouse_core::ErrorKind;
    use uuid::Uuid;

    fn held(claims: &[&str]) -> HashSet<Claim> {
        claims.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn account(organisation_id: Option<Uuid>, establishment_id: Option<Uuid>) -> UserAccount {
        UserAccount {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            organisation_id,
            establishment_id,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_highest_scope_wins_outright() {
        let held = held(&["read:organisation:users", "read:own:users"]);
        let scope = most_permissive_scope(&held, ClaimAction::Read, "users").unwrap();
        assert_eq!(scope, ClaimScope::Organisation);
    }

    #[test]
    fn test_any_beats_everything() {
        let held = held(&[
            "read:own:users",
            "read:establishment:users",
            "read:any:users",
        ]);
        let scope = most_permissive_scope(&held, ClaimAction::Read, "users").unwrap();
        assert_eq!(scope, ClaimScope::Any);
    }

    #[test]
    fn test_other_pairs_are_ignored() {
        let held = held(&["update:any:users", "read:own:sessions", "read:own:users"]);
        let scope = most_permissive_scope(&held, ClaimAction::Read, "users").unwrap();
        assert_eq!(scope, ClaimScope::Own);
    }

    #[test]
    fn test_no_match_is_a_server_fault() {
        let held = held(&["read:any:sessions"]);
        let err = most_permissive_scope(&held, ClaimAction::Read, "users").unwrap_err();
        assert!(err.is(ErrorKind::Internal));
    }

    #[test]
    fn test_build_scope_filters() {
        let org = Uuid::new_v4();
        let account = account(Some(org), None);

        let any = build_scope(&account, ClaimAction::Read, ClaimScope::Any, "users");
        assert!(any.is_unrestricted());

        let own = build_scope(&account, ClaimAction::Read, ClaimScope::Own, "users");
        assert_eq!(own.user_id(), Some(account.user_id));

        let org_scope = build_scope(&account, ClaimAction::Read, ClaimScope::Organisation, "users");
        assert_eq!(org_scope.organisation_id(), Some(org));

        // No establishment on the account: the filter selects nothing.
        let est = build_scope(&account, ClaimAction::Read, ClaimScope::Establishment, "users");
        assert!(est.selects_nothing());
    }

    #[test]
    fn test_resolve_composes() {
        let account = account(Some(Uuid::new_v4()), None);
        let held = held(&["read:organisation:users", "read:own:users"]);

        let scope = resolve(&account, &held, ClaimAction::Read, "users").unwrap();
        assert_eq!(scope.scope, ClaimScope::Organisation);
        assert_eq!(scope.organisation_id(), account.organisation_id);
        assert_eq!(scope.resource, "users");
    }
}
