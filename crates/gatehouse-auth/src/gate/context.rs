//! Request context carrying the authenticated caller and the published
//! authorization scope.

use std::collections::HashSet;

use gatehouse_entity::account::{AccountGrants, UserAccount};
use gatehouse_entity::claim::Claim;
use gatehouse_entity::client::Client;
use gatehouse_entity::scope::AuthScope;
use gatehouse_entity::session::Session;
use gatehouse_entity::user::User;

/// Context for the current authenticated request.
///
/// Built by the gate and threaded explicitly through every scoped call —
/// this is the request-scoped storage for the computed [`AuthScope`]; it
/// never leaks across concurrent requests and is discarded at request
/// end.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The resolved calling client.
    pub client: Client,
    /// The verified bearer token string.
    pub token: String,
    /// The active session.
    pub session: Session,
    /// The account with its user and Role→Claim closure.
    pub grants: AccountGrants,
    /// The authorization scope published by the claim gate, if the
    /// endpoint declared required claims.
    pub(crate) scope: Option<AuthScope>,
}

impl RequestContext {
    /// The authenticated account.
    pub fn account(&self) -> &UserAccount {
        &self.grants.account
    }

    /// The underlying user.
    pub fn user(&self) -> &User {
        &self.grants.user
    }

    /// The accumulated claim set across the account's roles.
    pub fn held_claims(&self) -> HashSet<Claim> {
        self.grants.held_claims()
    }

    /// The published authorization scope, when one has been computed.
    ///
    /// Scoped reads must treat `None` on a claim-gated endpoint as a
    /// fault, never as "no filter".
    pub fn scope(&self) -> Option<&AuthScope> {
        self.scope.as_ref()
    }
}
