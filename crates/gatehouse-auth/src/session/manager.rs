//! Session lifecycle manager.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::scope::{AuthScope, ScopeFilter};
use gatehouse_entity::session::Session;

use crate::account::AccountSource;

use super::store::SessionStore;

/// Manages session creation, lookup, and deletion.
///
/// At most one live session exists per account: creation replaces every
/// prior session atomically in the store.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    accounts: Arc<dyn AccountSource>,
    ttl_hours: i64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new(
        store: Arc<dyn SessionStore>,
        accounts: Arc<dyn AccountSource>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            accounts,
            ttl_hours: config.session_ttl_hours as i64,
        }
    }

    /// Create a session for the account, keyed by the bearer token.
    ///
    /// Every prior session of the account is deleted in the same atomic
    /// operation; the count is logged.
    pub async fn create(&self, token: &str, account_id: Uuid) -> AppResult<Session> {
        let now = Utc::now();
        let session = Session {
            token: token.to_string(),
            user_account_id: account_id,
            login_date: now,
            expiration_date: now + Duration::hours(self.ttl_hours),
        };

        let deleted = self.store.replace_for_account(session.clone()).await?;
        if deleted > 0 {
            info!(
                account_id = %account_id,
                deleted,
                "Replaced prior sessions on login"
            );
        }

        Ok(session)
    }

    /// Find a session by token, additionally filtered by the caller's
    /// authorization scope when one is published.
    ///
    /// A lookup under a narrower-than-Any scope must not surface sessions
    /// of accounts outside that scope, even on an exact token match.
    /// Returns `Ok(None)` when nothing (visible) matches; never errors on
    /// absence.
    pub async fn find_by_token(
        &self,
        token: &str,
        scope: Option<&AuthScope>,
    ) -> AppResult<Option<Session>> {
        let Some(session) = self.store.find_by_token(token).await? else {
            return Ok(None);
        };

        if let Some(scope) = scope {
            if !self.session_visible(&session, scope).await? {
                debug!(token = %session.token, "Session outside caller scope");
                return Ok(None);
            }
        }

        Ok(Some(session))
    }

    /// Find a session by token or fail with a not-found error.
    pub async fn get_by_token(
        &self,
        token: &str,
        scope: Option<&AuthScope>,
    ) -> AppResult<Session> {
        self.find_by_token(token, scope)
            .await?
            .ok_or_else(|| AppError::not_found("Session not found"))
    }

    /// Delete one session (logout). `true` if a session was deleted.
    pub async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        self.store.delete_by_token(token).await
    }

    /// Delete every session of one account.
    pub async fn delete_all_by_account(&self, account_id: Uuid) -> AppResult<u64> {
        self.store.delete_all_by_account(account_id).await
    }

    /// Delete every session across all accounts of one user
    /// (cross-account logout).
    pub async fn delete_all_by_user(&self, user_id: Uuid) -> AppResult<u64> {
        let accounts = self.accounts.accounts_of_user(user_id).await?;
        let mut deleted = 0u64;
        for account in accounts {
            deleted += self.store.delete_all_by_account(account.id).await?;
        }
        Ok(deleted)
    }

    /// Sweep every expired session. Invoked at process startup and
    /// opportunistically thereafter.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let deleted = self.store.delete_expired(Utc::now()).await?;
        if deleted > 0 {
            info!(deleted, "Swept expired sessions");
        }
        Ok(deleted)
    }

    async fn session_visible(&self, session: &Session, scope: &AuthScope) -> AppResult<bool> {
        match scope.filter {
            ScopeFilter::Unrestricted => Ok(true),
            // A scoped filter with no identifier matches nothing.
            ScopeFilter::Organisation(None) | ScopeFilter::Establishment(None) => Ok(false),
            ScopeFilter::User(user_id) => {
                let Some(grants) = self.accounts.account_grants(session.user_account_id).await?
                else {
                    return Ok(false);
                };
                Ok(grants.account.user_id == user_id)
            }
            ScopeFilter::Organisation(Some(org_id)) => {
                let Some(grants) = self.accounts.account_grants(session.user_account_id).await?
                else {
                    return Ok(false);
                };
                Ok(grants.account.organisation_id == Some(org_id))
            }
            ScopeFilter::Establishment(Some(est_id)) => {
                let Some(grants) = self.accounts.account_grants(session.user_account_id).await?
                else {
                    return Ok(false);
                };
                Ok(grants.account.establishment_id == Some(est_id))
            }
        }
    }
}
