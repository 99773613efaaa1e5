//! Action token issuance, validation, and revocation.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::RngCore;
use tracing::debug;

use gatehouse_core::config::tokens::ActionTokenConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::client::Client;
use gatehouse_entity::token::{ActionToken, ActionTypeSet, CreateActionToken};

use super::store::ActionTokenStore;

/// A validation request presented with a token.
#[derive(Debug, Clone)]
pub struct ValidateActionToken {
    /// The opaque token string.
    pub token: String,
    /// The email the presenter claims the token was issued for.
    pub email: String,
}

/// Issues, validates, and revokes one-shot action tokens.
///
/// Lifecycle per token: issued → consumed | expired | revoked. Terminal
/// states are absorbing: a consumed or expired token never validates
/// again. Validation itself never revokes — callers revoke explicitly
/// after the guarded mutation succeeds, so a failed mutation leaves the
/// token usable for retry.
#[derive(Clone)]
pub struct ActionTokenService {
    store: Arc<dyn ActionTokenStore>,
    config: ActionTokenConfig,
}

impl std::fmt::Debug for ActionTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionTokenService").finish()
    }
}

impl ActionTokenService {
    /// Create a new action token service.
    pub fn new(store: Arc<dyn ActionTokenStore>, config: ActionTokenConfig) -> Self {
        Self { store, config }
    }

    /// Issue a token.
    ///
    /// The validity defaults to the **maximum** configured validity across
    /// every requested action type (a token bundling multiple actions must
    /// stay valid long enough for the most generous of them), with
    /// per-client overrides consulted first.
    pub async fn create(
        &self,
        client: Option<&Client>,
        request: CreateActionToken,
    ) -> AppResult<ActionToken> {
        if request.types.is_empty() {
            return Err(AppError::validation(
                "An action token requires at least one action type",
            ));
        }
        let email = request.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::validation("An action token requires an email"));
        }

        let validity_hours = request
            .expires_in_hours
            .unwrap_or_else(|| self.default_validity(client, request.types));

        let now = Utc::now();
        let token = ActionToken {
            token: generate_token(),
            types: request.types,
            email,
            user_id: request.user_id,
            role_ids: request.role_ids,
            organisation_id: request.organisation_id,
            establishment_id: request.establishment_id,
            created_at: now,
            expires_at: now + Duration::hours(validity_hours as i64),
        };

        self.store.insert(token.clone()).await?;
        debug!(types = %token.types, validity_hours, "Issued action token");

        Ok(token)
    }

    /// Validate a presented token against the request and the action
    /// types the calling flow requires.
    ///
    /// Rejections, in order: unknown token (not found), email mismatch,
    /// expiry, missing required action types (conflict). Never revokes.
    pub async fn validate(
        &self,
        request: &ValidateActionToken,
        required: ActionTypeSet,
    ) -> AppResult<ActionToken> {
        let token = self
            .store
            .find_by_token(&request.token)
            .await?
            .ok_or_else(|| AppError::not_found("Action token not found"))?;

        if !token.email_matches(&request.email) {
            return Err(AppError::unauthorized("Action token email mismatch"));
        }

        if token.is_expired() {
            return Err(AppError::unauthorized("Action token has expired"));
        }

        if !token.types.contains_all(required) {
            return Err(AppError::conflict(format!(
                "Action token authorizes '{}', not '{}'",
                token.types, required
            )));
        }

        Ok(token)
    }

    /// Revoke (delete) a token. Fails not-found on an already-revoked
    /// token; call sites that need idempotency catch that kind.
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        if !self.store.delete_by_token(token).await? {
            return Err(AppError::not_found("Action token not found"));
        }
        Ok(())
    }

    /// Sweep every expired token. Invoked at process startup; expiry is
    /// otherwise checked lazily on validation.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let deleted = self.store.delete_expired(Utc::now()).await?;
        if deleted > 0 {
            debug!(deleted, "Swept expired action tokens");
        }
        Ok(deleted)
    }

    fn default_validity(&self, client: Option<&Client>, types: ActionTypeSet) -> u64 {
        types
            .iter()
            .map(|action| match client {
                Some(client) => client.validity_for(action, &self.config),
                None => self.config.validity_for(action.as_str()),
            })
            .max()
            .unwrap_or(self.config.default_validity_hours)
    }
}

/// Generate an opaque unguessable token string (32 random bytes,
/// URL-safe base64).
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::memory::MemoryActionTokenStore;
    use gatehouse_core::ErrorKind;
    use gatehouse_entity::token::ActionType;

    fn service() -> ActionTokenService {
        ActionTokenService::new(
            Arc::new(MemoryActionTokenStore::new()),
            ActionTokenConfig::default(),
        )
    }

    fn create_request(types: ActionTypeSet) -> CreateActionToken {
        CreateActionToken {
            types,
            email: "Bob@Example.com".to_string(),
            user_id: None,
            role_ids: vec![],
            organisation_id: None,
            establishment_id: None,
            expires_in_hours: None,
        }
    }

    #[tokio::test]
    async fn test_create_uses_maximum_validity_across_types() {
        let service = service();
        // invite = 168h, reset_password = 2h: the bundle gets 168h.
        let token = service
            .create(
                None,
                create_request(ActionType::Invite | ActionType::ResetPassword),
            )
            .await
            .unwrap();

        let lifetime = token.expires_at - token.created_at;
        assert_eq!(lifetime.num_hours(), 168);
    }

    #[tokio::test]
    async fn test_tokens_are_opaque_and_unique() {
        let service = service();
        let a = service
            .create(None, create_request(ActionTypeSet::only(ActionType::Invite)))
            .await
            .unwrap();
        let b = service
            .create(None, create_request(ActionTypeSet::only(ActionType::Invite)))
            .await
            .unwrap();
        assert_ne!(a.token, b.token);
        assert!(a.token.len() >= 40);
    }

    #[tokio::test]
    async fn test_validate_then_revoke_is_single_use() {
        let service = service();
        let token = service
            .create(
                None,
                create_request(ActionTypeSet::only(ActionType::ResetPassword)),
            )
            .await
            .unwrap();

        let request = ValidateActionToken {
            token: token.token.clone(),
            email: "bob@example.com".to_string(),
        };

        service
            .validate(&request, ActionTypeSet::only(ActionType::ResetPassword))
            .await
            .unwrap();
        service.revoke(&token.token).await.unwrap();

        let err = service
            .validate(&request, ActionTypeSet::only(ActionType::ResetPassword))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_validate_rejects_email_mismatch() {
        let service = service();
        let token = service
            .create(
                None,
                create_request(ActionTypeSet::only(ActionType::ResetPassword)),
            )
            .await
            .unwrap();

        let err = service
            .validate(
                &ValidateActionToken {
                    token: token.token,
                    email: "mallory@example.com".to_string(),
                },
                ActionTypeSet::only(ActionType::ResetPassword),
            )
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }

    #[tokio::test]
    async fn test_validate_rejects_expired_regardless_of_other_fields() {
        let service = service();
        let mut request = create_request(ActionTypeSet::only(ActionType::ResetPassword));
        request.expires_in_hours = Some(0);
        let token = service.create(None, request).await.unwrap();

        let err = service
            .validate(
                &ValidateActionToken {
                    token: token.token,
                    email: "bob@example.com".to_string(),
                },
                ActionTypeSet::only(ActionType::ResetPassword),
            )
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }

    #[tokio::test]
    async fn test_validate_rejects_missing_action_type() {
        let service = service();
        let token = service
            .create(None, create_request(ActionTypeSet::only(ActionType::Invite)))
            .await
            .unwrap();

        let err = service
            .validate(
                &ValidateActionToken {
                    token: token.token,
                    email: "bob@example.com".to_string(),
                },
                ActionType::Invite | ActionType::ValidateEmail,
            )
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_issuing_again_leaves_earlier_token_valid() {
        let service = service();
        let first = service
            .create(
                None,
                create_request(ActionTypeSet::only(ActionType::ResetPassword)),
            )
            .await
            .unwrap();
        let _second = service
            .create(
                None,
                create_request(ActionTypeSet::only(ActionType::ResetPassword)),
            )
            .await
            .unwrap();

        // The first token still validates: issuance never implicitly
        // revokes an outstanding token of the same type.
        service
            .validate(
                &ValidateActionToken {
                    token: first.token,
                    email: "bob@example.com".to_string(),
                },
                ActionTypeSet::only(ActionType::ResetPassword),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_validate_does_not_consume() {
        let service = service();
        let token = service
            .create(
                None,
                create_request(ActionTypeSet::only(ActionType::ResetPassword)),
            )
            .await
            .unwrap();

        let request = ValidateActionToken {
            token: token.token,
            email: "bob@example.com".to_string(),
        };

        // Two validations in a row both succeed; only revoke consumes.
        for _ in 0..2 {
            service
                .validate(&request, ActionTypeSet::only(ActionType::ResetPassword))
                .await
                .unwrap();
        }
    }
}
