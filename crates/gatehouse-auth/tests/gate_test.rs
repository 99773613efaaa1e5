//! End-to-end tests for the request gate: client resolution, credential
//! verification, session validation, claim gating, and scope publication.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use http::header::{AUTHORIZATION, ORIGIN};
use http::{HeaderMap, HeaderValue};
use uuid::Uuid;

use gatehouse_auth::account::AccountSource;
use gatehouse_auth::client::ClientRegistry;
use gatehouse_auth::gate::{AuthGate, ClientGate, RequiredClaims};
use gatehouse_auth::jwt::{JwtDecoder, JwtEncoder};
use gatehouse_auth::session::{MemorySessionStore, SessionManager, SessionStore};
use gatehouse_core::ErrorKind;
use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::config::clients::{ClientConfig, ClientsConfig};
use gatehouse_core::result::AppResult;
use gatehouse_entity::account::{AccountGrants, UserAccount};
use gatehouse_entity::claim::{Claim, ClaimAction, ClaimScope};
use gatehouse_entity::role::Role;
use gatehouse_entity::scope::ScopeFilter;
use gatehouse_entity::session::Session;
use gatehouse_entity::user::User;

/// Fixed map of account grants standing in for the directory.
struct StubAccounts {
    grants: HashMap<Uuid, AccountGrants>,
}

#[async_trait]
impl AccountSource for StubAccounts {
    async fn account_grants(&self, account_id: Uuid) -> AppResult<Option<AccountGrants>> {
        Ok(self.grants.get(&account_id).cloned())
    }

    async fn accounts_of_user(&self, user_id: Uuid) -> AppResult<Vec<UserAccount>> {
        Ok(self
            .grants
            .values()
            .filter(|g| g.account.user_id == user_id)
            .map(|g| g.account.clone())
            .collect())
    }
}

fn make_grants(
    email: &str,
    organisation_id: Option<Uuid>,
    claims: &[&str],
    enabled: bool,
) -> AccountGrants {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: "digest".to_string(),
        first_name: None,
        last_name: None,
        enabled,
        email_validated_at: Some(now),
        terms_accepted_at: None,
        privacy_accepted_at: None,
        created_at: now,
        updated_at: now,
    };
    let account = UserAccount {
        id: Uuid::new_v4(),
        user_id: user.id,
        organisation_id,
        establishment_id: None,
        enabled,
        created_at: now,
    };
    let role = Role {
        id: Uuid::new_v4(),
        name: "tester".to_string(),
        description: None,
        claims: claims.iter().map(|s| s.parse().unwrap()).collect(),
        created_at: now,
    };
    AccountGrants {
        account,
        user,
        roles: vec![role],
    }
}

struct Harness {
    gate: AuthGate,
    encoder: JwtEncoder,
    sessions: Arc<SessionManager>,
    store: Arc<MemorySessionStore>,
}

fn harness(grants: Vec<AccountGrants>) -> Harness {
    let auth_config = AuthConfig {
        jwt_secret: "gate-test-secret".to_string(),
        ..AuthConfig::default()
    };

    let registry = ClientRegistry::from_config(&ClientsConfig {
        registered: vec![ClientConfig {
            id: "portal".to_string(),
            uri: Some("https://portal.example.com".to_string()),
            actions: Default::default(),
        }],
    })
    .unwrap();

    let accounts: Arc<StubAccounts> = Arc::new(StubAccounts {
        grants: grants.into_iter().map(|g| (g.account.id, g)).collect(),
    });

    let store = Arc::new(MemorySessionStore::new());
    let sessions = Arc::new(SessionManager::new(
        store.clone(),
        accounts.clone(),
        &auth_config,
    ));

    let gate = AuthGate::new(
        ClientGate::new(Arc::new(registry), auth_config.cookie_name.clone()),
        Arc::new(JwtDecoder::new(&auth_config)),
        sessions.clone(),
        accounts,
    );

    Harness {
        gate,
        encoder: JwtEncoder::new(&auth_config),
        sessions,
        store,
    }
}

fn request_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ORIGIN,
        HeaderValue::from_static("https://portal.example.com"),
    );
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}

async fn login(h: &Harness, grants: &AccountGrants) -> String {
    let (token, _) = h
        .encoder
        .generate(grants.account.id, &grants.user.email)
        .unwrap();
    h.sessions.create(&token, grants.account.id).await.unwrap();
    token
}

#[tokio::test]
async fn test_full_pipeline_publishes_scope() {
    let org = Uuid::new_v4();
    let grants = make_grants(
        "bob@example.com",
        Some(org),
        &["read:organisation:users", "read:own:users"],
        true,
    );
    let h = harness(vec![grants.clone()]);
    let token = login(&h, &grants).await;

    let mut ctx = h.gate.authenticate(&request_headers(&token)).await.unwrap();
    assert_eq!(ctx.account().id, grants.account.id);
    assert!(ctx.scope().is_none());

    let required = RequiredClaims::at_any_level(ClaimAction::Read, "users");
    let scope = h.gate.authorize(&mut ctx, &required).unwrap();

    // Holding organisation and own levels, the broader one wins outright.
    assert_eq!(scope.scope, ClaimScope::Organisation);
    assert_eq!(scope.filter, ScopeFilter::Organisation(Some(org)));
    assert_eq!(ctx.scope(), Some(&scope));
}

#[tokio::test]
async fn test_new_session_replaces_prior_one() {
    let grants = make_grants("bob@example.com", None, &["read:own:users"], true);
    let h = harness(vec![grants.clone()]);

    let t1 = login(&h, &grants).await;
    let t2 = login(&h, &grants).await;

    assert!(h.sessions.find_by_token(&t1, None).await.unwrap().is_none());
    assert!(h.sessions.find_by_token(&t2, None).await.unwrap().is_some());
    assert_eq!(h.store.len().await, 1);

    // The replaced credential no longer authenticates.
    let err = h.gate.authenticate(&request_headers(&t1)).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_expired_session_is_rejected_despite_valid_credential() {
    let grants = make_grants("bob@example.com", None, &["read:own:users"], true);
    let h = harness(vec![grants.clone()]);

    let (token, _) = h
        .encoder
        .generate(grants.account.id, &grants.user.email)
        .unwrap();
    h.store
        .replace_for_account(Session {
            token: token.clone(),
            user_account_id: grants.account.id,
            login_date: Utc::now() - Duration::hours(2),
            expiration_date: Utc::now() - Duration::hours(1),
        })
        .await
        .unwrap();

    let err = h.gate.authenticate(&request_headers(&token)).await.unwrap_err();
    assert!(err.is(ErrorKind::Unauthorized));
}

#[tokio::test]
async fn test_disabled_account_is_rejected() {
    let grants = make_grants("bob@example.com", None, &["read:own:users"], false);
    let h = harness(vec![grants.clone()]);
    let token = login(&h, &grants).await;

    let err = h.gate.authenticate(&request_headers(&token)).await.unwrap_err();
    assert!(err.is(ErrorKind::Unauthorized));
}

#[tokio::test]
async fn test_claim_gate_denies_unheld_claims() {
    let grants = make_grants("bob@example.com", None, &["read:own:users"], true);
    let h = harness(vec![grants.clone()]);
    let token = login(&h, &grants).await;

    let mut ctx = h.gate.authenticate(&request_headers(&token)).await.unwrap();
    let required = RequiredClaims::at_any_level(ClaimAction::Delete, "users");

    let err = h.gate.authorize(&mut ctx, &required).unwrap_err();
    assert!(err.is(ErrorKind::Forbidden));
    assert!(ctx.scope().is_none());
}

#[tokio::test]
async fn test_administrator_sentinel_passes_every_gate_at_any_scope() {
    let grants = make_grants("root@example.com", None, &["manage:any:all"], true);
    let h = harness(vec![grants.clone()]);
    let token = login(&h, &grants).await;

    let mut ctx = h.gate.authenticate(&request_headers(&token)).await.unwrap();
    let required = RequiredClaims::at_any_level(ClaimAction::Delete, "organisations");

    let scope = h.gate.authorize(&mut ctx, &required).unwrap();
    assert_eq!(scope.scope, ClaimScope::Any);
    assert!(scope.is_unrestricted());
    assert!(ctx.held_claims().contains(&Claim::administrator()));
}

#[tokio::test]
async fn test_scoped_session_lookup_hides_foreign_sessions() {
    let org_a = Uuid::new_v4();
    let alice = make_grants(
        "alice@example.com",
        Some(org_a),
        &["read:own:sessions"],
        true,
    );
    let bob = make_grants("bob@example.com", None, &["read:own:sessions"], true);
    let h = harness(vec![alice.clone(), bob.clone()]);

    let bob_token = login(&h, &bob).await;

    // Alice reads sessions at Own scope: Bob's token must stay invisible
    // even on an exact match.
    let alice_scope = gatehouse_auth::scope::build_scope(
        &alice.account,
        ClaimAction::Read,
        ClaimScope::Own,
        "sessions",
    );
    let hidden = h
        .sessions
        .find_by_token(&bob_token, Some(&alice_scope))
        .await
        .unwrap();
    assert!(hidden.is_none());

    // Bob's own scope sees it.
    let bob_scope = gatehouse_auth::scope::build_scope(
        &bob.account,
        ClaimAction::Read,
        ClaimScope::Own,
        "sessions",
    );
    assert!(
        h.sessions
            .find_by_token(&bob_token, Some(&bob_scope))
            .await
            .unwrap()
            .is_some()
    );

    // An organisation filter with no organisation on the caller's account
    // selects nothing rather than everything.
    let orphan_scope = gatehouse_auth::scope::build_scope(
        &bob.account,
        ClaimAction::Read,
        ClaimScope::Organisation,
        "sessions",
    );
    assert!(
        h.sessions
            .find_by_token(&bob_token, Some(&orphan_scope))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_expiry_sweep_removes_only_stale_sessions() {
    let grants = make_grants("bob@example.com", None, &["read:own:users"], true);
    let other = make_grants("eve@example.com", None, &["read:own:users"], true);
    let h = harness(vec![grants.clone(), other.clone()]);

    let live = login(&h, &grants).await;
    h.store
        .replace_for_account(Session {
            token: "stale".to_string(),
            user_account_id: other.account.id,
            login_date: Utc::now() - Duration::hours(48),
            expiration_date: Utc::now() - Duration::hours(36),
        })
        .await
        .unwrap();

    let swept = h.sessions.delete_expired().await.unwrap();
    assert_eq!(swept, 1);
    assert!(h.sessions.find_by_token(&live, None).await.unwrap().is_some());
    assert!(h.sessions.find_by_token("stale", None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cross_account_logout_fans_out() {
    let mut first = make_grants("bob@example.com", None, &["read:own:users"], true);
    // Second account of the same user, e.g. in another organisation.
    let mut second = make_grants("bob@example.com", Some(Uuid::new_v4()), &[], true);
    second.user = first.user.clone();
    second.account.user_id = first.user.id;
    first.account.user_id = first.user.id;

    let h = harness(vec![first.clone(), second.clone()]);
    let t1 = login(&h, &first).await;
    let t2 = login(&h, &second).await;

    let deleted = h
        .sessions
        .delete_all_by_user(first.user.id)
        .await
        .unwrap();
    assert_eq!(deleted, 2);
    assert!(h.sessions.find_by_token(&t1, None).await.unwrap().is_none());
    assert!(h.sessions.find_by_token(&t2, None).await.unwrap().is_none());
}
