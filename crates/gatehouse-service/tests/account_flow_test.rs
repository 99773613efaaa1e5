//! End-to-end account flow tests over the in-memory directory and
//! stores: invitation, password reset, sign-up, and cascade disable.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use gatehouse_auth::account::AccountSource;
use gatehouse_auth::jwt::JwtEncoder;
use gatehouse_auth::password::PasswordHasher;
use gatehouse_auth::scope::build_scope;
use gatehouse_auth::session::{MemorySessionStore, SessionManager};
use gatehouse_auth::token::{ActionTokenService, MemoryActionTokenStore};
use gatehouse_core::ErrorKind;
use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::config::tokens::ActionTokenConfig;
use gatehouse_core::result::AppResult;
use gatehouse_entity::claim::{Claim, ClaimAction, ClaimScope};
use gatehouse_entity::client::Client;

use gatehouse_service::account::email::EmailTokenRequest;
use gatehouse_service::account::invitation::{AcceptInvitation, InviteRequest};
use gatehouse_service::account::password::ResetPassword;
use gatehouse_service::account::signup::SignupRequest;
use gatehouse_service::account::{
    AccessService, AccountAdminService, EmailFlowService, InvitationService, PasswordService,
    SignupService,
};
use gatehouse_service::directory::{Directory, MemoryDirectory, NewAccount};
use gatehouse_service::link::ActionLinkBuilder;
use gatehouse_service::mailer::{ActionNotice, Mailer};
use gatehouse_entity::user::CreateUser;

/// Captures outbound notices so tests can read tokens and links.
#[derive(Default)]
struct RecordingMailer {
    notices: Mutex<Vec<ActionNotice>>,
}

impl RecordingMailer {
    async fn last(&self) -> ActionNotice {
        self.notices.lock().await.last().cloned().expect("no notice sent")
    }

    async fn count(&self) -> usize {
        self.notices.lock().await.len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, notice: ActionNotice) -> AppResult<()> {
        self.notices.lock().await.push(notice);
        Ok(())
    }
}

struct Harness {
    directory: Arc<MemoryDirectory>,
    sessions: Arc<SessionManager>,
    access: Arc<AccessService>,
    invitations: InvitationService,
    passwords: PasswordService,
    emails: Arc<EmailFlowService>,
    signup: SignupService,
    admin: AccountAdminService,
    mailer: Arc<RecordingMailer>,
    client: Client,
}

fn portal_client() -> Client {
    Client {
        id: "portal".to_string(),
        uri: Some("https://portal.example.com".to_string()),
        actions: HashMap::new(),
    }
}

fn harness() -> Harness {
    let auth_config = AuthConfig {
        jwt_secret: "flow-test-secret".to_string(),
        ..AuthConfig::default()
    };

    let directory = Arc::new(MemoryDirectory::new());
    let accounts: Arc<dyn AccountSource> = directory.clone();
    let dyn_directory: Arc<dyn Directory> = directory.clone();

    let sessions = Arc::new(SessionManager::new(
        Arc::new(MemorySessionStore::new()),
        accounts,
        &auth_config,
    ));
    let tokens = Arc::new(ActionTokenService::new(
        Arc::new(MemoryActionTokenStore::new()),
        ActionTokenConfig::default(),
    ));
    let encoder = Arc::new(JwtEncoder::new(&auth_config));
    let hasher = Arc::new(PasswordHasher::new());
    let links = Arc::new(ActionLinkBuilder::new(ActionTokenConfig::default()));
    let mailer = Arc::new(RecordingMailer::default());
    let dyn_mailer: Arc<dyn Mailer> = mailer.clone();

    let access = Arc::new(AccessService::new(
        dyn_directory.clone(),
        sessions.clone(),
        encoder,
        hasher.clone(),
    ));
    let emails = Arc::new(EmailFlowService::new(
        dyn_directory.clone(),
        tokens.clone(),
        links.clone(),
        dyn_mailer.clone(),
    ));

    Harness {
        invitations: InvitationService::new(
            dyn_directory.clone(),
            tokens.clone(),
            access.clone(),
            hasher.clone(),
            links.clone(),
            dyn_mailer.clone(),
            auth_config.clone(),
        ),
        passwords: PasswordService::new(
            dyn_directory.clone(),
            tokens.clone(),
            sessions.clone(),
            hasher.clone(),
            links,
            dyn_mailer,
            auth_config.clone(),
        ),
        signup: SignupService::new(
            dyn_directory.clone(),
            emails.clone(),
            hasher,
            auth_config,
        ),
        admin: AccountAdminService::new(dyn_directory),
        directory,
        sessions,
        access,
        emails,
        mailer,
        client: portal_client(),
    }
}

fn own_read_claims() -> Vec<Claim> {
    vec![
        Claim::new(ClaimAction::Read, ClaimScope::Own, "users"),
        Claim::new(ClaimAction::Update, ClaimScope::Own, "users"),
    ]
}

#[tokio::test]
async fn test_invitation_end_to_end() {
    let h = harness();
    let member = h.directory.add_role("member", &own_read_claims()).await;
    let org = h.directory.add_organisation("org1").await;

    let sent = h
        .invitations
        .send(
            &h.client,
            InviteRequest {
                email: "bob@example.com".to_string(),
                role_names: vec!["member".to_string()],
                organisation_id: Some(org.id),
                establishment_id: None,
            },
        )
        .await
        .unwrap();

    // The notice carries a clickable link with the token.
    let notice = h.mailer.last().await;
    assert_eq!(notice.to, "bob@example.com");
    assert!(notice.link.as_deref().unwrap().contains(&sent.token));

    let result = h
        .invitations
        .accept(AcceptInvitation {
            token: sent.token.clone(),
            email: "Bob@Example.com".to_string(),
            password: "correct-horse-battery".to_string(),
            first_name: Some("Bob".to_string()),
            last_name: None,
        })
        .await
        .unwrap();

    // Created user + account linked to org1 with the member role.
    assert_eq!(result.user.email, "bob@example.com");
    assert!(result.user.email_validated_at.is_some());
    assert_eq!(result.account.organisation_id, Some(org.id));

    let grants = h
        .directory
        .account_grants(result.account.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(grants.roles.len(), 1);
    assert_eq!(grants.roles[0].id, member.id);

    // A fresh session was issued.
    assert!(
        h.sessions
            .find_by_token(&result.token, None)
            .await
            .unwrap()
            .is_some()
    );

    // The token was revoked: accepting again fails not-found.
    let err = h
        .invitations
        .accept(AcceptInvitation {
            token: sent.token,
            email: "bob@example.com".to_string(),
            password: "correct-horse-battery".to_string(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_invitation_rejects_weak_password_but_keeps_token() {
    let h = harness();
    h.directory.add_role("member", &own_read_claims()).await;

    let sent = h
        .invitations
        .send(
            &h.client,
            InviteRequest {
                email: "bob@example.com".to_string(),
                role_names: vec!["member".to_string()],
                organisation_id: None,
                establishment_id: None,
            },
        )
        .await
        .unwrap();

    let err = h
        .invitations
        .accept(AcceptInvitation {
            token: sent.token.clone(),
            email: "bob@example.com".to_string(),
            password: "short".to_string(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Validation));

    // The failed mutation left the token usable for retry.
    h.invitations
        .accept(AcceptInvitation {
            token: sent.token,
            email: "bob@example.com".to_string(),
            password: "long-enough-now".to_string(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_two_reset_tokens_live_independently() {
    let h = harness();
    h.directory.add_role("member", &own_read_claims()).await;
    h.signup
        .signup(
            &h.client,
            SignupRequest {
                email: "bob@example.com".to_string(),
                password: "original-password".to_string(),
                first_name: None,
                last_name: None,
                organisation_id: None,
            },
        )
        .await
        .unwrap();

    h.passwords.send_reset(&h.client, "bob@example.com").await.unwrap();
    let first = h.mailer.last().await.token;
    h.passwords.send_reset(&h.client, "bob@example.com").await.unwrap();
    let second = h.mailer.last().await.token;
    assert_ne!(first, second);

    // Issuing the second token did not touch the first: it still resets.
    h.passwords
        .reset(ResetPassword {
            token: first,
            email: "bob@example.com".to_string(),
            new_password: "brand-new-password".to_string(),
        })
        .await
        .unwrap();

    // And the second remains valid on its own lifetime.
    h.passwords
        .reset(ResetPassword {
            token: second,
            email: "bob@example.com".to_string(),
            new_password: "another-new-password".to_string(),
        })
        .await
        .unwrap();

    let login = h
        .access
        .login("bob@example.com", "another-new-password", None)
        .await
        .unwrap();
    assert_eq!(login.user.email, "bob@example.com");
}

#[tokio::test]
async fn test_reset_logs_out_every_session() {
    let h = harness();
    h.directory.add_role("member", &own_read_claims()).await;
    h.signup
        .signup(
            &h.client,
            SignupRequest {
                email: "bob@example.com".to_string(),
                password: "original-password".to_string(),
                first_name: None,
                last_name: None,
                organisation_id: None,
            },
        )
        .await
        .unwrap();

    let login = h
        .access
        .login("bob@example.com", "original-password", None)
        .await
        .unwrap();

    h.passwords.send_reset(&h.client, "bob@example.com").await.unwrap();
    let token = h.mailer.last().await.token;
    h.passwords
        .reset(ResetPassword {
            token,
            email: "bob@example.com".to_string(),
            new_password: "brand-new-password".to_string(),
        })
        .await
        .unwrap();

    assert!(
        h.sessions
            .find_by_token(&login.token, None)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        h.access
            .login("bob@example.com", "original-password", None)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_reset_for_unknown_email_fails_silently() {
    let h = harness();
    h.passwords
        .send_reset(&h.client, "nobody@example.com")
        .await
        .unwrap();
    assert_eq!(h.mailer.count().await, 0);
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let h = harness();
    h.directory.add_role("member", &own_read_claims()).await;

    let request = SignupRequest {
        email: "bob@example.com".to_string(),
        password: "original-password".to_string(),
        first_name: None,
        last_name: None,
        organisation_id: None,
    };
    h.signup.signup(&h.client, request.clone()).await.unwrap();

    let err = h.signup.signup(&h.client, request).await.unwrap_err();
    assert!(err.is(ErrorKind::Conflict));
}

#[tokio::test]
async fn test_email_validation_flow() {
    let h = harness();
    h.directory.add_role("member", &own_read_claims()).await;
    let (user, _) = h
        .signup
        .signup(
            &h.client,
            SignupRequest {
                email: "bob@example.com".to_string(),
                password: "original-password".to_string(),
                first_name: None,
                last_name: None,
                organisation_id: None,
            },
        )
        .await
        .unwrap();
    assert!(user.email_validated_at.is_none());

    // Sign-up already queued a validation notice.
    let token = h.mailer.last().await.token;
    h.emails
        .validate(EmailTokenRequest {
            token,
            email: "bob@example.com".to_string(),
        })
        .await
        .unwrap();

    let user = h.directory.user_by_id(user.id).await.unwrap().unwrap();
    assert!(user.email_validated_at.is_some());
}

#[tokio::test]
async fn test_establishment_disable_cascades_but_enable_does_not() {
    let h = harness();
    let org = h.directory.add_organisation("org1").await;
    let establishment = h.directory.add_establishment(org.id, "site-a").await;

    // Two users in the establishment; Carol also has an account outside.
    let (bob, bob_account) = h
        .directory
        .create_user_with_account(
            CreateUser {
                email: "bob@example.com".to_string(),
                password_hash: "digest".to_string(),
                first_name: None,
                last_name: None,
                email_validated: true,
            },
            NewAccount {
                organisation_id: Some(org.id),
                establishment_id: Some(establishment.id),
                role_ids: vec![],
            },
        )
        .await
        .unwrap();
    let (carol, _) = h
        .directory
        .create_user_with_account(
            CreateUser {
                email: "carol@example.com".to_string(),
                password_hash: "digest".to_string(),
                first_name: None,
                last_name: None,
                email_validated: true,
            },
            NewAccount {
                organisation_id: Some(org.id),
                establishment_id: Some(establishment.id),
                role_ids: vec![],
            },
        )
        .await
        .unwrap();
    h.directory
        .add_account(gatehouse_entity::account::CreateUserAccount {
            user_id: carol.id,
            organisation_id: None,
            establishment_id: None,
            role_ids: vec![],
        })
        .await
        .unwrap();

    let outcome = h.admin.disable_establishment(establishment.id).await.unwrap();
    // Both establishment accounts disabled; only Bob lost his last one.
    assert_eq!(outcome.accounts_disabled, 2);
    assert_eq!(outcome.users_disabled, 1);

    let bob_after = h.directory.user_by_id(bob.id).await.unwrap().unwrap();
    let carol_after = h.directory.user_by_id(carol.id).await.unwrap().unwrap();
    assert!(!bob_after.enabled);
    assert!(carol_after.enabled);

    // Re-enabling is asymmetric: accounts and users stay disabled.
    h.admin.enable_establishment(establishment.id).await.unwrap();
    let grants = h
        .directory
        .account_grants(bob_account.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!grants.account.enabled);
    assert!(!grants.user.enabled);
}

#[tokio::test]
async fn test_own_scope_hides_other_users() {
    let h = harness();
    let (bob, bob_account) = h
        .directory
        .create_user_with_account(
            CreateUser {
                email: "bob@example.com".to_string(),
                password_hash: "digest".to_string(),
                first_name: None,
                last_name: None,
                email_validated: true,
            },
            NewAccount::default(),
        )
        .await
        .unwrap();
    let (alice, _) = h
        .directory
        .create_user_with_account(
            CreateUser {
                email: "alice@example.com".to_string(),
                password_hash: "digest".to_string(),
                first_name: None,
                last_name: None,
                email_validated: true,
            },
            NewAccount::default(),
        )
        .await
        .unwrap();

    let scope = build_scope(&bob_account, ClaimAction::Read, ClaimScope::Own, "users");

    // Bob reads himself, but another user's record stays invisible.
    assert!(
        h.directory
            .user_by_id_scoped(bob.id, Some(&scope))
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        h.directory
            .user_by_id_scoped(alice.id, Some(&scope))
            .await
            .unwrap()
            .is_none()
    );
}
