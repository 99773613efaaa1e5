//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use gatehouse_auth::account::AccountSource;
use gatehouse_auth::client::ClientRegistry;
use gatehouse_auth::gate::{AuthGate, ClientGate};
use gatehouse_auth::jwt::{JwtDecoder, JwtEncoder};
use gatehouse_auth::password::PasswordHasher;
use gatehouse_auth::session::{PgSessionStore, SessionManager};
use gatehouse_auth::token::{ActionTokenService, PgActionTokenStore};
use gatehouse_core::config::AppConfig;
use gatehouse_core::result::AppResult;

use gatehouse_database::repositories::action_token::ActionTokenRepository;
use gatehouse_database::repositories::claim::ClaimRepository;
use gatehouse_database::repositories::establishment::EstablishmentRepository;
use gatehouse_database::repositories::organisation::OrganisationRepository;
use gatehouse_database::repositories::role::RoleRepository;
use gatehouse_database::repositories::session::SessionRepository;

use gatehouse_service::account::{
    AccessService, AccountAdminService, EmailFlowService, InvitationService, PasswordService,
    SignupService, TermsService,
};
use gatehouse_service::directory::{Directory, PgDirectory};
use gatehouse_service::link::ActionLinkBuilder;
use gatehouse_service::mailer::{Mailer, TracingMailer};

/// Application state containing all shared dependencies.
///
/// Passed to every axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The composed request gate.
    pub auth_gate: Arc<AuthGate>,
    /// Session lifecycle manager.
    pub sessions: Arc<SessionManager>,
    /// Action token issuance/validation/revocation.
    pub tokens: Arc<ActionTokenService>,
    /// Login/logout flows.
    pub access: Arc<AccessService>,
    /// Invitation flows.
    pub invitations: Arc<InvitationService>,
    /// Password flows.
    pub passwords: Arc<PasswordService>,
    /// Email flows.
    pub emails: Arc<EmailFlowService>,
    /// Terms/privacy acceptance flows.
    pub terms: Arc<TermsService>,
    /// Public sign-up flow.
    pub signup: Arc<SignupService>,
    /// Cascade enable/disable operations.
    pub admin: Arc<AccountAdminService>,
    /// The identity/tenancy directory.
    pub directory: Arc<dyn Directory>,
    /// Role administration repository.
    pub roles: Arc<RoleRepository>,
    /// Claim catalogue repository.
    pub claims: Arc<ClaimRepository>,
    /// Organisation administration repository.
    pub organisations: Arc<OrganisationRepository>,
    /// Establishment administration repository.
    pub establishments: Arc<EstablishmentRepository>,
}

impl AppState {
    /// Wire the full service graph over one connection pool, with the
    /// default (tracing) mailer.
    pub fn from_pool(pool: PgPool, config: AppConfig) -> AppResult<Self> {
        Self::with_mailer(pool, config, Arc::new(TracingMailer))
    }

    /// Wire the full service graph with a caller-provided mailer.
    pub fn with_mailer(
        pool: PgPool,
        config: AppConfig,
        mailer: Arc<dyn Mailer>,
    ) -> AppResult<Self> {
        let registry = Arc::new(ClientRegistry::from_config(&config.clients)?);

        let directory = Arc::new(PgDirectory::new(pool.clone()));
        let dyn_directory: Arc<dyn Directory> = directory.clone();
        let accounts: Arc<dyn AccountSource> = directory.clone();

        let sessions = Arc::new(SessionManager::new(
            Arc::new(PgSessionStore::new(SessionRepository::new(pool.clone()))),
            accounts.clone(),
            &config.auth,
        ));
        let tokens = Arc::new(ActionTokenService::new(
            Arc::new(PgActionTokenStore::new(ActionTokenRepository::new(
                pool.clone(),
            ))),
            config.tokens.clone(),
        ));

        let encoder = Arc::new(JwtEncoder::new(&config.auth));
        let decoder = Arc::new(JwtDecoder::new(&config.auth));
        let hasher = Arc::new(PasswordHasher::new());
        let links = Arc::new(ActionLinkBuilder::new(config.tokens.clone()));

        let auth_gate = Arc::new(AuthGate::new(
            ClientGate::new(registry, config.auth.cookie_name.clone()),
            decoder,
            sessions.clone(),
            accounts,
        ));

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
            mailer.clone(),
        ));
        let invitations = Arc::new(InvitationService::new(
            dyn_directory.clone(),
            tokens.clone(),
            access.clone(),
            hasher.clone(),
            links.clone(),
            mailer.clone(),
            config.auth.clone(),
        ));
        let passwords = Arc::new(PasswordService::new(
            dyn_directory.clone(),
            tokens.clone(),
            sessions.clone(),
            hasher.clone(),
            links,
            mailer,
            config.auth.clone(),
        ));
        let terms = Arc::new(TermsService::new(dyn_directory.clone(), tokens.clone()));
        let signup = Arc::new(SignupService::new(
            dyn_directory.clone(),
            emails.clone(),
            hasher,
            config.auth.clone(),
        ));
        let admin = Arc::new(AccountAdminService::new(dyn_directory.clone()));

        Ok(Self {
            config: Arc::new(config),
            auth_gate,
            sessions,
            tokens,
            access,
            invitations,
            passwords,
            emails,
            terms,
            signup,
            admin,
            directory: dyn_directory,
            roles: Arc::new(RoleRepository::new(pool.clone())),
            claims: Arc::new(ClaimRepository::new(pool.clone())),
            organisations: Arc::new(OrganisationRepository::new(pool.clone())),
            establishments: Arc::new(EstablishmentRepository::new(pool)),
        })
    }
}
