//! Route table.

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::handlers::{account, admin, auth, health, roles, users};
use crate::state::AppState;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Sessions
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/logout-all", post(auth::logout_all))
        // Account lifecycle
        .route("/account/signup", post(account::signup))
        .route("/account/invitations", post(account::invite))
        .route("/account/invitations/accept", post(account::accept_invitation))
        .route("/account/reset-password/send", post(account::send_reset_password))
        .route("/account/reset-password", post(account::reset_password))
        .route("/account/change-password", post(account::change_password))
        .route("/account/validate-email/send", post(account::send_email_validation))
        .route("/account/validate-email", post(account::validate_email))
        .route("/account/change-email", post(account::request_email_change))
        .route("/account/change-email/confirm", post(account::confirm_email_change))
        .route("/account/accept-terms", post(account::accept_terms))
        .route(
            "/account/accept-privacy-policy",
            post(account::accept_privacy_policy),
        )
        // Scoped reads
        .route("/users/me", get(users::me))
        .route("/users/{id}", get(users::get_user))
        // Role administration
        .route("/claims", get(roles::list_claims))
        .route("/roles", get(roles::list).post(roles::create))
        .route("/roles/{id}", put(roles::update).delete(roles::delete))
        // Tenancy administration
        .route("/admin/organisations", post(admin::create_organisation))
        .route("/admin/establishments", post(admin::create_establishment))
        .route("/admin/accounts/{id}/disable", post(admin::disable_account))
        .route("/admin/accounts/{id}/enable", post(admin::enable_account))
        .route(
            "/admin/organisations/{id}/disable",
            post(admin::disable_organisation),
        )
        .route(
            "/admin/organisations/{id}/enable",
            post(admin::enable_organisation),
        )
        .route(
            "/admin/establishments/{id}/disable",
            post(admin::disable_establishment),
        )
        .route(
            "/admin/establishments/{id}/enable",
            post(admin::enable_establishment),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
