//! `Authenticated` extractor — runs the auth gate and injects the
//! request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use gatehouse_auth::gate::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated request context available in handlers.
///
/// Runs pipeline steps 1–5 (client, credential, session, account). Claim
/// gating and scope publication happen in the handler, which knows its
/// declared claims.
#[derive(Debug, Clone)]
pub struct Authenticated(pub RequestContext);

impl std::ops::Deref for Authenticated {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = state.auth_gate.authenticate(&parts.headers).await?;
        Ok(Authenticated(ctx))
    }
}
