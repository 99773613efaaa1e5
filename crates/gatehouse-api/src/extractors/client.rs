//! `ClientContext` extractor — tenant identification only.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use gatehouse_entity::client::Client;

use crate::error::ApiError;
use crate::state::AppState;

/// The resolved calling client, for endpoints that need tenant
/// identification but no session (sign-up, accept-invitation, reset).
#[derive(Debug, Clone)]
pub struct ClientContext(pub Client);

impl FromRequestParts<AppState> for ClientContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let client = state
            .auth_gate
            .client_gate()
            .resolve_client(&parts.headers)?;
        Ok(ClientContext(client))
    }
}
