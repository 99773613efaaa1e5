//! Scoped user reads.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use gatehouse_auth::gate::RequiredClaims;
use gatehouse_core::error::AppError;
use gatehouse_entity::claim::ClaimAction;
use gatehouse_entity::user::User;
use gatehouse_service::directory::Directory as _;

use crate::error::ApiError;
use crate::extractors::Authenticated;
use crate::state::AppState;

/// GET /users/me — the caller's own record; no claim gate needed.
pub async fn me(auth: Authenticated) -> Json<User> {
    Json(auth.user().clone())
}

/// GET /users/{id} — claim-gated, scope-filtered read.
///
/// A caller holding only an own-level claim asking for another user's
/// record gets a not-found, not the record.
pub async fn get_user(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let mut ctx = auth.0;
    let required = RequiredClaims::at_any_level(ClaimAction::Read, "users");
    state.auth_gate.authorize(&mut ctx, &required)?;

    let user = state
        .directory
        .user_by_id_scoped(id, ctx.scope())
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(user))
}
