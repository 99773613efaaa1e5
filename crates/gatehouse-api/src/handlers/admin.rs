//! Administrative enable/disable handlers.
//!
//! These operate across tenants, so they demand the any-scope claim
//! rather than accepting narrower levels.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use gatehouse_auth::gate::{RequestContext, RequiredClaims};
use gatehouse_entity::claim::{Claim, ClaimAction, ClaimScope};

use gatehouse_core::error::AppError;
use gatehouse_entity::establishment::Establishment;
use gatehouse_entity::organisation::Organisation;

use crate::dto::request::{CreateEstablishmentBody, CreateOrganisationBody};
use crate::dto::response::CascadeResponse;
use crate::error::ApiError;
use crate::extractors::Authenticated;
use crate::state::AppState;

fn gate_any(
    state: &AppState,
    ctx: &mut RequestContext,
    action: ClaimAction,
    resource: &str,
) -> Result<(), ApiError> {
    let required = RequiredClaims::new(vec![Claim::new(action, ClaimScope::Any, resource)])?;
    state.auth_gate.authorize(ctx, &required)?;
    Ok(())
}

/// POST /admin/accounts/{id}/disable
pub async fn disable_account(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<CascadeResponse>, ApiError> {
    let mut ctx = auth.0;
    gate_any(&state, &mut ctx, ClaimAction::Disable, "users")?;
    let outcome = state.admin.disable_account(id).await?;
    Ok(Json(outcome.into()))
}

/// POST /admin/accounts/{id}/enable
pub async fn enable_account(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut ctx = auth.0;
    gate_any(&state, &mut ctx, ClaimAction::Enable, "users")?;
    state.admin.enable_account(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/organisations
pub async fn create_organisation(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(body): Json<CreateOrganisationBody>,
) -> Result<(StatusCode, Json<Organisation>), ApiError> {
    let mut ctx = auth.0;
    gate_any(&state, &mut ctx, ClaimAction::Create, "organisations")?;
    let organisation = state.organisations.create(&body.name).await?;
    Ok((StatusCode::CREATED, Json(organisation)))
}

/// POST /admin/establishments
pub async fn create_establishment(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(body): Json<CreateEstablishmentBody>,
) -> Result<(StatusCode, Json<Establishment>), ApiError> {
    let mut ctx = auth.0;
    gate_any(&state, &mut ctx, ClaimAction::Create, "establishments")?;

    if state
        .organisations
        .find_by_id(body.organisation_id)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Organisation not found").into());
    }

    let establishment = state
        .establishments
        .create(body.organisation_id, &body.name)
        .await?;
    Ok((StatusCode::CREATED, Json(establishment)))
}

/// POST /admin/organisations/{id}/disable
pub async fn disable_organisation(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<CascadeResponse>, ApiError> {
    let mut ctx = auth.0;
    gate_any(&state, &mut ctx, ClaimAction::Disable, "organisations")?;
    let outcome = state.admin.disable_organisation(id).await?;
    Ok(Json(outcome.into()))
}

/// POST /admin/organisations/{id}/enable
pub async fn enable_organisation(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut ctx = auth.0;
    gate_any(&state, &mut ctx, ClaimAction::Enable, "organisations")?;
    state.admin.enable_organisation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/establishments/{id}/disable
pub async fn disable_establishment(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<CascadeResponse>, ApiError> {
    let mut ctx = auth.0;
    gate_any(&state, &mut ctx, ClaimAction::Disable, "establishments")?;
    let outcome = state.admin.disable_establishment(id).await?;
    Ok(Json(outcome.into()))
}

/// POST /admin/establishments/{id}/enable
pub async fn enable_establishment(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut ctx = auth.0;
    gate_any(&state, &mut ctx, ClaimAction::Enable, "establishments")?;
    state.admin.enable_establishment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
