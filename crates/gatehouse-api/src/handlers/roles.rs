//! Role administration handlers.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use gatehouse_auth::gate::{RequestContext, RequiredClaims};
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::claim::{Claim, ClaimAction, ClaimScope};
use gatehouse_entity::role::{CreateRole, Role};

use crate::dto::request::RoleBody;
use crate::error::ApiError;
use crate::extractors::Authenticated;
use crate::state::AppState;

fn gate(
    state: &AppState,
    ctx: &mut RequestContext,
    action: ClaimAction,
) -> Result<(), ApiError> {
    let required = RequiredClaims::new(vec![Claim::new(action, ClaimScope::Any, "roles")])?;
    state.auth_gate.authorize(ctx, &required)?;
    Ok(())
}

fn parse_claims(raw: &[String]) -> AppResult<Vec<Claim>> {
    raw.iter().map(|s| Claim::from_str(s)).collect()
}

/// GET /claims — the seeded claim catalogue, for role administration.
pub async fn list_claims(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Json<Vec<Claim>>, ApiError> {
    let mut ctx = auth.0;
    gate(&state, &mut ctx, ClaimAction::Read)?;
    Ok(Json(state.claims.list().await?))
}

/// GET /roles
pub async fn list(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Json<Vec<Role>>, ApiError> {
    let mut ctx = auth.0;
    gate(&state, &mut ctx, ClaimAction::Read)?;
    Ok(Json(state.roles.list().await?))
}

/// POST /roles
pub async fn create(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(body): Json<RoleBody>,
) -> Result<(StatusCode, Json<Role>), ApiError> {
    let mut ctx = auth.0;
    gate(&state, &mut ctx, ClaimAction::Create)?;

    let role = state
        .roles
        .create(&CreateRole {
            name: body.name,
            description: body.description,
            claims: parse_claims(&body.claims)?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(role)))
}

/// PUT /roles/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<Uuid>,
    Json(body): Json<RoleBody>,
) -> Result<Json<Role>, ApiError> {
    let mut ctx = auth.0;
    gate(&state, &mut ctx, ClaimAction::Update)?;

    let role = state
        .roles
        .update(
            id,
            &CreateRole {
                name: body.name,
                description: body.description,
                claims: parse_claims(&body.claims)?,
            },
        )
        .await?;

    Ok(Json(role))
}

/// DELETE /roles/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut ctx = auth.0;
    gate(&state, &mut ctx, ClaimAction::Delete)?;

    if !state.roles.delete(id).await? {
        return Err(AppError::not_found(format!("Role {id} not found")).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
