//! Login and logout handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{Value, json};

use crate::dto::request::LoginRequest;
use crate::dto::response::LoginResponse;
use crate::error::ApiError;
use crate::extractors::{Authenticated, ClientContext};
use crate::state::AppState;

/// POST /auth/login — email + password, sets the credential cookie.
pub async fn login(
    State(state): State<AppState>,
    ClientContext(_client): ClientContext,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let result = state
        .access
        .login(&body.email, &body.password, body.organisation_id)
        .await?;

    let cookie = Cookie::build((state.config.auth.cookie_name.clone(), result.token.clone()))
        .path("/")
        .http_only(true)
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token: result.token,
            expires_at: result.token_expires_at,
            account_id: result.account.id,
            user: result.user,
        }),
    ))
}

/// POST /auth/logout — delete the caller's session.
pub async fn logout(
    State(state): State<AppState>,
    auth: Authenticated,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    state.access.logout(&auth.token).await?;
    let jar = jar.remove(
        Cookie::build(state.config.auth.cookie_name.clone())
            .path("/")
            .build(),
    );
    Ok((jar, StatusCode::NO_CONTENT))
}

/// POST /auth/logout-all — delete every session across the user's
/// accounts.
pub async fn logout_all(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Json<Value>, ApiError> {
    let dropped = state.access.logout_all(auth.user().id).await?;
    Ok(Json(json!({ "sessions_dropped": dropped })))
}
