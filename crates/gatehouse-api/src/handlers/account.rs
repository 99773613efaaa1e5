//! Account lifecycle handlers: sign-up, invitation, password, email,
//! terms. Token-gated endpoints run with or without a session, under the
//! standalone client gate.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use gatehouse_entity::claim::ClaimAction;
use gatehouse_auth::gate::RequiredClaims;
use gatehouse_service::account::email::EmailTokenRequest;
use gatehouse_service::account::invitation::{AcceptInvitation, InviteRequest};
use gatehouse_service::account::password::ResetPassword;
use gatehouse_service::account::signup::SignupRequest;

use crate::dto::request::{
    AcceptInviteBody, ChangeEmailBody, ChangePasswordBody, EmailBody, InviteBody,
    ResetPasswordBody, SignupBody, TokenEmailBody,
};
use crate::dto::response::{InvitationResponse, LoginResponse};
use crate::error::ApiError;
use crate::extractors::{Authenticated, ClientContext};
use crate::state::AppState;

/// POST /account/signup — public, client-gated.
pub async fn signup(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    Json(body): Json<SignupBody>,
) -> Result<StatusCode, ApiError> {
    state
        .signup
        .signup(
            &client,
            SignupRequest {
                email: body.email,
                password: body.password,
                first_name: body.first_name,
                last_name: body.last_name,
                organisation_id: body.organisation_id,
            },
        )
        .await?;
    Ok(StatusCode::CREATED)
}

/// POST /account/invitations — administrative, claim-gated.
pub async fn invite(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(body): Json<InviteBody>,
) -> Result<(StatusCode, Json<InvitationResponse>), ApiError> {
    let mut ctx = auth.0;
    let required = RequiredClaims::at_any_level(ClaimAction::Create, "users");
    state.auth_gate.authorize(&mut ctx, &required)?;

    let token = state
        .invitations
        .send(
            &ctx.client,
            InviteRequest {
                email: body.email,
                role_names: body.roles,
                organisation_id: body.organisation_id,
                establishment_id: body.establishment_id,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InvitationResponse {
            email: token.email,
            expires_at: token.expires_at,
        }),
    ))
}

/// POST /account/invitations/accept — public, consumes the invite token
/// and opens a session.
pub async fn accept_invitation(
    State(state): State<AppState>,
    ClientContext(_client): ClientContext,
    Json(body): Json<AcceptInviteBody>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let result = state
        .invitations
        .accept(AcceptInvitation {
            token: body.token,
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token: result.token,
            expires_at: result.token_expires_at,
            account_id: result.account.id,
            user: result.user,
        }),
    ))
}

/// POST /account/reset-password/send — always responds no-content, even
/// for unknown emails.
pub async fn send_reset_password(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    Json(body): Json<EmailBody>,
) -> Result<StatusCode, ApiError> {
    state.passwords.send_reset(&client, &body.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /account/reset-password — token-gated reset.
pub async fn reset_password(
    State(state): State<AppState>,
    ClientContext(_client): ClientContext,
    Json(body): Json<ResetPasswordBody>,
) -> Result<StatusCode, ApiError> {
    state
        .passwords
        .reset(ResetPassword {
            token: body.token,
            email: body.email,
            new_password: body.new_password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /account/change-password — authenticated change.
pub async fn change_password(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(body): Json<ChangePasswordBody>,
) -> Result<StatusCode, ApiError> {
    state
        .passwords
        .change(auth.user().id, &body.current_password, &body.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /account/validate-email/send — resend a validation token;
/// silent on unknown emails.
pub async fn send_email_validation(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    Json(body): Json<EmailBody>,
) -> Result<StatusCode, ApiError> {
    state.emails.send_validation(&client, &body.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /account/validate-email — consume a validation token.
pub async fn validate_email(
    State(state): State<AppState>,
    ClientContext(_client): ClientContext,
    Json(body): Json<TokenEmailBody>,
) -> Result<StatusCode, ApiError> {
    state
        .emails
        .validate(EmailTokenRequest {
            token: body.token,
            email: body.email,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /account/change-email — authenticated; the confirmation token
/// goes to the new address.
pub async fn request_email_change(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(body): Json<ChangeEmailBody>,
) -> Result<StatusCode, ApiError> {
    state
        .emails
        .request_change(&auth.client, auth.user().id, &body.new_email)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /account/change-email/confirm — consume a change-email token.
pub async fn confirm_email_change(
    State(state): State<AppState>,
    ClientContext(_client): ClientContext,
    Json(body): Json<TokenEmailBody>,
) -> Result<StatusCode, ApiError> {
    state
        .emails
        .confirm_change(EmailTokenRequest {
            token: body.token,
            email: body.email,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /account/accept-terms — consume a terms token.
pub async fn accept_terms(
    State(state): State<AppState>,
    ClientContext(_client): ClientContext,
    Json(body): Json<TokenEmailBody>,
) -> Result<StatusCode, ApiError> {
    state
        .terms
        .accept_terms(EmailTokenRequest {
            token: body.token,
            email: body.email,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /account/accept-privacy-policy — consume a privacy token.
pub async fn accept_privacy_policy(
    State(state): State<AppState>,
    ClientContext(_client): ClientContext,
    Json(body): Json<TokenEmailBody>,
) -> Result<StatusCode, ApiError> {
    state
        .terms
        .accept_privacy_policy(EmailTokenRequest {
            token: body.token,
            email: body.email,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
