//! The client gate (tenant + credential) and the full auth gate.

use std::sync::Arc;

use http::HeaderMap;
use http::header::{AUTHORIZATION, COOKIE, ORIGIN, REFERER};
use tracing::debug;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::claim::{Claim, ClaimScope};
use gatehouse_entity::client::Client;
use gatehouse_entity::scope::AuthScope;

use crate::account::AccountSource;
use crate::client::ClientRegistry;
use crate::jwt::JwtDecoder;
use crate::scope::resolver;
use crate::session::SessionManager;

use super::context::RequestContext;
use super::required::RequiredClaims;

/// Header carrying an explicit client id; takes priority over
/// Origin/Referer matching.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Identifies the calling tenant and extracts the bearer credential.
///
/// Exposed standalone for endpoints that only need tenant identification
/// (accept-invitation, sign-up, reset-password).
#[derive(Debug, Clone)]
pub struct ClientGate {
    registry: Arc<ClientRegistry>,
    cookie_name: String,
}

impl ClientGate {
    /// Create a new client gate.
    pub fn new(registry: Arc<ClientRegistry>, cookie_name: impl Into<String>) -> Self {
        Self {
            registry,
            cookie_name: cookie_name.into(),
        }
    }

    /// Resolve the calling client: explicit `X-Client-Id` first, then
    /// Origin/Referer matching.
    pub fn resolve_client(&self, headers: &HeaderMap) -> AppResult<Client> {
        if let Some(id) = header_str(headers, CLIENT_ID_HEADER) {
            return self
                .registry
                .get(id)
                .cloned()
                .ok_or_else(|| AppError::unauthorized(format!("Unknown client '{id}'")));
        }

        for header in [ORIGIN.as_str(), REFERER.as_str()] {
            if let Some(value) = header_str(headers, header) {
                if let Some(client) = self.registry.match_origin(value) {
                    return Ok(client.clone());
                }
            }
        }

        Err(AppError::unauthorized("Calling client could not be resolved"))
    }

    /// Extract the bearer credential: `Authorization: Bearer` header
    /// first, then the configured cookie.
    pub fn extract_credential(&self, headers: &HeaderMap) -> AppResult<String> {
        if let Some(value) = header_str(headers, AUTHORIZATION.as_str()) {
            let token = value
                .strip_prefix("Bearer ")
                .ok_or_else(|| AppError::unauthorized("Malformed Authorization header"))?;
            return Ok(token.trim().to_string());
        }

        if let Some(token) = cookie_value(headers, &self.cookie_name) {
            return Ok(token);
        }

        Err(AppError::unauthorized("No credential presented"))
    }
}

/// The composed per-request pipeline, short-circuiting on first failure:
/// client resolution, credential extraction and verification, session
/// validation, enabled check, claim gate, scope computation.
#[derive(Clone)]
pub struct AuthGate {
    client_gate: ClientGate,
    decoder: Arc<JwtDecoder>,
    sessions: Arc<SessionManager>,
    accounts: Arc<dyn AccountSource>,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate").finish()
    }
}

impl AuthGate {
    /// Create a new auth gate.
    pub fn new(
        client_gate: ClientGate,
        decoder: Arc<JwtDecoder>,
        sessions: Arc<SessionManager>,
        accounts: Arc<dyn AccountSource>,
    ) -> Self {
        Self {
            client_gate,
            decoder,
            sessions,
            accounts,
        }
    }

    /// The standalone client gate (steps 1–2 only).
    pub fn client_gate(&self) -> &ClientGate {
        &self.client_gate
    }

    /// Run the authentication half of the pipeline (steps 1–5).
    ///
    /// Credential signature/expiry and session expiry are independent
    /// windows; both must hold.
    pub async fn authenticate(&self, headers: &HeaderMap) -> AppResult<RequestContext> {
        let client = self.client_gate.resolve_client(headers)?;
        let token = self.client_gate.extract_credential(headers)?;

        let claims = self.decoder.decode(&token)?;

        let session = self
            .sessions
            .find_by_token(&token, None)
            .await?
            .ok_or_else(|| AppError::not_found("Session not found"))?;

        if session.is_expired() {
            return Err(AppError::unauthorized("Session has expired"));
        }

        if claims.account_id() != session.user_account_id {
            return Err(AppError::unauthorized("Credential does not match session"));
        }

        let grants = self
            .accounts
            .account_grants(session.user_account_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

        if !grants.is_enabled() {
            return Err(AppError::unauthorized("Account is disabled"));
        }

        debug!(account_id = %grants.account.id, client = %client.id, "Request authenticated");

        Ok(RequestContext {
            client,
            token,
            session,
            grants,
            scope: None,
        })
    }

    /// Run the claim gate and scope computation (steps 6–7), publishing
    /// the resulting scope on the context.
    ///
    /// The sentinel administrator claim passes the membership check
    /// unconditionally and resolves to an Any-level scope for the
    /// declared pair.
    pub fn authorize(
        &self,
        ctx: &mut RequestContext,
        required: &RequiredClaims,
    ) -> AppResult<AuthScope> {
        let mut held = ctx.held_claims();
        let is_administrator = held.contains(&Claim::administrator());

        if is_administrator {
            held.insert(Claim::new(
                required.action(),
                ClaimScope::Any,
                required.resource(),
            ));
        } else if !required.claims().iter().any(|claim| held.contains(claim)) {
            return Err(AppError::forbidden(format!(
                "Missing required claim for '{}' on '{}'",
                required.action(),
                required.resource()
            )));
        }

        let scope = resolver::resolve(
            ctx.account(),
            &held,
            required.action(),
            required.resource(),
        )?;

        ctx.scope = Some(scope.clone());
        Ok(scope)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Pull one cookie value out of the `Cookie` header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = header_str(headers, COOKIE.as_str())?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::config::clients::{ClientConfig, ClientsConfig};
    use http::HeaderValue;

    fn client_gate() -> ClientGate {
        let registry = ClientRegistry::from_config(&ClientsConfig {
            registered: vec![ClientConfig {
                id: "portal".to_string(),
                uri: Some("https://portal.example.com".to_string()),
                actions: Default::default(),
            }],
        })
        .unwrap();
        ClientGate::new(Arc::new(registry), "access_token")
    }

    #[test]
    fn test_client_id_header_takes_priority() {
        let gate = client_gate();
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_ID_HEADER, HeaderValue::from_static("portal"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://elsewhere.example.com"));

        assert_eq!(gate.resolve_client(&headers).unwrap().id, "portal");
    }

    #[test]
    fn test_unknown_client_id_fails_even_with_matching_origin() {
        let gate = client_gate();
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_ID_HEADER, HeaderValue::from_static("ghost"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://portal.example.com"));

        assert!(gate.resolve_client(&headers).is_err());
    }

    #[test]
    fn test_origin_fallback() {
        let gate = client_gate();
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_static("https://portal.example.com"));
        assert_eq!(gate.resolve_client(&headers).unwrap().id, "portal");

        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_static("https://portal.example.com/login"),
        );
        assert_eq!(gate.resolve_client(&headers).unwrap().id, "portal");
    }

    #[test]
    fn test_unresolvable_client() {
        let gate = client_gate();
        assert!(gate.resolve_client(&HeaderMap::new()).is_err());
    }

    #[test]
    fn test_credential_header_beats_cookie() {
        let gate = client_gate();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(
            COOKIE,
            HeaderValue::from_static("access_token=from-cookie; theme=dark"),
        );

        assert_eq!(gate.extract_credential(&headers).unwrap(), "from-header");
    }

    #[test]
    fn test_credential_cookie_fallback() {
        let gate = client_gate();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; access_token=from-cookie"),
        );

        assert_eq!(gate.extract_credential(&headers).unwrap(), "from-cookie");
    }

    #[test]
    fn test_no_credential() {
        let gate = client_gate();
        assert!(gate.extract_credential(&HeaderMap::new()).is_err());
    }
}
