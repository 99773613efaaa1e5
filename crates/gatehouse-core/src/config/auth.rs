//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Bearer credential TTL in hours.
    #[serde(default = "default_jwt_ttl")]
    pub jwt_ttl_hours: u64,
    /// Session TTL in hours. Sessions expire independently of the
    /// credential; both windows must hold for a request to pass.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: u64,
    /// Name of the cookie carrying the bearer credential when no
    /// Authorization header is present.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Role names granted to accounts created through public sign-up.
    #[serde(default = "default_signup_roles")]
    pub signup_roles: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_ttl_hours: default_jwt_ttl(),
            session_ttl_hours: default_session_ttl(),
            cookie_name: default_cookie_name(),
            password_min_length: default_password_min(),
            signup_roles: default_signup_roles(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_jwt_ttl() -> u64 {
    24
}

fn default_session_ttl() -> u64 {
    12
}

fn default_cookie_name() -> String {
    "access_token".to_string()
}

fn default_password_min() -> usize {
    8
}

fn default_signup_roles() -> Vec<String> {
    vec!["member".to_string()]
}
