//! Registered tenant client configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// All registered calling applications (tenants).
///
/// Loaded once at startup and immutable thereafter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientsConfig {
    /// Registered clients, indexed by position in the TOML array.
    #[serde(default)]
    pub registered: Vec<ClientConfig>,
}

/// One registered calling application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Client identifier, matched against the `X-Client-Id` header.
    pub id: String,
    /// Base URI for action links. `None` means the client has no web
    /// surface and action tokens are communicated as raw codes.
    #[serde(default)]
    pub uri: Option<String>,
    /// Per-action-type overrides, keyed by the snake_case action name.
    #[serde(default)]
    pub actions: HashMap<String, ClientActionConfig>,
}

/// Per-client override of route and validity for one action type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientActionConfig {
    /// Route suffix override.
    #[serde(default)]
    pub route: Option<String>,
    /// Token validity override in hours.
    #[serde(default)]
    pub validity_hours: Option<u64>,
}
