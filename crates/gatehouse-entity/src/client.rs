//! Registered tenant client, resolved once per request.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatehouse_core::config::clients::ClientConfig;
use gatehouse_core::config::tokens::ActionTokenConfig;
use gatehouse_core::AppResult;

use crate::token::ActionType;

/// Per-client route and validity override for one action type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientAction {
    /// Route suffix override.
    pub route: Option<String>,
    /// Token validity override in hours.
    pub validity_hours: Option<u64>,
}

/// A registered calling application (tenant).
///
/// Built from configuration at startup and immutable thereafter. A client
/// with no `uri` has no web surface: action tokens for it are
/// communicated as raw codes rather than clickable links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Client identifier.
    pub id: String,
    /// Base URI for action links, if the client has a web surface.
    pub uri: Option<String>,
    /// Per-action-type overrides.
    pub actions: HashMap<ActionType, ClientAction>,
}

impl Client {
    /// Build a client from its configuration entry.
    ///
    /// Unrecognized action-type keys are rejected at startup rather than
    /// silently ignored.
    pub fn from_config(config: &ClientConfig) -> AppResult<Self> {
        let mut actions = HashMap::new();
        for (key, action) in &config.actions {
            let action_type = ActionType::from_str(key)?;
            actions.insert(
                action_type,
                ClientAction {
                    route: action.route.clone(),
                    validity_hours: action.validity_hours,
                },
            );
        }

        Ok(Self {
            id: config.id.clone(),
            uri: config.uri.clone(),
            actions,
        })
    }

    /// The route suffix for one action type: client override first, then
    /// the global default. `None` means code-only flow for this action.
    pub fn route_for(&self, action: ActionType, defaults: &ActionTokenConfig) -> Option<String> {
        self.actions
            .get(&action)
            .and_then(|a| a.route.clone())
            .or_else(|| defaults.route_for(action.as_str()).map(String::from))
    }

    /// The token validity in hours for one action type: client override
    /// first, then the global default.
    pub fn validity_for(&self, action: ActionType, defaults: &ActionTokenConfig) -> u64 {
        self.actions
            .get(&action)
            .and_then(|a| a.validity_hours)
            .unwrap_or_else(|| defaults.validity_for(action.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::config::clients::ClientActionConfig;

    fn config_with_override() -> ClientConfig {
        let mut actions = HashMap::new();
        actions.insert(
            "invite".to_string(),
            ClientActionConfig {
                route: Some("join".to_string()),
                validity_hours: Some(48),
            },
        );
        ClientConfig {
            id: "portal".to_string(),
            uri: Some("https://portal.example.com".to_string()),
            actions,
        }
    }

    #[test]
    fn test_overrides_beat_defaults() {
        let client = Client::from_config(&config_with_override()).unwrap();
        let defaults = ActionTokenConfig::default();

        assert_eq!(
            client.route_for(ActionType::Invite, &defaults).as_deref(),
            Some("join")
        );
        assert_eq!(client.validity_for(ActionType::Invite, &defaults), 48);

        // No override for reset: fall back to global defaults.
        assert_eq!(
            client
                .route_for(ActionType::ResetPassword, &defaults)
                .as_deref(),
            Some("reset-password")
        );
        assert_eq!(client.validity_for(ActionType::ResetPassword, &defaults), 2);
    }

    #[test]
    fn test_unknown_action_key_is_rejected() {
        let mut config = config_with_override();
        config
            .actions
            .insert("teleport".to_string(), ClientActionConfig::default());
        assert!(Client::from_config(&config).is_err());
    }
}
