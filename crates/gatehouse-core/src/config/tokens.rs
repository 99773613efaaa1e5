//! Action-token policy configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-action-type defaults for one-shot action tokens.
///
/// Maps are keyed by the snake_case action type name (`invite`,
/// `validate_email`, `accept_terms`, `accept_privacy_policy`,
/// `change_password`, `reset_password`, `change_email`). Registered
/// clients may override any entry per action type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTokenConfig {
    /// Default token validity in hours per action type.
    #[serde(default = "default_validity_by_type")]
    pub validity_hours: HashMap<String, u64>,
    /// Fallback validity in hours for action types without an entry.
    #[serde(default = "default_validity_fallback")]
    pub default_validity_hours: u64,
    /// Default route suffix per action type, appended to the client URI
    /// when building action links.
    #[serde(default = "default_routes")]
    pub routes: HashMap<String, String>,
}

impl Default for ActionTokenConfig {
    fn default() -> Self {
        Self {
            validity_hours: default_validity_by_type(),
            default_validity_hours: default_validity_fallback(),
            routes: default_routes(),
        }
    }
}

impl ActionTokenConfig {
    /// Configured validity for one action type name, falling back to the
    /// global default when no entry exists.
    pub fn validity_for(&self, action: &str) -> u64 {
        self.validity_hours
            .get(action)
            .copied()
            .unwrap_or(self.default_validity_hours)
    }

    /// Configured route suffix for one action type name, if any.
    pub fn route_for(&self, action: &str) -> Option<&str> {
        self.routes.get(action).map(String::as_str)
    }
}

fn default_validity_by_type() -> HashMap<String, u64> {
    let mut map = HashMap::new();
    map.insert("invite".to_string(), 168);
    map.insert("validate_email".to_string(), 72);
    map.insert("accept_terms".to_string(), 168);
    map.insert("accept_privacy_policy".to_string(), 168);
    map.insert("change_password".to_string(), 2);
    map.insert("reset_password".to_string(), 2);
    map.insert("change_email".to_string(), 24);
    map
}

fn default_validity_fallback() -> u64 {
    24
}

fn default_routes() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("invite".to_string(), "accept-invitation".to_string());
    map.insert("validate_email".to_string(), "validate-email".to_string());
    map.insert("accept_terms".to_string(), "accept-terms".to_string());
    map.insert(
        "accept_privacy_policy".to_string(),
        "accept-privacy-policy".to_string(),
    );
    map.insert("change_password".to_string(), "change-password".to_string());
    map.insert("reset_password".to_string(), "reset-password".to_string());
    map.insert("change_email".to_string(), "change-email".to_string());
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_fallback() {
        let config = ActionTokenConfig::default();
        assert_eq!(config.validity_for("invite"), 168);
        assert_eq!(config.validity_for("reset_password"), 2);
        assert_eq!(config.validity_for("unknown"), 24);
    }

    #[test]
    fn test_route_lookup() {
        let config = ActionTokenConfig::default();
        assert_eq!(config.route_for("invite"), Some("accept-invitation"));
        assert_eq!(config.route_for("unknown"), None);
    }
}
