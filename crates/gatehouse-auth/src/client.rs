//! Registry of configured tenant clients.

use std::collections::HashMap;

use gatehouse_core::config::clients::ClientsConfig;
use gatehouse_core::result::AppResult;
use gatehouse_entity::client::Client;

/// All registered clients, loaded once at startup and immutable
/// thereafter.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: Vec<Client>,
    by_id: HashMap<String, usize>,
}

impl ClientRegistry {
    /// Build the registry from configuration. Unknown action-type keys in
    /// any client entry are rejected.
    pub fn from_config(config: &ClientsConfig) -> AppResult<Self> {
        let mut clients = Vec::with_capacity(config.registered.len());
        let mut by_id = HashMap::new();

        for entry in &config.registered {
            let client = Client::from_config(entry)?;
            by_id.insert(client.id.clone(), clients.len());
            clients.push(client);
        }

        Ok(Self { clients, by_id })
    }

    /// Look up a client by its exact ID.
    pub fn get(&self, id: &str) -> Option<&Client> {
        self.by_id.get(id).map(|&i| &self.clients[i])
    }

    /// Match an Origin or Referer header value against client URIs.
    ///
    /// An Origin carries no path, so a client URI that extends the origin
    /// with a path still matches; a Referer carries the full URL, so it
    /// matches when it extends the client URI.
    pub fn match_origin(&self, origin: &str) -> Option<&Client> {
        let origin = origin.trim().trim_end_matches('/');
        if origin.is_empty() {
            return None;
        }

        self.clients.iter().find(|client| {
            client
                .uri
                .as_deref()
                .map(|uri| {
                    let uri = uri.trim_end_matches('/');
                    uri.starts_with(origin) || origin.starts_with(uri)
                })
                .unwrap_or(false)
        })
    }

    /// Whether no clients are registered.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::config::clients::ClientConfig;

    fn registry() -> ClientRegistry {
        let config = ClientsConfig {
            registered: vec![
                ClientConfig {
                    id: "portal".to_string(),
                    uri: Some("https://portal.example.com/app".to_string()),
                    actions: HashMap::new(),
                },
                ClientConfig {
                    id: "kiosk".to_string(),
                    uri: None,
                    actions: HashMap::new(),
                },
            ],
        };
        ClientRegistry::from_config(&config).unwrap()
    }

    #[test]
    fn test_lookup_by_id() {
        let registry = registry();
        assert!(registry.get("portal").is_some());
        assert!(registry.get("kiosk").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_match_origin() {
        let registry = registry();
        // Origin (no path) matches a client URI that extends it.
        let client = registry.match_origin("https://portal.example.com").unwrap();
        assert_eq!(client.id, "portal");
        // Referer (full URL) matches when it extends the client URI.
        let client = registry
            .match_origin("https://portal.example.com/app/login")
            .unwrap();
        assert_eq!(client.id, "portal");
        assert!(registry.match_origin("https://elsewhere.example.com").is_none());
        // A URI-less client never matches by origin.
        assert!(registry.match_origin("").is_none());
    }
}
