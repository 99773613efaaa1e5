//! Action-link construction for outbound notifications.

use gatehouse_core::config::tokens::ActionTokenConfig;
use gatehouse_entity::client::Client;
use gatehouse_entity::token::ActionType;

/// Builds the clickable link a client receives for an action token.
///
/// A client with no URI, or with no route for the action type, gets no
/// link: the raw token is communicated instead (code-only flow).
#[derive(Debug, Clone)]
pub struct ActionLinkBuilder {
    config: ActionTokenConfig,
}

impl ActionLinkBuilder {
    /// Create a link builder over the token policy configuration.
    pub fn new(config: ActionTokenConfig) -> Self {
        Self { config }
    }

    /// Build the link for one action type, or `None` for code-only flow.
    ///
    /// A URI with a non-http scheme is a mobile deeplink and is joined
    /// without a separator (`myapp://route?...`); a web URI gets a `/`
    /// separator and the email lowercased.
    pub fn build(
        &self,
        client: &Client,
        action: ActionType,
        token: &str,
        email: &str,
    ) -> Option<String> {
        let uri = client.uri.as_deref()?;
        let route = client.route_for(action, &self.config)?;

        if uri.contains("://") && !uri.starts_with("http") {
            let email = encode(email);
            Some(format!("{uri}{route}?token={token}&email={email}"))
        } else {
            let uri = uri.trim_end_matches('/');
            let email = encode(&email.to_lowercase());
            Some(format!("{uri}/{route}?token={token}&email={email}"))
        }
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn builder() -> ActionLinkBuilder {
        ActionLinkBuilder::new(ActionTokenConfig::default())
    }

    fn client(uri: Option<&str>) -> Client {
        Client {
            id: "portal".to_string(),
            uri: uri.map(String::from),
            actions: HashMap::new(),
        }
    }

    #[test]
    fn test_web_link() {
        let link = builder()
            .build(
                &client(Some("https://portal.example.com")),
                ActionType::ResetPassword,
                "tok123",
                "Bob@Example.com",
            )
            .unwrap();
        assert_eq!(
            link,
            "https://portal.example.com/reset-password?token=tok123&email=bob%40example.com"
        );
    }

    #[test]
    fn test_deeplink_keeps_email_case_and_skips_separator() {
        let link = builder()
            .build(
                &client(Some("myapp://")),
                ActionType::Invite,
                "tok123",
                "Bob@Example.com",
            )
            .unwrap();
        assert_eq!(
            link,
            "myapp://accept-invitation?token=tok123&email=Bob%40Example.com"
        );
    }

    #[test]
    fn test_code_only_flow_without_uri() {
        assert!(
            builder()
                .build(&client(None), ActionType::Invite, "tok123", "bob@example.com")
                .is_none()
        );
    }
}
