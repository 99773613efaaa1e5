//! Outbound notification seam.
//!
//! Actual delivery and templating live outside this crate; flows hand a
//! finished [`ActionNotice`] to whatever implementation is wired in.

use async_trait::async_trait;
use tracing::info;

use gatehouse_core::result::AppResult;
use gatehouse_entity::token::ActionType;

/// One outbound notification carrying an action token.
#[derive(Debug, Clone)]
pub struct ActionNotice {
    /// Recipient email address.
    pub to: String,
    /// The primary action the notice is about.
    pub action: ActionType,
    /// The clickable link, when the client has a web or deeplink surface.
    pub link: Option<String>,
    /// The raw token, communicated directly in the code-only flow.
    pub token: String,
}

/// Delivers action notices.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Deliver one notice.
    async fn send(&self, notice: ActionNotice) -> AppResult<()>;
}

/// Default mailer: logs the notice instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, notice: ActionNotice) -> AppResult<()> {
        info!(
            to = %notice.to,
            action = %notice.action,
            has_link = notice.link.is_some(),
            "Action notice (delivery not configured)"
        );
        Ok(())
    }
}
