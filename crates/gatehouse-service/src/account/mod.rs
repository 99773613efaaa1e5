//! Account lifecycle flows.

pub mod access;
pub mod admin;
pub mod email;
pub mod invitation;
pub mod password;
pub mod signup;
pub mod terms;

pub use access::{AccessService, LoginResult};
pub use admin::AccountAdminService;
pub use email::EmailFlowService;
pub use invitation::InvitationService;
pub use password::PasswordService;
pub use signup::SignupService;
pub use terms::TermsService;

use std::sync::Arc;

use gatehouse_core::result::AppResult;
use gatehouse_entity::client::Client;
use gatehouse_entity::token::{ActionToken, ActionType};

use crate::link::ActionLinkBuilder;
use crate::mailer::{ActionNotice, Mailer};

/// Hand a freshly issued token to the mailer, with a link when the
/// client has one configured for this action.
pub(crate) async fn deliver(
    mailer: &Arc<dyn Mailer>,
    links: &ActionLinkBuilder,
    client: &Client,
    action: ActionType,
    token: &ActionToken,
) -> AppResult<()> {
    let link = links.build(client, action, &token.token, &token.email);
    mailer
        .send(ActionNotice {
            to: token.email.clone(),
            action,
            link,
            token: token.token.clone(),
        })
        .await
}
