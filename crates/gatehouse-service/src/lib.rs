//! # gatehouse-service
//!
//! Account lifecycle flows over an injectable [`directory::Directory`]:
//! login, sign-up, invitation, password reset/change, email validation
//! and change, terms acceptance, and cascade enable/disable. Also the
//! action-link builder and the mailer seam.

pub mod account;
pub mod directory;
pub mod link;
pub mod mailer;

pub use directory::{Directory, MemoryDirectory, NewAccount, PgDirectory};
pub use link::ActionLinkBuilder;
pub use mailer::{ActionNotice, Mailer, TracingMailer};
