//! # gatehouse-entity
//!
//! Domain entity models for Gatehouse: claims, roles, users, accounts,
//! organisations, establishments, sessions, action tokens, clients, and
//! the per-request authorization scope.

pub mod account;
pub mod claim;
pub mod client;
pub mod establishment;
pub mod organisation;
pub mod role;
pub mod scope;
pub mod session;
pub mod token;
pub mod user;

pub use account::{AccountGrants, CascadeOutcome, CreateUserAccount, UserAccount};
pub use claim::{Claim, ClaimAction, ClaimScope};
pub use client::Client;
pub use scope::{AuthScope, ScopeFilter};
pub use session::Session;
pub use token::{ActionToken, ActionType, ActionTypeSet};
