//! Request extractors mapping the gate into handler arguments.

pub mod auth;
pub mod client;

pub use auth::Authenticated;
pub use client::ClientContext;
