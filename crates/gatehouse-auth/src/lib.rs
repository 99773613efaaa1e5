//! # gatehouse-auth
//!
//! The authorization core: JWT credential handling, password hashing,
//! scope resolution, session management, one-shot action tokens, the
//! client registry, and the composed per-request auth gate.

pub mod account;
pub mod client;
pub mod gate;
pub mod jwt;
pub mod password;
pub mod scope;
pub mod session;
pub mod token;

pub use account::AccountSource;
pub use client::ClientRegistry;
pub use gate::{AuthGate, ClientGate, RequestContext, RequiredClaims};
pub use session::SessionManager;
pub use token::ActionTokenService;
