//! # gatehouse-api
//!
//! The axum HTTP surface: application state, router, extractors mapping
//! the gate into handler arguments, and error → response translation.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
