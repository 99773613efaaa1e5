//! The composed per-request authentication and authorization pipeline.

pub mod context;
pub mod required;

mod pipeline;

pub use context::RequestContext;
pub use pipeline::{AuthGate, ClientGate};
pub use required::RequiredClaims;
