//! Claim triples and their canonical string codec.

pub mod action;
pub mod model;
pub mod scope;

pub use action::ClaimAction;
pub use model::Claim;
pub use scope::ClaimScope;
