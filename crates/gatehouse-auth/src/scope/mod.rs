//! Scope resolution: from held claims to an enforceable row filter.

pub mod resolver;

pub use resolver::{build_scope, most_permissive_scope, resolve};
