//! One-shot action tokens: storage seam, in-memory store, and the
//! issuance/validation/revocation service.

pub mod memory;
pub mod service;
pub mod store;

pub use memory::MemoryActionTokenStore;
pub use service::{ActionTokenService, ValidateActionToken};
pub use store::{ActionTokenStore, PgActionTokenStore};
