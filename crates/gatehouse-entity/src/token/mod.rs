//! One-shot action tokens and their action-type bit set.

pub mod action_type;
pub mod model;

pub use action_type::{ActionType, ActionTypeSet};
pub use model::{ActionToken, CreateActionToken};
