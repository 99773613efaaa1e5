//! Repository implementations for all persisted entities.

pub mod action_token;
pub mod claim;
pub mod establishment;
pub mod organisation;
pub mod role;
pub mod session;
pub mod user;
pub mod user_account;

use gatehouse_core::error::{AppError, ErrorKind};

/// Map an sqlx error into a database-kind [`AppError`], promoting unique
/// constraint violations to conflicts.
pub(crate) fn map_db_error(context: &str, err: sqlx::Error) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::conflict(format!("{context}: duplicate entry"));
        }
    }
    AppError::with_source(ErrorKind::Database, context.to_string(), err)
}
