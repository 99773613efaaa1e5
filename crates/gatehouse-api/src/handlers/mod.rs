//! HTTP handlers.

pub mod account;
pub mod admin;
pub mod auth;
pub mod health;
pub mod roles;
pub mod users;
