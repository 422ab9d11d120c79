//! Coursely HTTP API.
//!
//! The binary in `main.rs` only wires configuration, the database and the
//! Telegram bot around [`router::build_app_router`]; integration tests build
//! the same router against a throwaway database.

pub mod auth;
pub mod config;
pub mod error;
pub mod guards;
pub mod handlers;
pub mod middleware;
pub mod orders;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
