//! Lesson/payment ledger backend for a private tutoring business: member
//! rosters with prepaid lesson balances, lesson and payment logs, news posts
//! and user accounts over HTTP/JSON, backed by SQLite.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;
pub use routes::{create_router, AppState};
