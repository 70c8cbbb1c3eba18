pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod models;
pub mod notion;
pub mod openapi;
pub mod password;
pub mod questions;
pub mod repo;
pub mod routes;

// Re-export commonly used items for tests / external users
pub use routes::{config, cors, AppState};
