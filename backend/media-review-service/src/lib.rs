//! Media Review Service
//!
//! Stores media records for the review dashboard and pushes a
//! `media_updated` signal over WebSocket to every connected client whenever
//! the media set changes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod websocket;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
