//! REST API for the scorer service
//!
//! Exposes classification, health, scan history and analytics over HTTP

pub mod handlers;
pub mod server;

pub use handlers::AppState;
pub use server::ApiServer;
