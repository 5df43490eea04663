//! Server Setup
//!
//! Initialization, configuration, and application state for the Axum server.

pub mod config;
pub mod init;
pub mod state;

pub use init::create_app;
pub use state::AppState;
