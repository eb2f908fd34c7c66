//! Server core functionality
//!
//! This module contains the HTTP server, its router, configuration,
//! and the state shared between request handlers.

pub mod config;
pub mod core;
pub mod state;

pub use self::config::ServerConfig;
pub use self::core::{Server, build_router};
pub use self::state::AppState;
