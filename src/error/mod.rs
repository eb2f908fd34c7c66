//! Error handling
//!
//! Defines error types and their HTTP mapping for the share server.

pub mod handlers;
pub mod types;

pub use types::*;
