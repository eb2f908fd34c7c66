//! HTTP protocol layer
//!
//! Request handlers and the JSON bodies they exchange.

pub mod handlers;
pub mod responses;

pub use responses::*;
