//! LAN share server
//!
//! Exposes a single directory tree over HTTP so that clients on the local
//! network can browse, upload, download, preview and delete files.

pub mod error;
pub mod middleware;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use server::{Server, ServerConfig};
