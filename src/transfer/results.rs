//! Transfer result types
//!
//! Defines result structures returned by upload placement.

use std::path::PathBuf;

/// Outcome of placing one uploaded file
#[derive(Debug, Clone)]
pub struct PlacedFile {
    /// Name the client asked for, after decoding
    pub requested_name: String,
    /// Name the file was stored under
    pub name: String,
    pub path: PathBuf,
    pub bytes: u64,
}
