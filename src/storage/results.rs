//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub name: String,
    pub is_directory: bool,
    /// Bytes; always 0 for directories
    pub size: u64,
    /// Milliseconds since the Unix epoch
    pub mtime: u64,
    /// Same instant as `mtime`, under the name the bundled UI reads
    pub display_date: u64,
}
