//! Transfer module
//!
//! Handles upload placement: conflict policy, filename decoding and
//! streaming payloads into the store.

pub mod file_ops;
pub mod modes;
pub mod results;

// Re-export key types and functions
pub use file_ops::{place_upload, upload_filename};
pub use modes::{ConflictMode, FilenameEncoding};
pub use results::PlacedFile;
