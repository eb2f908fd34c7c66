//! File system storage management
//!
//! Sandboxed path resolution and the read/write operations on the store.

pub mod naming;
pub mod operations;
pub mod results;
pub mod validation;

pub use naming::unique_filename;
pub use operations::{create_folder, delete_path, find_existing, list_directory, read_text};
pub use results::Entry;
pub use validation::{StoreRoot, is_plain_name};
