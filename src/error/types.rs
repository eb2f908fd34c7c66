//! Error types
//!
//! Defines the error taxonomy for store operations and server startup.

use std::fmt;
use std::io;

/// Store operation that hit a filesystem failure.
///
/// Each operation carries the generic message reported to clients, so that
/// internal paths and OS error text stay in the server log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    CreateFolder,
    Upload,
    Delete,
    Read,
}

impl Operation {
    /// Client-facing message for a failure of this operation
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::List => "Unable to scan directory",
            Operation::CreateFolder => "Failed to create folder",
            Operation::Upload => "Upload failed",
            Operation::Delete => "Delete failed",
            Operation::Read => "Read failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::CreateFolder => "mkdir",
            Operation::Upload => "upload",
            Operation::Delete => "delete",
            Operation::Read => "read",
        };
        f.write_str(name)
    }
}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    /// Missing or malformed request field.
    Validation(String),
    /// Target name is already taken.
    Conflict(String),
    /// Operation refused, e.g. deleting the store root.
    Forbidden(String),
    /// Filesystem failure at the store boundary.
    Io {
        operation: Operation,
        source: io::Error,
    },
}

impl StorageError {
    pub fn io(operation: Operation, source: io::Error) -> Self {
        StorageError::Io { operation, source }
    }

    /// Message safe to hand back to a client
    pub fn client_message(&self) -> String {
        match self {
            StorageError::Validation(msg)
            | StorageError::Conflict(msg)
            | StorageError::Forbidden(msg) => msg.clone(),
            StorageError::Io { operation, .. } => operation.failure_message().to_string(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Validation(msg) => write!(f, "Validation error: {}", msg),
            StorageError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            StorageError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            StorageError::Io { operation, source } => {
                write!(f, "IO error during {}: {}", operation, source)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors that stop the server from starting or serving
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    StoreRoot(io::Error),
    Bind(String, io::Error),
    Serve(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::StoreRoot(e) => write!(f, "Unable to prepare store root: {}", e),
            ServerError::Bind(addr, e) => write!(f, "Failed to bind to {}: {}", addr, e),
            ServerError::Serve(e) => write!(f, "Server error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}
