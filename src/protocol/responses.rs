//! Request and response bodies
//!
//! JSON shapes exchanged with browser clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query string carrying a store-relative `path`
#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    pub path: Option<String>,
    pub conflict_mode: Option<String>,
    pub filename_encoding: Option<String>,
}

/// `filenames` stays untyped so a non-array can be reported as such
#[derive(Debug, Deserialize)]
pub struct CheckExistsRequest {
    #[serde(default)]
    pub filenames: Value,
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckExistsResponse {
    pub existing: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MkdirRequest {
    pub folder_name: Option<String>,
    pub current_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
