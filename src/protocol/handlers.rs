//! Request handlers for the share server.
//!
//! Each handler resolves the client's path through the store root, runs one
//! storage operation, and serializes the outcome. Every failure is returned
//! as a `StorageError`, which renders itself as a JSON error response.

use axum::Json;
use axum::extract::{Multipart, Query, State};
use log::{debug, info};
use serde_json::Value;

use crate::error::StorageError;
use crate::protocol::responses::{
    CheckExistsRequest, CheckExistsResponse, MkdirRequest, PathQuery, SuccessResponse,
    UploadQuery, UploadResponse,
};
use crate::server::state::AppState;
use crate::storage::{self, Entry};
use crate::transfer::{ConflictMode, FilenameEncoding, place_upload};

/// Multipart field that carries uploaded files
pub const UPLOAD_FIELD: &str = "files";

/// GET /api/files?path=P
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<Entry>>, StorageError> {
    let dir = state.store.resolve(query.path.as_deref().unwrap_or(""));
    let entries = storage::list_directory(&dir).await?;
    Ok(Json(entries))
}

/// POST /api/check-exists
pub async fn check_exists(
    State(state): State<AppState>,
    Json(request): Json<CheckExistsRequest>,
) -> Result<Json<CheckExistsResponse>, StorageError> {
    let Value::Array(values) = request.filenames else {
        return Err(StorageError::Validation(
            "filenames must be an array".into(),
        ));
    };

    let names: Vec<String> = values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(name) => Some(name),
            _ => None,
        })
        .collect();

    let dir = state.store.resolve(request.path.as_deref().unwrap_or(""));
    let existing = storage::find_existing(&dir, &names).await;
    debug!(
        "check-exists in {}: {}/{} taken",
        dir.display(),
        existing.len(),
        names.len()
    );

    Ok(Json(CheckExistsResponse { existing }))
}

/// POST /api/mkdir
pub async fn make_directory(
    State(state): State<AppState>,
    Json(request): Json<MkdirRequest>,
) -> Result<Json<SuccessResponse>, StorageError> {
    let folder_name = request.folder_name.unwrap_or_default();
    let parent = state
        .store
        .resolve(request.current_path.as_deref().unwrap_or(""));

    storage::create_folder(&parent, &folder_name).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/upload?path=P&conflictMode=M&filenameEncoding=E
pub async fn upload_files(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, StorageError> {
    let mode = ConflictMode::from_param(query.conflict_mode.as_deref());
    let encoding = FilenameEncoding::from_param(query.filename_encoding.as_deref())?;
    let dir = state.store.resolve(query.path.as_deref().unwrap_or(""));

    let mut count = 0;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StorageError::Validation(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }
        let Some(raw_name) = field.file_name().map(str::to_owned) else {
            debug!("Ignoring {} field without a filename", UPLOAD_FIELD);
            continue;
        };

        let name = encoding.decode(&raw_name);
        place_upload(&dir, &name, mode, field).await?;
        count += 1;
    }

    info!("Uploaded {} file(s) into {}", count, dir.display());
    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".into(),
        count,
    }))
}

/// DELETE /api/delete?path=P
pub async fn delete_entry(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<SuccessResponse>, StorageError> {
    let target = state.store.resolve(query.path.as_deref().unwrap_or(""));
    storage::delete_path(&state.store, &target).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/content?path=P
pub async fn read_content(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<String, StorageError> {
    let target = state.store.resolve(query.path.as_deref().unwrap_or(""));
    storage::read_text(&target).await
}
