//! Upload placement
//!
//! Streams an uploaded payload into the store and settles its final name.
//!
//! The payload is written to a temporary file in the destination directory
//! first and only moved onto its final name once fully received, so an
//! aborted upload never leaves a truncated file behind. In `Rename` mode the
//! final name is reserved with an exclusive create, and name generation is
//! retried if a concurrent upload wins the race for it.

use axum::body::Bytes;
use futures_util::{Stream, StreamExt};
use log::{debug, info, warn};
use std::fmt;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::{Operation, StorageError};
use crate::storage::naming::{scratch_name, unique_filename};
use crate::storage::validation::is_plain_name;
use crate::transfer::modes::ConflictMode;
use crate::transfer::results::PlacedFile;

const MAX_RESERVE_ATTEMPTS: usize = 64;

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Reduce a client-supplied filename to its final path segment.
pub fn upload_filename(raw: &str) -> Result<String, StorageError> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if !is_plain_name(name) {
        return Err(StorageError::Validation(format!(
            "Invalid filename: {:?}",
            raw
        )));
    }
    Ok(name.to_string())
}

/// Places one uploaded file into `dir`, creating the directory if needed.
pub async fn place_upload<S, E>(
    dir: &Path,
    raw_name: &str,
    mode: ConflictMode,
    body: S,
) -> Result<PlacedFile, StorageError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    let name = upload_filename(raw_name)?;

    fs::create_dir_all(dir)
        .await
        .map_err(|e| StorageError::io(Operation::Upload, e))?;

    let temp_path = temp_path_for(dir);
    let bytes = match write_stream(&temp_path, body).await {
        Ok(bytes) => bytes,
        Err(e) => {
            discard(&temp_path).await;
            return Err(StorageError::io(Operation::Upload, e));
        }
    };

    let committed = match mode {
        ConflictMode::Overwrite => commit_overwrite(dir, &name, &temp_path).await,
        ConflictMode::Rename => commit_rename(dir, &name, &temp_path).await,
    };

    match committed {
        Ok((final_name, path)) => {
            info!(
                "Stored upload {} as {} ({} bytes, {:?})",
                name,
                path.display(),
                bytes,
                mode
            );
            Ok(PlacedFile {
                requested_name: name,
                name: final_name,
                path,
                bytes,
            })
        }
        Err(e) => {
            discard(&temp_path).await;
            Err(StorageError::io(Operation::Upload, e))
        }
    }
}

/// Unique scratch path next to the final destination
fn temp_path_for(dir: &Path) -> PathBuf {
    let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    dir.join(scratch_name(std::process::id(), seq))
}

async fn write_stream<S, E>(path: &Path, body: S) -> io::Result<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    let mut body = std::pin::pin!(body);
    let mut total = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| {
            io::Error::new(
                ErrorKind::ConnectionAborted,
                format!("upload stream failed: {}", e),
            )
        })?;
        file.write_all(&chunk).await?;
        total += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(total)
}

/// Atomically replaces whatever sits at `name`.
async fn commit_overwrite(
    dir: &Path,
    name: &str,
    temp_path: &Path,
) -> io::Result<(String, PathBuf)> {
    let target = dir.join(name);
    if let Ok(metadata) = fs::symlink_metadata(&target).await {
        if metadata.is_dir() {
            return Err(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("{} is a directory", target.display()),
            ));
        }
    }

    fs::rename(temp_path, &target).await?;
    Ok((name.to_string(), target))
}

/// Reserves the first free name and moves the payload onto it.
async fn commit_rename(
    dir: &Path,
    name: &str,
    temp_path: &Path,
) -> io::Result<(String, PathBuf)> {
    for attempt in 1..=MAX_RESERVE_ATTEMPTS {
        let candidate = unique_filename(dir, name).await;
        let target = dir.join(&candidate);

        match reserve(&target).await {
            Ok(_) => {
                if let Err(e) = fs::rename(temp_path, &target).await {
                    discard(&target).await;
                    return Err(e);
                }
                return Ok((candidate, target));
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(
                    "Name {} taken concurrently (attempt {}/{}), retrying",
                    candidate, attempt, MAX_RESERVE_ATTEMPTS
                );
            }
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free name for {} after {} attempts", name, MAX_RESERVE_ATTEMPTS),
    ))
}

async fn reserve(target: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .await
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to clean up {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use tempfile::TempDir;

    fn body(parts: &'static [&'static str]) -> impl Stream<Item = Result<Bytes, io::Error>> {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|n| n.ends_with(".part"))
            .collect()
    }

    #[test]
    fn filename_is_reduced_to_last_segment() {
        assert_eq!(upload_filename("report.txt").unwrap(), "report.txt");
        assert_eq!(upload_filename("../../evil.txt").unwrap(), "evil.txt");
        assert_eq!(upload_filename("C:\\Users\\me\\a.txt").unwrap(), "a.txt");
        assert!(upload_filename("").is_err());
        assert!(upload_filename("uploads/..").is_err());
    }

    #[tokio::test]
    async fn writes_new_file_under_requested_name() {
        let dir = TempDir::new().unwrap();
        let placed = place_upload(dir.path(), "a.txt", ConflictMode::Rename, body(&["he", "llo"]))
            .await
            .unwrap();

        assert_eq!(placed.name, "a.txt");
        assert_eq!(placed.bytes, 5);
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hello");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn rename_mode_keeps_original() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "original").unwrap();

        let placed = place_upload(dir.path(), "a.txt", ConflictMode::Rename, body(&["new"]))
            .await
            .unwrap();

        assert_eq!(placed.name, "a (1).txt");
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "original");
        assert_eq!(std::fs::read_to_string(dir.path().join("a (1).txt")).unwrap(), "new");
    }

    #[tokio::test]
    async fn overwrite_mode_replaces_content() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "original").unwrap();

        let placed = place_upload(dir.path(), "a.txt", ConflictMode::Overwrite, body(&["new"]))
            .await
            .unwrap();

        assert_eq!(placed.name, "a.txt");
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "new");
        assert!(!dir.path().join("a (1).txt").exists());
    }

    #[tokio::test]
    async fn overwrite_refuses_to_replace_a_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("photos")).unwrap();

        let err = place_upload(dir.path(), "photos", ConflictMode::Overwrite, body(&["x"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert!(dir.path().join("photos").is_dir());
        assert!(leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn names_near_the_length_limit_are_stored() {
        let dir = TempDir::new().unwrap();
        let long_name = format!("{}.txt", "a".repeat(240));
        assert_eq!(long_name.len(), 244);

        let placed = place_upload(dir.path(), &long_name, ConflictMode::Rename, body(&["x"]))
            .await
            .unwrap();
        assert_eq!(placed.name, long_name);
        assert_eq!(std::fs::read_to_string(dir.path().join(&long_name)).unwrap(), "x");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn creates_missing_destination() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("a").join("b");
        place_upload(&dest, "x.bin", ConflictMode::Rename, body(&["1"]))
            .await
            .unwrap();
        assert!(dest.join("x.bin").is_file());
    }

    #[tokio::test]
    async fn aborted_stream_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let broken = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(ErrorKind::ConnectionReset, "client went away")),
        ]);

        let err = place_upload(dir.path(), "a.txt", ConflictMode::Rename, broken)
            .await
            .unwrap_err();
        assert_eq!(err.client_message(), "Upload failed");
        assert!(!dir.path().join("a.txt").exists());
        assert!(leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn concurrent_renames_never_collide() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "original").unwrap();

        let uploads = (0..8).map(|i| {
            let dir = dir.path().to_path_buf();
            tokio::spawn(async move {
                let content = format!("upload {}", i);
                let chunk = stream::iter(vec![Ok::<_, io::Error>(Bytes::from(content))]);
                place_upload(&dir, "a.txt", ConflictMode::Rename, chunk)
                    .await
                    .unwrap()
            })
        });

        let mut names = Vec::new();
        for handle in uploads.collect::<Vec<_>>() {
            names.push(handle.await.unwrap().name);
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);
        assert!(!names.contains(&"a.txt".to_string()));
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "original");
    }
}
