//! Storage operations
//!
//! Handles filesystem operations against resolved store paths: listing,
//! existence checks, folder creation, deletion and content reads.

use log::{debug, info, warn};
use std::io::ErrorKind;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tokio::fs;

use crate::error::{Operation, StorageError};
use crate::storage::naming::{is_scratch_name, is_taken};
use crate::storage::results::Entry;
use crate::storage::validation::{StoreRoot, is_plain_name};

/// Lists the immediate children of a directory.
///
/// Directories come first, then files; each group is ordered by modification
/// time, newest first.
pub async fn list_directory(dir: &Path) -> Result<Vec<Entry>, StorageError> {
    let mut read_dir = fs::read_dir(dir)
        .await
        .map_err(|e| StorageError::io(Operation::List, e))?;

    let mut entries = Vec::new();
    while let Some(child) = read_dir
        .next_entry()
        .await
        .map_err(|e| StorageError::io(Operation::List, e))?
    {
        let name = child.file_name().to_string_lossy().to_string();
        if is_scratch_name(&name) {
            continue;
        }

        // Follows symlinks, so a link to a folder lists as a folder.
        let metadata = match fs::metadata(child.path()).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping {} in {}: {}", name, dir.display(), e);
                continue;
            }
        };

        let is_directory = metadata.is_dir();
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|dur| dur.as_millis() as u64)
            .unwrap_or(0);

        entries.push(Entry {
            name,
            is_directory,
            size: if is_directory { 0 } else { metadata.len() },
            mtime,
            display_date: mtime,
        });
    }

    sort_entries(&mut entries);

    debug!("Listed {} - {} entries", dir.display(), entries.len());
    Ok(entries)
}

/// Directories before files, then newest first.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| b.mtime.cmp(&a.mtime))
    });
}

/// Returns the candidates that already exist in `dir`, in input order.
///
/// Files and directories both count. Names that are not a single plain
/// segment are never reported.
pub async fn find_existing(dir: &Path, names: &[String]) -> Vec<String> {
    let mut existing = Vec::new();
    for name in names {
        if is_plain_name(name) && is_taken(&dir.join(name)).await {
            existing.push(name.clone());
        }
    }
    existing
}

/// Creates a single folder named `folder_name` inside `parent`
pub async fn create_folder(parent: &Path, folder_name: &str) -> Result<(), StorageError> {
    let folder_name = folder_name.trim();
    if folder_name.is_empty() {
        return Err(StorageError::Validation("Folder name required".into()));
    }
    if !is_plain_name(folder_name) {
        return Err(StorageError::Validation("Invalid folder name".into()));
    }

    let target = parent.join(folder_name);
    if is_taken(&target).await {
        return Err(StorageError::Conflict("Folder already exists".into()));
    }

    match fs::create_dir(&target).await {
        Ok(()) => {
            info!("Created folder {}", target.display());
            Ok(())
        }
        // Lost a race with another client creating the same name.
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(StorageError::Conflict("Folder already exists".into()))
        }
        Err(e) => Err(StorageError::io(Operation::CreateFolder, e)),
    }
}

/// Removes a path and everything beneath it.
///
/// Refuses the store root; a path that is already gone counts as deleted.
pub async fn delete_path(store: &StoreRoot, target: &Path) -> Result<(), StorageError> {
    if store.is_root(target) {
        return Err(StorageError::Forbidden("Cannot delete root directory".into()));
    }

    let metadata = match fs::symlink_metadata(target).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Delete of missing path {} treated as done", target.display());
            return Ok(());
        }
        Err(e) => return Err(StorageError::io(Operation::Delete, e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(target).await
    } else {
        fs::remove_file(target).await
    };

    match result {
        Ok(()) => {
            info!("Deleted {}", target.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::io(Operation::Delete, e)),
    }
}

/// Reads a whole file as UTF-8 text for preview. No size cap.
///
/// Invalid byte sequences become U+FFFD, so binary files still load.
pub async fn read_text(path: &Path) -> Result<String, StorageError> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| StorageError::io(Operation::Read, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn set_mtime(path: &Path, secs_ago: u64) {
        let when = SystemTime::now() - Duration::from_secs(secs_ago);
        File::open(path).unwrap().set_modified(when).unwrap();
    }

    fn store() -> (TempDir, StoreRoot) {
        let dir = TempDir::new().unwrap();
        let root = StoreRoot::open(dir.path().join("store")).unwrap();
        (dir, root)
    }

    #[tokio::test]
    async fn lists_directories_first_newest_first() {
        let (_dir, store) = store();
        let root = store.path();

        for (name, age) in [("old-dir", 500), ("new-dir", 10)] {
            std::fs::create_dir(root.join(name)).unwrap();
            set_mtime(&root.join(name), age);
        }
        for (name, age) in [("a.txt", 300), ("b.txt", 5), ("c.txt", 100)] {
            std::fs::write(root.join(name), name).unwrap();
            set_mtime(&root.join(name), age);
        }

        let entries = list_directory(root).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["new-dir", "old-dir", "b.txt", "c.txt", "a.txt"]);

        assert!(entries[0].is_directory);
        assert_eq!(entries[0].size, 0);
        assert!(!entries[2].is_directory);
        assert_eq!(entries[2].size, 5);
        assert!(entries.iter().all(|e| e.display_date == e.mtime));
    }

    #[tokio::test]
    async fn listing_hides_upload_scratch_files() {
        let (_dir, store) = store();
        std::fs::write(store.path().join(".upload-1234-0.part"), "partial").unwrap();
        std::fs::write(store.path().join("kept.part"), "real").unwrap();

        let entries = list_directory(store.path()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["kept.part"]);
    }

    #[tokio::test]
    async fn listing_missing_directory_fails() {
        let (_dir, store) = store();
        let err = list_directory(&store.resolve("nope")).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Io {
                operation: Operation::List,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn listing_a_file_fails() {
        let (_dir, store) = store();
        std::fs::write(store.path().join("f.txt"), "x").unwrap();
        assert!(list_directory(&store.resolve("f.txt")).await.is_err());
    }

    #[tokio::test]
    async fn reports_only_existing_names_in_order() {
        let (_dir, store) = store();
        std::fs::write(store.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(store.path().join("c")).unwrap();

        let names = vec!["c".to_string(), "a.txt".to_string(), "b.txt".to_string()];
        assert_eq!(find_existing(store.path(), &names).await, ["c", "a.txt"]);

        let names = vec!["a.txt".to_string(), "b.txt".to_string()];
        assert_eq!(find_existing(store.path(), &names).await, ["a.txt"]);
    }

    #[tokio::test]
    async fn traversal_names_are_never_reported() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("outside.txt"), "").unwrap();
        let names = vec!["../outside.txt".to_string(), "..".to_string()];
        assert!(find_existing(store.path(), &names).await.is_empty());
    }

    #[tokio::test]
    async fn creates_folder_once() {
        let (_dir, store) = store();
        create_folder(store.path(), "notes").await.unwrap();
        assert!(store.path().join("notes").is_dir());

        let err = create_folder(store.path(), "notes").await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn folder_name_is_validated() {
        let (_dir, store) = store();
        assert!(matches!(
            create_folder(store.path(), "  ").await,
            Err(StorageError::Validation(_))
        ));
        assert!(matches!(
            create_folder(store.path(), "../escape").await,
            Err(StorageError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn folder_in_missing_parent_is_io_error() {
        let (_dir, store) = store();
        let err = create_folder(&store.path().join("missing"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[tokio::test]
    async fn refuses_to_delete_root() {
        let (_dir, store) = store();
        std::fs::write(store.path().join("keep.txt"), "").unwrap();

        let err = delete_path(&store, &store.resolve("")).await.unwrap_err();
        assert!(matches!(err, StorageError::Forbidden(_)));
        let err = delete_path(&store, &store.resolve("../..")).await.unwrap_err();
        assert!(matches!(err, StorageError::Forbidden(_)));
        assert!(store.path().join("keep.txt").exists());
    }

    #[tokio::test]
    async fn deletes_files_and_trees() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().join("tree/inner")).unwrap();
        std::fs::write(store.path().join("tree/inner/x.txt"), "x").unwrap();
        std::fs::write(store.path().join("y.txt"), "y").unwrap();

        delete_path(&store, &store.resolve("tree")).await.unwrap();
        delete_path(&store, &store.resolve("y.txt")).await.unwrap();
        assert!(!store.path().join("tree").exists());
        assert!(!store.path().join("y.txt").exists());
    }

    #[tokio::test]
    async fn deleting_missing_path_succeeds() {
        let (_dir, store) = store();
        delete_path(&store, &store.resolve("ghost.txt")).await.unwrap();
    }

    #[tokio::test]
    async fn reads_text_content() {
        let (_dir, store) = store();
        std::fs::write(store.path().join("readme.md"), "# héllo").unwrap();
        assert_eq!(read_text(&store.resolve("readme.md")).await.unwrap(), "# héllo");
        assert!(read_text(&store.resolve("missing.md")).await.is_err());
    }

    #[tokio::test]
    async fn binary_content_is_decoded_lossily() {
        let (_dir, store) = store();
        std::fs::write(store.path().join("img.bin"), [b'h', b'i', 0xff, 0x00]).unwrap();
        let text = read_text(&store.resolve("img.bin")).await.unwrap();
        assert_eq!(text, "hi\u{FFFD}\0");
    }

    #[tokio::test]
    async fn reading_a_directory_is_a_read_error() {
        let (_dir, store) = store();
        std::fs::create_dir(store.path().join("docs")).unwrap();
        let err = read_text(&store.resolve("docs")).await.unwrap_err();
        assert_eq!(err.client_message(), "Read failed");
    }
}
