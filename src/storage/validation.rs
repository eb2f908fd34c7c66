//! Path validation
//!
//! Resolves untrusted client paths against the store root. Resolution never
//! fails: anything that cannot be placed inside the store degrades to the
//! store root itself.

use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::storage::naming::is_scratch_name;

/// The sandbox boundary every store operation is resolved against.
#[derive(Debug, Clone)]
pub struct StoreRoot {
    root: PathBuf,
}

impl StoreRoot {
    /// Create the directory if absent and pin it to its canonical form.
    ///
    /// Upload scratch files left by an earlier process are removed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        let root = path.canonicalize()?;

        let swept = sweep_scratch_files(&root);
        if swept > 0 {
            info!("Removed {} stale upload scratch file(s)", swept);
        }

        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a client-supplied relative path to an absolute path in the store.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        let candidate = self.root.join(normalize_relative(relative));

        // Component-wise, so `/data/store-evil` never passes for `/data/store`.
        if !candidate.starts_with(&self.root) {
            warn!(
                "Path {:?} resolved outside store root, falling back to root",
                relative
            );
            return self.root.clone();
        }

        candidate
    }

    /// Whether `path` is the store root itself
    pub fn is_root(&self, path: &Path) -> bool {
        path == self.root
    }
}

/// Remove upload scratch files anywhere under `root`. Symlinks are not followed.
fn sweep_scratch_files(root: &Path) -> usize {
    let mut removed = 0;
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot scan {} for scratch files: {}", dir.display(), e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file()
                && is_scratch_name(&entry.file_name().to_string_lossy())
            {
                match fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
                }
            }
        }
    }

    removed
}

/// Normalize a relative path, accepting `/` and `\` as separators.
///
/// `.` segments are dropped and `..` pops the previous segment. A `..` with
/// nothing left to pop is discarded, which strips any leading traversal.
/// Segments that would re-root the path (drive prefixes) are dropped too.
pub fn normalize_relative(relative: &str) -> PathBuf {
    let mut segments: Vec<&str> = Vec::new();

    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other if is_plain_name(other) => segments.push(other),
            other => warn!("Dropping non-plain path segment {:?}", other),
        }
    }

    segments.iter().collect()
}

/// A single path segment that names a child entry and nothing else.
pub fn is_plain_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    if name.contains(['/', '\\', '\0']) {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
