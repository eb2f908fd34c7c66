//! Conflict-free file naming
//!
//! Derives `name (n).ext` style alternatives for names already taken in a
//! directory.

use std::path::Path;
use tokio::fs;

const SCRATCH_PREFIX: &str = ".upload-";
const SCRATCH_SUFFIX: &str = ".part";

/// Name of an in-flight upload's temporary file.
///
/// Independent of the uploaded name, so any name the filesystem accepts
/// can be staged.
pub fn scratch_name(pid: u32, seq: u64) -> String {
    format!("{}{}-{}{}", SCRATCH_PREFIX, pid, seq, SCRATCH_SUFFIX)
}

/// Whether `name` is an upload temporary file rather than stored content
pub fn is_scratch_name(name: &str) -> bool {
    name.starts_with(SCRATCH_PREFIX) && name.ends_with(SCRATCH_SUFFIX)
}

/// Split a filename into base and extension, extension keeping its dot.
///
/// A leading dot (`.bashrc`) belongs to the base.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

/// The `n`-th alternative for a taken name: `base (n)ext`
pub fn numbered_name(base: &str, ext: &str, n: usize) -> String {
    format!("{} ({}){}", base, n, ext)
}

/// Whether anything, including a dangling symlink, occupies `path`
pub async fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok()
}

/// First free name among `name`, `base (1)ext`, `base (2)ext`, …
///
/// Only a snapshot of the directory: the caller must still create the file
/// exclusively and retry on collision.
pub async fn unique_filename(dir: &Path, name: &str) -> String {
    if !is_taken(&dir.join(name)).await {
        return name.to_string();
    }

    let (base, ext) = split_name(name);
    let mut counter = 1;
    loop {
        let candidate = numbered_name(base, ext, counter);
        if !is_taken(&dir.join(&candidate)).await {
            return candidate;
        }
        counter += 1;
    }
}
