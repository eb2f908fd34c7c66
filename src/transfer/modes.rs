//! Upload modes
//!
//! Per-request upload policies: how name conflicts are settled and how the
//! client encoded its filenames.

use crate::error::StorageError;

/// What to do when an uploaded name already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictMode {
    /// Keep both: the upload gets the next free `name (n).ext`.
    #[default]
    Rename,
    /// Replace the existing content.
    Overwrite,
}

impl ConflictMode {
    /// Parse the `conflictMode` query value; anything unrecognised is `Rename`
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("overwrite") => ConflictMode::Overwrite,
            _ => ConflictMode::Rename,
        }
    }
}

/// Declared encoding of multipart filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilenameEncoding {
    #[default]
    Utf8,
    /// Each char of the received name is one raw byte of a UTF-8 name.
    Latin1,
}

impl FilenameEncoding {
    pub fn from_param(value: Option<&str>) -> Result<Self, StorageError> {
        let Some(value) = value.map(str::trim) else {
            return Ok(FilenameEncoding::Utf8);
        };

        match value.to_ascii_lowercase().as_str() {
            "" | "utf-8" | "utf8" => Ok(FilenameEncoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" | "binary" => Ok(FilenameEncoding::Latin1),
            other => Err(StorageError::Validation(format!(
                "Unsupported filename encoding: {}",
                other
            ))),
        }
    }

    /// Recover the intended filename from what arrived on the wire.
    ///
    /// For `Latin1`, a name that does not re-decode to valid UTF-8 is kept
    /// as received.
    pub fn decode(&self, raw: &str) -> String {
        match self {
            FilenameEncoding::Utf8 => raw.to_string(),
            FilenameEncoding::Latin1 => {
                let bytes: Option<Vec<u8>> = raw
                    .chars()
                    .map(|c| u8::try_from(u32::from(c)).ok())
                    .collect();
                bytes
                    .and_then(|bytes| String::from_utf8(bytes).ok())
                    .unwrap_or_else(|| raw.to_string())
            }
        }
    }
}
