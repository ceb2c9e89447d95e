//! The `<id>.json` naming convention.
//!
//! A file's ID is whatever precedes the first `.` in its name, read as an
//! unsigned integer. `42.json`, `042.json` and `42.backup.json` all carry ID 42.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Result, ToolError};

pub const JSON_EXT: &str = ".json";

/// Numeric identity of a metadata file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FileId(pub u64);

impl FileId {
    pub fn file_name(self) -> String {
        format!("{}{JSON_EXT}", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Substring of `file_name` before the first `.`.
pub fn id_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Parse the ID encoded in a file name.
pub fn parse_file_id(file_name: &str) -> Result<FileId> {
    let stem = id_stem(file_name);
    stem.parse::<u64>()
        .map(FileId)
        .map_err(|e| ToolError::Parse {
            target: format!("file name {file_name:?}"),
            reason: format!("{stem:?} is not a numeric ID ({e})"),
        })
}

/// True when the stem is a non-empty run of ASCII digits (no sign, no spaces).
pub fn has_digit_stem(file_name: &str) -> bool {
    let stem = id_stem(file_name);
    !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit())
}

/// One `*.json` entry of a directory listing.
#[derive(Debug, Clone)]
pub struct JsonEntry {
    pub file_name: String,
    pub path: PathBuf,
}

/// All regular files in `dir` (not recursive) whose name ends in `.json`,
/// sorted by file name. Names that are not valid UTF-8 are skipped.
pub fn list_json_files(dir: &Path) -> Result<Vec<JsonEntry>> {
    let entries = fs::read_dir(dir).map_err(|e| ToolError::io(dir, e))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ToolError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| ToolError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            log::debug!("skipping non UTF-8 name {:?}", entry.file_name());
            continue;
        };
        if name.ends_with(JSON_EXT) {
            out.push(JsonEntry { path: entry.path(), file_name: name });
        }
    }
    out.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(out)
}
