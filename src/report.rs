use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, ToolError};

/// Write `value` as pretty JSON to `path`, creating missing parent directories.
pub fn write_json_report<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ToolError::io(parent, e))?;
    }
    let text = serde_json::to_string_pretty(value).map_err(|e| ToolError::Parse {
        target: path.display().to_string(),
        reason: e.to_string(),
    })?;
    fs::write(path, text).map_err(|e| ToolError::io(path, e))
}
