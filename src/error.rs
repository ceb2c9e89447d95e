use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures shared by every metadata tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file name or JSON body could not be parsed as expected.
    #[error("cannot parse {target}: {reason}")]
    Parse { target: String, reason: String },

    /// A JSON document is missing a field or has it with the wrong type.
    #[error("{path}: {reason}")]
    Schema { path: PathBuf, reason: String },

    /// More unique IDs were requested than the ID space holds.
    #[error("cannot assign {requested} unique IDs from an ID space of {available}")]
    Capacity { requested: usize, available: u32 },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

impl ToolError {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        ToolError::Io { path: path.as_ref().to_path_buf(), source }
    }

    pub(crate) fn schema(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        ToolError::Schema { path: path.as_ref().to_path_buf(), reason: reason.into() }
    }
}
