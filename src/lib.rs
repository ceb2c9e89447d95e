//! Batch tools for a directory of numbered JSON metadata files (`<id>.json`):
//! gap/duplicate checks, flattening, ID shuffling and field patching.
//! Each tool has its own binary; this crate holds the shared logic.

pub mod config;
pub mod error;
pub mod file_id;
pub mod flatten;
pub mod integrity;
pub mod logging;
pub mod patch;
pub mod progress;
pub mod report;
pub mod shuffle;

pub use config::{ConfigOverrides, ToolConfig, DEFAULT_ID_SPACE_MAX};
pub use error::{Result, ToolError};
pub use file_id::{parse_file_id, FileId};
