use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// Upper bound of the ID space: valid IDs are `1..=DEFAULT_ID_SPACE_MAX`.
pub const DEFAULT_ID_SPACE_MAX: u32 = 30_000;

/// Settings shared by every tool. Each tool reads only the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub id_space_max: u32,
    pub image_prefix: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            target_dir: PathBuf::from("."),
            id_space_max: DEFAULT_ID_SPACE_MAX,
            image_prefix: String::new(),
        }
    }
}

/// Values given on the command line; `None` keeps whatever the file or
/// the defaults provide.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source_dir: Option<PathBuf>,
    pub target_dir: Option<PathBuf>,
    pub id_space_max: Option<u32>,
    pub image_prefix: Option<String>,
}

impl ToolConfig {
    /// Read a JSON config file. Missing keys fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ToolError::io(path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| ToolError::Parse {
            target: format!("config file {}", path.display()),
            reason: e.to_string(),
        })
    }

    /// defaults < config file < command line
    pub fn resolve(config_file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut cfg = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(v) = overrides.source_dir {
            cfg.source_dir = v;
        }
        if let Some(v) = overrides.target_dir {
            cfg.target_dir = v;
        }
        if let Some(v) = overrides.id_space_max {
            cfg.id_space_max = v;
        }
        if let Some(v) = overrides.image_prefix {
            cfg.image_prefix = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id_space_max == 0 {
            return Err(ToolError::Config("id_space_max must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file_or_flags() {
        let cfg = ToolConfig::resolve(None, ConfigOverrides::default()).unwrap();
        assert_eq!(cfg, ToolConfig::default());
        assert_eq!(cfg.id_space_max, 30_000);
    }

    #[test]
    fn flags_override_file_which_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tools.json");
        fs::write(
            &path,
            r#"{ "source_dir": "Meta", "id_space_max": 500, "image_prefix": "ipfs://abc/" }"#,
        )
        .unwrap();

        let cfg = ToolConfig::resolve(
            Some(&path),
            ConfigOverrides { id_space_max: Some(100), ..Default::default() },
        )
        .unwrap();

        assert_eq!(cfg.source_dir, PathBuf::from("Meta"));
        assert_eq!(cfg.target_dir, PathBuf::from("."));
        assert_eq!(cfg.id_space_max, 100);
        assert_eq!(cfg.image_prefix, "ipfs://abc/");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tools.json");
        fs::write(&path, r#"{ "sorce_dir": "Meta" }"#).unwrap();
        let err = ToolConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ToolError::Parse { .. }));
    }

    #[test]
    fn zero_id_space_is_invalid() {
        let err = ToolConfig::resolve(
            None,
            ConfigOverrides { id_space_max: Some(0), ..Default::default() },
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::Config(_)));
    }
}
