//!
//! Module Configuration
//!
//! Read from the `[sqlite]` table of a TOML file:
//!
//! ```toml
//! [sqlite]
//! file-access = true   # false: only in-memory databases may be opened
//! metadata = true      # false: `metadata` reports UNAVAILABLE-METADATA
//! ```
//!
//! Missing keys take their defaults; unknown keys are rejected.
//!

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SqliteConfig {
    pub file_access: bool,
    pub metadata: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            file_access: true,
            metadata: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    sqlite: SqliteConfig,
}

impl SqliteConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.sqlite)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Column metadata needs both the build feature and the config switch
    pub fn metadata_available(&self) -> bool {
        cfg!(feature = "column-metadata") && self.metadata
    }
}
