use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;
use crate::model::{ColumnLayout, DEFAULT_MARKER, LayoutError};

/// File name of the project config, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "lineage.toml";

/// Errors raised while loading configuration files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid [columns] in {}: {source}", path.display())]
    Layout {
        path: PathBuf,
        #[source]
        source: LayoutError,
    },
}

impl ConfigError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::Layout { .. } => ErrorCode::InvalidColumnLayout,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub columns: ColumnLayout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Sheet to resolve. When unset, a workbook with a single sheet uses it.
    #[serde(default)]
    pub sheet: Option<String>,
    /// Treat the first row as data instead of a header.
    #[serde(default)]
    pub header: bool,
    #[serde(default = "default_marker")]
    pub marker: char,
    #[serde(default = "default_true")]
    pub trim: bool,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sheet: None,
            header: false,
            marker: default_marker(),
            trim: default_true(),
            delimiter: default_delimiter(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

/// Load the project config.
///
/// An explicit `path` must exist. Without one, `lineage.toml` in
/// `project_root` is used when present, defaults otherwise.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed, or its
/// column layout maps two columns to one position.
pub fn load_project_config(
    project_root: &Path,
    path: Option<&Path>,
) -> Result<ProjectConfig, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = project_root.join(PROJECT_CONFIG_FILE);
            if !default.exists() {
                return Ok(ProjectConfig::default());
            }
            default
        }
    };

    let config: ProjectConfig = read_toml(&path)?;
    config
        .columns
        .validate()
        .map_err(|source| ConfigError::Layout {
            path: path.clone(),
            source,
        })?;
    Ok(config)
}

/// Load `lineage/config.toml` from the platform config directory.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig, ConfigError> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("lineage/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    read_toml(&path)
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str::<T>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

const fn default_true() -> bool {
    true
}

const fn default_marker() -> char {
    DEFAULT_MARKER
}

const fn default_delimiter() -> char {
    ','
}
