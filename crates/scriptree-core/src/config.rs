//! Editor configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::name::MAX_NAME_LEN;

/// Which folders get an explicit `name/` entry in an exported archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderEntries {
    /// Only empty folders, which would otherwise vanish from the archive.
    #[default]
    EmptyOnly,
    /// Every folder.
    All,
}

/// Compression applied to archive entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveCompression {
    #[default]
    Deflated,
    Stored,
}

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Configuration for an editing session.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq, Eq)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EditorConfig {
    /// Maximum node name length in bytes.
    #[builder(default = "MAX_NAME_LEN")]
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,

    /// Maximum depth accepted when ingesting uploaded entries (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Explicit folder entries written on export.
    #[builder(default)]
    #[serde(default)]
    pub folder_entries: FolderEntries,

    /// Archive entry compression.
    #[builder(default)]
    #[serde(default)]
    pub compression: ArchiveCompression,

    /// Collapse saves queued behind an in-flight save into the newest one.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub coalesce_saves: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_name_len() -> usize {
    MAX_NAME_LEN
}

fn check_limits(max_name_len: usize, max_depth: Option<u32>) -> Result<(), String> {
    if max_name_len == 0 {
        return Err("max_name_len must be positive".to_string());
    }
    if max_depth == Some(0) {
        return Err("max_depth must be positive".to_string());
    }
    Ok(())
}

impl EditorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        check_limits(
            self.max_name_len.unwrap_or(MAX_NAME_LEN),
            self.max_depth.flatten(),
        )
    }
}

impl EditorConfig {
    /// Create a new config builder.
    pub fn builder() -> EditorConfigBuilder {
        EditorConfigBuilder::default()
    }

    /// Default location: `<config dir>/scriptree/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scriptree").join("config.toml"))
    }

    /// Load a config file; fields left out take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Load the default config file if it exists, otherwise use defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        check_limits(config.max_name_len, config.max_depth)
            .map_err(|message| ConfigError::Invalid { message })?;
        Ok(config)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_name_len: MAX_NAME_LEN,
            max_depth: None,
            folder_entries: FolderEntries::EmptyOnly,
            compression: ArchiveCompression::Deflated,
            coalesce_saves: true,
        }
    }
}
