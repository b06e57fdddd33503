//! Host site configuration (`_siteboot.toml`).
//!
//! # Responsibility
//! - Parse the static bootstrap inputs: extensions, groups, manifest path,
//!   asset and logging settings.
//! - Resolve relative paths against the directory holding the config file.
//!
//! # Invariants
//! - `extensions` is non-empty and every entry is a valid extension id.

use crate::extension::id::ExtensionId;
use crate::extension::manifest::DEFAULT_MANIFEST_FILE;
use crate::logging::{default_log_level, LoggingConfig};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default config file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "_siteboot.toml";

/// Bootstrap inputs supplied by the host build tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub extensions: Vec<ExtensionId>,
    pub groups: Vec<String>,
    pub manifest: PathBuf,
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
    /// Directory relative paths are resolved against.
    pub base_dir: PathBuf,
}

/// Asset pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Search paths seeded before provider paths are merged.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Logical entry assets bundled after bootstrap.
    #[serde(default)]
    pub entries: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sources: Vec::new(),
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSiteConfig {
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    groups: Vec<String>,
    manifest: Option<PathBuf>,
    #[serde(default)]
    assets: AssetsConfig,
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Debug, Default, Deserialize)]
struct RawLogging {
    level: Option<String>,
    dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl SiteConfig {
    /// Parses config text; relative paths resolve against `base_dir`.
    pub fn from_toml_str(raw: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let parsed: RawSiteConfig =
            toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        if parsed.extensions.is_empty() {
            return Err(ConfigError::EmptyExtensions);
        }

        let mut extensions = Vec::with_capacity(parsed.extensions.len());
        for raw_id in &parsed.extensions {
            let id = ExtensionId::new(raw_id)
                .map_err(|err| ConfigError::InvalidExtensionId(err.to_string()))?;
            extensions.push(id);
        }

        let base_dir = base_dir.into();
        let manifest = parsed
            .manifest
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST_FILE));
        Ok(Self {
            extensions,
            groups: parsed
                .groups
                .into_iter()
                .map(|group| group.trim().to_string())
                .collect(),
            manifest: absolutize(&base_dir, manifest),
            assets: parsed.assets,
            logging: LoggingConfig {
                level: parsed
                    .logging
                    .level
                    .unwrap_or_else(|| default_log_level().to_string()),
                dir: parsed.logging.dir,
            },
            base_dir,
        })
    }

    /// Reads a config file; its parent directory becomes `base_dir`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let base_dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_toml_str(&raw, base_dir)
    }
}

fn absolutize(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        base_dir.join(path)
    } else {
        path
    }
}

/// Config read/parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse(String),
    EmptyExtensions,
    InvalidExtensionId(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "failed to read config `{}`: {message}", path.display())
            }
            Self::Parse(message) => write!(f, "config is malformed: {message}"),
            Self::EmptyExtensions => write!(f, "config must list at least one extension"),
            Self::InvalidExtensionId(message) => write!(f, "config extension invalid: {message}"),
        }
    }
}

impl Error for ConfigError {}
