//! Installed-extension catalog declarations and validation.
//!
//! # Responsibility
//! - Describe what is installed: id, version, optional asset load paths.
//! - Reject malformed declarations before they reach the registry.
//!
//! # Invariants
//! - `version` is a `major.minor.patch` triplet.
//! - A declared `load_paths` list is never empty and holds no blank entries.

use crate::asset::pipeline::AssetPathProvider;
use crate::extension::id::ExtensionId;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One installed extension as declared in `Extensions.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtensionDescriptor {
    pub id: ExtensionId,
    pub version: String,
    /// Asset search paths contributed once this extension is active.
    #[serde(default)]
    pub load_paths: Option<Vec<String>>,
}

impl ExtensionDescriptor {
    pub fn new(id: ExtensionId, version: impl Into<String>) -> Self {
        Self {
            id,
            version: version.into(),
            load_paths: None,
        }
    }

    pub fn with_load_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.load_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Validates declaration-level invariants.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if !is_semver_triplet(self.version.trim()) {
            return Err(DescriptorError::InvalidVersion {
                id: self.id.clone(),
                version: self.version.clone(),
            });
        }
        if let Some(paths) = &self.load_paths {
            if paths.is_empty() {
                return Err(DescriptorError::EmptyLoadPaths(self.id.clone()));
            }
            if paths.iter().any(|path| path.trim().is_empty()) {
                return Err(DescriptorError::BlankLoadPath(self.id.clone()));
            }
        }
        Ok(())
    }

    pub fn provides_assets(&self) -> bool {
        self.load_paths.is_some()
    }
}

/// Registry adapter contract for one installed extension.
pub trait ExtensionAdapter {
    fn descriptor(&self) -> &ExtensionDescriptor;

    /// Hook run on first activation. Refusal is fatal for the load.
    fn on_activate(&self) -> Result<(), String> {
        Ok(())
    }

    fn asset_path_provider(&self) -> Option<&dyn AssetPathProvider> {
        None
    }
}

/// Adapter for an extension known only through its catalog declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredExtension {
    descriptor: ExtensionDescriptor,
}

impl DeclaredExtension {
    pub fn new(descriptor: ExtensionDescriptor) -> Self {
        Self { descriptor }
    }
}

impl ExtensionAdapter for DeclaredExtension {
    fn descriptor(&self) -> &ExtensionDescriptor {
        &self.descriptor
    }

    fn asset_path_provider(&self) -> Option<&dyn AssetPathProvider> {
        if self.descriptor.provides_assets() {
            Some(self)
        } else {
            None
        }
    }
}

impl AssetPathProvider for DeclaredExtension {
    fn load_paths(&self) -> Vec<String> {
        self.descriptor.load_paths.clone().unwrap_or_default()
    }
}

fn is_semver_triplet(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    if parts.len() != 3 {
        return false;
    }
    parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// Catalog declaration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    InvalidVersion { id: ExtensionId, version: String },
    EmptyLoadPaths(ExtensionId),
    BlankLoadPath(ExtensionId),
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidVersion { id, version } => write!(
                f,
                "extension `{id}` version is invalid: {version} (expected major.minor.patch)"
            ),
            Self::EmptyLoadPaths(id) => {
                write!(f, "extension `{id}` declares an empty load_paths list")
            }
            Self::BlankLoadPath(id) => write!(f, "extension `{id}` declares a blank load path"),
        }
    }
}

impl Error for DescriptorError {}
