//! Dependency manifest: installed-extension catalog plus named groups.
//!
//! # Responsibility
//! - Parse and validate `Extensions.toml`.
//! - Resolve a declared group name to its ordered member ids.
//! - Build an in-process registry from the catalog.
//!
//! # Invariants
//! - Catalog ids are unique.
//! - Group names are never blank; member order is preserved as written.
//! - Group members are not required to be in the catalog; the loader reports
//!   missing members as unresolved extensions.

use crate::extension::catalog::{DeclaredExtension, DescriptorError, ExtensionDescriptor};
use crate::extension::id::ExtensionId;
use crate::extension::registry::{InProcessRegistry, RegistryError};
use log::info;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default manifest file name next to the site config.
pub const DEFAULT_MANIFEST_FILE: &str = "Extensions.toml";

/// Manifest seam consumed by the loader.
pub trait ManifestReader {
    fn resolve_group(&self, name: &str) -> Result<Vec<ExtensionId>, UnknownGroup>;
}

/// Parsed and validated dependency manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DependencyManifest {
    #[serde(default, rename = "extension")]
    extensions: Vec<ExtensionDescriptor>,
    #[serde(default)]
    groups: BTreeMap<String, Vec<ExtensionId>>,
}

impl DependencyManifest {
    /// Builds a manifest in code and validates it.
    pub fn new(
        extensions: Vec<ExtensionDescriptor>,
        groups: impl IntoIterator<Item = (String, Vec<ExtensionId>)>,
    ) -> Result<Self, ManifestError> {
        let manifest = Self {
            extensions,
            groups: groups.into_iter().collect(),
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parses manifest text and validates it.
    pub fn from_toml_str(raw: &str) -> Result<Self, ManifestError> {
        let manifest: Self =
            toml::from_str(raw).map_err(|err| ManifestError::Parse(err.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reads and parses a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ManifestError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let manifest = Self::from_toml_str(&raw)?;
        info!(
            "event=manifest_load module=manifest status=ok extensions={} groups={}",
            manifest.extensions.len(),
            manifest.groups.len()
        );
        Ok(manifest)
    }

    pub fn extensions(&self) -> &[ExtensionDescriptor] {
        &self.extensions
    }

    /// Returns declared group names, sorted.
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    /// Registers every catalog entry into a fresh registry.
    pub fn build_registry(&self) -> Result<InProcessRegistry, RegistryError> {
        let mut registry = InProcessRegistry::new();
        for descriptor in &self.extensions {
            registry.register_adapter(DeclaredExtension::new(descriptor.clone()))?;
        }
        Ok(registry)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = BTreeSet::<&ExtensionId>::new();
        for descriptor in &self.extensions {
            descriptor
                .validate()
                .map_err(ManifestError::InvalidExtension)?;
            if !seen.insert(&descriptor.id) {
                return Err(ManifestError::DuplicateExtensionId(descriptor.id.clone()));
            }
        }
        if self.groups.keys().any(|name| name.trim().is_empty()) {
            return Err(ManifestError::BlankGroupName);
        }
        Ok(())
    }
}

impl ManifestReader for DependencyManifest {
    fn resolve_group(&self, name: &str) -> Result<Vec<ExtensionId>, UnknownGroup> {
        self.groups
            .get(name.trim())
            .cloned()
            .ok_or_else(|| UnknownGroup(name.to_string()))
    }
}

/// A requested group is not declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGroup(pub String);

impl Display for UnknownGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "dependency group is not declared: {}", self.0)
    }
}

impl Error for UnknownGroup {}

/// Manifest read/parse/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    Io { path: PathBuf, message: String },
    Parse(String),
    InvalidExtension(DescriptorError),
    DuplicateExtensionId(ExtensionId),
    BlankGroupName,
}

impl Display for ManifestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "failed to read manifest `{}`: {message}", path.display())
            }
            Self::Parse(message) => write!(f, "manifest is malformed: {message}"),
            Self::InvalidExtension(err) => write!(f, "manifest declaration invalid: {err}"),
            Self::DuplicateExtensionId(id) => write!(f, "manifest declares `{id}` twice"),
            Self::BlankGroupName => write!(f, "manifest group name must not be blank"),
        }
    }
}

impl Error for ManifestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidExtension(err) => Some(err),
            _ => None,
        }
    }
}
