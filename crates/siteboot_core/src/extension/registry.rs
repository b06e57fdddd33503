//! Extension registry contract and in-process implementation.
//!
//! # Responsibility
//! - Answer "is this extension installed" and activate installed extensions.
//! - Answer the call-time presence query for asset-path providers.
//!
//! # Invariants
//! - Activation is idempotent: a second `activate` for the same id is a no-op.
//! - Active ids are kept in first-activation order.

use crate::asset::pipeline::AssetPathProvider;
use crate::extension::catalog::{DescriptorError, ExtensionAdapter};
use crate::extension::id::ExtensionId;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Outcome of one `activate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Activated,
    AlreadyActive,
}

/// Registry seam consumed by the loader.
///
/// Hosts pass a registry explicitly so tests can substitute a stub.
pub trait ExtensionRegistry {
    fn is_registered(&self, id: &ExtensionId) -> bool;

    fn activate(&mut self, id: &ExtensionId) -> Result<Activation, RegistryError>;

    /// Providers contributed by currently active extensions, in activation order.
    ///
    /// An empty list means no provider is present.
    fn asset_path_providers(&self) -> Vec<&dyn AssetPathProvider> {
        Vec::new()
    }
}

/// Registry backed by adapters registered in this process.
#[derive(Default)]
pub struct InProcessRegistry {
    entries: BTreeMap<ExtensionId, Box<dyn ExtensionAdapter>>,
    active: Vec<ExtensionId>,
    active_index: BTreeSet<ExtensionId>,
}

impl InProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one adapter after descriptor validation.
    pub fn register_adapter(
        &mut self,
        adapter: impl ExtensionAdapter + 'static,
    ) -> Result<(), RegistryError> {
        let descriptor = adapter.descriptor();
        descriptor
            .validate()
            .map_err(RegistryError::InvalidDescriptor)?;
        let id = descriptor.id.clone();
        if self.entries.contains_key(&id) {
            return Err(RegistryError::DuplicateExtensionId(id));
        }

        debug!(
            "event=extension_register module=registry status=ok id={} version={}",
            id, descriptor.version
        );
        self.entries.insert(id, Box::new(adapter));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_active(&self, id: &ExtensionId) -> bool {
        self.active_index.contains(id)
    }

    /// Returns active ids in activation order.
    pub fn active_ids(&self) -> &[ExtensionId] {
        &self.active
    }
}

impl ExtensionRegistry for InProcessRegistry {
    fn is_registered(&self, id: &ExtensionId) -> bool {
        self.entries.contains_key(id)
    }

    fn activate(&mut self, id: &ExtensionId) -> Result<Activation, RegistryError> {
        let Some(adapter) = self.entries.get(id) else {
            return Err(RegistryError::NotRegistered(id.clone()));
        };
        if self.active_index.contains(id) {
            return Ok(Activation::AlreadyActive);
        }

        adapter
            .on_activate()
            .map_err(|reason| RegistryError::ActivationRefused {
                id: id.clone(),
                reason,
            })?;
        self.active_index.insert(id.clone());
        self.active.push(id.clone());
        Ok(Activation::Activated)
    }

    fn asset_path_providers(&self) -> Vec<&dyn AssetPathProvider> {
        self.active
            .iter()
            .filter_map(|id| self.entries.get(id))
            .filter_map(|adapter| adapter.asset_path_provider())
            .collect()
    }
}

/// Registry registration and activation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidDescriptor(DescriptorError),
    DuplicateExtensionId(ExtensionId),
    NotRegistered(ExtensionId),
    ActivationRefused { id: ExtensionId, reason: String },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDescriptor(err) => write!(f, "invalid extension declaration: {err}"),
            Self::DuplicateExtensionId(id) => write!(f, "extension id already registered: {id}"),
            Self::NotRegistered(id) => write!(f, "extension is not registered: {id}"),
            Self::ActivationRefused { id, reason } => {
                write!(f, "extension `{id}` refused activation: {reason}")
            }
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDescriptor(err) => Some(err),
            _ => None,
        }
    }
}
