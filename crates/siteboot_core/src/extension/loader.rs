//! Extension loading and asset-path merge.
//!
//! # Responsibility
//! - Activate explicitly requested extensions, then group-derived ones.
//! - Merge provider load paths into the active asset pipeline.
//!
//! # Invariants
//! - Activation order is declaration order: explicit ids first, then each
//!   group in request order, members in manifest order.
//! - Every requested group is resolved before any group member is activated.
//! - Failure stops the load; earlier activations stay active.
//! - Provider paths are read once per merge and appended in provider order.

use crate::asset::pipeline::AssetPipeline;
use crate::extension::id::ExtensionId;
use crate::extension::manifest::ManifestReader;
use crate::extension::registry::{Activation, ExtensionRegistry, RegistryError};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Summary of one `load` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Correlates log lines of one invocation.
    pub run_id: Uuid,
    /// Ids activated by this call, in activation order.
    pub activated: Vec<ExtensionId>,
    /// Requested ids that were already active.
    pub already_active: Vec<ExtensionId>,
}

impl LoadReport {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            activated: Vec::new(),
            already_active: Vec::new(),
        }
    }
}

/// Activates `extension_ids` in order, then every member of `groups`.
///
/// # Errors
/// - `EmptyRequest` when `extension_ids` is empty.
/// - `UnresolvedExtension` for the first id missing from the registry.
/// - `UnknownGroup` for the first group missing from the manifest.
/// - `ActivationFailed` when a registered extension refuses activation.
pub fn load<R, M>(
    registry: &mut R,
    manifest: &M,
    extension_ids: &[ExtensionId],
    groups: &[String],
) -> Result<LoadReport, LoadError>
where
    R: ExtensionRegistry + ?Sized,
    M: ManifestReader + ?Sized,
{
    if extension_ids.is_empty() {
        return Err(LoadError::EmptyRequest);
    }

    let mut report = LoadReport::new();
    info!(
        "event=extension_load module=loader status=start run_id={} explicit={} groups={}",
        report.run_id,
        extension_ids.len(),
        groups.len()
    );

    for id in extension_ids {
        activate_one(registry, id, &mut report)?;
    }

    let mut derived = Vec::new();
    for group in groups {
        let members = manifest.resolve_group(group).map_err(|err| {
            error!(
                "event=extension_load module=loader status=error run_id={} error_code=unknown_group group={}",
                report.run_id, err.0
            );
            LoadError::UnknownGroup(err.0)
        })?;
        debug!(
            "event=group_resolve module=loader run_id={} group={} members={}",
            report.run_id,
            group,
            members.len()
        );
        derived.extend(members);
    }

    for id in &derived {
        activate_one(registry, id, &mut report)?;
    }

    info!(
        "event=extension_load module=loader status=ok run_id={} activated={} already_active={}",
        report.run_id,
        report.activated.len(),
        report.already_active.len()
    );
    Ok(report)
}

fn activate_one<R>(
    registry: &mut R,
    id: &ExtensionId,
    report: &mut LoadReport,
) -> Result<(), LoadError>
where
    R: ExtensionRegistry + ?Sized,
{
    if !registry.is_registered(id) {
        error!(
            "event=extension_load module=loader status=error run_id={} error_code=unresolved_extension id={}",
            report.run_id, id
        );
        return Err(LoadError::UnresolvedExtension(id.clone()));
    }

    match registry.activate(id) {
        Ok(Activation::Activated) => {
            debug!(
                "event=extension_activate module=loader run_id={} id={}",
                report.run_id, id
            );
            report.activated.push(id.clone());
            Ok(())
        }
        Ok(Activation::AlreadyActive) => {
            report.already_active.push(id.clone());
            Ok(())
        }
        Err(RegistryError::NotRegistered(missing)) => {
            Err(LoadError::UnresolvedExtension(missing))
        }
        Err(RegistryError::ActivationRefused { id, reason }) => {
            error!(
                "event=extension_load module=loader status=error run_id={} error_code=activation_failed id={}",
                report.run_id, id
            );
            Err(LoadError::ActivationFailed { id, reason })
        }
        Err(other) => Err(LoadError::ActivationFailed {
            id: id.clone(),
            reason: other.to_string(),
        }),
    }
}

/// Appends every load path of the present providers to `pipeline`.
///
/// No provider present is a silent no-op.
pub fn merge_asset_paths<R, P>(registry: &R, pipeline: &mut P)
where
    R: ExtensionRegistry + ?Sized,
    P: AssetPipeline + ?Sized,
{
    let providers = registry.asset_path_providers();
    if providers.is_empty() {
        debug!("event=asset_merge module=loader status=skipped reason=no_provider");
        return;
    }

    let mut appended = 0usize;
    for provider in providers {
        let paths = provider.load_paths();
        if paths.is_empty() {
            warn!("event=asset_merge module=loader status=warn reason=empty_provider");
        }
        for path in &paths {
            pipeline.append_path(path);
            appended += 1;
        }
    }
    info!(
        "event=asset_merge module=loader status=ok appended={} total_paths={}",
        appended,
        pipeline.paths().len()
    );
}

/// Fatal load errors; the host aborts the build on any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    EmptyRequest,
    UnresolvedExtension(ExtensionId),
    UnknownGroup(String),
    ActivationFailed { id: ExtensionId, reason: String },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRequest => write!(f, "no extensions requested"),
            Self::UnresolvedExtension(id) => write!(f, "unresolved extension: {id}"),
            Self::UnknownGroup(name) => write!(f, "unknown dependency group: {name}"),
            Self::ActivationFailed { id, reason } => {
                write!(f, "extension `{id}` failed to activate: {reason}")
            }
        }
    }
}

impl Error for LoadError {}

#[cfg(test)]
mod tests {
    use super::{load, merge_asset_paths, LoadError};
    use crate::asset::pipeline::{AssetPathProvider, AssetPipeline, StaticAssetPaths};
    use crate::extension::id::ExtensionId;
    use crate::extension::manifest::{ManifestReader, UnknownGroup};
    use crate::extension::registry::{Activation, ExtensionRegistry, RegistryError};
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    #[derive(Default)]
    struct StubRegistry {
        known: BTreeSet<String>,
        active: Vec<String>,
        activate_calls: usize,
        provider: Option<StaticAssetPaths>,
    }

    impl StubRegistry {
        fn with(ids: &[&str]) -> Self {
            Self {
                known: ids.iter().map(|id| id.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    impl ExtensionRegistry for StubRegistry {
        fn is_registered(&self, id: &ExtensionId) -> bool {
            self.known.contains(id.as_str())
        }

        fn activate(&mut self, id: &ExtensionId) -> Result<Activation, RegistryError> {
            self.activate_calls += 1;
            if self.active.iter().any(|active| active == id.as_str()) {
                return Ok(Activation::AlreadyActive);
            }
            self.active.push(id.to_string());
            Ok(Activation::Activated)
        }

        fn asset_path_providers(&self) -> Vec<&dyn AssetPathProvider> {
            self.provider
                .iter()
                .map(|provider| provider as &dyn AssetPathProvider)
                .collect()
        }
    }

    struct StubManifest;

    impl ManifestReader for StubManifest {
        fn resolve_group(&self, name: &str) -> Result<Vec<ExtensionId>, UnknownGroup> {
            let members: &[&str] = match name {
                "default" => &["x", "y"],
                "development" => &["z"],
                _ => return Err(UnknownGroup(name.to_string())),
            };
            Ok(ids(members))
        }
    }

    #[derive(Default)]
    struct RecordingPipeline {
        paths: Vec<PathBuf>,
    }

    impl AssetPipeline for RecordingPipeline {
        fn append_path(&mut self, path: &str) {
            self.paths.push(PathBuf::from(path));
        }

        fn paths(&self) -> &[PathBuf] {
            &self.paths
        }
    }

    fn ids(raw: &[&str]) -> Vec<ExtensionId> {
        raw.iter()
            .map(|value| ExtensionId::new(value).expect("valid id"))
            .collect()
    }

    fn groups(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn activates_explicit_ids_in_order() {
        let mut registry = StubRegistry::with(&["c", "a", "b"]);
        let report = load(&mut registry, &StubManifest, &ids(&["c", "a", "b"]), &[])
            .expect("all ids resolvable");
        assert_eq!(registry.active, vec!["c", "a", "b"]);
        assert_eq!(registry.activate_calls, 3);
        assert_eq!(report.activated, ids(&["c", "a", "b"]));
        assert!(report.already_active.is_empty());
    }

    #[test]
    fn rejects_empty_request() {
        let mut registry = StubRegistry::with(&["x"]);
        let err = load(&mut registry, &StubManifest, &[], &groups(&["default"])).unwrap_err();
        assert_eq!(err, LoadError::EmptyRequest);
        assert!(registry.active.is_empty());
    }

    #[test]
    fn unresolved_id_keeps_earlier_activations() {
        let mut registry = StubRegistry::with(&["a", "b", "d"]);
        let err = load(
            &mut registry,
            &StubManifest,
            &ids(&["a", "b", "ghost", "d"]),
            &[],
        )
        .unwrap_err();
        assert_eq!(
            err,
            LoadError::UnresolvedExtension(ExtensionId::new("ghost").expect("valid id"))
        );
        assert_eq!(registry.active, vec!["a", "b"]);
    }

    #[test]
    fn second_load_converges_on_same_active_set() {
        let mut registry = StubRegistry::with(&["a", "b"]);
        load(&mut registry, &StubManifest, &ids(&["a", "b"]), &[]).expect("first load");
        let report = load(&mut registry, &StubManifest, &ids(&["a", "b"]), &[])
            .expect("second load");
        assert_eq!(registry.active, vec!["a", "b"]);
        assert!(report.activated.is_empty());
        assert_eq!(report.already_active, ids(&["a", "b"]));
    }

    #[test]
    fn group_members_follow_explicit_ids_in_group_order() {
        let mut registry = StubRegistry::with(&["main", "x", "y", "z"]);
        load(
            &mut registry,
            &StubManifest,
            &ids(&["main"]),
            &groups(&["default", "development"]),
        )
        .expect("groups resolvable");
        assert_eq!(registry.active, vec!["main", "x", "y", "z"]);
    }

    #[test]
    fn unknown_group_performs_no_group_activations() {
        let mut registry = StubRegistry::with(&["main", "x", "y", "z"]);
        let err = load(
            &mut registry,
            &StubManifest,
            &ids(&["main"]),
            &groups(&["default", "staging"]),
        )
        .unwrap_err();
        assert_eq!(err, LoadError::UnknownGroup("staging".to_string()));
        assert_eq!(registry.active, vec!["main"]);
    }

    #[test]
    fn unresolved_group_member_is_named() {
        let mut registry = StubRegistry::with(&["main", "x"]);
        let err = load(
            &mut registry,
            &StubManifest,
            &ids(&["main"]),
            &groups(&["default"]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LoadError::UnresolvedExtension(ExtensionId::new("y").expect("valid id"))
        );
        assert_eq!(registry.active, vec!["main", "x"]);
    }

    #[test]
    fn merge_without_provider_leaves_pipeline_untouched() {
        let registry = StubRegistry::default();
        let mut pipeline = RecordingPipeline::default();
        merge_asset_paths(&registry, &mut pipeline);
        assert!(pipeline.paths().is_empty());
    }

    #[test]
    fn merge_appends_provider_paths_in_order() {
        let registry = StubRegistry {
            provider: Some(StaticAssetPaths::new(["a/path", "b/path"])),
            ..StubRegistry::default()
        };
        let mut pipeline = RecordingPipeline::default();
        merge_asset_paths(&registry, &mut pipeline);
        assert_eq!(
            pipeline.paths(),
            &[PathBuf::from("a/path"), PathBuf::from("b/path")]
        );
    }
}
