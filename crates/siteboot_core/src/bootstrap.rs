//! Build-start bootstrap: load extensions, then merge asset load paths.
//!
//! # Invariants
//! - The merge step only runs after a successful load.
//! - The pipeline is mutated by nothing else during bootstrap.

use crate::asset::pipeline::{AssetPipeline, DisabledPipeline, SearchPathPipeline};
use crate::config::{AssetsConfig, SiteConfig};
use crate::extension::id::ExtensionId;
use crate::extension::loader::{load, merge_asset_paths, LoadError, LoadReport};
use crate::extension::manifest::ManifestReader;
use crate::extension::registry::ExtensionRegistry;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Pipeline chosen from the `[assets]` config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitePipeline {
    Disabled(DisabledPipeline),
    Search(SearchPathPipeline),
}

impl SitePipeline {
    /// Builds the pipeline and seeds it with configured `sources`.
    pub fn from_config(assets: &AssetsConfig, base_dir: &Path) -> Self {
        if !assets.enabled {
            return Self::Disabled(DisabledPipeline);
        }
        let mut pipeline = SearchPathPipeline::new().with_root(base_dir);
        for source in &assets.sources {
            pipeline.append_path(source);
        }
        Self::Search(pipeline)
    }

    pub fn as_search(&self) -> Option<&SearchPathPipeline> {
        match self {
            Self::Search(pipeline) => Some(pipeline),
            Self::Disabled(_) => None,
        }
    }
}

impl AssetPipeline for SitePipeline {
    fn append_path(&mut self, path: &str) {
        match self {
            Self::Disabled(pipeline) => pipeline.append_path(path),
            Self::Search(pipeline) => pipeline.append_path(path),
        }
    }

    fn paths(&self) -> &[PathBuf] {
        match self {
            Self::Disabled(pipeline) => pipeline.paths(),
            Self::Search(pipeline) => pipeline.paths(),
        }
    }
}

/// Runs `load` and, on success, `merge_asset_paths`.
pub fn bootstrap<R, M, P>(
    registry: &mut R,
    manifest: &M,
    pipeline: &mut P,
    extension_ids: &[ExtensionId],
    groups: &[String],
) -> Result<LoadReport, LoadError>
where
    R: ExtensionRegistry + ?Sized,
    M: ManifestReader + ?Sized,
    P: AssetPipeline + ?Sized,
{
    let started_at = Instant::now();
    info!("event=bootstrap module=bootstrap status=start");

    let report = match load(registry, manifest, extension_ids, groups) {
        Ok(report) => report,
        Err(err) => {
            error!(
                "event=bootstrap module=bootstrap status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };
    merge_asset_paths(&*registry, pipeline);

    info!(
        "event=bootstrap module=bootstrap status=ok run_id={} duration_ms={} paths={}",
        report.run_id,
        started_at.elapsed().as_millis(),
        pipeline.paths().len()
    );
    Ok(report)
}

/// Bootstraps with the extensions and groups named in `config`.
pub fn bootstrap_site<R, M>(
    config: &SiteConfig,
    registry: &mut R,
    manifest: &M,
    pipeline: &mut SitePipeline,
) -> Result<LoadReport, LoadError>
where
    R: ExtensionRegistry + ?Sized,
    M: ManifestReader + ?Sized,
{
    bootstrap(
        registry,
        manifest,
        pipeline,
        &config.extensions,
        &config.groups,
    )
}
