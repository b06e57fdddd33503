//! Build-start entry point.
//!
//! # Responsibility
//! - Read `_siteboot.toml` (or the path given as the only argument).
//! - Load extensions, merge asset paths, bundle configured entries.
//! - Exit non-zero with a message naming the failing id/group on error.

use log::error;
use siteboot_core::{
    bootstrap_site, init_logging, AssetPipeline, DependencyManifest, SiteConfig, SitePipeline,
    DEFAULT_CONFIG_FILE,
};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match run(config_path) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("event=build_abort module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: PathBuf) -> Result<String, String> {
    let config = SiteConfig::load(&config_path).map_err(|err| err.to_string())?;
    init_logging(&config.logging).map_err(|err| err.to_string())?;

    let manifest = DependencyManifest::load(&config.manifest).map_err(|err| err.to_string())?;
    let mut registry = manifest.build_registry().map_err(|err| err.to_string())?;
    let mut pipeline = SitePipeline::from_config(&config.assets, &config.base_dir);

    let report = bootstrap_site(&config, &mut registry, &manifest, &mut pipeline)
        .map_err(|err| err.to_string())?;

    let mut bundles = serde_json::Map::new();
    if let Some(search) = pipeline.as_search() {
        for entry in &config.assets.entries {
            let files = search.bundle(entry).map_err(|err| err.to_string())?;
            let files: Vec<String> = files
                .iter()
                .map(|path| path.display().to_string())
                .collect();
            bundles.insert(entry.clone(), serde_json::json!(files));
        }
    }

    let load_paths: Vec<String> = pipeline
        .paths()
        .iter()
        .map(|path| path.display().to_string())
        .collect();
    let summary = serde_json::json!({
        "report": report,
        "active": registry.active_ids(),
        "load_paths": load_paths,
        "bundles": bundles,
    });
    serde_json::to_string_pretty(&summary).map_err(|err| err.to_string())
}
