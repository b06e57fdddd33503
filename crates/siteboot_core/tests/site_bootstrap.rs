use siteboot_core::{
    bootstrap_site, AssetError, AssetPipeline, DependencyManifest, LoadError, SiteConfig,
    SitePipeline,
};
use std::fs;
use std::path::Path;

const MANIFEST: &str = r#"
[[extension]]
id = "jekyll-assets"
version = "2.2.8"

[[extension]]
id = "jekyll-assets/compass"
version = "2.2.8"

[[extension]]
id = "rails-assets"
version = "0.1.0"
load_paths = ["vendor/assets/jquery", "vendor/assets/rrssb"]

[groups]
default = ["jekyll-assets"]
development = ["rails-assets"]
"#;

const CONFIG: &str = r#"
extensions = ["jekyll-assets", "jekyll-assets/compass"]
groups = ["default", "development"]

[assets]
sources = ["_assets/javascripts"]
entries = ["app.js"]
"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn site_fixture(config: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "Extensions.toml", MANIFEST);
    write(root, "_siteboot.toml", config);
    write(
        root,
        "_assets/javascripts/app.js",
        "//=require 'jquery'\n//=require 'rrssb'\n\n// Parallax\n'use strict';\n",
    );
    write(root, "vendor/assets/jquery/jquery.js", "/* jquery */\nvar $;\n");
    write(
        root,
        "vendor/assets/rrssb/rrssb.js",
        "//= require jquery\nvar rrssb;\n",
    );
    dir
}

#[test]
fn bootstrap_activates_extensions_and_merges_provider_paths() {
    let site = site_fixture(CONFIG);
    let config = SiteConfig::load(site.path().join("_siteboot.toml")).unwrap();
    let manifest = DependencyManifest::load(&config.manifest).unwrap();
    let mut registry = manifest.build_registry().unwrap();
    let mut pipeline = SitePipeline::from_config(&config.assets, &config.base_dir);

    let report = bootstrap_site(&config, &mut registry, &manifest, &mut pipeline).unwrap();

    let activated: Vec<&str> = report.activated.iter().map(|id| id.as_str()).collect();
    assert_eq!(
        activated,
        vec!["jekyll-assets", "jekyll-assets/compass", "rails-assets"]
    );
    let already: Vec<&str> = report.already_active.iter().map(|id| id.as_str()).collect();
    assert_eq!(already, vec!["jekyll-assets"]);

    let root = site.path();
    assert_eq!(
        pipeline.paths(),
        &[
            root.join("_assets/javascripts"),
            root.join("vendor/assets/jquery"),
            root.join("vendor/assets/rrssb"),
        ]
    );
}

#[test]
fn bundle_orders_required_files_before_entry_once_each() {
    let site = site_fixture(CONFIG);
    let config = SiteConfig::load(site.path().join("_siteboot.toml")).unwrap();
    let manifest = DependencyManifest::load(&config.manifest).unwrap();
    let mut registry = manifest.build_registry().unwrap();
    let mut pipeline = SitePipeline::from_config(&config.assets, &config.base_dir);
    bootstrap_site(&config, &mut registry, &manifest, &mut pipeline).unwrap();

    let search = pipeline.as_search().expect("assets enabled");
    let files = search.bundle("app.js").unwrap();

    let root = site.path();
    assert_eq!(
        files,
        vec![
            root.join("vendor/assets/jquery/jquery.js"),
            root.join("vendor/assets/rrssb/rrssb.js"),
            root.join("_assets/javascripts/app.js"),
        ]
    );
}

#[test]
fn bundle_fails_without_provider_paths() {
    let site = site_fixture(
        "extensions = [\"jekyll-assets\"]\n\n[assets]\nsources = [\"_assets/javascripts\"]\n",
    );
    let config = SiteConfig::load(site.path().join("_siteboot.toml")).unwrap();
    let manifest = DependencyManifest::load(&config.manifest).unwrap();
    let mut registry = manifest.build_registry().unwrap();
    let mut pipeline = SitePipeline::from_config(&config.assets, &config.base_dir);
    bootstrap_site(&config, &mut registry, &manifest, &mut pipeline).unwrap();

    assert_eq!(pipeline.paths().len(), 1);
    let err = pipeline
        .as_search()
        .expect("assets enabled")
        .bundle("app.js")
        .unwrap_err();
    assert_eq!(err, AssetError::NotFound("jquery".to_string()));
}

#[test]
fn disabled_assets_still_activate_provider() {
    let site = site_fixture(
        "extensions = [\"rails-assets\"]\n\n[assets]\nenabled = false\n",
    );
    let config = SiteConfig::load(site.path().join("_siteboot.toml")).unwrap();
    let manifest = DependencyManifest::load(&config.manifest).unwrap();
    let mut registry = manifest.build_registry().unwrap();
    let mut pipeline = SitePipeline::from_config(&config.assets, &config.base_dir);

    let report = bootstrap_site(&config, &mut registry, &manifest, &mut pipeline).unwrap();

    assert_eq!(report.activated.len(), 1);
    assert!(pipeline.paths().is_empty());
}

#[test]
fn unknown_group_aborts_before_merge() {
    let site = site_fixture("extensions = [\"jekyll-assets\"]\ngroups = [\"staging\"]\n");
    let config = SiteConfig::load(site.path().join("_siteboot.toml")).unwrap();
    let manifest = DependencyManifest::load(&config.manifest).unwrap();
    let mut registry = manifest.build_registry().unwrap();
    let mut pipeline = SitePipeline::from_config(&config.assets, &config.base_dir);

    let err = bootstrap_site(&config, &mut registry, &manifest, &mut pipeline).unwrap_err();

    assert_eq!(err, LoadError::UnknownGroup("staging".to_string()));
    assert!(pipeline.paths().is_empty());
}
