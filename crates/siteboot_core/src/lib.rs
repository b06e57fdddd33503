//! Extension loading and asset-path bootstrap for static-site builds.
//! The host build tool calls this once at process start, before any build step.

pub mod asset;
pub mod bootstrap;
pub mod config;
pub mod extension;
pub mod logging;

pub use asset::directive::parse_requires;
pub use asset::pipeline::{
    AssetError, AssetPathProvider, AssetPipeline, DisabledPipeline, SearchPathPipeline,
    StaticAssetPaths,
};
pub use bootstrap::{bootstrap, bootstrap_site, SitePipeline};
pub use config::{AssetsConfig, ConfigError, SiteConfig, DEFAULT_CONFIG_FILE};
pub use extension::catalog::{
    DeclaredExtension, DescriptorError, ExtensionAdapter, ExtensionDescriptor,
};
pub use extension::id::{ExtensionId, InvalidExtensionId};
pub use extension::loader::{load, merge_asset_paths, LoadError, LoadReport};
pub use extension::manifest::{DependencyManifest, ManifestError, ManifestReader, UnknownGroup};
pub use extension::registry::{Activation, ExtensionRegistry, InProcessRegistry, RegistryError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
