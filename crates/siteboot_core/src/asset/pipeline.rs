//! Asset pipeline contracts and search-path implementations.
//!
//! # Responsibility
//! - Accumulate asset search paths in append order.
//! - Resolve logical asset names against those paths.
//! - Expand `require` directives into an ordered file list.
//!
//! # Invariants
//! - `append_path` never deduplicates and never checks existence.
//! - In a bundle, each file appears once and after everything it requires.

use crate::asset::directive::parse_requires;
use log::debug;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Extensions tried when a logical name carries none of them.
pub const DEFAULT_ASSET_EXTENSIONS: &[&str] = &["js", "css", "scss"];

/// Source of extra asset search paths.
pub trait AssetPathProvider {
    /// Ordered, non-empty list of search paths.
    fn load_paths(&self) -> Vec<String>;
}

/// Active asset search context.
pub trait AssetPipeline {
    fn append_path(&mut self, path: &str);

    fn paths(&self) -> &[PathBuf];
}

/// Fixed list of load paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAssetPaths {
    paths: Vec<String>,
}

impl StaticAssetPaths {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl AssetPathProvider for StaticAssetPaths {
    fn load_paths(&self) -> Vec<String> {
        self.paths.clone()
    }
}

/// Pipeline used when asset compilation is turned off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisabledPipeline;

impl AssetPipeline for DisabledPipeline {
    fn append_path(&mut self, path: &str) {
        debug!(
            "event=asset_append module=pipeline status=skipped reason=disabled path={}",
            path
        );
    }

    fn paths(&self) -> &[PathBuf] {
        &[]
    }
}

/// Ordered search-path pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPathPipeline {
    root: Option<PathBuf>,
    paths: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl Default for SearchPathPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchPathPipeline {
    pub fn new() -> Self {
        Self {
            root: None,
            paths: Vec::new(),
            extensions: DEFAULT_ASSET_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    /// Relative paths appended later are joined onto `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Finds the first existing file for `logical` in search-path order.
    pub fn resolve(&self, logical: &str) -> Option<PathBuf> {
        self.resolve_preferring(logical, None)
    }

    /// Like `resolve`, trying `preferred` before the other known extensions.
    pub fn resolve_preferring(&self, logical: &str, preferred: Option<&str>) -> Option<PathBuf> {
        let logical = Path::new(logical.trim());
        let candidates = self.candidates(logical, preferred);
        self.paths.iter().find_map(|dir| {
            candidates
                .iter()
                .map(|candidate| dir.join(candidate))
                .find(|path| path.is_file())
        })
    }

    /// Expands `entry` and its `require` directives into dependency order.
    pub fn bundle(&self, entry: &str) -> Result<Vec<PathBuf>, AssetError> {
        let mut visited = BTreeSet::new();
        let mut ordered = Vec::new();
        self.visit(entry, None, &mut visited, &mut ordered)?;
        debug!(
            "event=asset_bundle module=pipeline status=ok entry={} files={}",
            entry,
            ordered.len()
        );
        Ok(ordered)
    }

    fn visit(
        &self,
        logical: &str,
        preferred: Option<&str>,
        visited: &mut BTreeSet<PathBuf>,
        ordered: &mut Vec<PathBuf>,
    ) -> Result<(), AssetError> {
        let path = self
            .resolve_preferring(logical, preferred)
            .ok_or_else(|| AssetError::NotFound(logical.to_string()))?;
        if !visited.insert(path.clone()) {
            return Ok(());
        }

        let source = std::fs::read_to_string(&path).map_err(|err| AssetError::Io {
            path: path.clone(),
            message: err.to_string(),
        })?;
        // Requires without an extension follow the requiring file's type.
        let own_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_string);
        for required in parse_requires(&source) {
            self.visit(&required, own_extension.as_deref(), visited, ordered)?;
        }
        ordered.push(path);
        Ok(())
    }

    fn candidates(&self, logical: &Path, preferred: Option<&str>) -> Vec<PathBuf> {
        if self.has_known_extension(logical) {
            return vec![logical.to_path_buf()];
        }

        // `jquery.min` keeps its dotted stem: append, never replace.
        let mut ordered: Vec<&str> = Vec::with_capacity(self.extensions.len() + 1);
        if let Some(preferred) = preferred {
            ordered.push(preferred);
        }
        for ext in &self.extensions {
            if !ordered.contains(&ext.as_str()) {
                ordered.push(ext);
            }
        }

        let mut candidates: Vec<PathBuf> = ordered
            .into_iter()
            .map(|ext| {
                let mut name = logical.as_os_str().to_os_string();
                name.push(".");
                name.push(ext);
                PathBuf::from(name)
            })
            .collect();
        candidates.push(logical.to_path_buf());
        candidates
    }

    fn has_known_extension(&self, logical: &Path) -> bool {
        logical
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known == ext))
    }
}

impl AssetPipeline for SearchPathPipeline {
    fn append_path(&mut self, path: &str) {
        let raw = PathBuf::from(path);
        let resolved = match &self.root {
            Some(root) if raw.is_relative() => root.join(raw),
            _ => raw,
        };
        self.paths.push(resolved);
    }

    fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

/// Asset resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    NotFound(String),
    Io { path: PathBuf, message: String },
}

impl Display for AssetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "asset not found in search paths: {name}"),
            Self::Io { path, message } => {
                write!(f, "failed to read asset `{}`: {message}", path.display())
            }
        }
    }
}

impl Error for AssetError {}
