//! Extension catalog, registry, manifest and loader.
//!
//! Loading is a two-step procedure: activate extensions, then merge asset
//! load paths contributed by active providers.

pub mod catalog;
pub mod id;
pub mod loader;
pub mod manifest;
pub mod registry;
