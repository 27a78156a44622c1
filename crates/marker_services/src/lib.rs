//! Marker Services Layer
//!
//! Host-side plumbing around a placement session: settings, the manifest
//! fetch, the tracking feed, and registry assembly.

pub mod fetch;
pub mod settings;
pub mod tracking;

pub use fetch::fetch_manifest;
pub use settings::{Settings, SettingsError};

use marker_asset::{AssetRegistry, Manifest};
use settings::BuiltinAsset;
use std::path::Path;

/// Settings from `path`, or the defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading settings");
            Settings::load(path)
        }
        None => Ok(Settings::default()),
    }
}

/// Issue loads for every manifest asset, then every built-in one.
///
/// Manifest entries win over built-ins with the same id. Returns the number
/// of registered assets.
pub fn register_assets(
    registry: &mut AssetRegistry,
    manifest: Manifest,
    builtin: &[BuiltinAsset],
) -> usize {
    for descriptor in manifest.into_descriptors() {
        registry.load(descriptor);
    }
    for asset in builtin {
        if registry.contains(&asset.id) {
            tracing::debug!(asset = %asset.id, "manifest overrides built-in asset");
            continue;
        }
        registry.load(asset.descriptor());
    }
    registry.len()
}
