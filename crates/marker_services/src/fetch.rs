//! Manifest fetch

use marker_asset::{loader, Manifest, ManifestError};

/// Fetch and decode the asset manifest.
///
/// Any failure here is fatal to startup: a session without a manifest has
/// nothing to place.
pub async fn fetch_manifest(location: &str) -> Result<Manifest, ManifestError> {
    tracing::info!(%location, "fetching asset manifest");
    let bytes = loader::fetch_bytes(location)
        .await
        .map_err(|source| ManifestError::Fetch {
            location: location.to_string(),
            source,
        })?;
    let manifest = Manifest::from_slice(&bytes)?;
    tracing::info!(assets = manifest.len(), "asset manifest decoded");
    Ok(manifest)
}
