//! Remote asset manifest
//!
//! ```json
//! { "assets": { "duck": { "url": "https://.../Duck.gltf", "position": [0, 0, 0] } } }
//! ```
//!
//! Each entry may also carry `"kind": "model" | "view"` and `"animate": bool`.
//! Descriptors come out in id order.

use crate::{AssetDescriptor, AssetId, AssetSource, ManifestError, Offset};
use marker_core::math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Renderable kind named by a manifest entry
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    #[default]
    Model,
    View,
}

#[derive(Deserialize)]
struct RawManifest {
    assets: BTreeMap<AssetId, RawAsset>,
}

#[derive(Deserialize)]
struct RawAsset {
    url: String,
    position: [f32; 3],
    #[serde(default)]
    kind: AssetKind,
    #[serde(default)]
    animate: bool,
}

/// Decoded manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    assets: Vec<AssetDescriptor>,
}

impl Manifest {
    /// Decode a manifest document. A manifest without assets is an error.
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        Self::from_slice(text.as_bytes())
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        let raw: RawManifest = serde_json::from_slice(bytes)?;
        if raw.assets.is_empty() {
            return Err(ManifestError::Empty);
        }

        let assets = raw
            .assets
            .into_iter()
            .map(|(id, asset)| {
                let source = match asset.kind {
                    AssetKind::Model => AssetSource::Model(asset.url),
                    AssetKind::View => AssetSource::View(asset.url),
                };
                AssetDescriptor {
                    id,
                    source,
                    offset: Offset::Fixed(Vec3::from_array(asset.position)),
                    animate: asset.animate,
                }
            })
            .collect();

        Ok(Self { assets })
    }

    pub fn descriptors(&self) -> &[AssetDescriptor] {
        &self.assets
    }

    pub fn into_descriptors(self) -> Vec<AssetDescriptor> {
        self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
