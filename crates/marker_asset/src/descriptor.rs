//! Static metadata for one placeable asset

use marker_core::math::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset identifier (the manifest key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where a renderable comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// 3D model at a URI (`https://`, `file://` or a plain path)
    Model(String),
    /// 2D view built from a named layout
    View(String),
}

impl AssetSource {
    pub fn location(&self) -> &str {
        match self {
            AssetSource::Model(uri) => uri,
            AssetSource::View(layout) => layout,
        }
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSource::Model(uri) => write!(f, "model:{uri}"),
            AssetSource::View(layout) => write!(f, "view:{layout}"),
        }
    }
}

/// Local offset of a node relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Offset {
    /// Offset in metres
    Fixed(Vec3),
    /// X and Z are fractions of the tracked image's extents, Y is in metres.
    ///
    /// `(-0.5, 0.0, -0.5)` is the image's upper-left corner.
    ExtentScaled(Vec3),
}

impl Offset {
    pub fn resolve(&self, extent_x: f32, extent_z: f32) -> Vec3 {
        match *self {
            Offset::Fixed(offset) => offset,
            Offset::ExtentScaled(factor) => {
                Vec3::new(factor.x * extent_x, factor.y, factor.z * extent_z)
            }
        }
    }
}

impl Default for Offset {
    fn default() -> Self {
        Offset::Fixed(Vec3::ZERO)
    }
}

/// Immutable description of one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDescriptor {
    pub id: AssetId,
    pub source: AssetSource,
    pub offset: Offset,
    /// Start an animation clip the first time this asset is placed
    pub animate: bool,
}

impl AssetDescriptor {
    pub fn new(id: impl Into<AssetId>, source: AssetSource, offset: Offset) -> Self {
        Self {
            id: id.into(),
            source,
            offset,
            animate: false,
        }
    }

    /// Model placed at a fixed offset, the common manifest case.
    pub fn model(id: impl Into<AssetId>, uri: impl Into<String>, position: [f32; 3]) -> Self {
        Self::new(
            id,
            AssetSource::Model(uri.into()),
            Offset::Fixed(Vec3::from_array(position)),
        )
    }

    pub fn with_animation(mut self) -> Self {
        self.animate = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_offset_ignores_extents() {
        let offset = Offset::Fixed(Vec3::new(-11.0, 0.0, 6.5));
        assert_eq!(offset.resolve(2.0, 3.0), Vec3::new(-11.0, 0.0, 6.5));
    }

    #[test]
    fn extent_scaled_offset_finds_upper_left_corner() {
        let offset = Offset::ExtentScaled(Vec3::new(-0.5, 0.0, -0.5));
        assert_eq!(offset.resolve(0.4, 0.2), Vec3::new(-0.2, 0.0, -0.1));
    }

    #[test]
    fn model_constructor_uses_fixed_offset() {
        let d = AssetDescriptor::model("duck", "Duck.gltf", [1.0, 2.0, 3.0]);
        assert_eq!(d.id.as_str(), "duck");
        assert_eq!(d.source, AssetSource::Model("Duck.gltf".into()));
        assert_eq!(d.offset, Offset::Fixed(Vec3::new(1.0, 2.0, 3.0)));
        assert!(!d.animate);
    }
}
