//! Tracked marker and the anchor frame derived from it

use marker_asset::Offset;
use marker_core::math::{Pose, Vec3};

/// A recognised image as reported by the tracking provider.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedImage {
    pub name: String,
    pub center_pose: Pose,
    /// Physical width of the image in metres
    pub extent_x: f32,
    /// Physical height of the image in metres
    pub extent_z: f32,
}

/// Anchor frame for one placement pass. Rebuilt from every tracking update.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnchorContext {
    pub pose: Pose,
    pub extent_x: f32,
    pub extent_z: f32,
}

impl AnchorContext {
    pub fn new(pose: Pose, extent_x: f32, extent_z: f32) -> Self {
        Self {
            pose,
            extent_x,
            extent_z,
        }
    }

    /// Anchor at the image centre.
    pub fn from_image(image: &TrackedImage) -> Self {
        Self::new(image.center_pose, image.extent_x, image.extent_z)
    }

    pub fn local_offset(&self, offset: &Offset) -> Vec3 {
        offset.resolve(self.extent_x, self.extent_z)
    }

    pub fn world_position(&self, local: Vec3) -> Vec3 {
        self.pose.transform_point(local)
    }
}
