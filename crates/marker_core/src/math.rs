//! Pose math
//!
//! Re-exports glam with the rigid transform used for anchors

pub use glam::*;

/// Rigid transform (rotation then translation), as reported by a tracker
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Map a point from this pose's local frame into the parent frame.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.rotation * local + self.position
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_points_alone() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Pose::IDENTITY.transform_point(p), p);
    }

    #[test]
    fn translation_adds_offset() {
        let pose = Pose::from_translation(Vec3::new(0.0, 1.0, -2.0));
        assert_eq!(
            pose.transform_point(Vec3::new(0.5, 0.0, 0.5)),
            Vec3::new(0.5, 1.0, -1.5)
        );
    }

    #[test]
    fn rotation_applies_before_translation() {
        let pose = Pose::new(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let world = pose.transform_point(Vec3::X);
        assert!((world - Vec3::new(10.0, 0.0, -1.0)).length() < 1e-5);
    }
}
