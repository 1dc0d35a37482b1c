//! Pose type definition

use glam::{DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

use crate::transform::Transform;

/// Pose (position and orientation) as written in configuration files
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub xyz: [f64; 3],
    pub rpy: [f64; 3], // roll, pitch, yaw in radians (fixed axes X, Y, Z)
}

impl Pose {
    pub fn new(xyz: [f64; 3], rpy: [f64; 3]) -> Self {
        Self { xyz, rpy }
    }

    pub fn from_position(xyz: [f64; 3]) -> Self {
        Self { xyz, rpy: [0.0; 3] }
    }

    /// Rotation as `Rz(yaw) * Ry(pitch) * Rx(roll)`
    pub fn to_quat(&self) -> DQuat {
        DQuat::from_euler(EulerRot::ZYX, self.rpy[2], self.rpy[1], self.rpy[0])
    }

    /// Get position as DVec3
    pub fn position(&self) -> DVec3 {
        DVec3::from(self.xyz)
    }

    pub fn to_transform(&self) -> Transform {
        Transform::new(self.to_quat(), self.position())
    }
}

impl From<Pose> for Transform {
    fn from(pose: Pose) -> Self {
        pose.to_transform()
    }
}

impl From<&urdf_rs::Pose> for Pose {
    fn from(urdf_pose: &urdf_rs::Pose) -> Self {
        Self {
            xyz: urdf_pose.xyz.0,
            rpy: urdf_pose.rpy.0,
        }
    }
}
