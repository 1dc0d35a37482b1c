//! Pose calculations for FrameGraph

use crate::transform::Transform;

use super::{FrameGraph, FrameGraphError};

impl FrameGraph {
    /// Get the pose of a frame in world coordinates (X_WF)
    pub fn world_pose(&self, name: &str) -> Result<Transform, FrameGraphError> {
        // Build transform chain from leaf to root, then apply root to leaf
        let chain = self.path_to_root(name)?;

        Ok(chain
            .into_iter()
            .rev()
            .fold(Transform::IDENTITY, |pose, frame| {
                pose.compose(&frame.parent_to_child)
            }))
    }

    /// Pose of `from` expressed in the coordinates of `to` (X_TF)
    pub fn relative_pose(&self, from: &str, to: &str) -> Result<Transform, FrameGraphError> {
        let world_from = self.world_pose(from)?;
        let world_to = self.world_pose(to)?;
        Ok(world_to.invert()?.compose(&world_from))
    }
}
