//! Weld: a declarative fixed edge between two frames

use uuid::Uuid;

use crate::pose::Pose;
use crate::transform::Transform;

use super::{FrameGraph, FrameGraphError, FrameKind};

/// A fixed joint between a parent frame and a child frame
#[derive(Debug, Clone, PartialEq)]
pub struct Weld {
    pub parent: String,
    pub child: String,
    /// Transform from parent frame to child frame
    pub transform: Transform,
    pub kind: FrameKind,
}

impl Weld {
    /// Weld a body frame to its parent
    pub fn new(parent: impl Into<String>, child: impl Into<String>, transform: Transform) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            transform,
            kind: FrameKind::Body,
        }
    }

    /// Weld an offset frame (not a body) to its parent
    pub fn fixed(
        parent: impl Into<String>,
        child: impl Into<String>,
        transform: Transform,
    ) -> Self {
        Self {
            kind: FrameKind::Fixed,
            ..Self::new(parent, child, transform)
        }
    }

    pub fn from_pose(parent: impl Into<String>, child: impl Into<String>, pose: &Pose) -> Self {
        Self::new(parent, child, pose.to_transform())
    }

    /// Insert the child frame into the graph
    pub fn apply(&self, graph: &mut FrameGraph) -> Result<Uuid, FrameGraphError> {
        graph.insert(self.child.clone(), &self.parent, self.transform, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::frame::WORLD_FRAME;

    #[test]
    fn test_apply_inserts_child() {
        let mut graph = FrameGraph::new();
        let weld = Weld::new(WORLD_FRAME, "desk", Transform::from_translation(DVec3::Z));
        weld.apply(&mut graph).unwrap();

        let desk = graph.frame("desk").unwrap();
        assert_eq!(desk.kind, FrameKind::Body);
        assert_eq!(desk.parent_to_child, weld.transform);
    }

    #[test]
    fn test_fixed_weld_kind() {
        let mut graph = FrameGraph::new();
        Weld::fixed(WORLD_FRAME, "marker", Transform::IDENTITY)
            .apply(&mut graph)
            .unwrap();
        assert_eq!(graph.frame("marker").unwrap().kind, FrameKind::Fixed);
    }

    #[test]
    fn test_welding_twice_is_an_error() {
        let mut graph = FrameGraph::new();
        let weld = Weld::from_pose(WORLD_FRAME, "desk", &Pose::from_position([0.0, 0.0, 1.0]));
        weld.apply(&mut graph).unwrap();
        assert_eq!(
            weld.apply(&mut graph),
            Err(FrameGraphError::DuplicateFrame("desk".into()))
        );
    }
}
