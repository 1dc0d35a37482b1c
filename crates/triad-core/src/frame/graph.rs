//! Graph operations for FrameGraph (add frames)

use uuid::Uuid;

use crate::transform::Transform;

use super::{Frame, FrameGraph, FrameGraphError, FrameKind};

impl FrameGraph {
    /// Add a body frame welded to `parent` by `parent_to_child`
    pub fn add_frame(
        &mut self,
        name: impl Into<String>,
        parent: &str,
        parent_to_child: Transform,
    ) -> Result<Uuid, FrameGraphError> {
        self.insert(name.into(), parent, parent_to_child, FrameKind::Body)
    }

    /// Add an offset frame that is not a body of its own
    pub fn add_fixed_frame(
        &mut self,
        name: impl Into<String>,
        parent: &str,
        parent_to_child: Transform,
    ) -> Result<Uuid, FrameGraphError> {
        self.insert(name.into(), parent, parent_to_child, FrameKind::Fixed)
    }

    pub(crate) fn insert(
        &mut self,
        name: String,
        parent: &str,
        parent_to_child: Transform,
        kind: FrameKind,
    ) -> Result<Uuid, FrameGraphError> {
        if self.frozen {
            return Err(FrameGraphError::Frozen(name));
        }
        if self.name_index.contains_key(&name) {
            return Err(FrameGraphError::DuplicateFrame(name));
        }
        let parent_id = *self
            .name_index
            .get(parent)
            .ok_or_else(|| FrameGraphError::UnknownParent {
                parent: parent.to_string(),
                child: name.clone(),
            })?;

        let frame = Frame {
            id: Uuid::new_v4(),
            name,
            kind,
            parent: Some(parent_id),
            parent_to_child,
        };
        let id = frame.id;

        tracing::debug!("Added frame '{}' under '{}' ({:?})", frame.name, parent, kind);

        self.name_index.insert(frame.name.clone(), id);
        self.children.entry(parent_id).or_default().push(id);
        self.order.push(id);
        self.frames.insert(id, frame);
        Ok(id)
    }
}
