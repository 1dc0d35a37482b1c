//! Frame graph: a rooted tree of named frames connected by welds

mod graph;
mod transforms;
mod weld;

pub use weld::*;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transform::{Transform, TransformError};

/// Name of the root frame every graph starts with
pub const WORLD_FRAME: &str = "world";

/// What a frame is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FrameKind {
    /// A rigid body known to the simulation engine
    #[default]
    Body,
    /// An offset frame rigidly attached to its nearest body ancestor
    Fixed,
}

/// A named coordinate frame
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub id: Uuid,
    pub name: String,
    pub kind: FrameKind,
    /// Parent frame ID (None only for the world frame)
    pub parent: Option<Uuid>,
    /// Transform from parent frame to this frame (X_PC)
    pub parent_to_child: Transform,
}

impl Frame {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Frame graph errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameGraphError {
    #[error("Frame already exists: {0}")]
    DuplicateFrame(String),

    #[error("Parent frame '{parent}' of '{child}' is not registered")]
    UnknownParent { parent: String, child: String },

    #[error("Frame not found: {0}")]
    UnknownFrame(String),

    #[error("Frame graph is frozen, cannot add '{0}'")]
    Frozen(String),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Append-only tree of frames rooted at [`WORLD_FRAME`]
#[derive(Debug, Clone)]
pub struct FrameGraph {
    root: Uuid,
    frames: HashMap<Uuid, Frame>,
    /// Frame name -> ID
    name_index: HashMap<String, Uuid>,
    /// Parent ID -> child IDs in insertion order
    children: HashMap<Uuid, Vec<Uuid>>,
    /// All frame IDs in insertion order
    order: Vec<Uuid>,
    frozen: bool,
}

impl Default for FrameGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameGraph {
    /// Create a graph holding only the world frame
    pub fn new() -> Self {
        let world = Frame {
            id: Uuid::new_v4(),
            name: WORLD_FRAME.to_string(),
            kind: FrameKind::Body,
            parent: None,
            parent_to_child: Transform::IDENTITY,
        };
        let root = world.id;

        Self {
            root,
            frames: HashMap::from([(root, world)]),
            name_index: HashMap::from([(WORLD_FRAME.to_string(), root)]),
            children: HashMap::new(),
            order: vec![root],
            frozen: false,
        }
    }

    pub fn root(&self) -> &Frame {
        &self.frames[&self.root]
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always false: the world frame exists from construction
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// Look up a frame by name
    pub fn frame(&self, name: &str) -> Result<&Frame, FrameGraphError> {
        self.name_index
            .get(name)
            .and_then(|id| self.frames.get(id))
            .ok_or_else(|| FrameGraphError::UnknownFrame(name.to_string()))
    }

    pub fn frame_by_id(&self, id: Uuid) -> Option<&Frame> {
        self.frames.get(&id)
    }

    /// All frames in insertion order (world first)
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.order.iter().filter_map(|id| self.frames.get(id))
    }

    /// Parent of a frame, or None for the world frame
    pub fn parent_of(&self, name: &str) -> Result<Option<&Frame>, FrameGraphError> {
        let frame = self.frame(name)?;
        Ok(frame.parent.and_then(|id| self.frames.get(&id)))
    }

    /// Direct children of a frame in insertion order
    pub fn children_of(&self, name: &str) -> Result<Vec<&Frame>, FrameGraphError> {
        let frame = self.frame(name)?;
        Ok(self
            .children
            .get(&frame.id)
            .map(|ids| ids.iter().filter_map(|id| self.frames.get(id)).collect())
            .unwrap_or_default())
    }

    /// Frames from `name` up to and including the world frame
    pub fn path_to_root(&self, name: &str) -> Result<Vec<&Frame>, FrameGraphError> {
        let mut current = Some(self.frame(name)?);
        let mut path = Vec::new();
        while let Some(frame) = current {
            path.push(frame);
            current = frame.parent.and_then(|id| self.frames.get(&id));
        }
        Ok(path)
    }

    /// Nearest ancestor of kind [`FrameKind::Body`], the frame itself included
    pub fn body_of(&self, name: &str) -> Result<&Frame, FrameGraphError> {
        self.path_to_root(name)?
            .into_iter()
            .find(|f| f.kind == FrameKind::Body)
            .ok_or_else(|| FrameGraphError::UnknownFrame(name.to_string()))
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Stop accepting new frames
    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}
