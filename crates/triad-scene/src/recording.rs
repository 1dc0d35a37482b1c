//! In-memory engine that records every registration

use serde::Serialize;
use triad_core::GeometryInstance;

use crate::engine::{FrameHandle, GeometryEngine, GeometryHandle, RegistrationError};

/// Name of the world body in the recording engine
const WORLD_BODY: &str = "world";

/// A registered body frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedFrame {
    pub handle: FrameHandle,
    pub name: String,
    /// None only for the world body
    pub parent: Option<FrameHandle>,
}

/// A registered geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedGeometry {
    pub handle: GeometryHandle,
    pub frame: FrameHandle,
    pub geometry: GeometryInstance,
}

/// Everything registered so far, in registration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    pub finalized: bool,
    pub frames: Vec<RecordedFrame>,
    pub geometries: Vec<RecordedGeometry>,
}

/// Engine that keeps registrations in memory.
///
/// Enforces the same ordering rules as a multibody plant: bodies before
/// finalize, geometry after.
#[derive(Debug, Clone)]
pub struct RecordingEngine {
    frames: Vec<RecordedFrame>,
    geometries: Vec<RecordedGeometry>,
    finalized: bool,
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            frames: vec![RecordedFrame {
                handle: FrameHandle(0),
                name: WORLD_BODY.to_string(),
                parent: None,
            }],
            geometries: Vec::new(),
            finalized: false,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn geometries(&self) -> &[RecordedGeometry] {
        &self.geometries
    }

    pub fn frame(&self, handle: FrameHandle) -> Option<&RecordedFrame> {
        self.frames.get(handle.0 as usize)
    }

    /// Geometries registered under one frame
    pub fn geometries_of(&self, handle: FrameHandle) -> impl Iterator<Item = &RecordedGeometry> {
        self.geometries.iter().filter(move |g| g.frame == handle)
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            finalized: self.finalized,
            frames: self.frames.clone(),
            geometries: self.geometries.clone(),
        }
    }
}

impl GeometryEngine for RecordingEngine {
    fn world_frame(&self) -> FrameHandle {
        FrameHandle(0)
    }

    fn register_frame(
        &mut self,
        name: &str,
        parent: FrameHandle,
    ) -> Result<FrameHandle, RegistrationError> {
        if self.finalized {
            return Err(RegistrationError::Finalized(name.to_string()));
        }
        if self.frame(parent).is_none() {
            return Err(RegistrationError::UnknownFrame(parent));
        }
        if self.frames.iter().any(|f| f.name == name) {
            return Err(RegistrationError::Rejected(format!(
                "body '{}' is already registered",
                name
            )));
        }

        let handle = FrameHandle(self.frames.len() as u32);
        self.frames.push(RecordedFrame {
            handle,
            name: name.to_string(),
            parent: Some(parent),
        });
        Ok(handle)
    }

    fn finalize(&mut self) -> Result<(), RegistrationError> {
        if self.finalized {
            return Err(RegistrationError::AlreadyFinalized);
        }
        self.finalized = true;
        Ok(())
    }

    fn register_geometry(
        &mut self,
        frame: FrameHandle,
        geometry: &GeometryInstance,
    ) -> Result<GeometryHandle, RegistrationError> {
        if !self.finalized {
            return Err(RegistrationError::NotFinalized(geometry.name.clone()));
        }
        if self.frame(frame).is_none() {
            return Err(RegistrationError::UnknownFrame(frame));
        }

        let handle = GeometryHandle(self.geometries.len() as u32);
        self.geometries.push(RecordedGeometry {
            handle,
            frame,
            geometry: geometry.clone(),
        });
        Ok(handle)
    }
}
