//! Boundary to the simulation / visualization engine
//!
//! The assembler only needs three things from an engine: register a body
//! frame, freeze the kinematic tree, and register geometry under a frame.

use serde::Serialize;
use triad_core::GeometryInstance;

/// Opaque engine-side frame identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FrameHandle(pub u32);

/// Opaque engine-side geometry identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GeometryHandle(pub u32);

/// Errors reported by the engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Unknown frame handle: {0:?}")]
    UnknownFrame(FrameHandle),

    #[error("Engine is finalized, cannot register frame '{0}'")]
    Finalized(String),

    #[error("Engine must be finalized before registering geometry '{0}'")]
    NotFinalized(String),

    #[error("Engine was already finalized")]
    AlreadyFinalized,

    #[error("Engine rejected registration: {0}")]
    Rejected(String),
}

/// Registration interface of the external engine
pub trait GeometryEngine {
    /// Handle of the engine's world body
    fn world_frame(&self) -> FrameHandle;

    /// Register a body frame under `parent`
    fn register_frame(
        &mut self,
        name: &str,
        parent: FrameHandle,
    ) -> Result<FrameHandle, RegistrationError>;

    /// Freeze the kinematic tree. Called exactly once.
    fn finalize(&mut self) -> Result<(), RegistrationError>;

    /// Register geometry posed relative to `frame`
    fn register_geometry(
        &mut self,
        frame: FrameHandle,
        geometry: &GeometryInstance,
    ) -> Result<GeometryHandle, RegistrationError>;
}
