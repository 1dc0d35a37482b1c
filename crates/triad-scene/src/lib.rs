//! Triad Scene Assembly
//!
//! Builds a welded scene from URDF models and a RON scene description, then
//! registers coordinate triads with a simulation engine.
//! - GeometryEngine: the registration boundary of the external engine
//! - RecordingEngine: in-memory engine used by the viewer and tests
//! - SceneAssembler: welds, finalize, triads, in that order

pub mod assembler;
pub mod config;
pub mod engine;
pub mod model;
pub mod recording;

pub use assembler::*;
pub use config::*;
pub use engine::*;
pub use model::*;
pub use recording::*;
