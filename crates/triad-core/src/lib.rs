//! Triad Scene Core
//!
//! Geometry for checking welded robot/environment scenes:
//! - Transform: immutable rigid transform
//! - Pose: xyz + rpy configuration form of a transform
//! - FrameGraph: tree of named frames connected by welds
//! - Triad: X/Y/Z axis cylinders marking a frame's orientation

pub mod frame;
pub mod geometry;
pub mod pose;
pub mod transform;
pub mod triad;

pub use frame::*;
pub use geometry::*;
pub use pose::*;
pub use transform::*;
pub use triad::*;
