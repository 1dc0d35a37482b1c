//! Shape descriptors and illustration properties

use serde::{Deserialize, Serialize};

use crate::transform::Transform;

/// Primitive shape. Cylinders are centered at their origin and extend
/// `length / 2` along their local +Z and -Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Cylinder { radius: f64, length: f64 },
}

/// Color with opacity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A named shape placed in some frame, ready for registration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryInstance {
    pub name: String,
    pub shape: Shape,
    /// Pose of the geometry in the frame it is registered under (X_FG)
    pub pose: Transform,
    pub color: Rgba,
}
