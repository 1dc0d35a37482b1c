//! Coordinate triad geometry
//!
//! A triad is three cylinders drawn along a frame's +X (red), +Y (green)
//! and +Z (blue) axes, each starting at the frame origin.

use std::f64::consts::FRAC_PI_2;

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::geometry::{GeometryInstance, Rgba, Shape};
use crate::transform::Transform;

/// Errors from triad construction
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Invalid {name}: {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn unit(&self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
        }
    }

    /// Red, green, blue for X, Y, Z
    pub fn color(&self, opacity: f64) -> Rgba {
        match self {
            Axis::X => Rgba::new(1.0, 0.0, 0.0, opacity),
            Axis::Y => Rgba::new(0.0, 1.0, 0.0, opacity),
            Axis::Z => Rgba::new(0.0, 0.0, 1.0, opacity),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Axis::X => "x-axis",
            Axis::Y => "y-axis",
            Axis::Z => "z-axis",
        }
    }

    /// Cylinder pose in the triad frame (X_TG).
    ///
    /// The cylinder's own Z is turned onto this axis, then its center is
    /// moved half a length out so it spans `[0, length]`.
    pub fn cylinder_pose(&self, length: f64) -> Transform {
        let center = self.unit() * (length / 2.0);
        let rotation = match self {
            Axis::X => DQuat::from_rotation_y(FRAC_PI_2),
            Axis::Y => DQuat::from_rotation_x(FRAC_PI_2),
            Axis::Z => DQuat::IDENTITY,
        };
        Transform::new(rotation, center)
    }
}

/// Size and opacity shared by the three axes of a triad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriadStyle {
    /// Axis length in meters
    pub length: f64,
    /// Axis radius in meters
    pub radius: f64,
    /// Opacity between 0 and 1
    pub opacity: f64,
}

impl Default for TriadStyle {
    fn default() -> Self {
        Self {
            length: 0.25,
            radius: 0.01,
            opacity: 1.0,
        }
    }
}

impl TriadStyle {
    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(GeometryError::InvalidParameter {
                name: "length",
                value: self.length,
                expected: "> 0",
            });
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(GeometryError::InvalidParameter {
                name: "radius",
                value: self.radius,
                expected: "> 0",
            });
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(GeometryError::InvalidParameter {
                name: "opacity",
                value: self.opacity,
                expected: "between 0 and 1",
            });
        }
        Ok(())
    }
}

/// Request for one triad
#[derive(Debug, Clone, PartialEq)]
pub struct TriadSpec {
    /// Frame the triad annotates; also the geometry name prefix
    pub frame: String,
    pub style: TriadStyle,
    /// Placement of the triad frame T within the target frame F (X_FT)
    pub offset: Transform,
}

impl TriadSpec {
    pub fn new(frame: impl Into<String>, style: TriadStyle) -> Self {
        Self {
            frame: frame.into(),
            style,
            offset: Transform::IDENTITY,
        }
    }

    pub fn with_offset(mut self, offset: Transform) -> Self {
        self.offset = offset;
        self
    }
}

/// One axis of a triad
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisGeometry {
    pub axis: Axis,
    pub instance: GeometryInstance,
}

/// Build the X, Y and Z cylinders for a triad, in that order
pub fn build_triad(spec: &TriadSpec) -> Result<[AxisGeometry; 3], GeometryError> {
    spec.style.validate()?;

    let TriadStyle {
        length,
        radius,
        opacity,
    } = spec.style;

    Ok(Axis::ALL.map(|axis| AxisGeometry {
        axis,
        instance: GeometryInstance {
            name: format!("{} {}", spec.frame, axis.label()),
            shape: Shape::Cylinder { radius, length },
            pose: spec.offset.compose(&axis.cylinder_pose(length)),
            color: axis.color(opacity),
        },
    }))
}
