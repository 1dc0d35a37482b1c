//! Rigid transforms (rotation + translation)

use std::ops::Mul;

use glam::{DMat3, DMat4, DQuat, DVec3};
use serde::Serialize;

/// Tolerance used when checking that a rotation is proper
const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// Transform-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("Rotation is not a proper orthonormal rotation")]
    NotOrthonormal,
}

/// An immutable rigid transform.
///
/// `X_AB` maps points expressed in frame B into frame A: rotate by
/// `rotation`, then add `translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    rotation: DQuat,
    translation: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        rotation: DQuat::IDENTITY,
        translation: DVec3::ZERO,
    };

    /// Create a transform from a quaternion and a translation.
    ///
    /// `rotation` is normalized. A zero or non-finite quaternion yields a
    /// transform that [`Transform::invert`] rejects; use
    /// [`Transform::try_new`] to catch that up front.
    pub fn new(rotation: DQuat, translation: DVec3) -> Self {
        Self {
            rotation: rotation.normalize(),
            translation,
        }
    }

    /// Checked construction: `rotation` must already be a unit quaternion
    pub fn try_new(rotation: DQuat, translation: DVec3) -> Result<Self, TransformError> {
        let transform = Self {
            rotation,
            translation,
        };
        if !transform.is_proper() {
            return Err(TransformError::NotOrthonormal);
        }
        Ok(Self::new(rotation, translation))
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn from_translation(translation: DVec3) -> Self {
        Self::new(DQuat::IDENTITY, translation)
    }

    pub fn from_rotation(rotation: DQuat) -> Self {
        Self::new(rotation, DVec3::ZERO)
    }

    /// Rotation about the X axis by `angle` radians
    pub fn from_rotation_x(angle: f64) -> Self {
        Self::from_rotation(DQuat::from_rotation_x(angle))
    }

    /// Rotation about the Y axis by `angle` radians
    pub fn from_rotation_y(angle: f64) -> Self {
        Self::from_rotation(DQuat::from_rotation_y(angle))
    }

    /// Rotation about the Z axis by `angle` radians
    pub fn from_rotation_z(angle: f64) -> Self {
        Self::from_rotation(DQuat::from_rotation_z(angle))
    }

    /// Build a transform from a 3x3 rotation matrix, rejecting anything that
    /// is not orthonormal with determinant +1.
    pub fn try_from_rotation_matrix(
        rotation: DMat3,
        translation: DVec3,
    ) -> Result<Self, TransformError> {
        let gram = rotation.transpose() * rotation;
        if !rotation.is_finite()
            || !translation.is_finite()
            || !gram.abs_diff_eq(DMat3::IDENTITY, ORTHONORMAL_TOLERANCE)
            || (rotation.determinant() - 1.0).abs() > ORTHONORMAL_TOLERANCE
        {
            return Err(TransformError::NotOrthonormal);
        }
        Ok(Self::new(DQuat::from_mat3(&rotation), translation))
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    pub fn rotation_matrix(&self) -> DMat3 {
        DMat3::from_quat(self.rotation)
    }

    pub fn translation(&self) -> DVec3 {
        self.translation
    }

    /// Compose `self` (X_AB) with `other` (X_BC), giving X_AC.
    pub fn compose(&self, other: &Transform) -> Transform {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Exact inverse: X_AB becomes X_BA
    pub fn invert(&self) -> Result<Transform, TransformError> {
        if !self.is_proper() {
            return Err(TransformError::NotOrthonormal);
        }
        let rotation = self.rotation.conjugate();
        Ok(Self {
            rotation,
            translation: -(rotation * self.translation),
        })
    }

    /// Map a point from the child frame into the parent frame
    pub fn apply(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    /// Rotate a direction vector (translation is ignored)
    pub fn apply_vector(&self, vector: DVec3) -> DVec3 {
        self.rotation * vector
    }

    /// Re-normalize the rotation after long composition chains
    pub fn renormalized(&self) -> Transform {
        Self::new(self.rotation, self.translation)
    }

    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Compare as rigid motions: `q` and `-q` describe the same rotation, so
    /// rotations are compared as matrices.
    pub fn abs_diff_eq(&self, other: &Transform, max_abs_diff: f64) -> bool {
        self.translation.abs_diff_eq(other.translation, max_abs_diff)
            && self
                .rotation_matrix()
                .abs_diff_eq(other.rotation_matrix(), max_abs_diff)
    }

    fn is_proper(&self) -> bool {
        self.rotation.is_finite()
            && self.translation.is_finite()
            && (self.rotation.length() - 1.0).abs() <= ORTHONORMAL_TOLERANCE
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}
