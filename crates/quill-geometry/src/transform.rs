//! 2D affine transformations.
//!
//! A [`Transform2D`] is the matrix
//!
//! ```text
//! [a c e]
//! [b d f]
//! [0 0 1]
//! ```
//!
//! stored as a [`glam::Affine2`].

use glam::{Affine2, Mat2, Vec2};

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f32 = 1e-6;

/// A 2D affine transformation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    affine: Affine2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    /// Identity transform (no transformation).
    pub const IDENTITY: Self = Self {
        affine: Affine2::IDENTITY,
    };

    /// Create from the six matrix values `[a, b, c, d, e, f]`.
    pub fn from_values(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self {
            affine: Affine2::from_cols(Vec2::new(a, b), Vec2::new(c, d), Vec2::new(e, f)),
        }
    }

    /// Create from a [`glam::Affine2`].
    pub fn from_affine(affine: Affine2) -> Self {
        Self { affine }
    }

    /// Create a translation transform.
    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            affine: Affine2::from_translation(Vec2::new(x, y)),
        }
    }

    /// Create a rotation transform (angle in radians).
    pub fn rotate(angle: f32) -> Self {
        Self {
            affine: Affine2::from_angle(angle),
        }
    }

    /// Create a non-uniform scale transform.
    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            affine: Affine2::from_scale(Vec2::new(sx, sy)),
        }
    }

    /// Create a horizontal skew transform (angle in radians).
    pub fn skew_x(angle: f32) -> Self {
        Self {
            affine: Affine2::from_mat2(Mat2::from_cols(
                Vec2::new(1.0, 0.0),
                Vec2::new(angle.tan(), 1.0),
            )),
        }
    }

    /// Create a vertical skew transform (angle in radians).
    pub fn skew_y(angle: f32) -> Self {
        Self {
            affine: Affine2::from_mat2(Mat2::from_cols(
                Vec2::new(1.0, angle.tan()),
                Vec2::new(0.0, 1.0),
            )),
        }
    }

    /// Combine two transforms: `self` is applied first, then `other`.
    pub fn then(&self, other: &Transform2D) -> Self {
        Self {
            affine: other.affine * self.affine,
        }
    }

    /// Put `op` in front of this transform, so `op` acts in the local space
    /// that this transform maps from.
    pub fn pre_multiply(&self, op: &Transform2D) -> Self {
        op.then(self)
    }

    /// Inverse transform. A singular matrix yields the identity.
    pub fn inverse(&self) -> Self {
        self.try_inverse().unwrap_or(Self::IDENTITY)
    }

    /// Inverse transform, or `None` if the matrix is singular.
    pub fn try_inverse(&self) -> Option<Self> {
        let det = self.affine.matrix2.determinant();
        if det.abs() < SINGULAR_EPSILON {
            None
        } else {
            Some(Self {
                affine: self.affine.inverse(),
            })
        }
    }

    /// Transform a point.
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        self.affine.transform_point2(point)
    }

    /// Transform a vector (ignores translation).
    pub fn transform_vector(&self, vector: Vec2) -> Vec2 {
        self.affine.transform_vector2(vector)
    }

    /// Geometric mean of the lengths of the two basis vectors.
    ///
    /// Converts a logical stroke width into a device-space width.
    pub fn average_scale(&self) -> f32 {
        let sx = self.affine.matrix2.x_axis.length();
        let sy = self.affine.matrix2.y_axis.length();
        (sx * sy).sqrt()
    }

    /// The six matrix values `[a, b, c, d, e, f]`.
    pub fn to_array(&self) -> [f32; 6] {
        let m = &self.affine.matrix2;
        let t = self.affine.translation;
        [m.x_axis.x, m.x_axis.y, m.y_axis.x, m.y_axis.y, t.x, t.y]
    }

    /// Get the underlying affine matrix.
    pub fn as_affine(&self) -> &Affine2 {
        &self.affine
    }

    /// Get the translation component.
    pub fn translation(&self) -> Vec2 {
        self.affine.translation
    }
}

impl std::ops::Mul<Transform2D> for Transform2D {
    type Output = Transform2D;

    fn mul(self, rhs: Transform2D) -> Transform2D {
        self.then(&rhs)
    }
}

impl std::ops::Mul<Vec2> for Transform2D {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        self.transform_point(rhs)
    }
}
