//! Projective maps.
//!
//! [`TransfMat3x4`] maps homogeneous 3-space onto the homogeneous plane. Its
//! columns are the images of the three axis directions (the vanishing
//! points) and of the origin. [`Affine2`] is a plain 2D affine transform in
//! homogeneous form, used to move whole perspectives around the canvas.

use std::fmt;

use nalgebra::{Matrix3, Matrix3x4, Vector3};

use crate::axis::ProjAxis;
use crate::point::{ProjPt2, ProjPt3};
use crate::{Point2, Vec2};

/// A 2D affine transformation stored as a 3x3 homogeneous matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    /// The underlying 3x3 matrix; the last row is `(0, 0, 1)`.
    pub matrix: Matrix3<f64>,
}

impl Affine2 {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Translation by `(dx, dy)`.
    pub fn translation(dx: f64, dy: f64) -> Self {
        let mut m = Matrix3::identity();
        m[(0, 2)] = dx;
        m[(1, 2)] = dy;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy)` about the origin.
    pub fn scale(sx: f64, sy: f64) -> Self {
        let mut m = Matrix3::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        Self { matrix: m }
    }

    /// Counter-clockwise rotation about the origin by `angle` radians.
    pub fn rotation(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix3::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Build from the six coefficients `[a, b, c, d, e, f]` of
    /// `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
    pub fn from_coeffs(c: [f64; 6]) -> Self {
        Self {
            matrix: Matrix3::new(c[0], c[2], c[4], c[1], c[3], c[5], 0.0, 0.0, 1.0),
        }
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Affine2) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform an affine point.
    pub fn apply_point(&self, p: &Point2) -> Point2 {
        let v = self.matrix * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v.x, v.y)
    }

    /// Transform a homogeneous point. Points at infinity stay at infinity and
    /// have only the linear part applied to their direction.
    pub fn apply_homogeneous(&self, p: &ProjPt2) -> ProjPt2 {
        let v = self.matrix * p.as_vector();
        ProjPt2::new(v.x, v.y, p.w())
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// Whether this is exactly the identity.
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix3::identity()
    }
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Projective map from homogeneous 3-space to the homogeneous plane.
///
/// Column `i` for a spatial axis is the vanishing point of that axis; the
/// `W` column is the image of the origin. A column with zero weight is a
/// vanishing point at infinity, i.e. lines along that axis stay parallel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransfMat3x4 {
    /// The underlying 3x4 matrix.
    pub matrix: Matrix3x4<f64>,
}

impl TransfMat3x4 {
    /// Assemble from the three vanishing points and the image of the origin.
    pub fn from_points(vp_x: ProjPt2, vp_y: ProjPt2, vp_z: ProjPt2, origin: ProjPt2) -> Self {
        let mut m = Self {
            matrix: Matrix3x4::zeros(),
        };
        m.set_column(ProjAxis::X, vp_x);
        m.set_column(ProjAxis::Y, vp_y);
        m.set_column(ProjAxis::Z, vp_z);
        m.set_column(ProjAxis::W, origin);
        m
    }

    /// The column for `axis` as a homogeneous point.
    pub fn column(&self, axis: ProjAxis) -> ProjPt2 {
        ProjPt2::from_vector(self.matrix.column(axis.index()).into_owned())
    }

    /// Overwrite the column for `axis`.
    pub fn set_column(&mut self, axis: ProjAxis, pt: ProjPt2) {
        self.matrix.set_column(axis.index(), pt.as_vector());
    }

    /// Whether the vanishing point of `axis` lies in the affine plane.
    pub fn has_finite_image(&self, axis: ProjAxis) -> bool {
        self.matrix[(2, axis.index())] != 0.0
    }

    /// Image of a point in 3-space.
    pub fn image(&self, pt: &ProjPt3) -> ProjPt2 {
        ProjPt2::from_vector(self.matrix * pt.as_vector())
    }

    /// Screen position of a point in 3-space; the non-finite sentinel when the
    /// image lies at infinity.
    pub fn image_affine(&self, pt: &ProjPt3) -> Point2 {
        self.image(pt).affine()
    }

    /// The unique point of 3-space whose `axis` coordinate equals `coord` and
    /// whose image is `pt`.
    ///
    /// The result is normalized (`w = 1`) and carries `coord` exactly. When
    /// the configuration is singular, [`ProjPt3::non_finite`] is returned.
    pub fn preimage(&self, pt: &Point2, coord: f64, axis: ProjAxis) -> ProjPt3 {
        let (a, b) = match axis {
            ProjAxis::X => (1, 2),
            ProjAxis::Y => (0, 2),
            ProjAxis::Z => (0, 1),
            ProjAxis::W => return ProjPt3::non_finite(),
        };
        let target = Vector3::new(pt.x, pt.y, 1.0);
        let lhs = Matrix3::from_columns(&[
            self.matrix.column(a).into_owned(),
            self.matrix.column(b).into_owned(),
            -target,
        ]);
        let rhs = -(self.matrix.column(axis.index()) * coord + self.matrix.column(3));

        let Some(sol) = lhs.lu().solve(&rhs) else {
            return ProjPt3::non_finite();
        };
        if !sol.iter().all(|c| c.is_finite()) {
            return ProjPt3::non_finite();
        }

        let mut result = ProjPt3::new(0.0, 0.0, 0.0, 1.0);
        result[a] = sol[0];
        result[b] = sol[1];
        result[axis.index()] = coord;
        result
    }

    /// Switch the vanishing point of `axis` between finite and infinite.
    ///
    /// A finite VP becomes the direction from the origin image towards it; an
    /// infinite VP becomes the point at that offset from the origin image.
    /// Returns `false` (leaving the matrix unchanged) when the origin image is
    /// itself not displayable.
    pub fn toggle_finite(&mut self, axis: ProjAxis) -> bool {
        if axis == ProjAxis::W {
            return false;
        }
        let Some(origin) = self.column(ProjAxis::W).try_affine() else {
            return false;
        };
        let col = self.column(axis);
        let toggled = if col.is_finite() {
            let Some(vp) = col.try_affine() else {
                return false;
            };
            ProjPt2::from_direction(vp - origin)
        } else {
            ProjPt2::from_affine(origin + col.direction())
        };
        self.set_column(axis, toggled);
        true
    }

    /// Direction angle in degrees of an infinite vanishing point.
    pub fn infinite_angle(&self, axis: ProjAxis) -> Option<f64> {
        if axis == ProjAxis::W || self.has_finite_image(axis) {
            return None;
        }
        let dir = self.column(axis).direction();
        Some(dir.y.atan2(dir.x).to_degrees())
    }

    /// Point an infinite vanishing point in direction `dir`, keeping the
    /// magnitude of the stored direction vector.
    pub fn set_infinite_direction(&mut self, axis: ProjAxis, dir: Vec2) {
        if axis == ProjAxis::W || self.has_finite_image(axis) {
            return;
        }
        let old_len = self.column(axis).direction().norm();
        let new_len = dir.norm();
        let scaled = if old_len > 0.0 && new_len > 0.0 {
            dir * (old_len / new_len)
        } else {
            dir
        };
        self.set_column(axis, ProjPt2::from_direction(scaled));
    }

    /// Rotate an infinite vanishing point by `degrees` counter-clockwise.
    /// Finite vanishing points are left alone.
    pub fn rotate_infinite_direction(&mut self, axis: ProjAxis, degrees: f64) -> bool {
        let Some(angle) = self.infinite_angle(axis) else {
            return false;
        };
        let a = (angle + degrees).to_radians();
        self.set_infinite_direction(axis, Vec2::new(a.cos(), a.sin()));
        true
    }

    /// Apply a 2D affine map to every column, preserving homogeneous weights.
    pub fn apply_affine(&mut self, xform: &Affine2) {
        for axis in [ProjAxis::X, ProjAxis::Y, ProjAxis::Z, ProjAxis::W] {
            let moved = xform.apply_homogeneous(&self.column(axis));
            self.set_column(axis, moved);
        }
    }
}

impl fmt::Display for TransfMat3x4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, axis) in [ProjAxis::X, ProjAxis::Y, ProjAxis::Z, ProjAxis::W]
            .iter()
            .enumerate()
        {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{axis}: {}", self.column(*axis))?;
        }
        Ok(())
    }
}
