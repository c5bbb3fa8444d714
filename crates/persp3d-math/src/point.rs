//! Homogeneous points.
//!
//! [`ProjPt2`] is a point of the projective plane (screen space), [`ProjPt3`]
//! a point of projective 3-space (box object space). Both carry their
//! homogeneous weight explicitly; a weight of zero means "at infinity".
//!
//! The textual form is the colon-separated list of components, e.g.
//! `"100 : 250 : 1"`.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use nalgebra::{Vector3, Vector4};

use crate::axis::ProjAxis;
use crate::error::{CoordError, Result};
use crate::{Point2, Vec2, EPSILON};

/// Screen-space sentinel for a point that cannot be displayed.
pub fn non_finite_point() -> Point2 {
    Point2::new(f64::INFINITY, f64::INFINITY)
}

/// Whether both coordinates of a screen point are finite numbers.
pub fn is_finite_point(p: &Point2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

fn parse_components(s: &str, accepted: &[usize], expected: &'static str) -> Result<Vec<f64>> {
    if s.trim().is_empty() {
        return Err(CoordError::Empty);
    }
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    if !accepted.contains(&parts.len()) {
        return Err(CoordError::ComponentCount {
            expected,
            found: parts.len(),
        });
    }
    parts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            text.parse::<f64>().map_err(|_| CoordError::NotANumber {
                index,
                text: (*text).to_string(),
            })
        })
        .collect()
}

/// A homogeneous point `(x : y : w)` of the projective plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjPt2(Vector3<f64>);

impl ProjPt2 {
    /// Create from homogeneous components.
    pub fn new(x: f64, y: f64, w: f64) -> Self {
        Self(Vector3::new(x, y, w))
    }

    /// Embed an affine point with weight 1.
    pub fn from_affine(p: Point2) -> Self {
        Self::new(p.x, p.y, 1.0)
    }

    /// A point at infinity in direction `dir`.
    pub fn from_direction(dir: Vec2) -> Self {
        Self::new(dir.x, dir.y, 0.0)
    }

    /// Wrap a raw homogeneous vector.
    pub fn from_vector(v: Vector3<f64>) -> Self {
        Self(v)
    }

    /// The underlying homogeneous vector.
    pub fn as_vector(&self) -> &Vector3<f64> {
        &self.0
    }

    /// Homogeneous weight.
    pub fn w(&self) -> f64 {
        self.0[2]
    }

    /// Whether the point lies in the affine part of the plane (w ≠ 0).
    pub fn is_finite(&self) -> bool {
        self.0[2] != 0.0
    }

    /// Divide through by `w`. Points at (or numerically near) infinity are
    /// left untouched and `false` is returned.
    pub fn normalize(&mut self) -> bool {
        let w = self.0[2];
        if w.abs() < EPSILON {
            return false;
        }
        if w != 1.0 {
            self.0 /= w;
        }
        true
    }

    /// Affine screen point, or the non-finite sentinel for points at infinity.
    pub fn affine(&self) -> Point2 {
        self.try_affine().unwrap_or_else(non_finite_point)
    }

    /// Affine screen point if the point is displayable.
    pub fn try_affine(&self) -> Option<Point2> {
        if !self.is_finite() {
            return None;
        }
        let p = Point2::new(self.0[0] / self.0[2], self.0[1] / self.0[2]);
        is_finite_point(&p).then_some(p)
    }

    /// The `(x, y)` part, which is the direction of a point at infinity.
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.0[0], self.0[1])
    }

    /// Textual form `"x : y : w"`.
    pub fn coord_string(&self) -> String {
        self.to_string()
    }
}

impl Index<usize> for ProjPt2 {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl IndexMut<usize> for ProjPt2 {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl fmt::Display for ProjPt2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} : {}", self.0[0], self.0[1], self.0[2])
    }
}

impl FromStr for ProjPt2 {
    type Err = CoordError;

    /// Accepts `"x : y : w"` or the affine shorthand `"x : y"`.
    fn from_str(s: &str) -> Result<Self> {
        let c = parse_components(s, &[2, 3], "2 or 3")?;
        let w = c.get(2).copied().unwrap_or(1.0);
        Ok(Self::new(c[0], c[1], w))
    }
}

/// A homogeneous point `(x : y : z : w)` of projective 3-space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjPt3(Vector4<f64>);

impl ProjPt3 {
    /// Create from homogeneous components.
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self(Vector4::new(x, y, z, w))
    }

    /// The sentinel returned by singular preimage computations.
    pub fn non_finite() -> Self {
        Self::new(f64::INFINITY, f64::INFINITY, f64::INFINITY, 1.0)
    }

    /// Wrap a raw homogeneous vector.
    pub fn from_vector(v: Vector4<f64>) -> Self {
        Self(v)
    }

    /// The underlying homogeneous vector.
    pub fn as_vector(&self) -> &Vector4<f64> {
        &self.0
    }

    /// Homogeneous weight.
    pub fn w(&self) -> f64 {
        self.0[3]
    }

    /// Coordinate along a matrix axis.
    pub fn get(&self, axis: ProjAxis) -> f64 {
        self.0[axis.index()]
    }

    /// Overwrite the coordinate along a matrix axis.
    pub fn set(&mut self, axis: ProjAxis, value: f64) {
        self.0[axis.index()] = value;
    }

    /// Whether the point is an affine point made of finite numbers.
    pub fn is_finite(&self) -> bool {
        self.0[3] != 0.0 && self.0.iter().all(|c| c.is_finite())
    }

    /// Divide through by `w`. Points at (or numerically near) infinity are
    /// left untouched and `false` is returned.
    pub fn normalize(&mut self) -> bool {
        let w = self.0[3];
        if w.abs() < EPSILON {
            return false;
        }
        if w != 1.0 {
            self.0 /= w;
        }
        true
    }

    /// A normalized copy.
    pub fn normalized(&self) -> Self {
        let mut p = *self;
        p.normalize();
        p
    }

    /// Textual form `"x : y : z : w"`.
    pub fn coord_string(&self) -> String {
        self.to_string()
    }
}

impl Index<usize> for ProjPt3 {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl IndexMut<usize> for ProjPt3 {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl Index<ProjAxis> for ProjPt3 {
    type Output = f64;
    fn index(&self, axis: ProjAxis) -> &f64 {
        &self.0[axis.index()]
    }
}

impl IndexMut<ProjAxis> for ProjPt3 {
    fn index_mut(&mut self, axis: ProjAxis) -> &mut f64 {
        &mut self.0[axis.index()]
    }
}

impl fmt::Display for ProjPt3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : {} : {} : {}",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl FromStr for ProjPt3 {
    type Err = CoordError;

    /// Accepts `"x : y : z : w"` or the affine shorthand `"x : y : z"`.
    fn from_str(s: &str) -> Result<Self> {
        let c = parse_components(s, &[3, 4], "3 or 4")?;
        let w = c.get(3).copied().unwrap_or(1.0);
        Ok(Self::new(c[0], c[1], c[2], w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pt2_affine_and_infinite() {
        let p = ProjPt2::new(10.0, 20.0, 2.0);
        assert!(p.is_finite());
        assert_relative_eq!(p.affine().x, 5.0);
        assert_relative_eq!(p.affine().y, 10.0);

        let dir = ProjPt2::new(1.0, 0.0, 0.0);
        assert!(!dir.is_finite());
        assert!(dir.try_affine().is_none());
        assert!(!is_finite_point(&dir.affine()));
    }

    #[test]
    fn test_normalize_leaves_points_at_infinity() {
        let mut p = ProjPt3::new(2.0, 4.0, 6.0, 2.0);
        assert!(p.normalize());
        assert_eq!(p, ProjPt3::new(1.0, 2.0, 3.0, 1.0));

        let mut q = ProjPt3::new(2.0, 4.0, 6.0, 0.0);
        assert!(!q.normalize());
        assert_eq!(q, ProjPt3::new(2.0, 4.0, 6.0, 0.0));
    }

    #[test]
    fn test_parse_pt2() {
        let p: ProjPt2 = "500 : 300 : 1".parse().unwrap();
        assert_eq!(p, ProjPt2::new(500.0, 300.0, 1.0));

        let q: ProjPt2 = "  12.5:-3 ".parse().unwrap();
        assert_eq!(q, ProjPt2::new(12.5, -3.0, 1.0));

        assert_eq!("".parse::<ProjPt2>(), Err(CoordError::Empty));
        assert!(matches!(
            "1 : 2 : 3 : 4".parse::<ProjPt2>(),
            Err(CoordError::ComponentCount { found: 4, .. })
        ));
        assert!(matches!(
            "1 : abc : 3".parse::<ProjPt2>(),
            Err(CoordError::NotANumber { index: 1, .. })
        ));
    }

    #[test]
    fn test_parse_pt3() {
        let p: ProjPt3 = "0 : 0 : 0 : 1".parse().unwrap();
        assert_eq!(p, ProjPt3::new(0.0, 0.0, 0.0, 1.0));
        let q: ProjPt3 = "1 : 2 : 3".parse().unwrap();
        assert_eq!(q.w(), 1.0);
        assert!("1 : 2".parse::<ProjPt3>().is_err());
    }

    #[test]
    fn test_coord_string_is_exact() {
        let p = ProjPt2::new(0.1 + 0.2, -1.0 / 3.0, 1.0);
        let back: ProjPt2 = p.coord_string().parse().unwrap();
        assert_eq!(p, back);

        let q = ProjPt3::new(1e-17, 123456.789, -0.25, 1.0);
        let back: ProjPt3 = q.coord_string().parse().unwrap();
        assert_eq!(q, back);
    }

    #[test]
    fn test_non_finite_sentinel() {
        assert!(!ProjPt3::non_finite().is_finite());
        assert!(ProjPt3::new(1.0, 2.0, 3.0, 1.0).is_finite());
    }
}
