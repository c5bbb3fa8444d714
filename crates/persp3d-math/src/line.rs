//! Screen-space lines and the sector tests built on them.

use crate::{Point2, Vec2, EPSILON};

/// Rotate a vector by 90 degrees (counter-clockwise when y grows downwards).
pub fn ccw(v: &Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Determinant of the 2x2 matrix with columns `a` and `b`.
pub fn determinant(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// An infinite line through `pt` with direction `v_dir`, stored together with
/// its normal form `dot(normal, p) = d0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pt: Point2,
    v_dir: Vec2,
    normal: Vec2,
    d0: f64,
}

impl Line {
    /// The line through `start` with direction `dir`.
    pub fn from_direction(start: Point2, dir: Vec2) -> Self {
        let normal = ccw(&dir);
        Self {
            pt: start,
            v_dir: dir,
            normal,
            d0: normal.dot(&start.coords),
        }
    }

    /// The line from `start` through `end`.
    pub fn through(start: Point2, end: Point2) -> Self {
        Self::from_direction(start, end - start)
    }

    /// Base point.
    pub fn point(&self) -> Point2 {
        self.pt
    }

    /// Direction vector (not normalized).
    pub fn direction(&self) -> Vec2 {
        self.v_dir
    }

    /// Normal vector.
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    /// Replace the direction, keeping the base point.
    pub fn set_direction(&mut self, dir: Vec2) {
        *self = Self::from_direction(self.pt, dir);
    }

    /// Intersection with `other`, or `None` when the lines are (nearly) parallel.
    pub fn intersect(&self, other: &Line) -> Option<Point2> {
        let denom = self.v_dir.dot(&other.normal);
        if denom.abs() <= EPSILON {
            return None;
        }
        let lambda = (other.d0 - self.pt.coords.dot(&other.normal)) / denom;
        Some(self.pt + self.v_dir * lambda)
    }

    /// Orthogonal projection of `p` onto this line. A degenerate line (zero
    /// direction) yields its base point.
    pub fn closest_to(&self, p: &Point2) -> Point2 {
        let perpendicular = Line::from_direction(*p, ccw(&self.v_dir));
        self.intersect(&perpendicular).unwrap_or(self.pt)
    }

    /// Signed offset of `p` from the line in units of the normal.
    fn side(&self, p: &Point2) -> f64 {
        self.normal.dot(&p.coords) - self.d0
    }

    /// Whether `a` and `b` lie strictly on the same side of the line.
    pub fn lie_on_same_side(&self, a: &Point2, b: &Point2) -> bool {
        self.side(a) * self.side(b) > 0.0
    }
}

/// Coordinates of `w` in the basis `{v1, v2}`, or `None` when the basis
/// vectors are (nearly) linearly dependent.
pub fn coordinates(v1: &Vec2, v2: &Vec2, w: &Vec2) -> Option<(f64, f64)> {
    let det = determinant(v1, v2);
    if det.abs() < EPSILON {
        return None;
    }
    Some((determinant(w, v2) / det, determinant(v1, w) / det))
}

/// Whether `w` lies in the closed sector spanned by `v1` and `v2`.
///
/// For a degenerate basis the answer is `true` exactly when `v1` and `v2`
/// point in opposite directions (the "sector" is then a half-plane).
pub fn lies_in_sector(v1: &Vec2, v2: &Vec2, w: &Vec2) -> bool {
    match coordinates(v1, v2, w) {
        Some((a, b)) => a >= 0.0 && b >= 0.0,
        None => v1.dot(v2) < 0.0,
    }
}

/// Whether `p` lies inside the quadrangle `A, B, C, D` (corners in order).
pub fn lies_in_quadrangle(a: &Point2, b: &Point2, c: &Point2, d: &Point2, p: &Point2) -> bool {
    lies_in_sector(&(d - a), &(b - a), &(p - a)) && lies_in_sector(&(d - c), &(b - c), &(p - c))
}

/// Whether the half-line starting at `a` through `b` crosses the infinite
/// line through `c` and `d`, where `c` and `d` must lie on opposite sides of
/// line `ab`.
pub fn half_line_crosses_joining_line(a: &Point2, b: &Point2, c: &Point2, d: &Point2) -> bool {
    let ab = Line::through(*a, *b);
    let cd = Line::through(*c, *d);
    let Some(e) = ab.intersect(&cd) else {
        return false;
    };

    if (ab.side(c) < 0.0) == (ab.side(d) < 0.0) {
        return false;
    }
    if (cd.side(a) < 0.0) != (cd.side(b) < 0.0) {
        return true;
    }
    // cd misses the segment; accept only when it lies beyond b
    (e - a).norm() >= (e - b).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn test_intersect() {
        let a = Line::through(p(0.0, 0.0), p(2.0, 2.0));
        let b = Line::through(p(0.0, 2.0), p(2.0, 0.0));
        let x = a.intersect(&b).unwrap();
        assert_relative_eq!(x.x, 1.0);
        assert_relative_eq!(x.y, 1.0);

        let parallel = Line::from_direction(p(0.0, 1.0), v(1.0, 1.0));
        assert!(a.intersect(&parallel).is_none());
    }

    #[test]
    fn test_closest_to() {
        let l = Line::from_direction(p(0.0, 5.0), v(3.0, 0.0));
        let c = l.closest_to(&p(7.0, -2.0));
        assert_relative_eq!(c.x, 7.0);
        assert_relative_eq!(c.y, 5.0);

        let degenerate = Line::from_direction(p(1.0, 1.0), v(0.0, 0.0));
        assert_eq!(degenerate.closest_to(&p(4.0, 4.0)), p(1.0, 1.0));
    }

    #[test]
    fn test_same_side() {
        let l = Line::through(p(0.0, 0.0), p(1.0, 0.0));
        assert!(l.lie_on_same_side(&p(3.0, 1.0), &p(-4.0, 2.0)));
        assert!(!l.lie_on_same_side(&p(3.0, 1.0), &p(3.0, -1.0)));
        assert!(!l.lie_on_same_side(&p(3.0, 0.0), &p(3.0, 1.0)));
    }

    #[test]
    fn test_coordinates() {
        let (a, b) = coordinates(&v(1.0, 0.0), &v(0.0, 2.0), &v(3.0, 4.0)).unwrap();
        assert_relative_eq!(a, 3.0);
        assert_relative_eq!(b, 2.0);
        assert!(coordinates(&v(1.0, 1.0), &v(2.0, 2.0), &v(0.0, 1.0)).is_none());
    }

    #[test]
    fn test_lies_in_sector() {
        assert!(lies_in_sector(&v(1.0, 0.0), &v(0.0, 1.0), &v(1.0, 1.0)));
        assert!(lies_in_sector(&v(1.0, 0.0), &v(0.0, 1.0), &v(1.0, 0.0)));
        assert!(!lies_in_sector(&v(1.0, 0.0), &v(0.0, 1.0), &v(-1.0, 1.0)));
        // degenerate bases
        assert!(lies_in_sector(&v(1.0, 0.0), &v(-1.0, 0.0), &v(0.0, 5.0)));
        assert!(!lies_in_sector(&v(1.0, 0.0), &v(2.0, 0.0), &v(0.0, 5.0)));
    }

    #[test]
    fn test_lies_in_quadrangle() {
        let (a, b, c, d) = (p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0));
        assert!(lies_in_quadrangle(&a, &b, &c, &d, &p(1.0, 3.0)));
        assert!(!lies_in_quadrangle(&a, &b, &c, &d, &p(5.0, 3.0)));
    }

    #[test]
    fn test_half_line_crosses_joining_line() {
        let a = p(0.0, 0.0);
        let b = p(1.0, 0.0);
        // segment cd straddles the ray beyond b
        assert!(half_line_crosses_joining_line(&a, &b, &p(5.0, -1.0), &p(5.0, 1.0)));
        // segment between a and b
        assert!(half_line_crosses_joining_line(&a, &b, &p(0.5, -1.0), &p(0.5, 1.0)));
        // behind a
        assert!(!half_line_crosses_joining_line(&a, &b, &p(-3.0, -1.0), &p(-3.0, 1.0)));
        // c and d on the same side of ab
        assert!(!half_line_crosses_joining_line(&a, &b, &p(5.0, 1.0), &p(6.0, 2.0)));
        // parallel
        assert!(!half_line_crosses_joining_line(&a, &b, &p(0.0, 1.0), &p(3.0, 1.0)));
    }
}
