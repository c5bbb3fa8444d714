//! Perspective lines.
//!
//! The screen image of a line parallel to one of the box axes. All such
//! lines pass through the axis' vanishing point when it is finite and share
//! its direction when it is infinite.

use persp3d_math::{Line, Point2, ProjAxis, TransfMat3x4, Vec2};

/// A line through a screen point towards the vanishing point of an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveLine {
    line: Line,
    axis: ProjAxis,
    vp_finite: bool,
}

impl PerspectiveLine {
    /// The perspective line of `axis` through `pt` under `tmat`.
    pub fn new(pt: Point2, axis: ProjAxis, tmat: &TransfMat3x4) -> Self {
        let vp = tmat.column(axis);
        let vp_finite = vp.is_finite();
        let line = if vp_finite {
            Line::through(pt, vp.affine())
        } else {
            Line::from_direction(pt, vp.direction())
        };
        Self {
            line,
            axis,
            vp_finite,
        }
    }

    /// Axis this line belongs to.
    pub fn axis(&self) -> ProjAxis {
        self.axis
    }

    /// Whether the line converges to a finite vanishing point.
    pub fn vp_is_finite(&self) -> bool {
        self.vp_finite
    }

    /// Point the line was constructed through.
    pub fn point(&self) -> Point2 {
        self.line.point()
    }

    /// Direction from the through-point towards the vanishing point.
    pub fn direction(&self) -> Vec2 {
        self.line.direction()
    }

    /// The underlying screen line.
    pub fn line(&self) -> &Line {
        &self.line
    }

    /// Orthogonal projection of `p` onto the line; the through-point when the
    /// line is degenerate.
    pub fn closest_to(&self, p: &Point2) -> Point2 {
        self.line.closest_to(p)
    }

    /// Whether `a` and `b` lie strictly on the same side of the line.
    pub fn lie_on_same_side(&self, a: &Point2, b: &Point2) -> bool {
        self.line.lie_on_same_side(a, b)
    }

    /// Intersection with another perspective line.
    pub fn meet(&self, other: &PerspectiveLine) -> Option<Point2> {
        self.line.intersect(&other.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use persp3d_math::ProjPt2;

    fn tmat() -> TransfMat3x4 {
        TransfMat3x4::from_points(
            ProjPt2::new(1.0, 0.0, 0.0),
            ProjPt2::new(500.0, 300.0, 1.0),
            ProjPt2::new(0.0, 1.0, 0.0),
            ProjPt2::new(100.0, 100.0, 1.0),
        )
    }

    #[test]
    fn test_finite_vp_line_passes_through_vp() {
        let pl = PerspectiveLine::new(Point2::new(100.0, 300.0), ProjAxis::Y, &tmat());
        assert!(pl.vp_is_finite());
        assert_relative_eq!(pl.direction().x, 400.0);
        assert_relative_eq!(pl.direction().y, 0.0);
        let c = pl.closest_to(&Point2::new(250.0, 340.0));
        assert_relative_eq!(c.x, 250.0);
        assert_relative_eq!(c.y, 300.0);
    }

    #[test]
    fn test_infinite_vp_line_is_parallel() {
        let m = tmat();
        let a = PerspectiveLine::new(Point2::new(0.0, 0.0), ProjAxis::Z, &m);
        let b = PerspectiveLine::new(Point2::new(50.0, 7.0), ProjAxis::Z, &m);
        assert!(!a.vp_is_finite());
        assert_eq!(a.direction(), b.direction());
        assert!(a.meet(&b).is_none());
        assert!(a.lie_on_same_side(&Point2::new(10.0, 0.0), &Point2::new(20.0, 90.0)));
        assert!(!a.lie_on_same_side(&Point2::new(10.0, 0.0), &Point2::new(-20.0, 90.0)));
    }

    #[test]
    fn test_degenerate_line_returns_through_point() {
        let pl = PerspectiveLine::new(Point2::new(500.0, 300.0), ProjAxis::Y, &tmat());
        let c = pl.closest_to(&Point2::new(10.0, 10.0));
        assert_eq!(c, Point2::new(500.0, 300.0));
    }

    #[test]
    fn test_meet() {
        let m = tmat();
        let x = PerspectiveLine::new(Point2::new(0.0, 50.0), ProjAxis::X, &m);
        let z = PerspectiveLine::new(Point2::new(30.0, 0.0), ProjAxis::Z, &m);
        let p = x.meet(&z).unwrap();
        assert_relative_eq!(p.x, 30.0);
        assert_relative_eq!(p.y, 50.0);
    }
}
