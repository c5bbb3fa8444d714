//! Drawing a new box by dragging.
//!
//! The first click fixes corner0 on the ground plane `z = 0`. Dragging
//! spans the base rectangle; the box is given a small initial depth so it is
//! visible right away. Once extrusion starts, the opposite corner moves along
//! its Z perspective line (or freely in its x plane), changing the depth.

use persp3d_math::{Point2, ProjAxis, ProjPt3, TransfMat3x4};
use tracing::warn;

use crate::box3d::{Box3D, INITIAL_DEPTH};
use crate::perspective_line::PerspectiveLine;

/// State of a box being drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxCreation {
    origin: ProjPt3,
    pt_b: Point2,
    pt_b_proj: ProjPt3,
    pt_c: Point2,
    pt_c_proj: ProjPt3,
    extruded: bool,
}

impl BoxCreation {
    /// Start at the screen point `click`.
    pub fn start(tmat: &TransfMat3x4, click: Point2) -> Self {
        let origin = tmat.preimage(&click, 0.0, ProjAxis::Z);
        let mut pt_c_proj = origin.normalized();
        pt_c_proj[ProjAxis::Z] = INITIAL_DEPTH;
        Self {
            origin,
            pt_b: click,
            pt_b_proj: origin,
            pt_c: click,
            pt_c_proj,
            extruded: false,
        }
    }

    /// Whether the depth is being dragged.
    pub fn is_extruded(&self) -> bool {
        self.extruded
    }

    /// Switch from spanning the base to extruding. Irreversible for this
    /// gesture.
    pub fn begin_extrusion(&mut self) {
        self.extruded = true;
    }

    /// Screen position of the dragged corner.
    pub fn dragged_point(&self) -> Point2 {
        self.pt_c
    }

    /// Follow the pointer. While extruding, the corner is kept on its Z
    /// perspective line unless `free` is set.
    pub fn drag(&mut self, tmat: &TransfMat3x4, motion: Point2, free: bool) {
        if !self.extruded {
            self.pt_b = motion;
            self.pt_c = motion;
            self.pt_b_proj = tmat.preimage(&motion, 0.0, ProjAxis::Z);
            let mut c = self.pt_b_proj.normalized();
            c[ProjAxis::Z] = INITIAL_DEPTH;
            self.pt_c_proj = c;
            return;
        }

        self.pt_c = if free {
            motion
        } else {
            PerspectiveLine::new(self.pt_b, ProjAxis::Z, tmat).closest_to(&motion)
        };
        self.pt_b_proj.normalize();
        let c = tmat.preimage(&self.pt_c, self.pt_b_proj[ProjAxis::X], ProjAxis::X);
        if c.is_finite() {
            self.pt_c_proj = c;
        } else {
            warn!("extrusion target has no preimage");
        }
    }

    /// The box drawn so far, in canonical corner order.
    pub fn to_box(&self, id: impl Into<String>) -> Box3D {
        let mut b = Box3D::new(id, self.origin, self.pt_c_proj);
        b.relabel_corners();
        b.save_corners();
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use persp3d_math::ProjPt2;

    fn ortho() -> TransfMat3x4 {
        TransfMat3x4::from_points(
            ProjPt2::new(1.0, 0.0, 0.0),
            ProjPt2::new(0.0, 1.0, 0.0),
            ProjPt2::new(0.5, -0.5, 0.0),
            ProjPt2::new(0.0, 0.0, 1.0),
        )
    }

    #[test]
    fn test_span_base_then_extrude() {
        let m = ortho();
        let mut c = BoxCreation::start(&m, Point2::new(10.0, 20.0));
        c.drag(&m, Point2::new(50.0, 60.0), false);

        let b = c.to_box("b");
        assert_relative_eq!(b.corner0()[0], 50.0, epsilon = 1e-9);
        assert_relative_eq!(b.corner7()[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(b.corner0()[1], 60.0, epsilon = 1e-9);
        assert_relative_eq!(b.corner7()[1], 20.0, epsilon = 1e-9);
        assert_relative_eq!(b.corner0()[2], 0.0, epsilon = 1e-9);
        assert_relative_eq!(b.corner7()[2], INITIAL_DEPTH, epsilon = 1e-9);

        c.begin_extrusion();
        // off the z line; the corner is pulled back onto it
        c.drag(&m, Point2::new(54.0, 56.0 + 3.0), false);
        let b = c.to_box("b");
        assert_relative_eq!(b.corner7()[2], 5.0, epsilon = 1e-9);
        assert_relative_eq!(b.corner0()[0], 50.0, epsilon = 1e-9);
        assert!(b.everted_directions().is_empty());
    }

    #[test]
    fn test_free_extrusion_follows_pointer() {
        let m = ortho();
        let mut c = BoxCreation::start(&m, Point2::new(0.0, 0.0));
        c.drag(&m, Point2::new(10.0, 10.0), false);
        c.begin_extrusion();
        c.drag(&m, Point2::new(13.0, 4.0), true);
        assert_eq!(c.dragged_point(), Point2::new(13.0, 4.0));
        let b = c.to_box("b");
        // x stays at 10, so 10 + z/2 = 13
        assert_relative_eq!(b.corner7()[2], 6.0, epsilon = 1e-9);
    }
}
