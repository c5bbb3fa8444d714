//! Shared perspectives.
//!
//! A [`Perspective`] owns the projective map shared by all boxes drawn in it
//! and the list of those boxes. The list is only changed through the
//! [`Scene`](crate::Scene), together with the boxes' references.

use persp3d_math::{Affine2, Point2, ProjAxis, ProjPt2, TransfMat3x4, Vec2};
use serde::{Deserialize, Serialize};

use crate::keys::BoxKey;
use crate::perspective_line::PerspectiveLine;

/// Whether perspective lines of an axis meet in a point or stay parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VpState {
    /// Lines meet in the vanishing point.
    Finite,
    /// Lines are parallel.
    Infinite,
}

/// A projective camera shared by a set of boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct Perspective {
    id: String,
    tmat: TransfMat3x4,
    boxes: Vec<BoxKey>,
}

impl Perspective {
    /// Create a perspective with no attached boxes.
    pub fn new(id: impl Into<String>, tmat: TransfMat3x4) -> Self {
        Self {
            id: id.into(),
            tmat,
            boxes: Vec::new(),
        }
    }

    /// The perspective placed on a fresh document of `width` × `height`:
    /// X vanishes at the left edge, Z at the right edge, Y is vertical and
    /// parallel, and the origin sits in the upper middle.
    pub fn default_for_document(id: impl Into<String>, width: f64, height: f64) -> Self {
        let tmat = TransfMat3x4::from_points(
            ProjPt2::new(0.0, height / 2.0, 1.0),
            ProjPt2::new(0.0, 1000.0, 0.0),
            ProjPt2::new(width, height / 2.0, 1.0),
            ProjPt2::new(width / 2.0, height / 3.0, 1.0),
        );
        Self::new(id, tmat)
    }

    /// Document id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The projective map.
    pub fn tmat(&self) -> &TransfMat3x4 {
        &self.tmat
    }

    /// Attached boxes in attachment order.
    pub fn boxes(&self) -> &[BoxKey] {
        &self.boxes
    }

    /// Whether `key` is attached.
    pub fn has_box(&self, key: BoxKey) -> bool {
        self.boxes.contains(&key)
    }

    /// Number of attached boxes.
    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub(crate) fn add_box(&mut self, key: BoxKey) -> bool {
        if self.has_box(key) {
            return false;
        }
        self.boxes.push(key);
        true
    }

    pub(crate) fn clear_boxes(&mut self) {
        self.boxes.clear();
    }

    pub(crate) fn remove_box(&mut self, key: BoxKey) -> bool {
        let before = self.boxes.len();
        self.boxes.retain(|k| *k != key);
        self.boxes.len() != before
    }

    /// Vanishing point of `axis`, or the origin image for `W`.
    pub fn vp(&self, axis: ProjAxis) -> ProjPt2 {
        self.tmat.column(axis)
    }

    /// Whether the vanishing point of `axis` is finite.
    pub fn is_finite(&self, axis: ProjAxis) -> bool {
        self.tmat.has_finite_image(axis)
    }

    /// Finite/infinite state of `axis`.
    pub fn vp_state(&self, axis: ProjAxis) -> VpState {
        if self.is_finite(axis) {
            VpState::Finite
        } else {
            VpState::Infinite
        }
    }

    /// Direction of an infinite vanishing point.
    pub fn infinite_direction(&self, axis: ProjAxis) -> Option<Vec2> {
        (!self.is_finite(axis)).then(|| self.vp(axis).direction())
    }

    /// Direction angle (degrees) of an infinite vanishing point.
    pub fn infinite_angle(&self, axis: ProjAxis) -> Option<f64> {
        self.tmat.infinite_angle(axis)
    }

    /// The perspective line of `axis` through `pt`.
    pub fn perspective_line(&self, pt: Point2, axis: ProjAxis) -> PerspectiveLine {
        PerspectiveLine::new(pt, axis, &self.tmat)
    }

    /// Direction from `pt` along the perspective line of `axis`.
    pub fn pl_dir_from_pt(&self, pt: Point2, axis: ProjAxis) -> Vec2 {
        pl_dir_from_pt(&self.tmat, pt, axis)
    }

    /// Switch the vanishing point of `axis` between finite and infinite.
    pub fn toggle_vp(&mut self, axis: ProjAxis) -> bool {
        self.tmat.toggle_finite(axis)
    }

    /// Bring `axis` into `state`, toggling if needed. Returns whether the
    /// matrix changed.
    pub fn set_vp_state(&mut self, axis: ProjAxis, state: VpState) -> bool {
        if self.vp_state(axis) == state {
            return false;
        }
        self.toggle_vp(axis)
    }

    /// Rotate an infinite vanishing point by `angle` degrees. With `fine`
    /// set, the rotation is half a degree in the direction of `angle`.
    /// Finite vanishing points are not rotated.
    pub fn rotate_vp(&mut self, axis: ProjAxis, angle: f64, fine: bool) -> bool {
        let step = if fine {
            if angle > 0.0 {
                0.5
            } else if angle < 0.0 {
                -0.5
            } else {
                0.0
            }
        } else {
            angle
        };
        self.tmat.rotate_infinite_direction(axis, step)
    }

    /// Move a vanishing point (or the origin image for `W`).
    pub fn set_vp(&mut self, axis: ProjAxis, pt: ProjPt2) {
        self.tmat.set_column(axis, pt);
    }

    /// Concatenate a 2D affine map with the projection.
    pub fn apply_affine(&mut self, xform: &Affine2) {
        self.tmat.apply_affine(xform);
    }

    /// Whether both perspectives project identically.
    pub fn coincides_with(&self, other: &Perspective) -> bool {
        self.tmat == other.tmat
    }

    /// Coordinate string of a matrix column.
    pub fn pt_to_str(&self, axis: ProjAxis) -> String {
        self.vp(axis).coord_string()
    }
}

/// Direction from `pt` along the perspective line of `axis` under `tmat`.
pub fn pl_dir_from_pt(tmat: &TransfMat3x4, pt: Point2, axis: ProjAxis) -> Vec2 {
    let vp = tmat.column(axis);
    if vp.is_finite() {
        PerspectiveLine::new(pt, axis, tmat).direction()
    } else {
        vp.direction()
    }
}
