//! Box faces.
//!
//! A [`Box3DSide`] knows which face it is and caches the screen
//! quadrilateral last computed for it. The quadrilateral is derived from the
//! parent box's corners and the shared projection on every change; it is
//! never the source of truth.

use std::fmt::Write as _;

use persp3d_math::{Point2, ProjPt3, TransfMat3x4};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::box3d::proj_corner_from;
use crate::error::{Persp3dError, Result};
use crate::face::{Face, FrontOrRear};

/// A closed screen quadrilateral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SidePath {
    /// Corners in drawing order.
    pub points: [Point2; 4],
}

impl SidePath {
    /// SVG path data: one move, three lines and a close.
    pub fn to_svg_d(&self) -> String {
        let mut d = String::new();
        for (i, p) in self.points.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{cmd} {},{} ", p.x, p.y);
        }
        d.push('Z');
        d
    }
}

/// A face detached from its box, kept as an ordinary path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainPath {
    /// SVG path data.
    pub d: String,
    /// Style attribute, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// One of the six faces of a box.
#[derive(Debug, Clone, PartialEq)]
pub struct Box3DSide {
    face: Face,
    path: Option<SidePath>,
    style: Option<String>,
}

impl Box3DSide {
    /// A side for `face` with no computed shape yet.
    pub fn new(face: Face) -> Self {
        Self {
            face,
            path: None,
            style: None,
        }
    }

    /// Build from a document side type code.
    pub fn from_type_code(code: i64) -> Result<Self> {
        Face::from_code(code).map(Self::new)
    }

    /// The face.
    pub fn face(&self) -> Face {
        self.face
    }

    /// Face slot (0..6).
    pub fn slot(&self) -> Option<usize> {
        self.face.slot()
    }

    /// Code written to documents.
    pub fn type_code(&self) -> u8 {
        self.face.code()
    }

    /// Whether this is the corner0 or corner7 face of its pair.
    pub fn front_or_rear(&self) -> FrontOrRear {
        self.face.front_or_rear
    }

    /// Corner ids of the quadrilateral.
    pub fn corner_ids(&self) -> [u8; 4] {
        self.face.corner_ids()
    }

    /// Object-space corners of the face for a box spanned by `c0`, `c7`.
    pub fn corners(&self, c0: &ProjPt3, c7: &ProjPt3) -> [ProjPt3; 4] {
        self.corner_ids().map(|id| proj_corner_from(id, c0, c7))
    }

    /// Project the face. Fails if any corner has no screen image.
    pub fn compute_shape(
        &self,
        c0: &ProjPt3,
        c7: &ProjPt3,
        tmat: &TransfMat3x4,
    ) -> Result<SidePath> {
        let face = self.slot().unwrap_or_default();
        let mut points = [Point2::origin(); 4];
        for (dst, corner) in points.iter_mut().zip(self.corners(c0, c7)) {
            *dst = tmat
                .image(&corner)
                .try_affine()
                .ok_or(Persp3dError::NonFiniteCorner { face })?;
        }
        Ok(SidePath { points })
    }

    /// Recompute the cached quadrilateral. On failure the previous shape is
    /// kept and `false` is returned.
    pub fn recompute_shape(&mut self, c0: &ProjPt3, c7: &ProjPt3, tmat: &TransfMat3x4) -> bool {
        match self.compute_shape(c0, c7, tmat) {
            Ok(path) => {
                trace!(side = %self.face, "side shape updated");
                self.path = Some(path);
                true
            }
            Err(e) => {
                warn!(side = %self.face, "skipping side update: {e}");
                false
            }
        }
    }

    /// Last computed quadrilateral.
    pub fn path(&self) -> Option<&SidePath> {
        self.path.as_ref()
    }

    /// SVG path data of the last computed quadrilateral.
    pub fn svg_d(&self) -> Option<String> {
        self.path.as_ref().map(SidePath::to_svg_d)
    }

    /// Style attribute.
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Replace the style attribute.
    pub fn set_style(&mut self, style: Option<String>) {
        self.style = style;
    }

    /// Human-readable position of the face.
    pub fn label(&self) -> &'static str {
        self.face.label()
    }

    /// Plane name plus label, e.g. `"XYfront"`.
    pub fn axes_string(&self) -> String {
        self.face.axes_string()
    }

    /// Convert to an ordinary path carrying the current shape and style.
    pub fn to_plain_path(&self) -> PlainPath {
        PlainPath {
            d: self.svg_d().unwrap_or_default(),
            style: self.style.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persp3d_math::ProjPt2;

    fn ortho() -> TransfMat3x4 {
        // x to the right, y down, z diagonal
        TransfMat3x4::from_points(
            ProjPt2::new(1.0, 0.0, 0.0),
            ProjPt2::new(0.0, 1.0, 0.0),
            ProjPt2::new(0.5, 0.5, 0.0),
            ProjPt2::new(0.0, 0.0, 1.0),
        )
    }

    #[test]
    fn test_front_xy_shape() {
        let side = Box3DSide::new(Face::from_slot(4).unwrap());
        let c0 = ProjPt3::new(0.0, 0.0, 0.0, 1.0);
        let c7 = ProjPt3::new(10.0, 20.0, 4.0, 1.0);
        let path = side.compute_shape(&c0, &c7, &ortho()).unwrap();
        assert_eq!(
            path.points,
            [
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 20.0),
                Point2::new(0.0, 20.0),
            ]
        );
        assert_eq!(path.to_svg_d(), "M 0,0 L 10,0 L 10,20 L 0,20 Z");
    }

    #[test]
    fn test_rear_side_uses_corner7_plane() {
        let side = Box3DSide::new(Face::from_slot(5).unwrap());
        let c0 = ProjPt3::new(0.0, 0.0, 0.0, 1.0);
        let c7 = ProjPt3::new(10.0, 20.0, 4.0, 1.0);
        let corners = side.corners(&c0, &c7);
        assert!(corners.iter().all(|c| c[2] == 4.0));
    }

    #[test]
    fn test_non_finite_corner_keeps_previous_shape() {
        let mut side = Box3DSide::new(Face::from_slot(0).unwrap());
        let c0 = ProjPt3::new(0.0, 0.0, 0.0, 1.0);
        let c7 = ProjPt3::new(1.0, 1.0, 1.0, 1.0);
        assert!(side.recompute_shape(&c0, &c7, &ortho()));
        let before = side.path().copied();

        // a corner whose image lands at infinity
        let flat = TransfMat3x4::from_points(
            ProjPt2::new(1.0, 0.0, 0.0),
            ProjPt2::new(0.0, 1.0, 0.0),
            ProjPt2::new(0.0, 0.0, -1.0),
            ProjPt2::new(0.0, 0.0, 1.0),
        );
        assert!(matches!(
            side.compute_shape(&c0, &c7, &flat),
            Err(Persp3dError::NonFiniteCorner { face: 0 })
        ));
        assert!(!side.recompute_shape(&c0, &c7, &flat));
        assert_eq!(side.path().copied(), before);
    }

    #[test]
    fn test_type_code_and_plain_path() {
        let mut side = Box3DSide::from_type_code(13).unwrap();
        assert_eq!(side.slot(), Some(3));
        assert_eq!(side.type_code(), 13);
        assert_eq!(side.axes_string(), "XZbottom");
        assert!(Box3DSide::from_type_code(7).is_err());

        side.set_style(Some("fill:#e9e9ff".into()));
        let plain = side.to_plain_path();
        assert_eq!(plain.d, "");
        assert_eq!(plain.style.as_deref(), Some("fill:#e9e9ff"));
    }
}
