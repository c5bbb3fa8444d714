//! Parametric perspective boxes.
//!
//! A [`Box3D`] is spanned by two opposite corners in object space. Corner
//! ids are 3-bit masks: bit `X` set means the x coordinate comes from
//! corner7, likewise for `Y` and `Z`; so corner 0 is `corner0` itself and
//! corner 7 is `corner7`. Everything the box displays is derived from these
//! two points and the projection of the attached perspective, which the
//! caller passes in.

use persp3d_math::{AxisMask, Point2, ProjAxis, ProjPt3, TransfMat3x4};
use tracing::{trace, warn};

use crate::error::{Persp3dError, Result};
use crate::face::{Face, FACE_COUNT};
use crate::perspective_line::PerspectiveLine;
use crate::reference::PerspectiveReference;
use crate::settings::ZOrderStrategy;
use crate::side::Box3DSide;
use crate::snap::{snap, DragSession, SnapTarget};
use crate::zorder::{self, ZOrder};

/// Depth given to a freshly drawn box before it is extruded.
pub const INITIAL_DEPTH: f64 = 0.25;

/// Corner `id` of the box spanned by `c0` and `c7`.
pub fn proj_corner_from(id: u8, c0: &ProjPt3, c7: &ProjPt3) -> ProjPt3 {
    let pick = |bit: AxisMask, axis: ProjAxis| {
        if AxisMask::from_bits(id).contains(bit) {
            c7[axis]
        } else {
            c0[axis]
        }
    };
    ProjPt3::new(
        pick(AxisMask::X, ProjAxis::X),
        pick(AxisMask::Y, ProjAxis::Y),
        pick(AxisMask::Z, ProjAxis::Z),
        1.0,
    )
}

fn check_movement(movement: AxisMask) -> Result<()> {
    if movement.is_empty() || movement == AxisMask::XYZ {
        return Err(Persp3dError::InvalidMovement(movement));
    }
    Ok(())
}

/// A box drawn in perspective.
#[derive(Debug, Clone, PartialEq)]
pub struct Box3D {
    id: String,
    corner0: ProjPt3,
    corner7: ProjPt3,
    save_corner0: ProjPt3,
    save_corner7: ProjPt3,
    z_orders: Option<ZOrder>,
    /// Paint stack, bottom first.
    sides: Vec<Box3DSide>,
    persp_ref: PerspectiveReference,
}

impl Box3D {
    /// A box spanned by `corner0` and `corner7` with its six sides in slot
    /// order and no perspective attached.
    pub fn new(id: impl Into<String>, corner0: ProjPt3, corner7: ProjPt3) -> Self {
        let sides = (0..FACE_COUNT)
            .filter_map(Face::from_slot)
            .map(Box3DSide::new)
            .collect();
        Self {
            id: id.into(),
            corner0,
            corner7,
            save_corner0: corner0,
            save_corner7: corner7,
            z_orders: None,
            sides,
            persp_ref: PerspectiveReference::default(),
        }
    }

    /// Document id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// First defining corner.
    pub fn corner0(&self) -> &ProjPt3 {
        &self.corner0
    }

    /// Second defining corner.
    pub fn corner7(&self) -> &ProjPt3 {
        &self.corner7
    }

    /// Corners as of the start of the current drag.
    pub fn saved_corners(&self) -> (&ProjPt3, &ProjPt3) {
        (&self.save_corner0, &self.save_corner7)
    }

    /// Replace corner0 and take it as the new drag baseline.
    pub fn set_corner0(&mut self, pt: ProjPt3) {
        self.corner0 = pt;
        self.save_corner0 = pt;
    }

    /// Replace corner7 and take it as the new drag baseline.
    pub fn set_corner7(&mut self, pt: ProjPt3) {
        self.corner7 = pt;
        self.save_corner7 = pt;
    }

    /// Normalize both corners and remember them as the drag baseline.
    pub fn save_corners(&mut self) {
        self.corner0.normalize();
        self.corner7.normalize();
        self.save_corner0 = self.corner0;
        self.save_corner7 = self.corner7;
    }

    /// Start a drag gesture.
    pub fn begin_drag(&mut self) {
        self.save_corners();
    }

    /// Abort a drag gesture, restoring the corners it started from.
    pub fn cancel_drag(&mut self) {
        self.corner0 = self.save_corner0;
        self.corner7 = self.save_corner7;
    }

    /// The perspective link.
    pub fn persp_ref(&self) -> &PerspectiveReference {
        &self.persp_ref
    }

    pub(crate) fn persp_ref_mut(&mut self) -> &mut PerspectiveReference {
        &mut self.persp_ref
    }

    /// Sides in paint order, bottom first.
    pub fn sides(&self) -> &[Box3DSide] {
        &self.sides
    }

    /// The side in face slot `slot`.
    pub fn side(&self, slot: usize) -> Option<&Box3DSide> {
        self.sides.iter().find(|s| s.slot() == Some(slot))
    }

    /// Mutable access to the side in face slot `slot`.
    pub fn side_mut(&mut self, slot: usize) -> Option<&mut Box3DSide> {
        self.sides.iter_mut().find(|s| s.slot() == Some(slot))
    }

    /// Face slots in paint order, bottom first.
    pub fn paint_order(&self) -> Vec<usize> {
        self.sides.iter().filter_map(Box3DSide::slot).collect()
    }

    fn lower_to_bottom(&mut self, slot: usize) {
        if let Some(pos) = self.sides.iter().position(|s| s.slot() == Some(slot)) {
            let side = self.sides.remove(pos);
            self.sides.insert(0, side);
        }
    }

    /// Corner `id` in object space.
    pub fn proj_corner(&self, id: u8) -> ProjPt3 {
        proj_corner_from(id, &self.corner0, &self.corner7)
    }

    /// Corner `id` on screen; the non-finite sentinel if it has no image.
    pub fn corner_screen(&self, id: u8, tmat: &TransfMat3x4) -> Point2 {
        tmat.image_affine(&self.proj_corner(id))
    }

    /// Center of the box in object space.
    pub fn proj_center(&self) -> ProjPt3 {
        let c0 = self.corner0.normalized();
        let c7 = self.corner7.normalized();
        ProjPt3::new(
            (c0[0] + c7[0]) / 2.0,
            (c0[1] + c7[1]) / 2.0,
            (c0[2] + c7[2]) / 2.0,
            1.0,
        )
    }

    /// Center of the box on screen.
    pub fn center_screen(&self, tmat: &TransfMat3x4) -> Point2 {
        tmat.image_affine(&self.proj_center())
    }

    /// The four screen corners from which the perspective lines of `axis`
    /// emerge, on the face farthest along that axis.
    pub fn corners_for_perspective_lines(
        &self,
        axis: ProjAxis,
        tmat: &TransfMat3x4,
    ) -> Option<[Point2; 4]> {
        if axis == ProjAxis::W {
            return None;
        }
        let (c0, c7) = (&self.corner0, &self.corner7);
        let coord = c0[axis].max(c7[axis]);
        let pts = match axis {
            ProjAxis::X => [
                ProjPt3::new(coord, c0[1], c0[2], 1.0),
                ProjPt3::new(coord, c7[1], c0[2], 1.0),
                ProjPt3::new(coord, c7[1], c7[2], 1.0),
                ProjPt3::new(coord, c0[1], c7[2], 1.0),
            ],
            ProjAxis::Y => [
                ProjPt3::new(c0[0], coord, c0[2], 1.0),
                ProjPt3::new(c7[0], coord, c0[2], 1.0),
                ProjPt3::new(c7[0], coord, c7[2], 1.0),
                ProjPt3::new(c0[0], coord, c7[2], 1.0),
            ],
            _ => [
                ProjPt3::new(c7[0], c7[1], coord, 1.0),
                ProjPt3::new(c7[0], c0[1], coord, 1.0),
                ProjPt3::new(c0[0], c0[1], coord, 1.0),
                ProjPt3::new(c0[0], c7[1], coord, 1.0),
            ],
        };
        Some(pts.map(|p| tmat.image_affine(&p)))
    }

    /// Move corner `id` so that it appears at `new_pos`.
    ///
    /// Without `Z` in `movement` the corner slides in its own z plane and
    /// only the x/y coordinates it owns change; with `constrained` set the
    /// position snaps to the box's construction lines. With `Z` the corner
    /// slides along its z perspective line. A drag target with no preimage
    /// leaves the box unchanged.
    pub fn set_corner(
        &mut self,
        tmat: &TransfMat3x4,
        id: u8,
        new_pos: Point2,
        movement: AxisMask,
        constrained: bool,
        session: &mut DragSession,
    ) -> Result<()> {
        check_movement(movement)?;
        if id > 7 {
            return Err(Persp3dError::InvalidCorner(id));
        }
        self.corner0.normalize();
        self.corner7.normalize();
        let corner = AxisMask::from_bits(id);

        if !movement.contains(AxisMask::Z) {
            let z = if corner.contains(AxisMask::Z) {
                self.corner7[ProjAxis::Z]
            } else {
                self.corner0[ProjAxis::Z]
            };
            let mut pt = tmat.preimage(&new_pos, z, ProjAxis::Z);
            if constrained {
                let start = proj_corner_from(id, &self.save_corner0, &self.save_corner7);
                pt = snap(
                    tmat,
                    &self.save_corner0,
                    &self.save_corner7,
                    SnapTarget::Corner(id),
                    &pt,
                    &start,
                    session,
                );
            }
            if !pt.normalize() || !pt.is_finite() {
                warn!(box_id = %self.id, corner = id, "corner drag target has no preimage");
                return Ok(());
            }

            let (s0, s7) = (self.save_corner0, self.save_corner7);
            let (moves_x, moves_y) = (corner.contains(AxisMask::X), corner.contains(AxisMask::Y));
            self.corner0 = ProjPt3::new(
                if moves_x { s0[0] } else { pt[0] },
                if moves_y { s0[1] } else { pt[1] },
                s0[2],
                1.0,
            );
            self.corner7 = ProjPt3::new(
                if moves_x { pt[0] } else { s7[0] },
                if moves_y { pt[1] } else { s7[1] },
                s7[2],
                1.0,
            );
        } else {
            let start = proj_corner_from(id, &self.save_corner0, &self.save_corner7);
            let pl = PerspectiveLine::new(tmat.image_affine(&start), ProjAxis::Z, tmat);
            let snapped = pl.closest_to(&new_pos);
            let known = if movement.contains(AxisMask::Y) {
                ProjAxis::X
            } else {
                ProjAxis::Y
            };
            let mut pt = tmat.preimage(&snapped, self.proj_corner(id)[known], known);
            if !pt.normalize() || !pt.is_finite() {
                warn!(box_id = %self.id, corner = id, "corner drag target has no preimage");
                return Ok(());
            }

            let c0_x = !corner.contains(AxisMask::X) && movement.contains(AxisMask::X);
            let c0_y = !corner.contains(AxisMask::Y) && movement.contains(AxisMask::Y);
            let c7_x = corner.contains(AxisMask::X) && movement.contains(AxisMask::X);
            let c7_y = corner.contains(AxisMask::Y) && movement.contains(AxisMask::Y);
            let on_rear = corner.contains(AxisMask::Z);
            let (c0, c7) = (self.corner0, self.corner7);
            self.corner0 = ProjPt3::new(
                if c0_x { pt[0] } else { c0[0] },
                if c0_y { pt[1] } else { c0[1] },
                if on_rear { c0[2] } else { pt[2] },
                1.0,
            );
            self.corner7 = ProjPt3::new(
                if c7_x { pt[0] } else { c7[0] },
                if c7_y { pt[1] } else { c7[1] },
                if on_rear { pt[2] } else { c7[2] },
                1.0,
            );
        }
        Ok(())
    }

    /// Move the whole box so that its center follows the pointer from
    /// `old_pos` to `new_pos`, keeping its extent.
    pub fn set_center(
        &mut self,
        tmat: &TransfMat3x4,
        new_pos: Point2,
        old_pos: Point2,
        movement: AxisMask,
        constrained: bool,
        session: &mut DragSession,
    ) -> Result<()> {
        check_movement(movement)?;
        let (c0, c7) = (self.corner0, self.corner7);

        if !movement.contains(AxisMask::Z) {
            let coord = (c0[2] + c7[2]) / 2.0;
            let rad_x = (c7[0] - c0[0]) / 2.0;
            let rad_y = (c7[1] - c0[1]) / 2.0;

            let mut pt = tmat.preimage(&new_pos, coord, ProjAxis::Z);
            if constrained {
                let start = tmat.preimage(&old_pos, coord, ProjAxis::Z);
                pt = snap(
                    tmat,
                    &self.save_corner0,
                    &self.save_corner7,
                    SnapTarget::Center,
                    &pt,
                    &start,
                    session,
                );
            }
            if !pt.normalize() || !pt.is_finite() {
                warn!(box_id = %self.id, "center drag target has no preimage");
                return Ok(());
            }

            let (mx, my) = (movement.contains(AxisMask::X), movement.contains(AxisMask::Y));
            self.corner0 = ProjPt3::new(
                if mx { pt[0] - rad_x } else { c0[0] },
                if my { pt[1] - rad_y } else { c0[1] },
                c0[2],
                1.0,
            );
            self.corner7 = ProjPt3::new(
                if mx { pt[0] + rad_x } else { c7[0] },
                if my { pt[1] + rad_y } else { c7[1] },
                c7[2],
                1.0,
            );
        } else {
            let coord = (c0[0] + c7[0]) / 2.0;
            let rad_z = (c7[2] - c0[2]) / 2.0;

            let pl = PerspectiveLine::new(old_pos, ProjAxis::Z, tmat);
            let snapped = pl.closest_to(&new_pos);
            let mut pt = tmat.preimage(&snapped, coord, ProjAxis::X);
            if !pt.normalize() || !pt.is_finite() {
                warn!(box_id = %self.id, "center drag target has no preimage");
                return Ok(());
            }

            self.corner0 = ProjPt3::new(c0[0], c0[1], pt[2] - rad_z, 1.0);
            self.corner7 = ProjPt3::new(c7[0], c7[1], pt[2] + rad_z, 1.0);
        }
        Ok(())
    }

    fn swap_coords(&mut self, axis: ProjAxis, smaller: bool) {
        self.corner0.normalize();
        self.corner7.normalize();
        if (self.corner0[axis] < self.corner7[axis]) != smaller {
            let tmp = self.corner0[axis];
            self.corner0[axis] = self.corner7[axis];
            self.corner7[axis] = tmp;
        }
    }

    /// Bring the corners into canonical order: corner0 not below corner7
    /// in x and y, and below corner7 in z.
    pub fn relabel_corners(&mut self) {
        self.swap_coords(ProjAxis::X, false);
        self.swap_coords(ProjAxis::Y, false);
        self.swap_coords(ProjAxis::Z, true);
    }

    /// Axes along which the corners are out of canonical order.
    pub fn everted_directions(&self) -> AxisMask {
        let c0 = self.corner0.normalized();
        let c7 = self.corner7.normalized();
        let mut ev = AxisMask::NONE;
        if c0[0] < c7[0] {
            ev = ev ^ AxisMask::X;
        }
        if c0[1] < c7[1] {
            ev = ev ^ AxisMask::Y;
        }
        if c0[2] > c7[2] {
            ev = ev ^ AxisMask::Z;
        }
        ev
    }

    /// Current face order, top first.
    pub fn z_orders(&self) -> Option<&ZOrder> {
        self.z_orders.as_ref()
    }

    /// Recompute the face order. Returns whether it differs from the stored
    /// one.
    pub fn recompute_z_orders(&mut self, tmat: &TransfMat3x4, strategy: ZOrderStrategy) -> bool {
        let order = zorder::compute_z_orders(self, tmat, strategy);
        if self.z_orders.as_ref() == Some(&order) {
            return false;
        }
        self.z_orders = Some(order);
        true
    }

    /// Recompute the face order and, if it changed, restack the sides so
    /// that the first face in the order ends up on top.
    pub fn set_z_orders(&mut self, tmat: &TransfMat3x4, strategy: ZOrderStrategy) -> bool {
        if !self.recompute_z_orders(tmat, strategy) {
            return false;
        }
        if let Some(order) = self.z_orders {
            for slot in order {
                self.lower_to_bottom(slot);
            }
            trace!(box_id = %self.id, ?order, "sides restacked");
        }
        true
    }

    /// Recompute the shape of every side. Returns how many were updated.
    pub fn position_set(&mut self, tmat: &TransfMat3x4) -> usize {
        let (c0, c7) = (self.corner0, self.corner7);
        self.sides
            .iter_mut()
            .map(|side| side.recompute_shape(&c0, &c7, tmat))
            .filter(|ok| *ok)
            .count()
    }

    /// Side shapes plus face order.
    pub fn update_repr(&mut self, tmat: &TransfMat3x4, strategy: ZOrderStrategy) {
        self.position_set(tmat);
        self.set_z_orders(tmat, strategy);
    }
}
