//! Face painting order.
//!
//! Which faces of a box are visible, and in which order they have to be
//! painted, follows from where the vanishing points lie as seen from the
//! box's reference corner (corner 3). The analysis here sorts the
//! configuration into a [`ZOrderCase`] and each case selects one of a fixed
//! set of face orders. Orders are arrays of face slots, top first.
//!
//! Two analyses are available:
//!
//! - the sector heuristics split on how many vanishing points are finite and
//!   then on which axis direction lies between the other two at corner 3
//!   (the "central" axis), refined by sector tests;
//! - the vanishing-triangle analysis (all vanishing points finite) finds the
//!   central axis as the one whose half-line from corner 3 crosses the line
//!   joining the other two vanishing points.
//!
//! Independently of the case, faces are swapped back for every axis along
//! which the box is everted.

use persp3d_math::{
    determinant, half_line_crosses_joining_line, lies_in_sector, AxisMask, Line, Point2, ProjAxis,
    TransfMat3x4,
};
use tracing::debug;

use crate::box3d::Box3D;
use crate::face::{slot_plane, FACE_COUNT};
use crate::perspective::pl_dir_from_pt;
use crate::perspective_line::PerspectiveLine;
use crate::settings::ZOrderStrategy;

/// Face slots from top (painted last) to bottom.
pub type ZOrder = [usize; FACE_COUNT];

// All vanishing points infinite.
const PARALLEL_X: ZOrder = [2, 0, 4, 1, 3, 5];
const PARALLEL_X_SWAPPED: ZOrder = [3, 1, 5, 2, 4, 0];
const PARALLEL_Y: ZOrder = [2, 3, 1, 4, 0, 5];
const PARALLEL_Y_SWAPPED: ZOrder = [5, 0, 4, 1, 3, 2];
const PARALLEL_Z: ZOrder = [2, 0, 1, 4, 3, 5];
const PARALLEL_Z_SWAPPED: ZOrder = [5, 3, 4, 1, 0, 2];
const PARALLEL_NONE: ZOrder = [2, 3, 4, 1, 0, 5];
const PARALLEL_NONE_SWAPPED: ZOrder = [5, 0, 1, 4, 3, 2];

// One finite vanishing point.
const ONE_X: ZOrder = [2, 4, 0, 1, 3, 5];
const ONE_X_SWAPPED: ZOrder = [5, 3, 1, 0, 2, 4];
const ONE_Y_TOWARD: ZOrder = [1, 2, 3, 0, 5, 4];
const ONE_Y: ZOrder = [2, 3, 1, 5, 0, 4];
const ONE_Z_BESIDE: ZOrder = [2, 1, 3, 0, 4, 5];
const ONE_Z_BESIDE_SWAPPED: ZOrder = [5, 3, 4, 0, 1, 2];
const ONE_Z: ZOrder = [0, 1, 2, 5, 4, 3];
const ONE_Z_SWAPPED: ZOrder = [5, 3, 4, 0, 2, 1];
const ONE_NONE: ZOrder = [2, 3, 4, 5, 0, 1];
const ONE_NONE_SWAPPED: ZOrder = [5, 0, 1, 3, 2, 4];

// Two or three finite vanishing points.
const SEVERAL_X_XY: ZOrder = [2, 4, 0, 5, 1, 3];
const SEVERAL_X_SWAPPED_YZ: ZOrder = [3, 1, 5, 0, 2, 4];
const SEVERAL_X_SWAPPED: ZOrder = [1, 3, 5, 0, 2, 4];
const SEVERAL_Y_YZ: ZOrder = [2, 3, 1, 0, 5, 4];
const SEVERAL_Z_ZY: ZOrder = [2, 1, 0, 4, 3, 5];
const SEVERAL_Z_XY: ZOrder = [2, 1, 0, 5, 4, 3];
const SEVERAL_Z: ZOrder = [2, 0, 1, 5, 3, 4];

// Vanishing triangle.
const TRIANGLE_X_CROSSED: ZOrder = [2, 1, 0, 4, 5, 3];
const TRIANGLE_Y_CROSSED: ZOrder = [2, 1, 3, 0, 5, 4];
const TRIANGLE_Z_CROSSED: ZOrder = [2, 1, 0, 5, 3, 4];
const TRIANGLE_Z: ZOrder = [2, 1, 0, 3, 4, 5];

/// Where a point lies relative to the sector between two perspective lines
/// of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorPosition {
    /// Not between the lines.
    Outside,
    /// Between the lines, on the vanishing point's side of the box edge
    /// (always the case for a finite vanishing point).
    TowardVp,
    /// Between parallel lines, on the far side of the box edge.
    AwayFromVp,
}

impl SectorPosition {
    /// `0`, `1` or `-1`.
    pub fn signum(self) -> i8 {
        match self {
            SectorPosition::Outside => 0,
            SectorPosition::TowardVp => 1,
            SectorPosition::AwayFromVp => -1,
        }
    }

    /// Whether the point lies between the lines at all.
    pub fn is_inside(self) -> bool {
        self != SectorPosition::Outside
    }
}

/// Sector position of each vanishing point with respect to the perspective
/// lines of another axis. `xy` is the X vanishing point against the Y lines
/// through corners 3 and 3 ^ Z, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VpSectors {
    /// X against Y.
    pub xy: SectorPosition,
    /// X against Z.
    pub xz: SectorPosition,
    /// Y against X.
    pub yx: SectorPosition,
    /// Y against Z.
    pub yz: SectorPosition,
    /// Z against X.
    pub zx: SectorPosition,
    /// Z against Y.
    pub zy: SectorPosition,
}

impl Default for VpSectors {
    fn default() -> Self {
        Self {
            xy: SectorPosition::Outside,
            xz: SectorPosition::Outside,
            yx: SectorPosition::Outside,
            yz: SectorPosition::Outside,
            zx: SectorPosition::Outside,
            zy: SectorPosition::Outside,
        }
    }
}

/// A classified vanishing-point configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrderCase {
    /// No finite vanishing point.
    AllInfinite {
        /// Central axis at corner 3, or `NONE`.
        central: AxisMask,
        /// Whether the X and Y directions are swapped on screen.
        swapped: bool,
    },
    /// Exactly one finite vanishing point.
    OneFinite {
        /// Central axis at corner 3, or `NONE`.
        central: AxisMask,
        /// Whether the X and Y directions are swapped on screen.
        swapped: bool,
        /// The finite vanishing point against the lines of the first
        /// remaining axis.
        inside1: SectorPosition,
        /// The finite vanishing point against the lines of the second
        /// remaining axis.
        inside2: SectorPosition,
    },
    /// Two or three finite vanishing points.
    SeveralFinite {
        /// Central axis at corner 3, or `NONE`.
        central: AxisMask,
        /// Whether the X and Y directions are swapped on screen.
        swapped: bool,
        /// Sector tests of every vanishing point.
        sectors: VpSectors,
    },
    /// All three vanishing points finite, analysed through the triangle they
    /// span.
    VanishingTriangle {
        /// Axis whose half-line from corner 3 crosses the opposite side, or
        /// `NONE`.
        central: AxisMask,
        /// Direction of the box edge at corner 3 crossed by a line between
        /// two vanishing points, if any.
        crossed_edge: Option<AxisMask>,
    },
}

impl ZOrderCase {
    /// Classify the configuration of `bx` under `tmat`.
    pub fn classify(bx: &Box3D, tmat: &TransfMat3x4, strategy: ZOrderStrategy) -> Self {
        let all_finite = ProjAxis::SPATIAL.iter().all(|a| tmat.has_finite_image(*a));
        if strategy == ZOrderStrategy::VanishingTriangle && all_finite {
            return classify_triangle(bx, tmat);
        }

        let c3 = bx.corner_screen(3, tmat);
        let finite: Vec<ProjAxis> = ProjAxis::SPATIAL
            .into_iter()
            .filter(|a| tmat.has_finite_image(*a))
            .collect();
        let central = central_axis(tmat, c3);
        let swapped = xy_axes_swapped(tmat, c3);

        match finite.as_slice() {
            [] => ZOrderCase::AllInfinite { central, swapped },
            [fin] => {
                let fin_mask = AxisMask::from(*fin);
                let (o1, o2) = fin_mask
                    .remaining_axes()
                    .unwrap_or((AxisMask::NONE, AxisMask::NONE));
                let vp = tmat.column(*fin).affine();
                ZOrderCase::OneFinite {
                    central,
                    swapped,
                    inside1: pt_lies_in_pl_sector(bx, tmat, vp, 3, 3 ^ o2.bits(), o1),
                    inside2: pt_lies_in_pl_sector(bx, tmat, vp, 3, 3 ^ o1.bits(), o2),
                }
            }
            _ => {
                let sector = |vp: ProjAxis, edge: AxisMask, axis: AxisMask| {
                    vp_lies_in_pl_sector(bx, tmat, vp, 3, 3 ^ edge.bits(), axis)
                };
                ZOrderCase::SeveralFinite {
                    central,
                    swapped,
                    sectors: VpSectors {
                        xy: sector(ProjAxis::X, AxisMask::Z, AxisMask::Y),
                        xz: sector(ProjAxis::X, AxisMask::Y, AxisMask::Z),
                        yx: sector(ProjAxis::Y, AxisMask::Z, AxisMask::X),
                        yz: sector(ProjAxis::Y, AxisMask::X, AxisMask::Z),
                        zx: sector(ProjAxis::Z, AxisMask::Y, AxisMask::X),
                        zy: sector(ProjAxis::Z, AxisMask::X, AxisMask::Y),
                    },
                }
            }
        }
    }

    /// The face order selected by this case, before eversion correction.
    pub fn permutation(&self) -> ZOrder {
        use SectorPosition::{AwayFromVp, TowardVp};

        match *self {
            ZOrderCase::AllInfinite { central, swapped } => match (central, swapped) {
                (AxisMask::X, false) => PARALLEL_X,
                (AxisMask::X, true) => PARALLEL_X_SWAPPED,
                (AxisMask::Y, false) => PARALLEL_Y,
                (AxisMask::Y, true) => PARALLEL_Y_SWAPPED,
                (AxisMask::Z, false) => PARALLEL_Z,
                (AxisMask::Z, true) => PARALLEL_Z_SWAPPED,
                (_, false) => PARALLEL_NONE,
                (_, true) => PARALLEL_NONE_SWAPPED,
            },

            ZOrderCase::OneFinite {
                central,
                swapped,
                inside1,
                inside2,
            } => match central {
                AxisMask::X if swapped => ONE_X_SWAPPED,
                AxisMask::X => ONE_X,
                AxisMask::Y => match inside2 {
                    TowardVp => ONE_Y_TOWARD,
                    AwayFromVp => PARALLEL_Y,
                    _ if swapped => PARALLEL_Y_SWAPPED,
                    _ => ONE_Y,
                },
                AxisMask::Z => {
                    if inside2.is_inside() {
                        if swapped {
                            ONE_Z_BESIDE_SWAPPED
                        } else {
                            ONE_Z_BESIDE
                        }
                    } else if inside1.is_inside() {
                        if swapped {
                            PARALLEL_Z_SWAPPED
                        } else {
                            PARALLEL_Z
                        }
                    } else if swapped {
                        ONE_Z_SWAPPED
                    } else {
                        ONE_Z
                    }
                }
                _ if swapped => ONE_NONE_SWAPPED,
                _ => ONE_NONE,
            },

            ZOrderCase::SeveralFinite {
                central,
                swapped,
                sectors,
            } => match central {
                AxisMask::X if swapped => {
                    if sectors.yz == AwayFromVp {
                        SEVERAL_X_SWAPPED_YZ
                    } else {
                        SEVERAL_X_SWAPPED
                    }
                }
                AxisMask::X => {
                    if sectors.zy == AwayFromVp {
                        ONE_X
                    } else if sectors.xy == TowardVp {
                        SEVERAL_X_XY
                    } else {
                        ONE_X
                    }
                }
                AxisMask::Y if swapped => PARALLEL_Y_SWAPPED,
                AxisMask::Y => {
                    if sectors.yz == TowardVp {
                        SEVERAL_Y_YZ
                    } else {
                        ONE_Y
                    }
                }
                AxisMask::Z if swapped => PARALLEL_Z_SWAPPED,
                AxisMask::Z => {
                    if sectors.zy == TowardVp {
                        SEVERAL_Z_ZY
                    } else if sectors.xy == AwayFromVp {
                        SEVERAL_Z_XY
                    } else {
                        SEVERAL_Z
                    }
                }
                _ if swapped => PARALLEL_NONE_SWAPPED,
                _ => PARALLEL_NONE,
            },

            ZOrderCase::VanishingTriangle {
                central,
                crossed_edge,
            } => match (central, crossed_edge) {
                (AxisMask::X, Some(_)) => TRIANGLE_X_CROSSED,
                (AxisMask::X, None) => SEVERAL_X_XY,
                (AxisMask::Y, Some(_)) => TRIANGLE_Y_CROSSED,
                (AxisMask::Y, None) => ONE_Y,
                (AxisMask::Z, Some(AxisMask::Y)) => PARALLEL_Z,
                (AxisMask::Z, Some(_)) => TRIANGLE_Z_CROSSED,
                (AxisMask::Z, None) => TRIANGLE_Z,
                _ => PARALLEL_NONE,
            },
        }
    }
}

fn classify_triangle(bx: &Box3D, tmat: &TransfMat3x4) -> ZOrderCase {
    let vpx = tmat.column(ProjAxis::X).affine();
    let vpy = tmat.column(ProjAxis::Y).affine();
    let vpz = tmat.column(ProjAxis::Z).affine();
    let c3 = bx.corner_screen(3, tmat);

    let central = if half_line_crosses_joining_line(&c3, &vpx, &vpy, &vpz) {
        AxisMask::X
    } else if half_line_crosses_joining_line(&c3, &vpy, &vpz, &vpx) {
        AxisMask::Y
    } else if half_line_crosses_joining_line(&c3, &vpz, &vpx, &vpy) {
        AxisMask::Z
    } else {
        AxisMask::NONE
    };

    let crosses_edge = |a: &Point2, b: &Point2, edge: AxisMask| {
        let other = bx.corner_screen(3 ^ edge.bits(), tmat);
        half_line_crosses_joining_line(a, b, &c3, &other).then_some(edge)
    };
    let crossed_edge = match central {
        AxisMask::X => crosses_edge(&vpz, &vpx, AxisMask::Y),
        AxisMask::Y => crosses_edge(&vpz, &vpy, AxisMask::X),
        AxisMask::Z => crosses_edge(&vpx, &vpz, AxisMask::Y)
            .or_else(|| crosses_edge(&vpx, &vpy, AxisMask::Z)),
        _ => None,
    };
    ZOrderCase::VanishingTriangle {
        central,
        crossed_edge,
    }
}

/// The axis whose perspective-line direction at `c3` lies between the other
/// two, or `NONE`.
pub fn central_axis(tmat: &TransfMat3x4, c3: Point2) -> AxisMask {
    let dirs = ProjAxis::SPATIAL.map(|a| pl_dir_from_pt(tmat, c3, a));
    if lies_in_sector(&dirs[0], &dirs[1], &dirs[2]) {
        AxisMask::Z
    } else if lies_in_sector(&dirs[1], &dirs[2], &dirs[0]) {
        AxisMask::X
    } else if lies_in_sector(&dirs[2], &dirs[0], &dirs[1]) {
        AxisMask::Y
    } else {
        AxisMask::NONE
    }
}

/// Whether the X and Y perspective lines through `c3` turn clockwise on
/// screen (positive cross product of their directions).
pub fn xy_axes_swapped(tmat: &TransfMat3x4, c3: Point2) -> bool {
    let v1 = PerspectiveLine::new(c3, ProjAxis::X, tmat).direction();
    let v2 = PerspectiveLine::new(c3, ProjAxis::Y, tmat).direction();
    determinant(&v1, &v2) > 0.0
}

/// Position of `pt` relative to the sector formed by the perspective lines
/// of `axis` through corners `id1` and `id2`.
///
/// For a finite vanishing point the sector is the angle at the vanishing
/// point. For an infinite one it is the strip between the two parallel
/// lines, and the box edge from `id1` to `id2` tells whether `pt` lies
/// toward or away from the vanishing direction.
pub fn pt_lies_in_pl_sector(
    bx: &Box3D,
    tmat: &TransfMat3x4,
    pt: Point2,
    id1: u8,
    id2: u8,
    axis: AxisMask,
) -> SectorPosition {
    let Some(proj_axis) = axis.to_proj() else {
        return SectorPosition::Outside;
    };
    let c1 = bx.corner_screen(id1, tmat);
    let c2 = bx.corner_screen(id2, tmat);

    let vp = tmat.column(proj_axis);
    if vp.is_finite() {
        let vp = vp.affine();
        if lies_in_sector(&(c1 - vp), &(c2 - vp), &(pt - vp)) {
            SectorPosition::TowardVp
        } else {
            SectorPosition::Outside
        }
    } else {
        let pl1 = PerspectiveLine::new(c1, proj_axis, tmat);
        let pl2 = PerspectiveLine::new(c2, proj_axis, tmat);
        if !(pl1.lie_on_same_side(&pt, &c2) && pl2.lie_on_same_side(&pt, &c1)) {
            return SectorPosition::Outside;
        }
        let edge = Line::through(c1, c2);
        let beyond = bx.corner_screen(id1 ^ axis.bits(), tmat);
        if edge.lie_on_same_side(&pt, &beyond) {
            SectorPosition::TowardVp
        } else {
            SectorPosition::AwayFromVp
        }
    }
}

/// [`pt_lies_in_pl_sector`] for the vanishing point of `vp_axis`; an
/// infinite vanishing point is always outside.
pub fn vp_lies_in_pl_sector(
    bx: &Box3D,
    tmat: &TransfMat3x4,
    vp_axis: ProjAxis,
    id1: u8,
    id2: u8,
    axis: AxisMask,
) -> SectorPosition {
    let vp = tmat.column(vp_axis);
    if !vp.is_finite() {
        return SectorPosition::Outside;
    }
    pt_lies_in_pl_sector(bx, tmat, vp.affine(), id1, id2, axis)
}

/// Exchange the two faces orthogonal to `axis`.
pub fn swap_sides(order: &mut ZOrder, axis: AxisMask) {
    let mut positions = order
        .iter()
        .enumerate()
        .filter(|(_, slot)| !slot_plane(**slot).intersects(axis))
        .map(|(i, _)| i);
    if let (Some(a), Some(b)) = (positions.next(), positions.next()) {
        order.swap(a, b);
    }
}

/// Face order of `bx` under `tmat`, corrected for eversion.
pub fn compute_z_orders(bx: &Box3D, tmat: &TransfMat3x4, strategy: ZOrderStrategy) -> ZOrder {
    let case = ZOrderCase::classify(bx, tmat, strategy);
    let mut order = case.permutation();
    let everted = bx.everted_directions();
    for axis in everted.axes() {
        swap_sides(&mut order, axis);
    }
    debug!(box_id = bx.id(), ?case, %everted, ?order, "z-order case selected");
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use persp3d_math::{ProjPt2, ProjPt3};
    use std::collections::HashSet;

    const TABLES: [ZOrder; 29] = [
        PARALLEL_X,
        PARALLEL_X_SWAPPED,
        PARALLEL_Y,
        PARALLEL_Y_SWAPPED,
        PARALLEL_Z,
        PARALLEL_Z_SWAPPED,
        PARALLEL_NONE,
        PARALLEL_NONE_SWAPPED,
        ONE_X,
        ONE_X_SWAPPED,
        ONE_Y_TOWARD,
        ONE_Y,
        ONE_Z_BESIDE,
        ONE_Z_BESIDE_SWAPPED,
        ONE_Z,
        ONE_Z_SWAPPED,
        ONE_NONE,
        ONE_NONE_SWAPPED,
        SEVERAL_X_XY,
        SEVERAL_X_SWAPPED_YZ,
        SEVERAL_X_SWAPPED,
        SEVERAL_Y_YZ,
        SEVERAL_Z_ZY,
        SEVERAL_Z_XY,
        SEVERAL_Z,
        TRIANGLE_X_CROSSED,
        TRIANGLE_Y_CROSSED,
        TRIANGLE_Z_CROSSED,
        TRIANGLE_Z,
    ];

    const CENTRALS: [AxisMask; 4] = [AxisMask::X, AxisMask::Y, AxisMask::Z, AxisMask::NONE];
    const POSITIONS: [SectorPosition; 3] = [
        SectorPosition::Outside,
        SectorPosition::TowardVp,
        SectorPosition::AwayFromVp,
    ];

    fn is_permutation(order: &ZOrder) -> bool {
        let mut sorted = *order;
        sorted.sort_unstable();
        sorted == [0, 1, 2, 3, 4, 5]
    }

    fn every_case() -> Vec<ZOrderCase> {
        let mut cases = Vec::new();
        for central in CENTRALS {
            for swapped in [false, true] {
                cases.push(ZOrderCase::AllInfinite { central, swapped });
                for inside1 in POSITIONS {
                    for inside2 in POSITIONS {
                        cases.push(ZOrderCase::OneFinite {
                            central,
                            swapped,
                            inside1,
                            inside2,
                        });
                    }
                }
                for xy in POSITIONS {
                    for yz in POSITIONS {
                        for zy in POSITIONS {
                            let sectors = VpSectors {
                                xy,
                                yz,
                                zy,
                                ..VpSectors::default()
                            };
                            cases.push(ZOrderCase::SeveralFinite {
                                central,
                                swapped,
                                sectors,
                            });
                        }
                    }
                }
            }
            for crossed_edge in [None, Some(AxisMask::X), Some(AxisMask::Y), Some(AxisMask::Z)] {
                cases.push(ZOrderCase::VanishingTriangle {
                    central,
                    crossed_edge,
                });
            }
        }
        cases
    }

    #[test]
    fn test_every_table_is_a_permutation_and_reachable() {
        for table in &TABLES {
            assert!(is_permutation(table), "{table:?}");
        }
        let reached: HashSet<ZOrder> = every_case().iter().map(ZOrderCase::permutation).collect();
        for table in &TABLES {
            assert!(reached.contains(table), "unreachable table {table:?}");
        }
        assert_eq!(reached.len(), TABLES.len());
    }

    #[test]
    fn test_swap_sides_exchanges_orthogonal_faces() {
        let mut order = PARALLEL_NONE;
        swap_sides(&mut order, AxisMask::X);
        // slots 0 and 1 are the YZ faces
        assert_eq!(order, [2, 3, 4, 0, 1, 5]);
        swap_sides(&mut order, AxisMask::Z);
        assert_eq!(order, [2, 3, 5, 0, 1, 4]);
        swap_sides(&mut order, AxisMask::Y);
        assert_eq!(order, [3, 2, 5, 0, 1, 4]);
        assert!(is_permutation(&order));
    }

    fn matrix(vps: [ProjPt2; 3], origin: ProjPt2) -> TransfMat3x4 {
        TransfMat3x4::from_points(vps[0], vps[1], vps[2], origin)
    }

    fn pt3(x: f64, y: f64, z: f64) -> ProjPt3 {
        ProjPt3::new(x, y, z, 1.0)
    }

    #[test]
    fn test_axonometric_case() {
        let m = matrix(
            [
                ProjPt2::new(1.0, 0.0, 0.0),
                ProjPt2::new(0.0, 1.0, 0.0),
                ProjPt2::new(1.0, 1.0, 0.0),
            ],
            ProjPt2::new(100.0, 100.0, 1.0),
        );
        let bx = Box3D::new("b", pt3(10.0, 10.0, 0.0), pt3(0.0, 0.0, 10.0));
        let case = ZOrderCase::classify(&bx, &m, ZOrderStrategy::SectorHeuristics);
        assert_eq!(
            case,
            ZOrderCase::AllInfinite {
                central: AxisMask::Z,
                swapped: true
            }
        );
        assert_eq!(compute_z_orders(&bx, &m, ZOrderStrategy::SectorHeuristics), PARALLEL_Z_SWAPPED);
    }

    #[test]
    fn test_finite_count_selects_case() {
        let bx = Box3D::new("b", pt3(10.0, 10.0, 0.0), pt3(0.0, 0.0, 10.0));
        let origin = ProjPt2::new(100.0, 100.0, 1.0);
        let one = matrix(
            [
                ProjPt2::new(-1.0, 0.2, 0.0),
                ProjPt2::new(500.0, 300.0, 1.0),
                ProjPt2::new(0.0, 1.0, 0.0),
            ],
            origin,
        );
        assert!(matches!(
            ZOrderCase::classify(&bx, &one, ZOrderStrategy::SectorHeuristics),
            ZOrderCase::OneFinite { .. }
        ));
        let three = matrix(
            [
                ProjPt2::new(-400.0, 100.0, 1.0),
                ProjPt2::new(500.0, 900.0, 1.0),
                ProjPt2::new(900.0, 50.0, 1.0),
            ],
            origin,
        );
        assert!(matches!(
            ZOrderCase::classify(&bx, &three, ZOrderStrategy::SectorHeuristics),
            ZOrderCase::SeveralFinite { .. }
        ));
        assert!(matches!(
            ZOrderCase::classify(&bx, &three, ZOrderStrategy::VanishingTriangle),
            ZOrderCase::VanishingTriangle { .. }
        ));
        // the triangle analysis needs three finite vanishing points
        assert!(matches!(
            ZOrderCase::classify(&bx, &one, ZOrderStrategy::VanishingTriangle),
            ZOrderCase::OneFinite { .. }
        ));
    }

    #[test]
    fn test_vanishing_triangle_central_axis() {
        let vps = [
            ProjPt2::new(0.0, 0.0, 1.0),
            ProjPt2::new(1000.0, 0.0, 1.0),
            ProjPt2::new(500.0, 800.0, 1.0),
        ];
        // a box collapsed onto the origin image
        let bx = Box3D::new("b", pt3(0.0, 0.0, 0.0), pt3(0.0, 0.0, 0.0));

        let inside = matrix(vps, ProjPt2::new(500.0, 300.0, 1.0));
        assert_eq!(
            ZOrderCase::classify(&bx, &inside, ZOrderStrategy::VanishingTriangle),
            ZOrderCase::VanishingTriangle {
                central: AxisMask::NONE,
                crossed_edge: None
            }
        );

        let beyond_xy = matrix(vps, ProjPt2::new(500.0, -300.0, 1.0));
        let case = ZOrderCase::classify(&bx, &beyond_xy, ZOrderStrategy::VanishingTriangle);
        assert_eq!(
            case,
            ZOrderCase::VanishingTriangle {
                central: AxisMask::Z,
                crossed_edge: None
            }
        );
        assert_eq!(case.permutation(), TRIANGLE_Z);
    }

    #[test]
    fn test_end_to_end_mixed_perspective() {
        let m = matrix(
            [
                ProjPt2::new(1.0, 0.0, 0.0),
                ProjPt2::new(500.0, 300.0, 1.0),
                ProjPt2::new(0.0, 1.0, 0.0),
            ],
            ProjPt2::new(100.0, 100.0, 1.0),
        );
        assert!(!m.has_finite_image(ProjAxis::X));
        assert!(m.has_finite_image(ProjAxis::Y));
        assert!(!m.has_finite_image(ProjAxis::Z));

        let mut bx = Box3D::new("b", pt3(0.0, 0.0, 0.0), pt3(10.0, 10.0, 10.0));
        let p0 = bx.corner_screen(0, &m);
        let p7 = bx.corner_screen(7, &m);
        assert!(persp3d_math::is_finite_point(&p0));
        assert!(persp3d_math::is_finite_point(&p7));
        assert_ne!(p0, p7);

        assert!(bx.recompute_z_orders(&m, ZOrderStrategy::SectorHeuristics));
        assert!(is_permutation(bx.z_orders().unwrap()));
    }

    #[test]
    fn test_random_configurations_give_permutations() {
        let mut seed = 0x2545_f491_u32;
        let mut next = move || {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            f64::from(seed >> 8) / f64::from(1u32 << 24)
        };

        for _ in 0..400 {
            let mut vps = [ProjPt2::new(0.0, 0.0, 0.0); 3];
            for vp in &mut vps {
                let x = next() * 2000.0 - 1000.0;
                let y = next() * 2000.0 - 1000.0;
                *vp = if next() < 0.5 {
                    ProjPt2::new(x, y, 1.0)
                } else {
                    ProjPt2::new(x, y, 0.0)
                };
            }
            let m = matrix(vps, ProjPt2::new(next() * 800.0, next() * 800.0, 1.0));
            let mut bx = Box3D::new(
                "b",
                pt3(next() * 20.0 - 10.0, next() * 20.0 - 10.0, next() * 20.0 - 10.0),
                pt3(next() * 20.0 - 10.0, next() * 20.0 - 10.0, next() * 20.0 - 10.0),
            );
            for strategy in [ZOrderStrategy::SectorHeuristics, ZOrderStrategy::VanishingTriangle] {
                let order = compute_z_orders(&bx, &m, strategy);
                assert!(is_permutation(&order), "{order:?}");
            }

            // stable without geometry changes
            bx.recompute_z_orders(&m, ZOrderStrategy::SectorHeuristics);
            assert!(!bx.recompute_z_orders(&m, ZOrderStrategy::SectorHeuristics));
        }
    }

    #[test]
    fn test_eversion_swaps_orthogonal_faces() {
        let m = matrix(
            [
                ProjPt2::new(-400.0, 100.0, 1.0),
                ProjPt2::new(0.0, 1000.0, 0.0),
                ProjPt2::new(900.0, 50.0, 1.0),
            ],
            ProjPt2::new(300.0, 200.0, 1.0),
        );
        // corner0 and corner7 exchanged along x only
        let bx = Box3D::new("b", pt3(0.0, 10.0, 0.0), pt3(10.0, 0.0, 10.0));
        assert_eq!(bx.everted_directions(), AxisMask::X);

        let baseline = ZOrderCase::classify(&bx, &m, ZOrderStrategy::SectorHeuristics).permutation();
        let order = compute_z_orders(&bx, &m, ZOrderStrategy::SectorHeuristics);
        let pos = |o: &ZOrder, slot: usize| o.iter().position(|s| *s == slot);
        assert_eq!(pos(&order, 0), pos(&baseline, 1));
        assert_eq!(pos(&order, 1), pos(&baseline, 0));
        for slot in 2..6 {
            assert_eq!(pos(&order, slot), pos(&baseline, slot));
        }
    }

    #[test]
    fn test_sector_position_of_finite_vp() {
        let m = matrix(
            [
                ProjPt2::new(1000.0, 0.0, 1.0),
                ProjPt2::new(0.0, 1.0, 0.0),
                ProjPt2::new(0.0, 0.0, 0.0),
            ],
            ProjPt2::new(0.0, 0.0, 1.0),
        );
        // corners 3 and 1 differ in y; the X lines through them meet at (1000, 0)
        let bx = Box3D::new("b", pt3(0.0, 0.0, 0.0), pt3(100.0, 100.0, 0.0));
        let between = Point2::new(500.0, 10.0);
        let above = Point2::new(500.0, -10.0);
        assert_eq!(
            pt_lies_in_pl_sector(&bx, &m, between, 3, 1, AxisMask::X),
            SectorPosition::TowardVp
        );
        assert_eq!(
            pt_lies_in_pl_sector(&bx, &m, above, 3, 1, AxisMask::X),
            SectorPosition::Outside
        );
        assert_eq!(
            vp_lies_in_pl_sector(&bx, &m, ProjAxis::Y, 3, 1, AxisMask::X),
            SectorPosition::Outside
        );
        assert_eq!(SectorPosition::AwayFromVp.signum(), -1);
    }
}
