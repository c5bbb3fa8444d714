//! Constrained dragging.
//!
//! While a corner or the center of a box is dragged with the constraint
//! modifier, the pointer snaps to one of the box's construction lines in the
//! plane of the drag: the two edges through the start point and a diagonal
//! (both diagonals for center drags). Near the intersection of these lines
//! the previously chosen line is kept so the snapped point does not flicker
//! between them.

use persp3d_math::{is_finite_point, AxisMask, Line, Point2, ProjAxis, ProjPt3, TransfMat3x4};

use crate::settings::SceneSettings;

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapTarget {
    /// A corner, by id.
    Corner(u8),
    /// The box center.
    Center,
}

/// State carried across the motion events of one drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    remembered_snap: usize,
    threshold: f64,
    zoom: f64,
}

impl DragSession {
    /// Start a gesture.
    pub fn new(settings: &SceneSettings) -> Self {
        Self {
            remembered_snap: 0,
            threshold: settings.snap_threshold,
            zoom: settings.zoom,
        }
    }

    /// Index of the snap line chosen most recently.
    pub fn remembered_snap(&self) -> usize {
        self.remembered_snap
    }
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new(&SceneSettings::default())
    }
}

/// Snap `pt_proj` to the construction lines through `start_pt`.
///
/// The box extent is taken from the saved corners `save0`/`save7`. The result
/// lies in the plane `z = start_pt.z`. If the pointer has no screen image the
/// point is returned unchanged.
pub fn snap(
    tmat: &TransfMat3x4,
    save0: &ProjPt3,
    save7: &ProjPt3,
    target: SnapTarget,
    pt_proj: &ProjPt3,
    start_pt: &ProjPt3,
    session: &mut DragSession,
) -> ProjPt3 {
    let z = start_pt[ProjAxis::Z];
    let x = start_pt[ProjAxis::X];
    let y = start_pt[ProjAxis::Y];
    let dx = save7[ProjAxis::X] - save0[ProjAxis::X];
    let dy = save7[ProjAxis::Y] - save0[ProjAxis::Y];

    let screen = |px: f64, py: f64| tmat.image_affine(&ProjPt3::new(px, py, z, 1.0));
    let a = screen(x, y);
    let b = screen(x + dx, y);
    let c = screen(x + dx, y + dy);
    let d = screen(x, y + dy);
    let e = screen(x - dx, y + dy);
    let pt = tmat.image_affine(pt_proj);
    if !is_finite_point(&pt) {
        return *pt_proj;
    }

    let main_diagonal = match target {
        SnapTarget::Center => true,
        SnapTarget::Corner(id) => {
            let id = AxisMask::from_bits(id);
            id.contains(AxisMask::X) == id.contains(AxisMask::Y)
        }
    };
    let mut lines = vec![
        Line::through(a, b),
        Line::through(a, d),
        Line::through(a, if main_diagonal { c } else { e }),
    ];
    if target == SnapTarget::Center {
        lines.push(Line::through(a, e));
    }

    let snap_pts: Vec<Point2> = lines.iter().map(|l| l.closest_to(&pt)).collect();
    let dists: Vec<f64> = snap_pts
        .iter()
        .map(|s| (s - pt).norm() * session.zoom)
        .collect();

    let within_tolerance = dists.iter().all(|d| *d <= session.threshold);
    let closest = dists
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, d)| if *d < best.1 { (i, *d) } else { best })
        .0;

    let index = if within_tolerance && session.remembered_snap < snap_pts.len() {
        session.remembered_snap
    } else {
        session.remembered_snap = closest;
        closest
    };
    tmat.preimage(&snap_pts[index], z, ProjAxis::Z)
}
