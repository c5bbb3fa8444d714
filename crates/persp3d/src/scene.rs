//! The registry of perspectives and boxes.
//!
//! A [`Scene`] owns every [`Perspective`] and [`Box3D`] in slot maps. Boxes
//! refer to their perspective by key; each perspective lists its boxes. The
//! two sides of that relation are only ever changed together, inside
//! [`Scene::attach`] and [`Scene::detach`], so they cannot drift apart.
//!
//! Changes to a perspective's projection fan out explicitly to the boxes on
//! its membership list.

use persp3d_math::{Affine2, AxisMask, Point2, ProjAxis, ProjPt2, ProjPt3, TransfMat3x4};
use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::box3d::Box3D;
use crate::creation::BoxCreation;
use crate::error::{Persp3dError, Result};
use crate::keys::{BoxKey, PerspKey};
use crate::perspective::{Perspective, VpState};
use crate::reference::{href_for, parse_href, RefChange};
use crate::settings::SceneSettings;
use crate::snap::DragSession;

/// Perspectives, boxes and the links between them.
#[derive(Debug, Clone)]
pub struct Scene {
    settings: SceneSettings,
    perspectives: SlotMap<PerspKey, Perspective>,
    boxes: SlotMap<BoxKey, Box3D>,
    current: Option<PerspKey>,
    id_counter: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            settings: SceneSettings::default(),
            perspectives: SlotMap::with_key(),
            boxes: SlotMap::with_key(),
            current: None,
            id_counter: 0,
        }
    }
}

impl Scene {
    /// An empty scene with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty scene with the given settings.
    pub fn with_settings(settings: SceneSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    /// Scene settings.
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Replace the settings.
    pub fn set_settings(&mut self, settings: SceneSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        loop {
            self.id_counter += 1;
            let id = format!("{prefix}{}", self.id_counter);
            let taken = self.perspectives.values().any(|p| p.id() == id)
                || self.boxes.values().any(|b| b.id() == id);
            if !taken {
                return id;
            }
        }
    }

    /// Register a perspective with no attached boxes. The first one becomes
    /// the current perspective.
    pub fn insert_perspective(&mut self, mut persp: Perspective) -> PerspKey {
        persp.clear_boxes();
        let key = self.perspectives.insert(persp);
        if self.current.is_none() {
            self.current = Some(key);
        }
        key
    }

    /// Create a perspective with a generated id.
    pub fn add_perspective(&mut self, tmat: TransfMat3x4) -> PerspKey {
        let id = self.fresh_id("perspective");
        self.insert_perspective(Perspective::new(id, tmat))
    }

    /// Create the default perspective for the configured page size.
    pub fn add_default_perspective(&mut self) -> PerspKey {
        let id = self.fresh_id("perspective");
        let persp = Perspective::default_for_document(
            id,
            self.settings.document_width,
            self.settings.document_height,
        );
        self.insert_perspective(persp)
    }

    /// Copy the projection of `key` into a new perspective with no boxes.
    pub fn duplicate_perspective(&mut self, key: PerspKey) -> Result<PerspKey> {
        let tmat = *self.perspective_or_err(key)?.tmat();
        Ok(self.add_perspective(tmat))
    }

    /// Remove a perspective that has no attached boxes.
    pub fn remove_perspective(&mut self, key: PerspKey) -> Result<Perspective> {
        let persp = self.perspective_or_err(key)?;
        if persp.box_count() > 0 {
            return Err(Persp3dError::PerspectiveInUse(persp.id().to_string()));
        }
        if self.current == Some(key) {
            self.current = None;
        }
        self.perspectives
            .remove(key)
            .ok_or_else(|| Persp3dError::UnknownPerspective(format!("{key:?}")))
    }

    /// Drop every perspective without boxes, except the current one.
    pub fn remove_unused_perspectives(&mut self) -> usize {
        let current = self.current;
        let before = self.perspectives.len();
        self.perspectives
            .retain(|key, p| p.box_count() > 0 || Some(key) == current);
        let removed = before - self.perspectives.len();
        if removed > 0 {
            debug!(removed, "removed unused perspectives");
        }
        removed
    }

    /// A perspective by key.
    pub fn perspective(&self, key: PerspKey) -> Option<&Perspective> {
        self.perspectives.get(key)
    }

    fn perspective_or_err(&self, key: PerspKey) -> Result<&Perspective> {
        self.perspectives
            .get(key)
            .ok_or_else(|| Persp3dError::UnknownPerspective(format!("{key:?}")))
    }

    fn perspective_mut_or_err(&mut self, key: PerspKey) -> Result<&mut Perspective> {
        self.perspectives
            .get_mut(key)
            .ok_or_else(|| Persp3dError::UnknownPerspective(format!("{key:?}")))
    }

    /// Look a perspective up by document id.
    pub fn find_perspective(&self, id: &str) -> Option<PerspKey> {
        self.perspectives
            .iter()
            .find(|(_, p)| p.id() == id)
            .map(|(k, _)| k)
    }

    /// All perspectives.
    pub fn perspectives(&self) -> impl Iterator<Item = (PerspKey, &Perspective)> {
        self.perspectives.iter()
    }

    /// Number of perspectives.
    pub fn perspective_count(&self) -> usize {
        self.perspectives.len()
    }

    /// The perspective new boxes are drawn in.
    pub fn current_perspective(&self) -> Option<PerspKey> {
        self.current
    }

    /// Make `key` the current perspective.
    pub fn set_current_perspective(&mut self, key: PerspKey) -> Result<()> {
        self.perspective_or_err(key)?;
        self.current = Some(key);
        Ok(())
    }

    /// The current perspective, creating the default one if there is none.
    pub fn current_or_default(&mut self) -> PerspKey {
        match self.current {
            Some(key) if self.perspectives.contains_key(key) => key,
            _ => {
                let key = self.add_default_perspective();
                self.current = Some(key);
                key
            }
        }
    }

    /// Whether two perspectives project identically.
    pub fn perspectives_coincide(&self, a: PerspKey, b: PerspKey) -> Result<bool> {
        let pa = self.perspective_or_err(a)?;
        let pb = self.perspective_or_err(b)?;
        Ok(pa.coincides_with(pb))
    }

    /// Move every box of `other` onto `keep`. Both must coincide.
    pub fn absorb(&mut self, keep: PerspKey, other: PerspKey) -> Result<()> {
        if keep == other {
            return Ok(());
        }
        if !self.perspectives_coincide(keep, other)? {
            return Err(Persp3dError::PerspectivesDiffer(
                self.perspective_or_err(keep)?.id().to_string(),
                self.perspective_or_err(other)?.id().to_string(),
            ));
        }
        let moved = self.perspective_or_err(other)?.boxes().to_vec();
        for key in moved {
            self.switch_perspectives(key, other, keep)?;
            self.save_box(key);
        }
        Ok(())
    }

    /// Register a box. Any perspective link it carries is dropped; the box
    /// stays detached until attached.
    pub(crate) fn insert_box(&mut self, mut b: Box3D) -> BoxKey {
        b.persp_ref_mut().detach();
        self.boxes.insert(b)
    }

    /// Create a box with a generated id and attach it to `persp`.
    pub fn add_box(&mut self, corner0: ProjPt3, corner7: ProjPt3, persp: PerspKey) -> Result<BoxKey> {
        self.perspective_or_err(persp)?;
        let id = self.fresh_id("box3d");
        let key = self.insert_box(Box3D::new(id, corner0, corner7));
        self.attach(key, persp)?;
        Ok(key)
    }

    /// Turn a finished creation drag into a box in the current perspective.
    pub fn add_created_box(&mut self, creation: &BoxCreation) -> Result<BoxKey> {
        let persp = self.current_or_default();
        let id = self.fresh_id("box3d");
        let key = self.insert_box(creation.to_box(id));
        self.attach(key, persp)?;
        Ok(key)
    }

    /// Detach and remove a box.
    pub fn remove_box(&mut self, key: BoxKey) -> Result<Box3D> {
        self.detach(key)?;
        self.boxes
            .remove(key)
            .ok_or_else(|| Persp3dError::UnknownBox(format!("{key:?}")))
    }

    /// A box by key.
    pub fn box3d(&self, key: BoxKey) -> Option<&Box3D> {
        self.boxes.get(key)
    }

    /// Mutable access to a box. Its perspective link can only be changed
    /// through the scene.
    pub fn box3d_mut(&mut self, key: BoxKey) -> Option<&mut Box3D> {
        self.boxes.get_mut(key)
    }

    fn box_or_err(&self, key: BoxKey) -> Result<&Box3D> {
        self.boxes
            .get(key)
            .ok_or_else(|| Persp3dError::UnknownBox(format!("{key:?}")))
    }

    fn box_mut_or_err(&mut self, key: BoxKey) -> Result<&mut Box3D> {
        self.boxes
            .get_mut(key)
            .ok_or_else(|| Persp3dError::UnknownBox(format!("{key:?}")))
    }

    /// Look a box up by document id.
    pub fn find_box(&self, id: &str) -> Option<BoxKey> {
        self.boxes.iter().find(|(_, b)| b.id() == id).map(|(k, _)| k)
    }

    /// All boxes.
    pub fn boxes(&self) -> impl Iterator<Item = (BoxKey, &Box3D)> {
        self.boxes.iter()
    }

    /// Number of boxes.
    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    /// The perspective a box is attached to.
    pub fn perspective_of(&self, key: BoxKey) -> Result<PerspKey> {
        self.box_or_err(key)?
            .persp_ref()
            .target()
            .filter(|p| self.perspectives.contains_key(*p))
            .ok_or(Persp3dError::NoPerspective)
    }

    fn tmat_of(&self, key: BoxKey) -> Result<TransfMat3x4> {
        let persp = self.perspective_of(key)?;
        Ok(*self.perspective_or_err(persp)?.tmat())
    }

    fn apply_ref_change(&mut self, key: BoxKey, change: RefChange) {
        if !change.is_change() {
            return;
        }
        if let Some(old) = change.old.and_then(|k| self.perspectives.get_mut(k)) {
            old.remove_box(key);
        }
        if let Some(new) = change.new.and_then(|k| self.perspectives.get_mut(k)) {
            new.add_box(key);
        }
    }

    /// Attach a box to a perspective, updating both the box's reference and
    /// the membership lists, and redraw its sides.
    pub fn attach(&mut self, key: BoxKey, persp: PerspKey) -> Result<RefChange> {
        let href = href_for(self.perspective_or_err(persp)?.id());
        let change = self
            .box_mut_or_err(key)?
            .persp_ref_mut()
            .retarget(Some(href), Some(persp));
        self.apply_ref_change(key, change);
        self.update_box_display(key);
        Ok(change)
    }

    /// Detach a box from its perspective.
    pub fn detach(&mut self, key: BoxKey) -> Result<RefChange> {
        let change = self.box_mut_or_err(key)?.persp_ref_mut().detach();
        self.apply_ref_change(key, change);
        Ok(change)
    }

    /// Move a box from `old` to `new`.
    pub fn switch_perspectives(&mut self, key: BoxKey, old: PerspKey, new: PerspKey) -> Result<()> {
        let b = self.box_or_err(key)?;
        if b.persp_ref().target() != Some(old) {
            warn!(box_id = b.id(), "box was not attached to the perspective it is switched from");
        }
        self.attach(key, new)?;
        Ok(())
    }

    /// Apply a perspective reference read from a document. `None` detaches;
    /// a malformed reference is logged and detaches; a reference to an
    /// unknown perspective is kept as text but resolves to nothing.
    pub fn set_box_href(&mut self, key: BoxKey, href: Option<&str>) -> Result<()> {
        let b = self.box_or_err(key)?;
        if href.is_some() && b.persp_ref().href() == href && b.persp_ref().is_attached() {
            return Ok(());
        }
        let Some(href) = href else {
            self.detach(key)?;
            return Ok(());
        };
        let id = match parse_href(href) {
            Ok(id) => id,
            Err(e) => {
                warn!(box_id = b.id(), "{e}");
                self.detach(key)?;
                return Ok(());
            }
        };
        let target = self.find_perspective(id);
        if target.is_none() {
            warn!(box_id = b.id(), href, "perspective reference does not resolve");
        }
        let change = self
            .box_mut_or_err(key)?
            .persp_ref_mut()
            .retarget(Some(href.to_string()), target);
        self.apply_ref_change(key, change);
        self.update_box_display(key);
        Ok(())
    }

    /// The reference written for a box: its own, or the current perspective
    /// for a box that has none yet.
    pub fn href_for_write(&self, key: BoxKey) -> Result<Option<String>> {
        let b = self.box_or_err(key)?;
        if let Some(href) = b.persp_ref().href() {
            return Ok(Some(href.to_string()));
        }
        Ok(self
            .current
            .and_then(|k| self.perspectives.get(k))
            .map(|p| href_for(p.id())))
    }

    fn save_box(&mut self, key: BoxKey) {
        if let Some(b) = self.boxes.get_mut(key) {
            b.save_corners();
        }
    }

    /// Perspectives of the selected boxes, in order of first appearance.
    pub fn selected_perspectives(&self, selection: &[BoxKey]) -> Vec<PerspKey> {
        let mut out = Vec::new();
        for key in selection {
            if let Ok(p) = self.perspective_of(*key) {
                if !out.contains(&p) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// Whether every box of `persp` is selected.
    pub fn has_all_boxes_in_selection(&self, persp: PerspKey, selection: &[BoxKey]) -> Result<bool> {
        Ok(self
            .perspective_or_err(persp)?
            .boxes()
            .iter()
            .all(|b| selection.contains(b)))
    }

    /// The selected boxes of `persp`.
    pub fn selected_boxes(&self, persp: PerspKey, selection: &[BoxKey]) -> Result<Vec<BoxKey>> {
        Ok(self
            .perspective_or_err(persp)?
            .boxes()
            .iter()
            .filter(|b| selection.contains(b))
            .copied()
            .collect())
    }

    /// Apply a 2D affine map to the selected boxes. A perspective shared with
    /// unselected boxes is forked first, so that only the selection moves.
    /// Returns the perspectives that were transformed.
    pub fn apply_affine_to_selection(
        &mut self,
        selection: &[BoxKey],
        xform: &Affine2,
    ) -> Result<Vec<PerspKey>> {
        let mut transformed = Vec::new();
        for persp in self.selected_perspectives(selection) {
            let target = if self.has_all_boxes_in_selection(persp, selection)? {
                persp
            } else {
                let fork = self.duplicate_perspective(persp)?;
                let moved = self.selected_boxes(persp, selection)?;
                debug!(
                    from = self.perspective_or_err(persp)?.id(),
                    boxes = moved.len(),
                    "forking perspective before transform"
                );
                for b in moved {
                    self.switch_perspectives(b, persp, fork)?;
                }
                fork
            };
            self.perspective_mut_or_err(target)?.apply_affine(xform);
            self.update_box_reprs(target)?;
            transformed.push(target);
        }
        Ok(transformed)
    }

    /// Toggle a vanishing point between finite and infinite.
    pub fn toggle_vp(&mut self, persp: PerspKey, axis: ProjAxis) -> Result<bool> {
        let changed = self.perspective_mut_or_err(persp)?.toggle_vp(axis);
        if changed {
            self.update_box_reprs(persp)?;
        }
        Ok(changed)
    }

    /// Toggle the same vanishing point of several perspectives.
    pub fn toggle_vps(&mut self, persps: &[PerspKey], axis: ProjAxis) -> Result<()> {
        for p in persps {
            self.toggle_vp(*p, axis)?;
        }
        Ok(())
    }

    /// Bring a vanishing point into `state`.
    pub fn set_vp_state(&mut self, persp: PerspKey, axis: ProjAxis, state: VpState) -> Result<bool> {
        let changed = self.perspective_mut_or_err(persp)?.set_vp_state(axis, state);
        if changed {
            self.update_box_reprs(persp)?;
        }
        Ok(changed)
    }

    /// Rotate an infinite vanishing point.
    pub fn rotate_vp(&mut self, persp: PerspKey, axis: ProjAxis, angle: f64, fine: bool) -> Result<bool> {
        let changed = self.perspective_mut_or_err(persp)?.rotate_vp(axis, angle, fine);
        if changed {
            self.update_box_reprs(persp)?;
        }
        Ok(changed)
    }

    /// Move a vanishing point (or the origin image for `W`).
    pub fn set_vp(&mut self, persp: PerspKey, axis: ProjAxis, pt: ProjPt2) -> Result<()> {
        self.perspective_mut_or_err(persp)?.set_vp(axis, pt);
        self.update_box_displays(persp)
    }

    fn update_box_display(&mut self, key: BoxKey) {
        let Ok(tmat) = self.tmat_of(key) else {
            return;
        };
        if let Some(b) = self.boxes.get_mut(key) {
            b.position_set(&tmat);
        }
    }

    /// Recompute the sides of every box in `persp`.
    pub fn update_box_displays(&mut self, persp: PerspKey) -> Result<()> {
        let p = self.perspective_or_err(persp)?;
        let tmat = *p.tmat();
        for key in p.boxes().to_vec() {
            if let Some(b) = self.boxes.get_mut(key) {
                b.position_set(&tmat);
            }
        }
        Ok(())
    }

    /// Recompute sides and face order of every box in `persp`, taking the
    /// current corners as the new drag baseline.
    pub fn update_box_reprs(&mut self, persp: PerspKey) -> Result<()> {
        let p = self.perspective_or_err(persp)?;
        let tmat = *p.tmat();
        let strategy = self.settings.z_order_strategy;
        for key in p.boxes().to_vec() {
            if let Some(b) = self.boxes.get_mut(key) {
                b.save_corners();
                b.update_repr(&tmat, strategy);
            }
        }
        Ok(())
    }

    /// Recompute the face order of every box in `persp`.
    pub fn update_z_orders(&mut self, persp: PerspKey) -> Result<()> {
        let p = self.perspective_or_err(persp)?;
        let tmat = *p.tmat();
        let strategy = self.settings.z_order_strategy;
        for key in p.boxes().to_vec() {
            if let Some(b) = self.boxes.get_mut(key) {
                b.set_z_orders(&tmat, strategy);
            }
        }
        Ok(())
    }

    /// Redraw one box and restack its sides.
    pub fn update_box(&mut self, key: BoxKey) -> Result<()> {
        let tmat = self.tmat_of(key)?;
        let strategy = self.settings.z_order_strategy;
        self.box_mut_or_err(key)?.update_repr(&tmat, strategy);
        Ok(())
    }

    /// Start dragging a handle of `key`.
    pub fn begin_drag(&mut self, key: BoxKey) -> Result<DragSession> {
        self.box_mut_or_err(key)?.begin_drag();
        Ok(DragSession::new(&self.settings))
    }

    /// Drag corner `id` of a box, then redraw it.
    pub fn set_corner(
        &mut self,
        key: BoxKey,
        id: u8,
        new_pos: Point2,
        movement: AxisMask,
        constrained: bool,
        session: &mut DragSession,
    ) -> Result<()> {
        let tmat = self.tmat_of(key)?;
        let strategy = self.settings.z_order_strategy;
        let b = self.box_mut_or_err(key)?;
        b.set_corner(&tmat, id, new_pos, movement, constrained, session)?;
        b.update_repr(&tmat, strategy);
        Ok(())
    }

    /// Drag the center of a box, then redraw it.
    pub fn set_center(
        &mut self,
        key: BoxKey,
        new_pos: Point2,
        old_pos: Point2,
        movement: AxisMask,
        constrained: bool,
        session: &mut DragSession,
    ) -> Result<()> {
        let tmat = self.tmat_of(key)?;
        let strategy = self.settings.z_order_strategy;
        let b = self.box_mut_or_err(key)?;
        b.set_center(&tmat, new_pos, old_pos, movement, constrained, session)?;
        b.update_repr(&tmat, strategy);
        Ok(())
    }

    /// Finish a drag, keeping the new corners.
    pub fn finish_drag(&mut self, key: BoxKey, _session: DragSession) -> Result<()> {
        self.box_mut_or_err(key)?.save_corners();
        self.update_box(key)
    }

    /// Abort a drag, restoring the corners it started from.
    pub fn cancel_drag(&mut self, key: BoxKey, _session: DragSession) -> Result<()> {
        self.box_mut_or_err(key)?.cancel_drag();
        match self.update_box(key) {
            Err(Persp3dError::NoPerspective) => Ok(()),
            other => other,
        }
    }
}
