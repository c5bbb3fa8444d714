//! Document elements for perspectives, boxes and their sides.
//!
//! The host document stores a scene as flat attributes on three element
//! kinds. Perspectives carry the four columns of their projection as
//! coordinate strings; boxes carry two corners and a `#id` reference to
//! their perspective; sides carry a face code and the path last drawn for
//! them. Anything malformed is logged and skipped so that loading never
//! fails on bad data, only on bad JSON.

use persp3d_math::{ProjAxis, ProjPt2, ProjPt3, TransfMat3x4};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::box3d::Box3D;
use crate::error::Result;
use crate::face::Face;
use crate::keys::BoxKey;
use crate::perspective::Perspective;
use crate::scene::Scene;
use crate::settings::SceneSettings;
use crate::side::PlainPath;

/// Attributes of a perspective element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveElement {
    /// Element id, referenced by boxes as `#id`.
    pub id: String,
    /// Vanishing point along X, `"x : y : w"`.
    pub vp_x: Option<String>,
    /// Vanishing point along Y.
    pub vp_y: Option<String>,
    /// Vanishing point along Z.
    pub vp_z: Option<String>,
    /// Image of the origin.
    pub origin: Option<String>,
}

/// Attributes of a box element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxElement {
    /// Element id.
    pub id: String,
    /// Reference to the perspective, `#id`.
    #[serde(rename = "perspectiveID", default, skip_serializing_if = "Option::is_none")]
    pub perspective_id: Option<String>,
    /// First corner, `"x : y : z : w"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner0: Option<String>,
    /// Opposite corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner7: Option<String>,
    /// Child sides, bottom first.
    #[serde(default)]
    pub sides: Vec<SideElement>,
}

/// Attributes of a box side element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideElement {
    /// Face code, `dir1 ^ dir2 ^ front_or_rear`.
    pub box3dsidetype: i64,
    /// Path data last drawn for the side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    /// Style attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// One element of a scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// A shared perspective.
    Perspective(PerspectiveElement),
    /// A box with its sides.
    Box(BoxElement),
    /// A side outside of any box.
    Side(SideElement),
    /// Any element kind this crate does not handle.
    #[serde(other)]
    Other,
}

/// A flat list of elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Elements in document order.
    pub elements: Vec<Element>,
}

impl SceneDocument {
    /// Parse a document from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn parse_column(elem: &PerspectiveElement, name: &str, value: Option<&str>) -> Option<ProjPt2> {
    let Some(value) = value else {
        warn!(perspective = %elem.id, attr = name, "missing attribute");
        return None;
    };
    match value.parse::<ProjPt2>() {
        Ok(pt) => Some(pt),
        Err(e) => {
            warn!(perspective = %elem.id, attr = name, "{e}");
            None
        }
    }
}

fn read_perspective(elem: &PerspectiveElement) -> Option<Perspective> {
    let vp_x = parse_column(elem, "vp_x", elem.vp_x.as_deref());
    let vp_y = parse_column(elem, "vp_y", elem.vp_y.as_deref());
    let vp_z = parse_column(elem, "vp_z", elem.vp_z.as_deref());
    let origin = parse_column(elem, "origin", elem.origin.as_deref());
    let tmat = TransfMat3x4::from_points(vp_x?, vp_y?, vp_z?, origin?);
    Some(Perspective::new(elem.id.clone(), tmat))
}

/// Corners equal to this are "not set yet".
fn is_unset(pt: &ProjPt3) -> bool {
    (0..4).all(|i| pt[i] == 0.0)
}

fn read_corner(elem: &BoxElement, name: &str, value: Option<&str>) -> Option<ProjPt3> {
    let pt = match value?.parse::<ProjPt3>() {
        Ok(pt) => pt,
        Err(e) => {
            warn!(box_id = %elem.id, attr = name, "{e}");
            return None;
        }
    };
    (!is_unset(&pt)).then_some(pt)
}

fn read_box(elem: &BoxElement) -> Box3D {
    let corner0 = read_corner(elem, "corner0", elem.corner0.as_deref());
    let corner7 = read_corner(elem, "corner7", elem.corner7.as_deref());
    let mut b = Box3D::new(
        elem.id.clone(),
        corner0.unwrap_or_else(ProjPt3::non_finite),
        corner7.unwrap_or_else(ProjPt3::non_finite),
    );
    for side in &elem.sides {
        match Face::from_code(side.box3dsidetype) {
            Ok(face) => {
                if let Some(target) = face.slot().and_then(|slot| b.side_mut(slot)) {
                    target.set_style(side.style.clone());
                }
            }
            Err(e) => warn!(box_id = %elem.id, "{e}"),
        }
    }
    b
}

fn has_corners(b: &Box3D) -> bool {
    b.corner0().is_finite() && b.corner7().is_finite()
}

impl Scene {
    /// Build a scene from a document.
    ///
    /// The first perspective becomes the current one. Perspectives with
    /// malformed columns are dropped, so boxes referring to them stay
    /// unattached and are kept as plain paths by the host.
    pub fn load_document(doc: &SceneDocument, settings: SceneSettings) -> Result<Self> {
        let mut scene = Scene::with_settings(settings)?;

        for elem in &doc.elements {
            if let Element::Perspective(p) = elem {
                if scene.find_perspective(&p.id).is_some() {
                    warn!(perspective = %p.id, "duplicate perspective id");
                    continue;
                }
                if let Some(persp) = read_perspective(p) {
                    scene.insert_perspective(persp);
                }
            }
        }

        for elem in &doc.elements {
            match elem {
                Element::Perspective(_) => {}
                Element::Box(e) => {
                    let key = scene.insert_box(read_box(e));
                    scene.set_box_href(key, e.perspective_id.as_deref())?;
                    let drawable = scene
                        .box3d(key)
                        .is_some_and(|b| b.persp_ref().is_attached() && has_corners(b));
                    if drawable {
                        scene.update_box(key)?;
                    }
                }
                Element::Side(s) => {
                    warn!(side_type = s.box3dsidetype, "box side outside of a box");
                }
                Element::Other => {}
            }
        }

        debug!(
            perspectives = scene.perspective_count(),
            boxes = scene.box_count(),
            "scene loaded"
        );
        Ok(scene)
    }

    /// Write the scene as a document: perspectives first, then boxes with
    /// their sides in paint order. Corners are normalized on the way out.
    pub fn write_document(&mut self) -> SceneDocument {
        let mut elements: Vec<Element> = self
            .perspectives()
            .map(|(_, p)| {
                Element::Perspective(PerspectiveElement {
                    id: p.id().to_string(),
                    vp_x: Some(p.pt_to_str(ProjAxis::X)),
                    vp_y: Some(p.pt_to_str(ProjAxis::Y)),
                    vp_z: Some(p.pt_to_str(ProjAxis::Z)),
                    origin: Some(p.pt_to_str(ProjAxis::W)),
                })
            })
            .collect();

        let keys: Vec<BoxKey> = self.boxes().map(|(k, _)| k).collect();
        for key in keys {
            let href = self.href_for_write(key).ok().flatten();
            let Some(b) = self.box3d_mut(key) else {
                continue;
            };
            if has_corners(b) {
                b.save_corners();
            }
            let corner = |pt: &ProjPt3| pt.is_finite().then(|| pt.normalized().coord_string());
            elements.push(Element::Box(BoxElement {
                id: b.id().to_string(),
                perspective_id: href,
                corner0: corner(b.corner0()),
                corner7: corner(b.corner7()),
                sides: b
                    .sides()
                    .iter()
                    .map(|s| SideElement {
                        box3dsidetype: i64::from(s.type_code()),
                        d: s.svg_d(),
                        style: s.style().map(str::to_string),
                    })
                    .collect(),
            }));
        }

        SceneDocument { elements }
    }

    /// Remove a box, returning its sides as plain paths in paint order.
    pub fn flatten_box(&mut self, key: BoxKey) -> Result<Vec<PlainPath>> {
        let b = self.remove_box(key)?;
        Ok(b.sides().iter().map(|s| s.to_plain_path()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use persp3d_math::AxisMask;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn perspective_element(id: &str) -> Element {
        Element::Perspective(PerspectiveElement {
            id: id.into(),
            vp_x: Some("-231.7 : 512.25 : 1".into()),
            vp_y: Some("388.1 : -1400.03 : 1".into()),
            vp_z: Some("1022.9 : 497.5 : 1".into()),
            origin: Some("372.045 : 350.78 : 1".into()),
        })
    }

    fn box_element(id: &str, href: Option<&str>) -> Element {
        Element::Box(BoxElement {
            id: id.into(),
            perspective_id: href.map(str::to_string),
            corner0: Some("40 : 30 : 0 : 1".into()),
            corner7: Some("0 : 0 : 25 : 1".into()),
            sides: vec![
                SideElement {
                    box3dsidetype: 13,
                    d: None,
                    style: Some("fill:#e9e9ff".into()),
                },
                SideElement {
                    box3dsidetype: 7,
                    d: None,
                    style: None,
                },
            ],
        })
    }

    #[test]
    fn test_perspective_round_trip() {
        let doc = SceneDocument {
            elements: vec![perspective_element("p1")],
        };
        let mut scene = Scene::load_document(&doc, SceneSettings::default()).unwrap();
        let original = *scene.perspective(scene.find_perspective("p1").unwrap()).unwrap().tmat();

        let json = scene.write_document().to_json().unwrap();
        let reread = SceneDocument::from_json(&json).unwrap();
        let scene = Scene::load_document(&reread, SceneSettings::default()).unwrap();
        let tmat = scene.perspective(scene.find_perspective("p1").unwrap()).unwrap().tmat();

        for id in 0..8u8 {
            let bits = AxisMask::from_bits(id);
            let corner = ProjPt3::new(
                f64::from(u8::from(bits.contains(AxisMask::X))),
                f64::from(u8::from(bits.contains(AxisMask::Y))),
                f64::from(u8::from(bits.contains(AxisMask::Z))),
                1.0,
            );
            let a = original.image_affine(&corner);
            let b = tmat.image_affine(&corner);
            assert_relative_eq!(a.x, b.x, max_relative = 1e-9);
            assert_relative_eq!(a.y, b.y, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_box_round_trip() {
        let doc = SceneDocument {
            elements: vec![perspective_element("p1"), box_element("b1", Some("#p1"))],
        };
        let mut scene = Scene::load_document(&doc, SceneSettings::default()).unwrap();
        let key = scene.find_box("b1").unwrap();
        assert!(scene.box3d(key).unwrap().persp_ref().is_attached());
        assert!(scene.box3d(key).unwrap().z_orders().is_some());
        assert_eq!(
            scene.box3d(key).unwrap().side(3).unwrap().style(),
            Some("fill:#e9e9ff")
        );

        let written = scene.write_document();
        let Element::Box(b) = &written.elements[1] else {
            panic!("expected a box element");
        };
        assert_eq!(b.perspective_id.as_deref(), Some("#p1"));
        assert_eq!(b.corner0.as_deref(), Some("40 : 30 : 0 : 1"));
        assert_eq!(b.sides.len(), 6);
        assert!(b.sides.iter().all(|s| s.d.as_deref().is_some_and(|d| d.starts_with('M'))));
        let mut codes: Vec<_> = b.sides.iter().map(|s| s.box3dsidetype).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 6);
    }

    #[test]
    fn test_malformed_input_degrades() {
        init_tracing();
        let json = r##"{
            "elements": [
                {"type": "perspective", "id": "bad", "vp_x": "1 : nope : 1",
                 "vp_y": "0 : 1 : 0", "vp_z": "1 : 1 : 0", "origin": "0 : 0"},
                {"type": "box", "id": "b1", "perspectiveID": "#bad",
                 "corner0": "0 : 0 : 0 : 0", "corner7": "1 : 1 : 1 : 1"},
                {"type": "side", "box3dsidetype": 4},
                {"type": "guide", "position": "10,10"}
            ]
        }"##;
        let doc = SceneDocument::from_json(json).unwrap();
        assert_eq!(doc.elements[3], Element::Other);

        let mut scene = Scene::load_document(&doc, SceneSettings::default()).unwrap();
        assert_eq!(scene.perspective_count(), 0);
        let key = scene.find_box("b1").unwrap();
        let b = scene.box3d(key).unwrap();
        assert!(!b.persp_ref().is_attached());
        assert_eq!(b.persp_ref().href(), Some("#bad"));
        // the sentinel corner is left unset
        assert!(!b.corner0().is_finite());
        assert!(b.corner7().is_finite());

        // only the unset corner is left out on save
        let written = scene.write_document();
        let Element::Box(e) = &written.elements[0] else {
            panic!("expected a box element");
        };
        assert_eq!(e.corner0, None);
        assert_eq!(e.corner7.as_deref(), Some("1 : 1 : 1 : 1"));
        assert_eq!(e.perspective_id.as_deref(), Some("#bad"));

        let paths = scene.flatten_box(key).unwrap();
        assert_eq!(paths.len(), 6);
        assert!(paths.iter().all(|p| p.d.is_empty()));
        assert_eq!(scene.box_count(), 0);
    }

    #[test]
    fn test_missing_reference_uses_current_perspective() {
        let doc = SceneDocument {
            elements: vec![perspective_element("p1"), box_element("b1", None)],
        };
        let mut scene = Scene::load_document(&doc, SceneSettings::default()).unwrap();
        let key = scene.find_box("b1").unwrap();
        assert!(!scene.box3d(key).unwrap().persp_ref().is_attached());

        let written = scene.write_document();
        let Element::Box(b) = &written.elements[1] else {
            panic!("expected a box element");
        };
        assert_eq!(b.perspective_id.as_deref(), Some("#p1"));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = SceneSettings {
            zoom: 0.0,
            ..SceneSettings::default()
        };
        assert!(Scene::load_document(&SceneDocument::default(), settings).is_err());
    }
}
