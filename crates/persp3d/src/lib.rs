#![warn(missing_docs)]

//! Shared 3D perspectives and perspective boxes.
//!
//! A [`Perspective`] is a projective map from 3-space onto the page, given
//! by three vanishing points and the image of the origin. A [`Box3D`] is an
//! axis-aligned box in that space, drawn as six [`Box3DSide`] faces whose
//! stacking order is inferred from where the vanishing points lie relative
//! to the box. Many boxes share one perspective; the [`Scene`] keeps the
//! links between them consistent and pushes perspective changes out to
//! every attached box.
//!
//! # Example
//!
//! ```rust
//! use persp3d::{Scene, SceneDocument};
//! use persp3d_math::{ProjAxis, ProjPt3};
//!
//! let mut scene = Scene::new();
//! let persp = scene.add_default_perspective();
//! let b = scene
//!     .add_box(ProjPt3::new(80.0, 60.0, 0.0, 1.0), ProjPt3::new(0.0, 0.0, 40.0, 1.0), persp)
//!     .unwrap();
//! assert!(scene.box3d(b).unwrap().z_orders().is_none());
//!
//! scene.toggle_vp(persp, ProjAxis::Z).unwrap();
//! assert!(scene.box3d(b).unwrap().z_orders().is_some());
//!
//! let json = scene.write_document().to_json().unwrap();
//! let reloaded = Scene::load_document(&SceneDocument::from_json(&json).unwrap(), Default::default()).unwrap();
//! assert_eq!(reloaded.box_count(), 1);
//! ```

pub mod attrs;
pub mod box3d;
pub mod creation;
pub mod error;
pub mod face;
pub mod keys;
pub mod perspective;
pub mod perspective_line;
pub mod reference;
pub mod scene;
pub mod settings;
pub mod side;
pub mod snap;
pub mod zorder;

pub use attrs::{BoxElement, Element, PerspectiveElement, SceneDocument, SideElement};
pub use box3d::{Box3D, INITIAL_DEPTH};
pub use creation::BoxCreation;
pub use error::{Persp3dError, Result};
pub use face::{Face, FrontOrRear};
pub use keys::{BoxKey, PerspKey};
pub use perspective::{Perspective, VpState};
pub use perspective_line::PerspectiveLine;
pub use reference::{PerspectiveReference, RefChange};
pub use scene::Scene;
pub use settings::{SceneSettings, ZOrderStrategy};
pub use side::{Box3DSide, PlainPath, SidePath};
pub use snap::{snap, DragSession, SnapTarget};
pub use zorder::{ZOrder, ZOrderCase};
