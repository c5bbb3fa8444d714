//! Error types for perspectives and boxes.

use persp3d_math::{AxisMask, CoordError};
use thiserror::Error;

/// Errors that can occur while editing a perspective scene.
#[derive(Error, Debug)]
pub enum Persp3dError {
    /// A drag was requested with no movement axis or with all three at once.
    #[error("invalid movement axes {0}; expected one or two axes")]
    InvalidMovement(AxisMask),

    /// A corner id outside `0..=7`.
    #[error("invalid corner id {0}; expected 0..=7")]
    InvalidCorner(u8),

    /// The box is not attached to any perspective.
    #[error("box is not attached to a perspective")]
    NoPerspective,

    /// No box with the given key or id exists.
    #[error("unknown box: {0}")]
    UnknownBox(String),

    /// No perspective with the given key or id exists.
    #[error("unknown perspective: {0}")]
    UnknownPerspective(String),

    /// The perspective still has attached boxes.
    #[error("perspective {0} still has attached boxes")]
    PerspectiveInUse(String),

    /// A corner of a face projects to a point that cannot be displayed.
    #[error("face {face} has a corner that projects to infinity")]
    NonFiniteCorner {
        /// Face slot (0..6).
        face: usize,
    },

    /// A side type code that does not name a face.
    #[error("invalid box side type {0}")]
    InvalidSideType(i64),

    /// A perspective reference that is not of the form `#id`.
    #[error("bad perspective reference {0:?}")]
    BadUri(String),

    /// Two perspectives were expected to coincide.
    #[error("perspectives {0} and {1} do not coincide")]
    PerspectivesDiffer(String, String),

    /// Invalid scene settings.
    #[error("invalid settings: {0}")]
    Settings(String),

    /// Malformed homogeneous coordinate string.
    #[error(transparent)]
    Coord(#[from] CoordError),

    /// JSON document error.
    #[error("document error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML settings error.
    #[error("settings file error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for perspective scene operations.
pub type Result<T> = std::result::Result<T, Persp3dError>;
