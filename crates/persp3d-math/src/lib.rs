#![warn(missing_docs)]

//! Projective algebra for perspective boxes.
//!
//! Homogeneous points in the plane and in 3-space, the 3x4 projective map
//! that places a box in a perspective, and the small amount of line
//! geometry needed to reason about vanishing points on screen.

pub mod axis;
pub mod error;
pub mod line;
pub mod matrix;
pub mod point;

pub use axis::{AxisMask, ProjAxis};
pub use error::{CoordError, Result};
pub use line::{
    coordinates, determinant, half_line_crosses_joining_line, lies_in_quadrangle, lies_in_sector,
    Line,
};
pub use matrix::{Affine2, TransfMat3x4};
pub use point::{is_finite_point, non_finite_point, ProjPt2, ProjPt3};

use nalgebra::Vector2;

/// A point in screen space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in screen space.
pub type Vec2 = Vector2<f64>;

/// Threshold below which determinants, denominators and weights count as zero.
pub const EPSILON: f64 = 1e-6;
