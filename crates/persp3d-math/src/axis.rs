//! Axis identifiers.
//!
//! Two encodings coexist. [`ProjAxis`] indexes the columns of a projective
//! matrix (the three spatial axes plus the homogeneous `W` column), while
//! [`AxisMask`] is a bit set over the spatial axes. Corner ids, face codes and
//! drag constraints are all expressed as masks: bit 0 is X, bit 1 is Y and
//! bit 2 is Z.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor};

use serde::{Deserialize, Serialize};

/// Column index of a 3x4 projective matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjAxis {
    /// First spatial axis.
    X,
    /// Second spatial axis.
    Y,
    /// Third spatial axis.
    Z,
    /// Homogeneous coordinate; its matrix column is the image of the origin.
    W,
}

impl ProjAxis {
    /// The three spatial axes in order.
    pub const SPATIAL: [ProjAxis; 3] = [ProjAxis::X, ProjAxis::Y, ProjAxis::Z];

    /// Column / coordinate index (0..=3).
    pub fn index(self) -> usize {
        match self {
            ProjAxis::X => 0,
            ProjAxis::Y => 1,
            ProjAxis::Z => 2,
            ProjAxis::W => 3,
        }
    }

    /// The single-axis mask for this axis (`NONE` for `W`).
    pub fn mask(self) -> AxisMask {
        match self {
            ProjAxis::X => AxisMask::X,
            ProjAxis::Y => AxisMask::Y,
            ProjAxis::Z => AxisMask::Z,
            ProjAxis::W => AxisMask::NONE,
        }
    }

    /// Short upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            ProjAxis::X => "X",
            ProjAxis::Y => "Y",
            ProjAxis::Z => "Z",
            ProjAxis::W => "W",
        }
    }
}

impl fmt::Display for ProjAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bit set over the spatial axes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct AxisMask(u8);

impl AxisMask {
    /// No axis.
    pub const NONE: Self = Self(0);
    /// X only.
    pub const X: Self = Self(1);
    /// Y only.
    pub const Y: Self = Self(2);
    /// Z only.
    pub const Z: Self = Self(4);
    /// The XY plane.
    pub const XY: Self = Self(3);
    /// The XZ plane.
    pub const XZ: Self = Self(5);
    /// The YZ plane.
    pub const YZ: Self = Self(6);
    /// All three axes.
    pub const XYZ: Self = Self(7);

    /// Single-axis masks in X, Y, Z order.
    pub const AXES: [AxisMask; 3] = [AxisMask::X, AxisMask::Y, AxisMask::Z];
    /// The three coordinate planes.
    pub const PLANES: [AxisMask; 3] = [AxisMask::XY, AxisMask::XZ, AxisMask::YZ];

    /// Build from raw bits; anything above bit 2 is discarded.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x7)
    }

    /// Raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether no axis is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every axis of `other` is set in `self`.
    pub const fn contains(self, other: AxisMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `self` and `other` share at least one axis.
    pub const fn intersects(self, other: AxisMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Number of axes set.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Nonzero power of two.
    pub const fn is_single_axis(self) -> bool {
        self.0 != 0 && self.0 & (self.0 - 1) == 0
    }

    /// Exactly two axes set.
    pub const fn is_plane(self) -> bool {
        self.count() == 2
    }

    /// Complement within XYZ: a plane maps to its normal axis and vice versa.
    pub const fn orth_plane_or_axis(self) -> Self {
        Self(self.0 ^ 0x7)
    }

    /// The axis orthogonal to the plane spanned by two single axes.
    pub const fn third_axis(dir1: AxisMask, dir2: AxisMask) -> Self {
        Self((dir1.0 | dir2.0) ^ 0x7)
    }

    /// Lowest axis occurring in `self`.
    pub const fn first_axis(self) -> Self {
        if self.0 & 1 != 0 {
            Self::X
        } else if self.0 & 2 != 0 {
            Self::Y
        } else if self.0 & 4 != 0 {
            Self::Z
        } else {
            Self::NONE
        }
    }

    /// Second-lowest axis occurring in `self`.
    pub const fn second_axis(self) -> Self {
        Self(self.0 ^ self.first_axis().0).first_axis()
    }

    /// Lowest axis that does *not* occur in `self`.
    pub const fn perpendicular_axis(self) -> Self {
        Self(!self.0 & 0x7).first_axis()
    }

    /// For a single axis, the two remaining axes in ascending order.
    pub fn remaining_axes(self) -> Option<(AxisMask, AxisMask)> {
        if !self.is_single_axis() {
            return None;
        }
        let rest = self.orth_plane_or_axis();
        Some((rest.first_axis(), rest.second_axis()))
    }

    /// Matrix column of a single axis.
    pub fn to_proj(self) -> Option<ProjAxis> {
        match self {
            AxisMask::X => Some(ProjAxis::X),
            AxisMask::Y => Some(ProjAxis::Y),
            AxisMask::Z => Some(ProjAxis::Z),
            _ => None,
        }
    }

    /// Iterate over the single axes contained in `self`.
    pub fn axes(self) -> impl Iterator<Item = AxisMask> {
        Self::AXES.into_iter().filter(move |a| self.contains(*a))
    }
}

impl BitXor for AxisMask {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl BitAnd for AxisMask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for AxisMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl From<ProjAxis> for AxisMask {
    fn from(axis: ProjAxis) -> Self {
        axis.mask()
    }
}

impl fmt::Display for AxisMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        for (axis, name) in Self::AXES.iter().zip(["X", "Y", "Z"]) {
            if self.contains(*axis) {
                f.write_str(name)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for AxisMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AxisMask({self})")
    }
}
