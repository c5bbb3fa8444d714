//! Face identifiers.
//!
//! A face is named by the plane it lies in and whether it sits on the
//! corner0 ("front") or corner7 ("rear") side along the orthogonal axis. The
//! raw code packs the plane (or its normal axis) into bits 0..=2 and the
//! front/rear flag into bit 3. Of the 16 raw values only twelve name a face,
//! and those fold onto six face slots:
//!
//! | slot | face     | codes   |
//! |------|----------|---------|
//! | 0    | YZ front | 6, 1    |
//! | 1    | YZ rear  | 14, 9   |
//! | 2    | XZ front | 5, 2    |
//! | 3    | XZ rear  | 13, 10  |
//! | 4    | XY front | 3, 4    |
//! | 5    | XY rear  | 11, 12  |

use std::fmt;

use persp3d_math::AxisMask;
use serde::{Deserialize, Serialize};

use crate::error::{Persp3dError, Result};

/// Number of faces of a box.
pub const FACE_COUNT: usize = 6;

/// Bit marking the rear face of a pair.
pub const REAR_BIT: u8 = 8;

/// Canonical code of each face slot.
const FACE_CODES: [u8; FACE_COUNT] = [6, 14, 5, 13, 3, 11];

/// Which of two parallel faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrontOrRear {
    /// The face through corner 0.
    Front,
    /// The face through corner 7.
    Rear,
}

impl FrontOrRear {
    /// Bit value inside a face code.
    pub fn bit(self) -> u8 {
        match self {
            FrontOrRear::Front => 0,
            FrontOrRear::Rear => REAR_BIT,
        }
    }

    fn from_code(code: u8) -> Self {
        if code & REAR_BIT != 0 {
            FrontOrRear::Rear
        } else {
            FrontOrRear::Front
        }
    }
}

/// Fold a raw face code onto a face slot (0..6).
pub fn face_to_int(code: u8) -> Option<usize> {
    match code {
        1 | 6 => Some(0),
        9 | 14 => Some(1),
        2 | 5 => Some(2),
        10 | 13 => Some(3),
        3 | 4 => Some(4),
        11 | 12 => Some(5),
        _ => None,
    }
}

/// Canonical (plane-based) code of a face slot.
pub fn int_to_face(slot: usize) -> Option<u8> {
    FACE_CODES.get(slot).copied()
}

/// Whether `code` names a face.
pub fn is_face_id(code: i64) -> bool {
    u8::try_from(code).ok().and_then(face_to_int).is_some()
}

/// The plane spanned by a face slot.
pub fn slot_plane(slot: usize) -> AxisMask {
    int_to_face(slot)
        .map(AxisMask::from_bits)
        .unwrap_or(AxisMask::NONE)
}

/// One of the six faces: the two axes spanning it and its position along the
/// third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Face {
    /// First spanning axis.
    pub dir1: AxisMask,
    /// Second spanning axis.
    pub dir2: AxisMask,
    /// Position along the orthogonal axis.
    pub front_or_rear: FrontOrRear,
}

impl Face {
    /// The face stored in a slot.
    pub fn from_slot(slot: usize) -> Option<Self> {
        let code = int_to_face(slot)?;
        Self::from_code(i64::from(code)).ok()
    }

    /// Decode a side type code. A single-axis code is taken to mean the
    /// plane orthogonal to that axis.
    pub fn from_code(code: i64) -> Result<Self> {
        if !is_face_id(code) {
            return Err(Persp3dError::InvalidSideType(code));
        }
        let code = code as u8;
        let mut plane = AxisMask::from_bits(code);
        if !plane.is_plane() {
            plane = plane.orth_plane_or_axis();
        }
        Ok(Self {
            dir1: plane.first_axis(),
            dir2: plane.second_axis(),
            front_or_rear: FrontOrRear::from_code(code),
        })
    }

    /// The code written to documents: `dir1 ^ dir2 ^ front_or_rear`.
    pub fn code(&self) -> u8 {
        (self.dir1 ^ self.dir2).bits() ^ self.front_or_rear.bit()
    }

    /// Face slot (0..6).
    pub fn slot(&self) -> Option<usize> {
        face_to_int(self.code())
    }

    /// The spanned plane.
    pub fn plane(&self) -> AxisMask {
        self.dir1 | self.dir2
    }

    /// The axis orthogonal to the face.
    pub fn orth_axis(&self) -> AxisMask {
        AxisMask::third_axis(self.dir1, self.dir2)
    }

    /// Corner ids of the face quadrilateral, walked around its boundary.
    pub fn corner_ids(&self) -> [u8; 4] {
        let i0 = match self.front_or_rear {
            FrontOrRear::Front => 0,
            FrontOrRear::Rear => self.orth_axis().bits(),
        };
        let d1 = self.dir1.bits();
        let d2 = self.dir2.bits();
        [i0, i0 ^ d1, i0 ^ d1 ^ d2, i0 ^ d2]
    }

    /// Recover a face from the corner ids produced by [`Face::corner_ids`].
    pub fn from_corner_ids(ids: [u8; 4]) -> Option<Self> {
        let dir1 = AxisMask::from_bits(ids[0] ^ ids[1]);
        let dir2 = AxisMask::from_bits(ids[0] ^ ids[3]);
        if !dir1.is_single_axis() || !dir2.is_single_axis() || dir1 == dir2 {
            return None;
        }
        let front_or_rear = if ids[0] == 0 {
            FrontOrRear::Front
        } else {
            FrontOrRear::Rear
        };
        Some(Self {
            dir1,
            dir2,
            front_or_rear,
        })
    }

    /// Human-readable position: front, rear, top, bottom, right or left.
    pub fn label(&self) -> &'static str {
        let front = self.front_or_rear == FrontOrRear::Front;
        match self.plane() {
            AxisMask::XY => {
                if front {
                    "front"
                } else {
                    "rear"
                }
            }
            AxisMask::XZ => {
                if front {
                    "top"
                } else {
                    "bottom"
                }
            }
            AxisMask::YZ => {
                if front {
                    "right"
                } else {
                    "left"
                }
            }
            _ => "",
        }
    }

    /// Plane name followed by the label, e.g. `"XZtop"`. Used as the key for
    /// per-face default styles.
    pub fn axes_string(&self) -> String {
        format!("{}{}", self.plane(), self.label())
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.axes_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_to_int_folds_sixteen_codes() {
        let mut hits = [0usize; FACE_COUNT];
        for code in 0u8..16 {
            if let Some(slot) = face_to_int(code) {
                hits[slot] += 1;
            }
        }
        assert_eq!(hits, [2; FACE_COUNT]);
        for code in [0u8, 7, 8, 15] {
            assert!(face_to_int(code).is_none());
        }
    }

    #[test]
    fn test_slot_codes_are_consistent() {
        for slot in 0..FACE_COUNT {
            let code = int_to_face(slot).unwrap();
            assert_eq!(face_to_int(code), Some(slot));
            let face = Face::from_slot(slot).unwrap();
            assert_eq!(face.slot(), Some(slot));
        }
        assert!(int_to_face(6).is_none());
    }

    #[test]
    fn test_corner_ids_roundtrip() {
        for slot in 0..FACE_COUNT {
            let face = Face::from_slot(slot).unwrap();
            let ids = face.corner_ids();
            assert_eq!(Face::from_corner_ids(ids), Some(face));
            // every corner of the face shares the orthogonal bit
            let orth = face.orth_axis().bits();
            let bit = ids[0] & orth;
            assert!(ids.iter().all(|id| id & orth == bit));
        }
    }

    #[test]
    fn test_from_code_recovers_single_axis() {
        let face = Face::from_code(1).unwrap();
        assert_eq!(face.plane(), AxisMask::YZ);
        assert_eq!(face.front_or_rear, FrontOrRear::Front);
        assert_eq!(face.code(), 6);

        let rear = Face::from_code(12).unwrap();
        assert_eq!(rear.plane(), AxisMask::XY);
        assert_eq!(rear.front_or_rear, FrontOrRear::Rear);
    }

    #[test]
    fn test_from_code_rejects_invalid() {
        for code in [-1i64, 0, 7, 8, 15, 16, 300] {
            assert!(matches!(
                Face::from_code(code),
                Err(Persp3dError::InvalidSideType(c)) if c == code
            ));
        }
    }

    #[test]
    fn test_labels() {
        let names: Vec<String> = (0..FACE_COUNT)
            .map(|s| Face::from_slot(s).unwrap().axes_string())
            .collect();
        assert_eq!(
            names,
            ["YZright", "YZleft", "XZtop", "XZbottom", "XYfront", "XYrear"]
        );
    }

    #[test]
    fn test_slot_plane() {
        assert_eq!(slot_plane(0), AxisMask::YZ);
        assert_eq!(slot_plane(3), AxisMask::XZ);
        assert_eq!(slot_plane(5), AxisMask::XY);
        assert_eq!(slot_plane(9), AxisMask::NONE);
    }
}
