//! EXIF orientation values and their collapse into four rotation classes.
//!
//! EXIF tag `0x0112` carries one of eight meaningful values (plus `0`,
//! "undefined", written by some cameras and used here as the "no tag"
//! value):
//!
//! ```text
//! 0 Undefined        → Rotate0
//! 1 Normal           → Rotate0
//! 2 FlipHorizontal   → Rotate0
//! 3 Rotate180        → Rotate180
//! 4 FlipVertical     → Rotate180
//! 5 Transpose        → Rotate270
//! 6 Rotate90 (CW)    → Rotate270
//! 7 Transverse       → Rotate90
//! 8 Rotate270 (CW)   → Rotate90
//! ```
//!
//! Mirroring is not modeled: each flip variant lands in its nearest rotation
//! class. The raw value is kept alongside the class so it can be written back
//! into the preview unchanged.

use serde::{Deserialize, Serialize};

/// Raw EXIF orientation tag value, carried verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExifOrientation(pub u16);

impl ExifOrientation {
    pub const UNDEFINED: Self = Self(0);
    pub const NORMAL: Self = Self(1);
    pub const FLIP_HORIZONTAL: Self = Self(2);
    pub const ROTATE_180: Self = Self(3);
    pub const FLIP_VERTICAL: Self = Self(4);
    pub const TRANSPOSE: Self = Self(5);
    pub const ROTATE_90: Self = Self(6);
    pub const TRANSVERSE: Self = Self(7);
    pub const ROTATE_270: Self = Self(8);

    pub fn value(self) -> u16 {
        self.0
    }

    /// Collapse into a rotation class. Unknown values read as `Rotate0`.
    pub fn class(self) -> OrientationClass {
        match self.0 {
            3 | 4 => OrientationClass::Rotate180,
            5 | 6 => OrientationClass::Rotate270,
            7 | 8 => OrientationClass::Rotate90,
            _ => OrientationClass::Rotate0,
        }
    }

    /// Human-readable name, for CLI and log output.
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "undefined",
            1 => "normal",
            2 => "flip-horizontal",
            3 => "rotate-180",
            4 => "flip-vertical",
            5 => "transpose",
            6 => "rotate-90",
            7 => "transverse",
            8 => "rotate-270",
            _ => "unknown",
        }
    }
}

/// Normalized rotation state of an image.
///
/// Serialized as its wire code (see [`OrientationClass::code`]), which is
/// *not* in rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OrientationClass {
    #[default]
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl OrientationClass {
    /// Wire code used in the info record: 0=0°, 1=180°, 2=90°, 3=270°.
    pub fn code(self) -> u8 {
        match self {
            Self::Rotate0 => 0,
            Self::Rotate180 => 1,
            Self::Rotate90 => 2,
            Self::Rotate270 => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Rotate0),
            1 => Some(Self::Rotate180),
            2 => Some(Self::Rotate90),
            3 => Some(Self::Rotate270),
            _ => None,
        }
    }

    /// Quarter turns swap the displayed width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::Rotate0 => 0,
            Self::Rotate90 => 90,
            Self::Rotate180 => 180,
            Self::Rotate270 => 270,
        }
    }
}

impl From<OrientationClass> for u8 {
    fn from(class: OrientationClass) -> u8 {
        class.code()
    }
}

impl TryFrom<u8> for OrientationClass {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("invalid orientation code {code}"))
    }
}
