//! The info part: logical image size plus rotation class.
//!
//! Serialized as compact JSON with the fields in a fixed order:
//!
//! ```text
//! {"orientation":2,"width":4000,"height":3000}
//! ```
//!
//! `width` and `height` are what a viewer sees after applying the rotation,
//! not the dimensions of the stored pixel buffer.

use crate::imaging::{OrientationClass, logical_dimensions};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoRecord {
    pub orientation: OrientationClass,
    pub width: u32,
    pub height: u32,
}

impl InfoRecord {
    /// Build the record from raw pixel dimensions, swapping axes for
    /// quarter-turn rotations.
    pub fn from_raw(raw: (u32, u32), orientation: OrientationClass) -> Self {
        let (width, height) = logical_dimensions(raw, orientation);
        Self {
            orientation,
            width,
            height,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode an info part back into a record.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
