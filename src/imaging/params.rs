//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which plans the preview) and the [`backend`](super::backend) (which does
//! the actual pixel work). This separation allows swapping backends (e.g. for
//! testing with a mock) without changing planning logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 75). Clamped on construction.
//! - [`Resampling`]: Filter used for the final exact-size resample.
//! - [`PreviewParams`]: Full specification for a preview render: sample factor,
//!   target dimensions, quality, filter.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// Resampling filter for the exact-size scale after decimation.
///
/// `Triangle` is bilinear. `Nearest` is accepted for completeness but blurs
/// nothing and aliases badly; it is not a sensible preview filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resampling {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl Resampling {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Parameters for a preview render (decimate, resample, encode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewParams {
    /// Power-of-two decode decimation factor (≥ 1).
    pub sample_factor: u32,
    /// Exact output dimensions.
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub filter: Resampling,
}
