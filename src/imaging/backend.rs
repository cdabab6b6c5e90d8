//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations the preview
//! pipeline needs: identify, read_orientation, render_preview, and
//! tag_orientation. Rendering and tagging are separate calls because the
//! encoder knows nothing about EXIF; the tag is patched into the encoded
//! bytes afterwards.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and statically
//! linked.

use super::exif_parser::MetadataError;
use super::orientation::ExifOrientation;
use super::params::PreviewParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Render failed: {0}")]
    Render(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Trait for image processing backends.
///
/// All operations take the encoded source bytes; none of them retain
/// anything between calls, so one backend can serve concurrent builds.
pub trait ImageBackend: Sync {
    /// Get pixel dimensions from the header, without decoding pixel data.
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError>;

    /// Read the raw EXIF orientation tag. Absent tag → `UNDEFINED`.
    fn read_orientation(&self, data: &[u8]) -> Result<ExifOrientation, MetadataError>;

    /// Decode at the sample factor, resample to exact size, encode JPEG.
    fn render_preview(&self, data: &[u8], params: &PreviewParams) -> Result<Vec<u8>, BackendError>;

    /// Write the orientation tag into an encoded JPEG.
    fn tag_orientation(
        &self,
        jpeg: &[u8],
        orientation: ExifOrientation,
    ) -> Result<Vec<u8>, BackendError>;
}
