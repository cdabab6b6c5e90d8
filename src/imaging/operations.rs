//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{calculate_preview_dimensions, calculate_sample_factor};
use super::orientation::ExifOrientation;
use super::params::{PreviewParams, Quality, Resampling};
use tracing::{debug, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, data: &[u8]) -> Result<(u32, u32)> {
    let dims = backend.identify(data)?;
    Ok(dims.as_tuple())
}

/// Read the orientation tag, degrading unreadable metadata to `UNDEFINED`.
///
/// A broken EXIF block never fails a build; it is logged and ignored.
pub fn resolve_orientation(backend: &impl ImageBackend, data: &[u8]) -> ExifOrientation {
    match backend.read_orientation(data) {
        Ok(orientation) => {
            debug!(
                raw = orientation.value(),
                name = orientation.name(),
                "found EXIF orientation"
            );
            orientation
        }
        Err(e) => {
            warn!(error = %e, "unreadable EXIF metadata, assuming undefined orientation");
            ExifOrientation::UNDEFINED
        }
    }
}

/// Configuration for preview generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Bounding box the preview must fit inside.
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
    pub filter: Resampling,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_width: 512,
            max_height: 512,
            quality: Quality::default(),
            filter: Resampling::default(),
        }
    }
}

/// Plan a preview render without executing it.
///
/// Works in raw (pre-rotation) pixel space, matching how the decoder samples.
pub fn plan_preview(original: (u32, u32), config: &PreviewConfig) -> PreviewParams {
    let (width, height) =
        calculate_preview_dimensions(original, (config.max_width, config.max_height));
    let sample_factor = calculate_sample_factor(original, (width, height));

    PreviewParams {
        sample_factor,
        width,
        height,
        quality: config.quality,
        filter: config.filter,
    }
}

/// Render a preview and tag it with the source orientation.
///
/// Two passes: the backend encodes the pixels, then patches the raw
/// orientation value into the encoded bytes.
pub fn create_preview(
    backend: &impl ImageBackend,
    data: &[u8],
    params: &PreviewParams,
    orientation: ExifOrientation,
) -> Result<Vec<u8>> {
    let rendered = backend.render_preview(data, params)?;
    debug!(bytes = rendered.len(), "compressed preview");

    let tagged = backend.tag_orientation(&rendered, orientation)?;
    debug!(
        raw = orientation.value(),
        bytes = tagged.len(),
        "orientation preserved in preview"
    );
    Ok(tagged)
}
