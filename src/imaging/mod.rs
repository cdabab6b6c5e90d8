//! Image processing in pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **EXIF orientation** | `kamadak-exif` reader + APP1 splice |
//! | **Decimate** | `jpeg-decoder` DCT scaling for JPEG, `thumbnail_exact` otherwise |
//! | **Resample** | `resize_exact` |
//! | **Encode → JPEG** | `JpegEncoder` at the configured quality |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Orientation**: EXIF tag values and their rotation classes
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod exif_parser;
pub mod operations;
mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    calculate_preview_dimensions, calculate_sample_factor, logical_dimensions, sampled_dimensions,
};
pub use exif_parser::{MetadataError, embed_orientation, read_orientation};
pub use operations::{
    PreviewConfig, create_preview, get_dimensions, plan_preview, resolve_orientation,
};
pub use orientation::{ExifOrientation, OrientationClass};
pub use params::{PreviewParams, Quality, Resampling};
pub use rust_backend::{RustBackend, supported_input_extensions};
