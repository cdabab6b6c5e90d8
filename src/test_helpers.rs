//! Shared test utilities for the tripart test suite.
//!
//! Synthesizes small JPEG fixtures in memory and on disk, optionally tagged
//! with an EXIF orientation, so tests never depend on checked-in binaries.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let jpeg = jpeg_with_orientation(64, 48, ExifOrientation::ROTATE_90);
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = write_fixture(tmp.path(), "photo.jpg", &jpeg);
//! ```

use image::{ImageEncoder, RgbImage};
use std::path::{Path, PathBuf};

use crate::imaging::ExifOrientation;
use crate::imaging::exif_parser::embed_orientation;

// =========================================================================
// In-memory fixtures
// =========================================================================

/// Encode a gradient JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Encode a gradient JPEG carrying an EXIF orientation tag.
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: ExifOrientation) -> Vec<u8> {
    embed_orientation(&jpeg_bytes(width, height), orientation).unwrap()
}

/// Count APP1 segments whose payload starts with the Exif header.
pub fn count_exif_segments(jpeg: &[u8]) -> usize {
    jpeg.windows(10)
        .filter(|w| w[0] == 0xFF && w[1] == 0xE1 && &w[4..10] == b"Exif\0\0")
        .count()
}

// =========================================================================
// On-disk fixtures
// =========================================================================

/// Write `bytes` to `dir/name` and return the full path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
