//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Orientation | `kamadak-exif` via [`exif_parser`](super::exif_parser) |
//! | Decode JPEG at 1/2, 1/4, 1/8 | `jpeg-decoder` DCT scaling (`Decoder::scale`) |
//! | Decode (PNG, TIFF, WebP, other JPEG) | `image` crate (pure Rust decoders) |
//! | Trim to the sampled size | `image::DynamicImage::thumbnail_exact` (area average) |
//! | Resample to exact size | `image::DynamicImage::resize_exact` (configurable filter) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Orientation patch | APP1 splice in [`exif_parser`](super::exif_parser) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::sampled_dimensions;
use super::exif_parser::{self, MetadataError};
use super::orientation::ExifOrientation;
use super::params::{PreviewParams, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, RgbImage};
use jpeg_decoder::PixelFormat;
use std::io::Cursor;
use std::sync::LazyLock;
use tracing::debug;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Decode at `1/factor` of the stored size: `floor(w/F) x floor(h/F)`.
///
/// JPEG sources are reduced inside the decoder, so no full-resolution
/// buffer is allocated. Other containers decode at full size. Either way
/// `thumbnail_exact` trims the bitmap to the exact sampled size.
///
/// Decoding failures here are render failures: the header already parsed
/// during identify, so the pixel data itself is broken.
fn decode_sampled(data: &[u8], factor: u32) -> Result<DynamicImage, BackendError> {
    let (raw, img) = match decode_jpeg_scaled(data, factor) {
        Some(decoded) => decoded,
        None => {
            let img = reader(data)?
                .decode()
                .map_err(|e| BackendError::Render(format!("Failed to decode source: {e}")))?;
            ((img.width(), img.height()), img)
        }
    };

    if factor <= 1 {
        return Ok(img);
    }
    let (w, h) = sampled_dimensions(raw, factor);
    if img.width() == w && img.height() == h {
        Ok(img)
    } else {
        Ok(img.thumbnail_exact(w, h))
    }
}

/// DCT-scaled JPEG decode. Returns the stored size and the reduced bitmap.
///
/// The decoder picks the largest reduction (down to 1/8) that still covers
/// the sampled size. `None` means "use the generic path": not a JPEG, no
/// reduction requested, a pixel format without a direct `image` buffer
/// (CMYK, 16-bit lossless), or a stream this decoder rejects.
fn decode_jpeg_scaled(data: &[u8], factor: u32) -> Option<((u32, u32), DynamicImage)> {
    if factor <= 1 || image::guess_format(data).ok()? != ImageFormat::Jpeg {
        return None;
    }

    let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(data));
    if let Err(e) = decoder.read_info() {
        debug!(error = %e, "scaled JPEG decode unavailable, decoding at full size");
        return None;
    }
    let info = decoder.info()?;
    if !matches!(info.pixel_format, PixelFormat::RGB24 | PixelFormat::L8) {
        return None;
    }

    let raw = (u32::from(info.width), u32::from(info.height));
    let (target_w, target_h) = sampled_dimensions(raw, factor);
    let scaled = decoder.scale(
        u16::try_from(target_w).ok()?,
        u16::try_from(target_h).ok()?,
    );
    let (w, h) = match scaled {
        Ok((w, h)) => (u32::from(w), u32::from(h)),
        Err(e) => {
            debug!(error = %e, "JPEG decoder refused to scale, decoding at full size");
            return None;
        }
    };
    let pixels = match decoder.decode() {
        Ok(pixels) => pixels,
        Err(e) => {
            debug!(error = %e, "scaled JPEG decode failed, retrying at full size");
            return None;
        }
    };
    debug!(width = w, height = h, "decoded JPEG with DCT scaling");

    let img = match info.pixel_format {
        PixelFormat::RGB24 => DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, pixels)?),
        PixelFormat::L8 => DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, pixels)?),
        _ => return None,
    };
    Some((raw, img))
}

/// Encode as baseline JPEG. Alpha is dropped; JPEG has no alpha channel.
fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::Render(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(data)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {e}")))?;
        if width == 0 || height == 0 {
            return Err(BackendError::Decode(format!(
                "Image reports empty dimensions {width}x{height}"
            )));
        }
        Ok(Dimensions { width, height })
    }

    fn read_orientation(&self, data: &[u8]) -> Result<ExifOrientation, MetadataError> {
        exif_parser::read_orientation(data)
    }

    fn render_preview(&self, data: &[u8], params: &PreviewParams) -> Result<Vec<u8>, BackendError> {
        let sampled = decode_sampled(data, params.sample_factor)?;

        let scaled = if sampled.width() == params.width && sampled.height() == params.height {
            sampled
        } else {
            sampled.resize_exact(params.width, params.height, params.filter.filter_type())
        };

        encode_jpeg(&scaled, params.quality)
    }

    fn tag_orientation(
        &self,
        jpeg: &[u8],
        orientation: ExifOrientation,
    ) -> Result<Vec<u8>, BackendError> {
        exif_parser::embed_orientation(jpeg, orientation)
            .map_err(|e| BackendError::Render(format!("Failed to embed orientation: {e}")))
    }
}
