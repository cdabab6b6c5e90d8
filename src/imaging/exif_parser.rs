//! EXIF orientation: read from any container, write into a JPEG.
//!
//! Reading goes through `kamadak-exif`, which understands JPEG, TIFF, PNG,
//! WebP and HEIF containers.
//!
//! Writing is the second pass of preview rendering. The encoder produces a
//! bare JPEG; this module then builds a one-field TIFF block holding the
//! orientation tag and splices it in as an APP1 `Exif\0\0` segment:
//!
//! ```text
//! SOI  [APP0 JFIF]  APP1 Exif  ...other markers...  SOS  scan data  EOI
//!                   ^ inserted here, replacing any earlier Exif APP1
//! ```

use super::orientation::ExifOrientation;
use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),
    #[error("Malformed orientation tag: {0}")]
    MalformedTag(String),
    #[error("Not a JPEG stream")]
    NotJpeg,
    #[error("Truncated or malformed JPEG segment at offset {0}")]
    Truncated(usize),
    #[error("EXIF block too large for an APP1 segment ({0} bytes)")]
    TooLarge(usize),
}

const EXIF_HEADER: &[u8] = b"Exif\0\0";

const SOI: u8 = 0xD8;
const SOS: u8 = 0xDA;
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;

/// Read the raw orientation tag from an encoded image.
///
/// A container without an EXIF block, or an EXIF block without the tag,
/// yields [`ExifOrientation::UNDEFINED`]. Only a block that is present but
/// unreadable is an error.
pub fn read_orientation(data: &[u8]) -> Result<ExifOrientation, MetadataError> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(ExifOrientation::UNDEFINED),
        Err(e) => return Err(e.into()),
    };

    let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) else {
        return Ok(ExifOrientation::UNDEFINED);
    };

    let value = field.value.get_uint(0).ok_or_else(|| {
        MetadataError::MalformedTag(format!("unexpected value type {:?}", field.value))
    })?;
    u16::try_from(value)
        .map(ExifOrientation)
        .map_err(|_| MetadataError::MalformedTag(format!("value {value} out of range")))
}

/// Return a copy of `jpeg` carrying `orientation` in its EXIF block.
///
/// Any existing Exif APP1 segment is dropped; every other segment and the
/// entropy-coded data are copied through byte for byte.
pub fn embed_orientation(
    jpeg: &[u8],
    orientation: ExifOrientation,
) -> Result<Vec<u8>, MetadataError> {
    if jpeg.len() < 2 || jpeg[0] != 0xFF || jpeg[1] != SOI {
        return Err(MetadataError::NotJpeg);
    }

    let segment = exif_segment(orientation)?;
    let mut out = Vec::with_capacity(jpeg.len() + segment.len());
    out.extend_from_slice(&jpeg[..2]);

    let mut inserted = false;
    let mut pos = 2;
    loop {
        if pos + 2 > jpeg.len() || jpeg[pos] != 0xFF {
            return Err(MetadataError::Truncated(pos));
        }
        let marker = jpeg[pos + 1];

        // Fill bytes before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }

        // Image data starts: everything from here on is copied verbatim
        if marker == SOS {
            if !inserted {
                out.extend_from_slice(&segment);
            }
            out.extend_from_slice(&jpeg[pos..]);
            return Ok(out);
        }

        // Markers without a length field
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            out.extend_from_slice(&jpeg[pos..pos + 2]);
            pos += 2;
            continue;
        }

        if pos + 4 > jpeg.len() {
            return Err(MetadataError::Truncated(pos));
        }
        let len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        let end = pos + 2 + len;
        if len < 2 || end > jpeg.len() {
            return Err(MetadataError::Truncated(pos));
        }

        let is_exif = marker == APP1 && jpeg[pos + 4..end].starts_with(EXIF_HEADER);
        if !is_exif {
            // APP0 (JFIF) must stay first; the Exif segment goes right after it
            if !inserted && marker != APP0 {
                out.extend_from_slice(&segment);
                inserted = true;
            }
            out.extend_from_slice(&jpeg[pos..end]);
        }
        pos = end;
    }
}

/// Build a complete APP1 segment (marker, length, payload) for `orientation`.
fn exif_segment(orientation: ExifOrientation) -> Result<Vec<u8>, MetadataError> {
    let field = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![orientation.value()]),
    };
    let mut writer = Writer::new();
    writer.push_field(&field);
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false)?;
    let tiff = tiff.into_inner();

    let payload_len = EXIF_HEADER.len() + tiff.len();
    if payload_len + 2 > u16::MAX as usize {
        return Err(MetadataError::TooLarge(payload_len));
    }

    let mut segment = Vec::with_capacity(payload_len + 4);
    segment.extend_from_slice(&[0xFF, APP1]);
    segment.extend_from_slice(&((payload_len + 2) as u16).to_be_bytes());
    segment.extend_from_slice(EXIF_HEADER);
    segment.extend_from_slice(&tiff);
    Ok(segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{count_exif_segments, jpeg_bytes, jpeg_with_orientation};

    #[test]
    fn plain_jpeg_reads_undefined() {
        let jpeg = jpeg_bytes(32, 24);
        assert_eq!(
            read_orientation(&jpeg).unwrap(),
            ExifOrientation::UNDEFINED
        );
    }

    #[test]
    fn png_without_exif_reads_undefined() {
        let img = image::RgbImage::new(8, 8);
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        assert_eq!(read_orientation(&png).unwrap(), ExifOrientation::UNDEFINED);
    }

    #[test]
    fn embedded_orientation_reads_back() {
        let jpeg = embed_orientation(&jpeg_bytes(32, 24), ExifOrientation::ROTATE_90).unwrap();
        assert_eq!(read_orientation(&jpeg).unwrap(), ExifOrientation::ROTATE_90);
    }

    #[test]
    fn undefined_is_written_verbatim() {
        let jpeg = embed_orientation(&jpeg_bytes(16, 16), ExifOrientation::UNDEFINED).unwrap();
        assert_eq!(count_exif_segments(&jpeg), 1);
        assert_eq!(read_orientation(&jpeg).unwrap(), ExifOrientation::UNDEFINED);
    }

    #[test]
    fn embedding_replaces_existing_exif() {
        let tagged = jpeg_with_orientation(32, 24, ExifOrientation::TRANSVERSE);
        let retagged = embed_orientation(&tagged, ExifOrientation::ROTATE_180).unwrap();

        assert_eq!(count_exif_segments(&retagged), 1);
        assert_eq!(
            read_orientation(&retagged).unwrap(),
            ExifOrientation::ROTATE_180
        );
    }

    #[test]
    fn embedding_keeps_image_decodable() {
        let jpeg = embed_orientation(&jpeg_bytes(40, 30), ExifOrientation::ROTATE_270).unwrap();
        let img = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((img.width(), img.height()), (40, 30));
    }

    #[test]
    fn exif_follows_jfif_header() {
        let jpeg = embed_orientation(&jpeg_bytes(16, 16), ExifOrientation::NORMAL).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, SOI]);
        if jpeg[3] == APP0 {
            let app0_len = u16::from_be_bytes([jpeg[4], jpeg[5]]) as usize;
            let next = 2 + 2 + app0_len;
            assert_eq!(jpeg[next + 1], APP1);
        } else {
            assert_eq!(jpeg[3], APP1);
        }
    }

    #[test]
    fn non_jpeg_is_rejected() {
        let result = embed_orientation(b"\x89PNG\r\n\x1a\n", ExifOrientation::NORMAL);
        assert!(matches!(result, Err(MetadataError::NotJpeg)));
    }

    #[test]
    fn truncated_jpeg_is_rejected() {
        let jpeg = jpeg_bytes(16, 16);
        // Cut inside the first segment header
        let result = embed_orientation(&jpeg[..5], ExifOrientation::NORMAL);
        assert!(matches!(result, Err(MetadataError::Truncated(_))));
    }

    #[test]
    fn garbage_exif_block_is_an_error() {
        // SOI, APP1 "Exif\0\0" + bytes that are not a TIFF header, EOI
        let mut data = vec![0xFF, SOI, 0xFF, APP1];
        let payload = b"Exif\0\0XXXXXXXXXXXX";
        data.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        data.extend_from_slice(payload);
        data.extend_from_slice(&[0xFF, 0xD9]);

        assert!(read_orientation(&data).is_err());
    }
}
