//! The image triple builder.
//!
//! One build is a straight sequence over a single in-memory copy of the
//! source:
//!
//! ```text
//! read source ─▶ probe bounds ─▶ resolve orientation ─▶ plan preview
//!                                                          │
//!        ImageTriple ◀─ package ◀─ tag orientation ◀─ render preview
//! ```
//!
//! Every intermediate buffer is an owned value, so an early `?` return
//! drops everything built so far. Either all three parts come back or none.
//!
//! The builder holds no mutable state. One instance can serve any number of
//! concurrent builds when its backend is `Sync`.

use crate::imaging::{
    BackendError, Dimensions, ExifOrientation, ImageBackend, OrientationClass, PreviewConfig,
    PreviewParams, RustBackend, create_preview, logical_dimensions, plan_preview,
    resolve_orientation, sampled_dimensions,
};
use crate::info::InfoRecord;
use crate::parts::ImageTriple;
use crate::source::{ImageSource, SourceError};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid source {source_name}: {reason}")]
    InvalidSource { source_name: String, reason: String },
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Render failed: {0}")]
    Render(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Info record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<SourceError> for BuildError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Invalid {
                source_name,
                reason,
            } => BuildError::InvalidSource {
                source_name,
                reason,
            },
            SourceError::Io(e) => BuildError::Io(e),
        }
    }
}

impl From<BackendError> for BuildError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Io(e) => BuildError::Io(e),
            BackendError::Decode(msg) => BuildError::Decode(msg),
            BackendError::Render(msg) => BuildError::Render(msg),
        }
    }
}

/// Everything known about a source before any pixels are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildPlan {
    /// Pixel buffer dimensions as stored.
    pub raw: Dimensions,
    /// Orientation tag as found, carried into the preview verbatim.
    pub orientation: ExifOrientation,
    pub class: OrientationClass,
    /// Dimensions as displayed after rotation.
    pub logical: (u32, u32),
    pub preview: PreviewParams,
}

impl BuildPlan {
    pub fn info(&self) -> InfoRecord {
        InfoRecord::from_raw(self.raw.as_tuple(), self.class)
    }

    /// Bitmap size after decoding at `1/sample_factor`, before the resample.
    pub fn sampled(&self) -> (u32, u32) {
        sampled_dimensions(self.raw.as_tuple(), self.preview.sample_factor)
    }
}

/// Builds [`ImageTriple`]s from full-resolution sources.
pub struct TripleBuilder<B: ImageBackend = RustBackend> {
    backend: B,
    config: PreviewConfig,
}

impl TripleBuilder<RustBackend> {
    pub fn new(config: PreviewConfig) -> Self {
        Self::with_backend(RustBackend::new(), config)
    }
}

impl Default for TripleBuilder<RustBackend> {
    fn default() -> Self {
        Self::new(PreviewConfig::default())
    }
}

impl<B: ImageBackend> TripleBuilder<B> {
    /// Build with a specific backend (allows testing with mock).
    pub fn with_backend(backend: B, config: PreviewConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Probe bounds and orientation, and size the preview. No pixel decode.
    pub fn plan(&self, data: &[u8]) -> Result<BuildPlan, BuildError> {
        let raw = self.backend.identify(data)?;
        debug!(width = raw.width, height = raw.height, "probed bounds");

        let orientation = resolve_orientation(&self.backend, data);
        let class = orientation.class();
        let logical = logical_dimensions(raw.as_tuple(), class);
        debug!(
            raw = orientation.value(),
            class = class.degrees(),
            logical_width = logical.0,
            logical_height = logical.1,
            "resolved orientation"
        );

        let preview = plan_preview(raw.as_tuple(), &self.config);
        let plan = BuildPlan {
            raw,
            orientation,
            class,
            logical,
            preview,
        };
        let (sampled_width, sampled_height) = plan.sampled();
        debug!(
            width = preview.width,
            height = preview.height,
            sample_factor = preview.sample_factor,
            sampled_width,
            sampled_height,
            "planned preview"
        );

        Ok(plan)
    }

    /// Run the whole pipeline on `source`.
    pub fn build(&self, source: ImageSource) -> Result<ImageTriple, BuildError> {
        let name = source.to_string();
        let data = source.read_all()?;
        debug!(source = %name, bytes = data.len(), "read source");
        self.build_from_bytes(data)
    }

    /// Run the pipeline on bytes already in memory.
    ///
    /// Empty input is rejected the same way an empty source is.
    pub fn build_from_bytes(&self, data: Vec<u8>) -> Result<ImageTriple, BuildError> {
        if data.is_empty() {
            return Err(BuildError::InvalidSource {
                source_name: "buffer".to_string(),
                reason: "zero-length buffer".to_string(),
            });
        }

        let plan = self.plan(&data)?;
        let preview = create_preview(&self.backend, &data, &plan.preview, plan.orientation)?;
        let info = plan.info().to_json()?.into_bytes();

        info!(
            full = data.len(),
            preview = preview.len(),
            info = info.len(),
            "built image triple"
        );
        Ok(ImageTriple::new(data, preview, info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::MetadataError;
    use crate::imaging::backend::tests::{MOCK_PREVIEW, MockBackend, RecordedOp};
    use crate::parts::{CONTENT_TYPE_FULL, CONTENT_TYPE_INFO, CONTENT_TYPE_PREVIEW};
    use std::io::Cursor;

    const SOURCE: &[u8] = b"\xFF\xD8fake full-resolution bytes";

    fn builder(backend: MockBackend) -> TripleBuilder<MockBackend> {
        TripleBuilder::with_backend(backend, PreviewConfig::default())
    }

    fn mock(width: u32, height: u32, orientation: ExifOrientation) -> MockBackend {
        MockBackend::with_orientation(vec![Dimensions { width, height }], orientation)
    }

    fn stream(bytes: &[u8]) -> ImageSource {
        ImageSource::from_reader(Cursor::new(bytes.to_vec()), Some(bytes.len() as u64))
    }

    fn info_json(triple: &ImageTriple) -> &str {
        std::str::from_utf8(triple.info().bytes()).unwrap()
    }

    #[test]
    fn landscape_without_exif() {
        let builder = builder(mock(4000, 3000, ExifOrientation::UNDEFINED));

        let triple = builder.build(stream(SOURCE)).unwrap();

        assert_eq!(triple.full().bytes(), SOURCE);
        assert_eq!(
            info_json(&triple),
            r#"{"orientation":0,"width":4000,"height":3000}"#
        );
        assert_eq!(
            builder.backend().get_operations(),
            vec![
                RecordedOp::Identify(SOURCE.len()),
                RecordedOp::ReadOrientation(SOURCE.len()),
                RecordedOp::RenderPreview {
                    sample_factor: 4,
                    width: 512,
                    height: 384,
                    quality: 75,
                },
                RecordedOp::TagOrientation(0),
            ]
        );
    }

    #[test]
    fn portrait_rotated_270_cw_reports_swapped_size() {
        let builder = builder(mock(3000, 4000, ExifOrientation::ROTATE_270));

        let triple = builder.build(stream(SOURCE)).unwrap();

        assert_eq!(
            info_json(&triple),
            r#"{"orientation":2,"width":4000,"height":3000}"#
        );
        // Preview is sized from the raw buffer, not the logical size
        let ops = builder.backend().get_operations();
        assert!(ops.contains(&RecordedOp::RenderPreview {
            sample_factor: 4,
            width: 384,
            height: 512,
            quality: 75,
        }));
        assert_eq!(ops.last(), Some(&RecordedOp::TagOrientation(8)));
    }

    #[test]
    fn portrait_rotated_90_cw_reports_swapped_size() {
        let builder = builder(mock(3000, 4000, ExifOrientation::ROTATE_90));

        let triple = builder.build(stream(SOURCE)).unwrap();

        assert_eq!(
            info_json(&triple),
            r#"{"orientation":3,"width":4000,"height":3000}"#
        );
    }

    #[test]
    fn flip_tag_is_preserved_verbatim() {
        let builder = builder(mock(800, 600, ExifOrientation::FLIP_HORIZONTAL));

        let triple = builder.build(stream(SOURCE)).unwrap();

        // Mock tagging appends the raw value; the flip is not collapsed
        let mut expected = MOCK_PREVIEW.to_vec();
        expected.extend_from_slice(&2u16.to_be_bytes());
        assert_eq!(triple.preview().bytes(), expected.as_slice());
        assert_eq!(
            info_json(&triple),
            r#"{"orientation":0,"width":800,"height":600}"#
        );
    }

    #[test]
    fn malformed_exif_degrades_to_default() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 640,
            height: 480,
        }]);
        backend
            .orientation_results
            .lock()
            .unwrap()
            .push(Err(MetadataError::MalformedTag("garbage".to_string())));
        let builder = builder(backend);

        let triple = builder.build(stream(SOURCE)).unwrap();

        assert_eq!(
            info_json(&triple),
            r#"{"orientation":0,"width":640,"height":480}"#
        );
        assert_eq!(
            builder.backend().get_operations().last(),
            Some(&RecordedOp::TagOrientation(0))
        );
    }

    #[test]
    fn empty_stream_is_invalid_and_never_reaches_backend() {
        let builder = builder(mock(100, 100, ExifOrientation::NORMAL));

        let result = builder.build(ImageSource::from_reader(std::io::empty(), None));

        assert!(matches!(result, Err(BuildError::InvalidSource { .. })));
        assert!(builder.backend().get_operations().is_empty());
    }

    #[test]
    fn missing_file_is_invalid() {
        let tmp = tempfile::TempDir::new().unwrap();
        let builder = builder(mock(100, 100, ExifOrientation::NORMAL));

        let result = builder.build(ImageSource::from_path(tmp.path().join("missing.jpg")));

        assert!(matches!(result, Err(BuildError::InvalidSource { .. })));
        assert!(builder.backend().get_operations().is_empty());
    }

    #[test]
    fn empty_buffer_is_invalid() {
        let builder = builder(mock(100, 100, ExifOrientation::NORMAL));
        let result = builder.build_from_bytes(Vec::new());
        assert!(matches!(result, Err(BuildError::InvalidSource { .. })));
    }

    #[test]
    fn unrecognized_image_is_decode_error() {
        // No mock dimensions queued: identify fails
        let builder = builder(MockBackend::new());

        let result = builder.build(stream(SOURCE));

        assert!(matches!(result, Err(BuildError::Decode(_))));
        assert_eq!(
            builder.backend().get_operations(),
            vec![RecordedOp::Identify(SOURCE.len())]
        );
    }

    #[test]
    fn render_failure_returns_no_parts() {
        let backend = MockBackend {
            fail_render: true,
            ..mock(4000, 3000, ExifOrientation::NORMAL)
        };
        let builder = builder(backend);

        let result = builder.build(stream(SOURCE));

        assert!(matches!(result, Err(BuildError::Render(_))));
        // Tagging never ran
        assert!(
            !builder
                .backend()
                .get_operations()
                .iter()
                .any(|op| matches!(op, RecordedOp::TagOrientation(_)))
        );
    }

    #[test]
    fn parts_always_in_fixed_order() {
        for (w, h) in [(1, 1), (512, 512), (4000, 3000), (100, 9000)] {
            let builder = builder(mock(w, h, ExifOrientation::NORMAL));
            let triple = builder.build(stream(SOURCE)).unwrap();

            let types: Vec<_> = triple.parts().iter().map(|p| p.content_type()).collect();
            assert_eq!(
                types,
                vec![CONTENT_TYPE_FULL, CONTENT_TYPE_PREVIEW, CONTENT_TYPE_INFO]
            );
        }
    }

    #[test]
    fn plan_reports_everything_without_rendering() {
        let builder = builder(mock(3000, 4000, ExifOrientation::TRANSPOSE));

        let plan = builder.plan(SOURCE).unwrap();

        assert_eq!(plan.raw.as_tuple(), (3000, 4000));
        assert_eq!(plan.orientation, ExifOrientation::TRANSPOSE);
        assert_eq!(plan.class, OrientationClass::Rotate270);
        assert_eq!(plan.logical, (4000, 3000));
        assert_eq!((plan.preview.width, plan.preview.height), (384, 512));
        assert_eq!(plan.preview.sample_factor, 4);
        assert_eq!(plan.sampled(), (750, 1000));
        assert!(
            !builder
                .backend()
                .get_operations()
                .iter()
                .any(|op| matches!(op, RecordedOp::RenderPreview { .. }))
        );
    }

    #[test]
    fn custom_box_flows_into_render() {
        let config = PreviewConfig {
            max_width: 100,
            max_height: 100,
            ..PreviewConfig::default()
        };
        let builder = TripleBuilder::with_backend(mock(1600, 1200, ExifOrientation::NORMAL), config);

        builder.build(stream(SOURCE)).unwrap();

        assert!(
            builder
                .backend()
                .get_operations()
                .contains(&RecordedOp::RenderPreview {
                    sample_factor: 8,
                    width: 100,
                    height: 75,
                    quality: 75,
                })
        );
    }

    #[test]
    fn builder_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TripleBuilder>();
    }
}
