//! # tripart
//!
//! Builds three-part image messages from full-resolution photos. Every
//! message is the same fixed triple:
//!
//! ```text
//! 0  image/jpeg                   the source bytes, untouched
//! 1  image/jpeg+preview           a scaled JPEG, orientation tag preserved
//! 2  application/json+imageSize   {"orientation":N,"width":W,"height":H}
//! ```
//!
//! A consumer finds each part by index, never by sniffing content.
//!
//! # Pipeline
//!
//! ```text
//! ImageSource ─▶ bounds probe ─▶ orientation ─▶ preview sizing ─▶ sample factor
//!                                                                     │
//!                       ImageTriple ◀─ packaging ◀─ render + re-tag ◀─┘
//! ```
//!
//! The info record reports *logical* dimensions: for a photo shot in
//! portrait and stored as a landscape buffer with a rotation tag, the
//! record says portrait. The preview keeps the stored buffer layout and
//! carries the raw orientation tag, so viewers rotate it exactly like the
//! full image.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`builder`] | [`TripleBuilder`](builder::TripleBuilder): runs the pipeline, maps failures to [`BuildError`](builder::BuildError) |
//! | [`source`] | [`ImageSource`](source::ImageSource): a path or a byte stream, validated before decode |
//! | [`imaging`] | Dimension math, EXIF orientation, and the [`ImageBackend`](imaging::ImageBackend) that decodes and encodes |
//! | [`info`] | The JSON info record and its orientation-driven axis swap |
//! | [`parts`] | Content types and the ordered [`ImageTriple`](parts::ImageTriple) |
//! | [`capture`] | Serializable state for a photo that is still being captured |
//! | [`config`] | `config.toml` loading, validation, and merging over stock defaults |
//! | [`batch`] | Parallel builds for the CLI, writing parts to disk |
//! | [`output`] | CLI output formatting |
//!
//! # Example
//!
//! ```no_run
//! use tripart::builder::TripleBuilder;
//! use tripart::source::ImageSource;
//!
//! let builder = TripleBuilder::default();
//! let triple = builder.build(ImageSource::from_path("photo.jpg"))?;
//! for part in triple.parts() {
//!     println!("{} {} bytes", part.content_type(), part.len());
//! }
//! # Ok::<(), tripart::builder::BuildError>(())
//! ```
//!
//! # Design Decisions
//!
//! ## Flips Collapse Into Rotations
//!
//! The eight EXIF orientations fold into four rotation classes. A mirrored
//! photo reports the size of its nearest rotation. The raw tag still goes
//! into the preview untouched, so nothing is lost for viewers that handle
//! mirroring themselves.
//!
//! ## Decode Big, Then Resample
//!
//! The sample factor is the largest power of two that keeps the decoded
//! bitmap at or above the preview size, backed off one step. The final
//! resize is then always a downscale.
//!
//! ## Two-Pass Preview
//!
//! The JPEG encoder knows nothing about EXIF. Rendering produces bare JPEG
//! bytes; a second pass splices an APP1 segment holding the orientation
//! tag into exactly those bytes.

pub mod batch;
pub mod builder;
pub mod capture;
pub mod config;
pub mod imaging;
pub mod info;
pub mod output;
pub mod parts;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;
