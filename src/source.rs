//! Image sources: a path on disk or an opaque byte stream.
//!
//! Both variants end up as one owned byte buffer. The full part of a triple
//! is the source bytes untouched, so they are read exactly once and every
//! later step (probe, orientation, render) borrows that buffer.
//!
//! Validation happens here, before any decoding: a missing, unreadable or
//! empty source never reaches the image backend.

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound on the buffer reserved up front from a declared stream length.
const MAX_PREALLOCATION: u64 = 64 << 20;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Invalid source {source_name}: {reason}")]
    Invalid { source_name: String, reason: String },
    #[error("IO error reading source: {0}")]
    Io(#[from] io::Error),
}

impl SourceError {
    fn invalid(source_name: &str, reason: impl Into<String>) -> Self {
        SourceError::Invalid {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Where the full-resolution image comes from.
pub enum ImageSource {
    /// A file on disk.
    Path(PathBuf),
    /// A readable stream, with the length the producer announced (if any).
    Stream {
        reader: Box<dyn Read + Send>,
        declared_len: Option<u64>,
    },
}

impl ImageSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImageSource::Path(path.into())
    }

    pub fn from_reader(reader: impl Read + Send + 'static, declared_len: Option<u64>) -> Self {
        ImageSource::Stream {
            reader: Box::new(reader),
            declared_len,
        }
    }

    /// Read the whole source into memory.
    ///
    /// Missing files, non-files, permission failures and zero-length
    /// sources are [`SourceError::Invalid`]; any other read failure is
    /// [`SourceError::Io`] with the cause kept.
    pub fn read_all(self) -> Result<Vec<u8>, SourceError> {
        // Taken up front: a stream's reader is moved out below.
        let name = self.to_string();
        match self {
            ImageSource::Path(path) => {
                let len = match fs::metadata(&path) {
                    Ok(meta) if !meta.is_file() => {
                        return Err(SourceError::invalid(&name, "not a regular file"));
                    }
                    Ok(meta) => meta.len(),
                    Err(e) => return Err(classify_open_error(&name, e)),
                };
                if len == 0 {
                    return Err(SourceError::invalid(&name, "zero-length file"));
                }
                let bytes = fs::read(&path).map_err(|e| classify_open_error(&name, e))?;
                if bytes.is_empty() {
                    return Err(SourceError::invalid(&name, "zero-length file"));
                }
                Ok(bytes)
            }
            ImageSource::Stream {
                declared_len: Some(0),
                ..
            } => Err(SourceError::invalid(&name, "stream declares zero length")),
            ImageSource::Stream {
                mut reader,
                declared_len,
            } => {
                // The announced length is only a hint; a wrong one must not
                // drive the allocation.
                let capacity = declared_len.map_or(0, |n| n.min(MAX_PREALLOCATION) as usize);
                let mut bytes = Vec::with_capacity(capacity);
                reader.read_to_end(&mut bytes)?;
                if bytes.is_empty() {
                    return Err(SourceError::invalid(&name, "stream is empty"));
                }
                Ok(bytes)
            }
        }
    }
}

fn classify_open_error(source_name: &str, e: io::Error) -> SourceError {
    match e.kind() {
        io::ErrorKind::NotFound => SourceError::invalid(source_name, "does not exist"),
        io::ErrorKind::PermissionDenied => SourceError::invalid(source_name, "permission denied"),
        _ => SourceError::Io(e),
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(path) => write!(f, "{}", path.display()),
            ImageSource::Stream {
                declared_len: Some(n),
                ..
            } => write!(f, "stream ({n} bytes)"),
            ImageSource::Stream { .. } => write!(f, "stream"),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ImageSource::Stream { declared_len, .. } => f
                .debug_struct("Stream")
                .field("declared_len", declared_len)
                .finish_non_exhaustive(),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_fixture;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device unplugged"))
        }
    }

    #[test]
    fn reads_file_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = write_fixture(tmp.path(), "photo.jpg", b"\xFF\xD8abc");

        let bytes = ImageSource::from_path(&path).read_all().unwrap();
        assert_eq!(bytes, b"\xFF\xD8abc");
    }

    #[test]
    fn missing_file_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let result = ImageSource::from_path(tmp.path().join("gone.jpg")).read_all();
        assert!(matches!(result, Err(SourceError::Invalid { .. })));
    }

    #[test]
    fn empty_file_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = write_fixture(tmp.path(), "empty.jpg", b"");
        let result = ImageSource::from_path(&path).read_all();
        assert!(matches!(result, Err(SourceError::Invalid { .. })));
    }

    #[test]
    fn directory_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let result = ImageSource::from_path(tmp.path()).read_all();
        match result {
            Err(SourceError::Invalid { reason, .. }) => assert_eq!(reason, "not a regular file"),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn reads_stream_bytes() {
        let source = ImageSource::from_reader(Cursor::new(b"payload".to_vec()), Some(7));
        assert_eq!(source.read_all().unwrap(), b"payload");
    }

    #[test]
    fn stream_without_declared_length() {
        let source = ImageSource::from_reader(Cursor::new(b"xyz".to_vec()), None);
        assert_eq!(source.read_all().unwrap(), b"xyz");
    }

    #[test]
    fn stream_declaring_zero_is_invalid() {
        let source = ImageSource::from_reader(Cursor::new(b"ignored".to_vec()), Some(0));
        assert!(matches!(
            source.read_all(),
            Err(SourceError::Invalid { .. })
        ));
    }

    #[test]
    fn empty_stream_is_invalid() {
        let source = ImageSource::from_reader(io::empty(), None);
        assert!(matches!(
            source.read_all(),
            Err(SourceError::Invalid { .. })
        ));
    }

    #[test]
    fn oversized_declared_length_is_only_a_hint() {
        for declared in [u64::MAX, 1 << 40, 3] {
            let source =
                ImageSource::from_reader(Cursor::new(b"\xFF\xD8abc".to_vec()), Some(declared));
            assert_eq!(source.read_all().unwrap(), b"\xFF\xD8abc");
        }
    }

    #[test]
    fn empty_stream_error_names_the_source() {
        let source = ImageSource::from_reader(io::empty(), Some(42));
        match source.read_all() {
            Err(SourceError::Invalid {
                source_name,
                reason,
            }) => {
                assert_eq!(source_name, "stream (42 bytes)");
                assert_eq!(reason, "stream is empty");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn stream_read_failure_is_io() {
        let source = ImageSource::from_reader(FailingReader, Some(100));
        assert!(matches!(source.read_all(), Err(SourceError::Io(_))));
    }

    #[test]
    fn display_names_the_source() {
        assert_eq!(
            ImageSource::from_path("/tmp/a.jpg").to_string(),
            "/tmp/a.jpg"
        );
        assert_eq!(
            ImageSource::from_reader(io::empty(), Some(42)).to_string(),
            "stream (42 bytes)"
        );
        assert_eq!(ImageSource::from_reader(io::empty(), None).to_string(), "stream");
    }
}
