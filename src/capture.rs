//! State for a photo that is being captured but not yet built.
//!
//! A capture flow allocates an output path, hands it to whatever takes the
//! photo, and builds the triple once the file exists. The flow can be
//! interrupted in between, so the pending state is a plain value the caller
//! owns and can persist as JSON and restore later.

use crate::source::ImageSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const FILE_PREFIX: &str = "cameraOutput";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCapture {
    photo_path: PathBuf,
}

impl PendingCapture {
    /// Allocate a fresh `cameraOutput<millis>.jpg` path inside `dir`.
    pub fn allocate(dir: &Path) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self::at_millis(dir, millis)
    }

    /// Allocate the path for a given capture timestamp.
    pub fn at_millis(dir: &Path, millis: u128) -> Self {
        Self {
            photo_path: dir.join(format!("{FILE_PREFIX}{millis}.jpg")),
        }
    }

    /// Resume a capture whose path is already known.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            photo_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.photo_path
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The captured file as a build source.
    pub fn into_source(self) -> ImageSource {
        ImageSource::Path(self.photo_path)
    }
}

impl From<PendingCapture> for ImageSource {
    fn from(capture: PendingCapture) -> Self {
        capture.into_source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_uses_timestamp_name() {
        let capture = PendingCapture::at_millis(Path::new("/pictures"), 1_700_000_000_123);
        assert_eq!(
            capture.path(),
            Path::new("/pictures/cameraOutput1700000000123.jpg")
        );
    }

    #[test]
    fn allocate_stays_in_directory() {
        let capture = PendingCapture::allocate(Path::new("/pictures"));
        assert_eq!(capture.path().parent(), Some(Path::new("/pictures")));

        let name = capture.path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("cameraOutput"));
        assert!(name.ends_with(".jpg"));
        let digits = &name["cameraOutput".len()..name.len() - ".jpg".len()];
        assert!(digits.parse::<u128>().is_ok());
    }

    #[test]
    fn survives_json_round_trip() {
        let capture = PendingCapture::at_millis(Path::new("/data/pics"), 42);
        let json = capture.to_json().unwrap();
        assert_eq!(json, r#"{"photo_path":"/data/pics/cameraOutput42.jpg"}"#);
        assert_eq!(PendingCapture::from_json(&json).unwrap(), capture);
    }

    #[test]
    fn malformed_state_is_rejected() {
        assert!(PendingCapture::from_json("{}").is_err());
        assert!(PendingCapture::from_json("not json").is_err());
    }

    #[test]
    fn converts_into_path_source() {
        let capture = PendingCapture::from_path("/tmp/shot.jpg");
        match ImageSource::from(capture) {
            ImageSource::Path(path) => assert_eq!(path, PathBuf::from("/tmp/shot.jpg")),
            other => panic!("expected path source, got {other:?}"),
        }
    }
}
