//! Message parts and the ordered triple they form.
//!
//! A finished build is always exactly three parts, in this order:
//!
//! | Index | Kind | Content type | Payload |
//! |---|---|---|---|
//! | 0 | Full | `image/jpeg` | source bytes, untouched |
//! | 1 | Preview | `image/jpeg+preview` | scaled JPEG, orientation re-tagged |
//! | 2 | Info | `application/json+imageSize` | [`InfoRecord`](crate::info::InfoRecord) JSON |
//!
//! Consumers locate parts by index alone.

pub const CONTENT_TYPE_FULL: &str = "image/jpeg";
pub const CONTENT_TYPE_PREVIEW: &str = "image/jpeg+preview";
pub const CONTENT_TYPE_INFO: &str = "application/json+imageSize";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Full,
    Preview,
    Info,
}

impl PartKind {
    pub const ALL: [PartKind; 3] = [PartKind::Full, PartKind::Preview, PartKind::Info];

    pub fn index(self) -> usize {
        match self {
            PartKind::Full => 0,
            PartKind::Preview => 1,
            PartKind::Info => 2,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            PartKind::Full => CONTENT_TYPE_FULL,
            PartKind::Preview => CONTENT_TYPE_PREVIEW,
            PartKind::Info => CONTENT_TYPE_INFO,
        }
    }

    /// Short label used in file names and summaries.
    pub fn label(self) -> &'static str {
        match self {
            PartKind::Full => "full",
            PartKind::Preview => "preview",
            PartKind::Info => "info",
        }
    }
}

/// One payload of the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePart {
    kind: PartKind,
    bytes: Vec<u8>,
}

impl ImagePart {
    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// The three parts of one image message, in index order.
///
/// Only constructible from all three payloads at once, so a partially
/// built triple cannot exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTriple {
    parts: [ImagePart; 3],
}

impl ImageTriple {
    pub(crate) fn new(full: Vec<u8>, preview: Vec<u8>, info: Vec<u8>) -> Self {
        Self {
            parts: [
                ImagePart {
                    kind: PartKind::Full,
                    bytes: full,
                },
                ImagePart {
                    kind: PartKind::Preview,
                    bytes: preview,
                },
                ImagePart {
                    kind: PartKind::Info,
                    bytes: info,
                },
            ],
        }
    }

    pub fn get(&self, kind: PartKind) -> &ImagePart {
        &self.parts[kind.index()]
    }

    pub fn full(&self) -> &ImagePart {
        self.get(PartKind::Full)
    }

    pub fn preview(&self) -> &ImagePart {
        self.get(PartKind::Preview)
    }

    pub fn info(&self) -> &ImagePart {
        self.get(PartKind::Info)
    }

    /// All parts in index order.
    pub fn parts(&self) -> &[ImagePart; 3] {
        &self.parts
    }

    pub fn into_parts(self) -> [ImagePart; 3] {
        self.parts
    }

    /// Sum of the three payload lengths.
    pub fn total_len(&self) -> usize {
        self.parts.iter().map(ImagePart::len).sum()
    }
}
