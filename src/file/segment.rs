//! Path segments and path splitting.
//!
//! A [`Segment`] is one validated path component. Full paths and document URIs
//! are turned into trie keys with [`split_into_segments`], which accepts every
//! separator variant a backing URI may use.

use crate::error::{FsafError, FsafResult};
use std::fmt;

/// Percent-encoded `/` as it appears inside document ids.
pub const ENCODED_SEPARATOR: &str = "%2F";

/// URI schemes stripped before splitting.
const URI_SCHEMES: [&str; 2] = ["content://", "file://"];

/// Whether a segment names a directory or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// An intermediate directory
    Directory,
    /// A terminal file name, only valid in last position
    File,
}

/// One immutable path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    name: String,
    kind: SegmentKind,
}

impl Segment {
    /// Creates a directory segment.
    ///
    /// # Errors
    ///
    /// Returns [`FsafError::InvalidSegment`] if the name is blank or contains a
    /// path separator.
    pub fn dir<S: Into<String>>(name: S) -> FsafResult<Self> {
        Self::new(name, SegmentKind::Directory)
    }

    /// Creates a file name segment.
    ///
    /// # Errors
    ///
    /// Same as [`Segment::dir`].
    pub fn file<S: Into<String>>(name: S) -> FsafResult<Self> {
        Self::new(name, SegmentKind::File)
    }

    /// Creates a segment of the given kind.
    pub fn new<S: Into<String>>(name: S, kind: SegmentKind) -> FsafResult<Self> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(FsafError::InvalidSegment {
                name,
                reason: "segment name must not be blank".to_string(),
            });
        }

        if name.contains(['/', '\\']) || name.contains(ENCODED_SEPARATOR) {
            return Err(FsafError::InvalidSegment {
                name,
                reason: "segment name must not contain a path separator".to_string(),
            });
        }

        Ok(Self { name, kind })
    }

    /// The component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory or file.
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Returns true for a terminal file name segment.
    pub fn is_file_name(&self) -> bool {
        self.kind == SegmentKind::File
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Splits a path or URI string into its non-empty segments.
///
/// A leading `content://` or `file://` scheme is dropped, then the rest is
/// split on `/`, `\` and the encoded separator `%2F`. Blank fragments are
/// discarded, so `"/a//b/"` and `"a\\b"` both produce `["a", "b"]`.
pub fn split_into_segments(path: &str) -> Vec<String> {
    let path = URI_SCHEMES
        .iter()
        .find_map(|scheme| path.strip_prefix(scheme))
        .unwrap_or(path);

    path.replace(ENCODED_SEPARATOR, "/")
        .split(['/', '\\'])
        .filter(|fragment| !fragment.trim().is_empty())
        .map(str::to_owned)
        .collect()
}
