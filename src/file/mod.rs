//! File handles.
//!
//! A handle is a resolved root plus a list of pending segments that have not
//! been looked up yet. Building a handle never touches the backing store; the
//! file managers resolve it lazily when an operation needs the real object.

pub mod segment;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use crate::document::CachedDocument;
use crate::error::{FsafError, FsafResult};
pub use segment::{split_into_segments, Segment, SegmentKind};

/// Something a handle can be rooted at.
pub trait RootHolder: Clone {
    /// Trie key segments of the root itself.
    fn root_segments(&self) -> Vec<String>;

    /// Printable location of the root.
    fn root_path(&self) -> String;
}

impl RootHolder for PathBuf {
    fn root_segments(&self) -> Vec<String> {
        split_into_segments(&self.to_string_lossy())
    }

    fn root_path(&self) -> String {
        self.to_string_lossy().into_owned()
    }
}

impl RootHolder for CachedDocument {
    fn root_segments(&self) -> Vec<String> {
        self.path().to_vec()
    }

    fn root_path(&self) -> String {
        self.uri().as_str().to_string()
    }
}

/// The already resolved start of a handle.
///
/// A directory root may be extended with further segments; a file root may not.
#[derive(Debug, Clone)]
pub enum Root<H> {
    /// A directory
    Dir(H),
    /// A file together with its name
    File {
        /// The resolved file
        holder: H,
        /// File name
        name: String,
    },
}

impl<H> Root<H> {
    /// The resolved object.
    pub fn holder(&self) -> &H {
        match self {
            Root::Dir(holder) | Root::File { holder, .. } => holder,
        }
    }

    /// The file name of a file root.
    pub fn name(&self) -> Option<&str> {
        match self {
            Root::Dir(_) => None,
            Root::File { name, .. } => Some(name),
        }
    }

    /// Returns true for a file root.
    pub fn is_file(&self) -> bool {
        matches!(self, Root::File { .. })
    }
}

/// A root plus pending segments.
#[derive(Debug, Clone)]
pub struct FileHandle<H> {
    root: Root<H>,
    segments: Vec<Segment>,
}

/// Handle backed by the hierarchical file API.
pub type RawFile = FileHandle<PathBuf>;

/// Handle backed by a document provider.
pub type ExternalFile = FileHandle<CachedDocument>;

impl<H: RootHolder> FileHandle<H> {
    /// A handle pointing exactly at `root`.
    pub fn new(root: Root<H>) -> Self {
        Self {
            root,
            segments: Vec::new(),
        }
    }

    /// The resolved root.
    pub fn root(&self) -> &Root<H> {
        &self.root
    }

    /// Pending segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the root is a file or the last segment is a file name.
    pub fn is_file_name_appended(&self) -> bool {
        match self.segments.last() {
            Some(segment) => segment.is_file_name(),
            None => self.root.is_file(),
        }
    }

    /// Returns a copy of this handle with `new_segments` appended. The
    /// original handle is left untouched.
    ///
    /// # Errors
    ///
    /// * [`FsafError::FileNameAppended`] if this handle already ends with a
    ///   file and `new_segments` is not empty.
    /// * [`FsafError::InvalidSegment`] if a file name segment is followed by
    ///   another segment.
    pub fn clone_with<I>(&self, new_segments: I) -> FsafResult<Self>
    where
        I: IntoIterator<Item = Segment>,
    {
        let new_segments: Vec<Segment> = new_segments.into_iter().collect();
        if new_segments.is_empty() {
            return Ok(self.clone());
        }

        if self.is_file_name_appended() {
            return Err(FsafError::FileNameAppended(self.full_path()));
        }

        let last = new_segments.len() - 1;
        if let Some(misplaced) = new_segments
            .iter()
            .enumerate()
            .find(|(index, segment)| segment.is_file_name() && *index != last)
            .map(|(_, segment)| segment)
        {
            return Err(FsafError::InvalidSegment {
                name: misplaced.name().to_string(),
                reason: "only the last segment may be a file name".to_string(),
            });
        }

        let mut handle = self.clone();
        handle.segments.extend(new_segments);
        Ok(handle)
    }

    /// Appends one directory segment.
    pub fn append_dir(&self, name: &str) -> FsafResult<Self> {
        self.clone_with([Segment::dir(name)?])
    }

    /// Appends a file name segment.
    pub fn append_file(&self, name: &str) -> FsafResult<Self> {
        self.clone_with([Segment::file(name)?])
    }

    /// Root location followed by the pending segment names.
    pub fn full_path(&self) -> String {
        let mut path = self.root.holder().root_path();
        for segment in &self.segments {
            if !path.ends_with('/') {
                path.push('/');
            }
            path.push_str(segment.name());
        }
        path
    }

    /// Key of this handle in the lookup cache.
    pub fn key_segments(&self) -> Vec<String> {
        let mut key = self.root.holder().root_segments();
        key.extend(self.segments.iter().map(|segment| segment.name().to_string()));
        key
    }

    /// Name known without I/O: the last file segment, or the name of a file
    /// root with no pending segments.
    pub fn known_file_name(&self) -> Option<&str> {
        match self.segments.last() {
            Some(segment) if segment.is_file_name() => Some(segment.name()),
            Some(_) => None,
            None => self.root.name(),
        }
    }
}

impl RawFile {
    /// The path this handle designates.
    pub fn to_path(&self) -> PathBuf {
        let mut path = self.root.holder().clone();
        for segment in &self.segments {
            path.push(segment.name());
        }
        path
    }
}

impl<H: RootHolder> PartialEq for FileHandle<H> {
    fn eq(&self, other: &Self) -> bool {
        self.full_path() == other.full_path()
    }
}

impl<H: RootHolder> Eq for FileHandle<H> {}

impl<H: RootHolder> Hash for FileHandle<H> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.full_path().hash(state);
    }
}

impl<H: RootHolder> fmt::Display for FileHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// A handle of either backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbstractFile {
    /// Hierarchical file
    Raw(RawFile),
    /// Provider document
    External(ExternalFile),
}

impl AbstractFile {
    /// Full path of the wrapped handle.
    pub fn full_path(&self) -> String {
        match self {
            AbstractFile::Raw(file) => file.full_path(),
            AbstractFile::External(file) => file.full_path(),
        }
    }

    /// Pending segments of the wrapped handle.
    pub fn segments(&self) -> &[Segment] {
        match self {
            AbstractFile::Raw(file) => file.segments(),
            AbstractFile::External(file) => file.segments(),
        }
    }

    /// Same as [`FileHandle::clone_with`], keeping the variant.
    pub fn clone_with<I>(&self, new_segments: I) -> FsafResult<Self>
    where
        I: IntoIterator<Item = Segment>,
    {
        Ok(match self {
            AbstractFile::Raw(file) => AbstractFile::Raw(file.clone_with(new_segments)?),
            AbstractFile::External(file) => AbstractFile::External(file.clone_with(new_segments)?),
        })
    }

    /// The provider handle, if this is one.
    pub fn as_external(&self) -> Option<&ExternalFile> {
        match self {
            AbstractFile::External(file) => Some(file),
            AbstractFile::Raw(_) => None,
        }
    }
}

impl fmt::Display for AbstractFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_dir() -> RawFile {
        RawFile::new(Root::Dir(PathBuf::from("/storage/emulated/0")))
    }

    #[test]
    fn test_clone_with_leaves_original_untouched() {
        let dir = raw_dir();
        let file = dir
            .clone_with([Segment::dir("music").unwrap(), Segment::file("a.mp3").unwrap()])
            .unwrap();

        assert!(dir.segments().is_empty());
        assert_eq!(file.segments().len(), 2);
        assert_eq!(file.full_path(), "/storage/emulated/0/music/a.mp3");
        assert_eq!(file.to_path(), PathBuf::from("/storage/emulated/0/music/a.mp3"));
    }

    #[test]
    fn test_cannot_append_after_file_name() {
        let file = raw_dir().append_file("a.txt").unwrap();

        assert!(matches!(
            file.append_dir("more"),
            Err(FsafError::FileNameAppended(_))
        ));
        assert!(file.clone_with(Vec::new()).is_ok());
    }

    #[test]
    fn test_cannot_extend_file_root() {
        let file = RawFile::new(Root::File {
            holder: PathBuf::from("/tmp/a.txt"),
            name: "a.txt".to_string(),
        });

        assert!(file.is_file_name_appended());
        assert!(file.append_dir("x").is_err());
        assert_eq!(file.known_file_name(), Some("a.txt"));
    }

    #[test]
    fn test_file_segment_must_be_last() {
        let result = raw_dir().clone_with([
            Segment::file("a.txt").unwrap(),
            Segment::dir("dir").unwrap(),
        ]);

        assert!(matches!(result, Err(FsafError::InvalidSegment { .. })));
    }

    #[test]
    fn test_key_segments() {
        let file = raw_dir().append_dir("dir").unwrap();
        assert_eq!(file.key_segments(), vec!["storage", "emulated", "0", "dir"]);
        assert_eq!(file.known_file_name(), None);
    }

    #[test]
    fn test_equality_by_full_path() {
        let left = raw_dir().append_dir("dir").unwrap();
        let right = RawFile::new(Root::Dir(PathBuf::from("/storage/emulated/0/dir")));

        assert_eq!(left, right);
        assert_ne!(left, raw_dir());
    }
}
