//! Provider documents and their preloaded metadata.
//!
//! Every property access against a document provider is an inter-process call,
//! so documents are materialized from one query row that already carries the
//! name, MIME type, size, modification time and flags. A [`CachedDocument`]
//! answers all property reads from that row.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::file::segment::{split_into_segments, ENCODED_SEPARATOR};

/// MIME type providers use for directories.
pub const MIME_TYPE_DIR: &str = "vnd.android.document/directory";

/// Separates the tree part of a document URI from the document id.
const DOCUMENT_MARKER: &str = "/document/";

/// Identity of a provider document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentUri(String);

impl DocumentUri {
    /// Wraps a URI string.
    pub fn new<S: Into<String>>(uri: S) -> Self {
        Self(uri.into())
    }

    /// The URI as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The URI split into segments.
    pub fn segments(&self) -> Vec<String> {
        split_into_segments(&self.0)
    }

    /// Trie key of the document this URI names.
    ///
    /// A document URI inside a tree is keyed as the tree URI followed by the
    /// document id relative to the tree id. The same document reached by
    /// walking from the tree root gets the same key. URIs whose document id
    /// is not below the tree id fall back to [`DocumentUri::segments`].
    pub fn key_segments(&self) -> Vec<String> {
        let Some((tree, document)) = self.0.split_once(DOCUMENT_MARKER) else {
            return self.segments();
        };

        let tree_id = decode_id(tree.rsplit('/').next().unwrap_or_default());
        let document_id = decode_id(document);
        match document_id.strip_prefix(tree_id.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') || tree_id.ends_with(':') => {
                let mut key = split_into_segments(tree);
                key.extend(split_into_segments(rest));
                key
            }
            _ => self.segments(),
        }
    }
}

fn decode_id(id: &str) -> String {
    id.replace(ENCODED_SEPARATOR, "/")
        .replace("%2f", "/")
        .replace("%3A", ":")
        .replace("%3a", ":")
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentUri {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

bitflags! {
    /// Capability flags reported by a provider for each document.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DocumentFlags: u32 {
        /// Document is a thumbnail source
        const SUPPORTS_THUMBNAIL = 1;
        /// Document content can be written
        const SUPPORTS_WRITE = 1 << 1;
        /// Document can be deleted
        const SUPPORTS_DELETE = 1 << 2;
        /// Directory accepts new children
        const DIR_SUPPORTS_CREATE = 1 << 3;
    }
}

/// One row of a provider listing: everything needed to answer property
/// queries without further calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadedInfo {
    /// Provider specific document id
    pub document_id: String,
    /// MIME type, `None` when the provider reported nothing
    pub mime_type: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// Milliseconds since the epoch
    pub last_modified: u64,
    /// Capability flags
    pub flags: DocumentFlags,
    /// Size in bytes
    pub size: u64,
}

impl PreloadedInfo {
    /// Metadata row for a directory.
    pub fn directory<S: Into<String>>(document_id: S, name: S) -> Self {
        Self {
            document_id: document_id.into(),
            mime_type: Some(MIME_TYPE_DIR.to_string()),
            display_name: Some(name.into()),
            last_modified: 0,
            flags: DocumentFlags::DIR_SUPPORTS_CREATE | DocumentFlags::SUPPORTS_DELETE,
            size: 0,
        }
    }

    /// Metadata row for a regular file.
    pub fn file<S: Into<String>>(document_id: S, name: S, mime_type: S, size: u64) -> Self {
        Self {
            document_id: document_id.into(),
            mime_type: Some(mime_type.into()),
            display_name: Some(name.into()),
            last_modified: 0,
            flags: DocumentFlags::SUPPORTS_WRITE | DocumentFlags::SUPPORTS_DELETE,
            size,
        }
    }

    fn has_mime_type(&self) -> bool {
        self.mime_type.as_deref().is_some_and(|mime| !mime.is_empty())
    }

    fn is_directory(&self) -> bool {
        self.mime_type.as_deref() == Some(MIME_TYPE_DIR)
    }
}

/// A resolved provider document.
///
/// Clones share the liveness flag: invalidating one clone (e.g. the copy held
/// by the lookup cache) makes every clone report `exists() == false`.
#[derive(Debug, Clone)]
pub struct CachedDocument {
    uri: DocumentUri,
    path: Arc<[String]>,
    info: PreloadedInfo,
    alive: Arc<AtomicBool>,
}

impl CachedDocument {
    /// Creates a document reachable through the logical `path`.
    pub fn new(uri: DocumentUri, path: Vec<String>, info: PreloadedInfo) -> Self {
        Self {
            uri,
            path: path.into(),
            info,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Creates a root document keyed by [`DocumentUri::key_segments`].
    pub fn root(uri: DocumentUri, info: PreloadedInfo) -> Self {
        let path = uri.key_segments();
        Self::new(uri, path, info)
    }

    /// Makes this document share the liveness flag of `other`.
    pub(crate) fn share_liveness(mut self, other: &CachedDocument) -> Self {
        self.alive = Arc::clone(&other.alive);
        self
    }

    /// Provider URI of this document.
    pub fn uri(&self) -> &DocumentUri {
        &self.uri
    }

    /// Segments under which this document is cached.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The metadata row this document was built from.
    pub fn info(&self) -> &PreloadedInfo {
        &self.info
    }

    /// False once the document was deleted or invalidated.
    pub fn exists(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Marks this document (and every clone) as gone.
    pub fn invalidate(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Directory check from the MIME type.
    pub fn is_directory(&self) -> bool {
        self.info.is_directory()
    }

    /// A document with a MIME type that is not the directory type.
    pub fn is_file(&self) -> bool {
        self.info.has_mime_type() && !self.info.is_directory()
    }

    /// Documents without a MIME type cannot be opened.
    pub fn can_read(&self) -> bool {
        self.info.has_mime_type()
    }

    /// Deletable documents count as writable, as do creatable directories and
    /// writable files.
    pub fn can_write(&self) -> bool {
        if !self.info.has_mime_type() {
            return false;
        }

        let flags = self.info.flags;
        if flags.contains(DocumentFlags::SUPPORTS_DELETE) {
            return true;
        }

        if self.is_directory() {
            flags.contains(DocumentFlags::DIR_SUPPORTS_CREATE)
        } else {
            flags.contains(DocumentFlags::SUPPORTS_WRITE)
        }
    }

    /// Display name reported by the provider.
    pub fn name(&self) -> Option<&str> {
        self.info.display_name.as_deref()
    }

    /// Size in bytes, `None` for directories.
    pub fn length(&self) -> Option<u64> {
        if self.is_directory() {
            None
        } else {
            Some(self.info.size)
        }
    }

    /// Last modification time in milliseconds since the epoch.
    pub fn last_modified(&self) -> u64 {
        self.info.last_modified
    }
}
