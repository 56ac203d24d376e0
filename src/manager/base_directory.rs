//! Registry of base directories.
//!
//! A base directory maps a logical id to a concrete root, either a provider
//! tree URI or a local path. The external file manager asks the registry
//! whether a URI is a registered root because listing queries are addressed
//! differently for tree roots and for documents inside a tree.

use fnv::FnvHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::document::DocumentUri;

/// Answers whether a URI is one of the registered roots.
pub trait DirectoryRegistry: Send + Sync + fmt::Debug {
    /// True if `uri` is the URI of a registered base directory.
    fn is_registered_root(&self, uri: &DocumentUri) -> bool;
}

/// A named root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirectory {
    id: String,
    dir_uri: Option<DocumentUri>,
    dir_path: Option<PathBuf>,
}

impl BaseDirectory {
    /// A base directory served by a document provider.
    pub fn from_uri<S: Into<String>>(id: S, uri: DocumentUri) -> Self {
        Self {
            id: id.into(),
            dir_uri: Some(uri),
            dir_path: None,
        }
    }

    /// A base directory on the local file system.
    pub fn from_path<S: Into<String>, P: Into<PathBuf>>(id: S, path: P) -> Self {
        Self {
            id: id.into(),
            dir_uri: None,
            dir_path: Some(path.into()),
        }
    }

    /// Registry key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Provider tree URI, if any.
    pub fn dir_uri(&self) -> Option<&DocumentUri> {
        self.dir_uri.as_ref()
    }

    /// Local path, if any.
    pub fn dir_path(&self) -> Option<&Path> {
        self.dir_path.as_deref()
    }

    /// True if `uri` is this directory's URI.
    pub fn is_base_dir_uri(&self, uri: &DocumentUri) -> bool {
        self.dir_uri.as_ref() == Some(uri)
    }

    /// True if `path` is this directory's path.
    pub fn is_base_dir_path(&self, path: &Path) -> bool {
        self.dir_path.as_deref() == Some(path)
    }
}

/// Base directories keyed by id.
#[derive(Debug, Default)]
pub struct DirectoryManager {
    dirs: RwLock<FnvHashMap<String, BaseDirectory>>,
}

impl DirectoryManager {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `dir`, replacing a previous directory with the same id.
    pub fn register(&self, dir: BaseDirectory) {
        tracing::debug!(id = dir.id(), "registering base directory");
        self.dirs.write().insert(dir.id.clone(), dir);
    }

    /// Removes the directory with `id`. Returns false if none was registered.
    pub fn unregister(&self, id: &str) -> bool {
        self.dirs.write().remove(id).is_some()
    }

    /// Removes the directory registered for `uri`.
    pub fn unregister_by_uri(&self, uri: &DocumentUri) -> bool {
        let mut dirs = self.dirs.write();
        let before = dirs.len();
        dirs.retain(|_, dir| !dir.is_base_dir_uri(uri));
        dirs.len() != before
    }

    /// Looks a directory up by id.
    pub fn get_by_id(&self, id: &str) -> Option<BaseDirectory> {
        self.dirs.read().get(id).cloned()
    }

    /// Looks a directory up by URI.
    pub fn get_by_uri(&self, uri: &DocumentUri) -> Option<BaseDirectory> {
        self.dirs
            .read()
            .values()
            .find(|dir| dir.is_base_dir_uri(uri))
            .cloned()
    }

    /// True if `path` is a registered local base directory.
    pub fn is_base_dir_path(&self, path: &Path) -> bool {
        self.dirs.read().values().any(|dir| dir.is_base_dir_path(path))
    }

    /// Number of registered directories.
    pub fn len(&self) -> usize {
        self.dirs.read().len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.dirs.read().is_empty()
    }
}

impl DirectoryRegistry for DirectoryManager {
    fn is_registered_root(&self, uri: &DocumentUri) -> bool {
        self.dirs.read().values().any(|dir| dir.is_base_dir_uri(uri))
    }
}
