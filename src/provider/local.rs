//! A document provider backed by a local directory tree.
//!
//! Documents are the files and directories below `base`. URIs follow the
//! tree/document layout providers use:
//!
//! ```text
//! content://<authority>/tree/<tree id>
//! content://<authority>/tree/<tree id>/document/<document id>
//! ```
//!
//! Document ids are `root` for `base` itself and `root/<relative path>` for
//! everything below it, with `/` encoded as `%2F` inside URIs.

use std::fs::{self, Metadata, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::{debug, trace};

use super::DocumentProvider;
use crate::document::{DocumentFlags, DocumentUri, PreloadedInfo, MIME_TYPE_DIR};
use crate::error::provider::{ProviderError, ProviderResult};
use crate::file::segment::ENCODED_SEPARATOR;

/// Document id of the base directory.
pub const ROOT_DOCUMENT_ID: &str = "root";

/// MIME type reported for regular files when no other is configured.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const TREE_PATH: &str = "tree";
const DOCUMENT_PATH: &str = "document";

/// Serves a local directory as a document tree.
#[derive(Debug, Clone)]
pub struct LocalDocumentProvider {
    base: PathBuf,
    authority: String,
    file_mime_type: String,
}

impl LocalDocumentProvider {
    /// Serves `base` under `authority`.
    pub fn new<P: Into<PathBuf>, S: Into<String>>(base: P, authority: S) -> Self {
        Self {
            base: base.into(),
            authority: authority.into(),
            file_mime_type: DEFAULT_MIME_TYPE.to_string(),
        }
    }

    /// MIME type reported for every regular file.
    pub fn with_file_mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.file_mime_type = mime_type.into();
        self
    }

    /// The served directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Tree URI of the base directory.
    pub fn tree_uri(&self) -> DocumentUri {
        DocumentUri::new(format!(
            "content://{}/{}/{}",
            self.authority, TREE_PATH, ROOT_DOCUMENT_ID
        ))
    }

    /// Splits a URI into its tree id and optional document id.
    fn parse(&self, uri: &DocumentUri) -> ProviderResult<(String, Option<String>)> {
        let prefix = format!("content://{}/{}/", self.authority, TREE_PATH);
        let rest = uri
            .as_str()
            .strip_prefix(&prefix)
            .ok_or_else(|| ProviderError::MalformedUri(uri.to_string()))?;

        let document_marker = format!("/{DOCUMENT_PATH}/");
        match rest.split_once(&document_marker) {
            Some((tree, document)) => Ok((decode(tree), Some(decode(document)))),
            None if !rest.is_empty() && !rest.contains('/') => Ok((decode(rest), None)),
            None => Err(ProviderError::MalformedUri(uri.to_string())),
        }
    }

    /// The document id a query on `uri` addresses. Tree-rooted queries use
    /// the tree id, the others the document id. A tree URI that was not
    /// registered as a root carries no document id and falls back to the
    /// tree id.
    fn addressed_id(&self, uri: &DocumentUri, tree_rooted: bool) -> ProviderResult<String> {
        let (tree, document) = self.parse(uri)?;
        if tree_rooted {
            return Ok(tree);
        }

        Ok(document.unwrap_or_else(|| {
            trace!(%uri, "unregistered tree uri, addressing the tree id");
            tree
        }))
    }

    /// Document id for plain lookups: the document part if present, the tree
    /// id otherwise.
    fn target_id(&self, uri: &DocumentUri) -> ProviderResult<String> {
        let (tree, document) = self.parse(uri)?;
        Ok(document.unwrap_or(tree))
    }

    fn path_of(&self, document_id: &str) -> ProviderResult<PathBuf> {
        if document_id == ROOT_DOCUMENT_ID {
            return Ok(self.base.clone());
        }

        let relative = document_id
            .strip_prefix(ROOT_DOCUMENT_ID)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| ProviderError::MalformedUri(document_id.to_string()))?;

        let relative = Path::new(relative);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(ProviderError::MalformedUri(document_id.to_string()));
        }

        Ok(self.base.join(relative))
    }

    fn child_id(parent_id: &str, name: &str) -> String {
        format!("{parent_id}/{name}")
    }

    fn info_for(&self, document_id: String, path: &Path, metadata: &Metadata) -> PreloadedInfo {
        let display_name = if document_id == ROOT_DOCUMENT_ID {
            self.base
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .or_else(|| Some(ROOT_DOCUMENT_ID.to_string()))
        } else {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        };

        let last_modified = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();

        let writable = !metadata.permissions().readonly();

        if metadata.is_dir() {
            let flags = if writable {
                DocumentFlags::DIR_SUPPORTS_CREATE | DocumentFlags::SUPPORTS_DELETE
            } else {
                DocumentFlags::empty()
            };

            PreloadedInfo {
                document_id,
                mime_type: Some(MIME_TYPE_DIR.to_string()),
                display_name,
                last_modified,
                flags,
                size: 0,
            }
        } else {
            let flags = if writable {
                DocumentFlags::SUPPORTS_WRITE | DocumentFlags::SUPPORTS_DELETE
            } else {
                DocumentFlags::empty()
            };

            PreloadedInfo {
                document_id,
                mime_type: Some(self.file_mime_type.clone()),
                display_name,
                last_modified,
                flags,
                size: metadata.len(),
            }
        }
    }

    fn stat(&self, document_id: String) -> ProviderResult<Option<PreloadedInfo>> {
        let path = self.path_of(&document_id)?;
        match fs::metadata(&path) {
            Ok(metadata) => Ok(Some(self.info_for(document_id, &path, &metadata))),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(error, &document_id)),
        }
    }
}

impl DocumentProvider for LocalDocumentProvider {
    fn query_document(&self, uri: &DocumentUri) -> ProviderResult<Option<PreloadedInfo>> {
        trace!(%uri, "query_document");
        self.stat(self.target_id(uri)?)
    }

    fn list_children(
        &self,
        parent: &DocumentUri,
        tree_rooted: bool,
    ) -> ProviderResult<Vec<PreloadedInfo>> {
        let parent_id = self.addressed_id(parent, tree_rooted)?;
        let dir = self.path_of(&parent_id)?;
        debug!(%parent, tree_rooted, "list_children");

        let mut children = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|error| io_error(error, &parent_id))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = entry.metadata()?;
            children.push(self.info_for(
                Self::child_id(&parent_id, &name),
                &entry.path(),
                &metadata,
            ));
        }

        children.sort_by(|left, right| left.display_name.cmp(&right.display_name));
        Ok(children)
    }

    fn find_child(
        &self,
        parent: &DocumentUri,
        name: &str,
        tree_rooted: bool,
    ) -> ProviderResult<Option<PreloadedInfo>> {
        let parent_id = self.addressed_id(parent, tree_rooted)?;
        debug!(%parent, name, tree_rooted, "find_child");
        self.stat(Self::child_id(&parent_id, name))
    }

    fn document_uri(&self, parent: &DocumentUri, document_id: &str) -> DocumentUri {
        let tree = self
            .parse(parent)
            .map(|(tree, _)| tree)
            .unwrap_or_else(|_| ROOT_DOCUMENT_ID.to_string());

        DocumentUri::new(format!(
            "content://{}/{}/{}/{}/{}",
            self.authority,
            TREE_PATH,
            encode(&tree),
            DOCUMENT_PATH,
            encode(document_id)
        ))
    }

    fn create_document(
        &self,
        parent: &DocumentUri,
        mime_type: &str,
        name: &str,
    ) -> ProviderResult<Option<PreloadedInfo>> {
        let parent_id = self.target_id(parent)?;
        let document_id = Self::child_id(&parent_id, name);
        let path = self.path_of(&document_id)?;

        let created = if mime_type == MIME_TYPE_DIR {
            fs::create_dir(&path)
        } else {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .map(|_| ())
        };

        match created {
            Ok(()) => self.stat(document_id),
            Err(error) if error.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(error) => Err(io_error(error, &document_id)),
        }
    }

    fn delete_document(&self, uri: &DocumentUri) -> ProviderResult<bool> {
        let document_id = self.target_id(uri)?;
        let path = self.path_of(&document_id)?;

        let result = match fs::symlink_metadata(&path) {
            Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(&path),
            Ok(_) => fs::remove_file(&path),
            Err(error) => Err(error),
        };

        match result {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(io_error(error, &document_id)),
        }
    }

    fn has_uri_permission(&self, uri: &DocumentUri) -> bool {
        self.parse(uri).is_ok()
    }
}

fn io_error(error: io::Error, document_id: &str) -> ProviderError {
    match error.kind() {
        ErrorKind::PermissionDenied => ProviderError::PermissionDenied(document_id.to_string()),
        _ => error.into(),
    }
}

fn encode(id: &str) -> String {
    id.replace('/', ENCODED_SEPARATOR)
}

fn decode(id: &str) -> String {
    id.replace(ENCODED_SEPARATOR, "/")
}
