//! Read-through cache over a document provider.
//!
//! Every provider call is an inter-process round trip, so resolved documents
//! are kept in a [`SegmentTrie`] keyed by their logical path (root URI
//! segments followed by child names). A lookup first tries the full key,
//! then walks the pending segments one hop at a time, asking the provider
//! only for hops the trie cannot answer.
//!
//! Misses are never cached: the set of children can grow between calls.

use std::fmt;
use std::iter;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use super::base_directory::DirectoryRegistry;
use super::BaseFileManager;
use crate::config::{CacheConfig, FsafConfig, SearchMode};
use crate::data_structures::SegmentTrie;
use crate::document::{CachedDocument, DocumentUri, PreloadedInfo, MIME_TYPE_DIR};
use crate::error::provider::ProviderError;
use crate::error::{report_error, ErrorContext, FsafError, FsafResult};
use crate::file::{ExternalFile, Root, Segment, SegmentKind};
use crate::provider::DocumentProvider;

const COMPONENT: &str = "external_file_manager";

/// File manager for documents served by a [`DocumentProvider`].
pub struct ExternalFileManager<P> {
    provider: P,
    registry: Arc<dyn DirectoryRegistry>,
    trie: SegmentTrie<CachedDocument>,
    cache: CacheConfig,
    default_mime_type: String,
}

impl<P: DocumentProvider> ExternalFileManager<P> {
    /// Creates a manager over `provider`. `registry` decides which URIs are
    /// tree roots.
    pub fn new(provider: P, registry: Arc<dyn DirectoryRegistry>, config: &FsafConfig) -> Self {
        Self {
            provider,
            registry,
            trie: SegmentTrie::new(),
            cache: config.cache.clone(),
            default_mime_type: config.provider.default_mime_type.clone(),
        }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The lookup cache.
    pub fn trie(&self) -> &SegmentTrie<CachedDocument> {
        &self.trie
    }

    /// Active lookup strategy.
    pub fn search_mode(&self) -> SearchMode {
        self.cache.search_mode
    }

    pub(crate) fn cache_config(&self) -> &CacheConfig {
        &self.cache
    }

    /// Builds a handle rooted at the document `uri`. Issues one provider
    /// query; `None` if the document does not exist.
    ///
    /// A document URI is keyed below its tree (see
    /// [`DocumentUri::key_segments`]), so it shares cache entries with the
    /// same document reached from the tree root. If that document is already
    /// cached, the new root shares its liveness and a delete through either
    /// handle is seen by both.
    pub fn from_uri(&self, uri: &DocumentUri) -> Option<ExternalFile> {
        match self.provider.query_document(uri) {
            Ok(Some(info)) => {
                let mut root = CachedDocument::root(uri.clone(), info);
                if let Some(cached) = self.lookup_cache(root.path()) {
                    root = root.share_liveness(&cached);
                }
                Some(to_external_file(root))
            }
            Ok(None) => {
                debug!(%uri, "document not found");
                None
            }
            Err(error) => {
                self.report_failure(error, "query_document", uri.as_str());
                None
            }
        }
    }

    /// Resolves `file` to a provider document.
    ///
    /// Returns `None` when any hop does not exist or the provider fails.
    pub fn resolve(&self, file: &ExternalFile) -> Option<CachedDocument> {
        let root = file.root().holder();
        if !root.exists() {
            debug!(root = %root.uri(), "root document no longer exists");
            return None;
        }

        if file.segments().is_empty() {
            return Some(root.clone());
        }

        let key = file.key_segments();
        if let Some(document) = self.lookup_cache(&key) {
            trace!(path = %key.join("/"), "cache hit");
            return Some(document);
        }

        let root_len = key.len() - file.segments().len();
        let mut current = root.clone();
        for (index, segment) in file.segments().iter().enumerate() {
            current = match self.lookup_cache(&key[..root_len + index + 1]) {
                Some(document) => document,
                None => self.query_child(&current, segment.name())?,
            };
        }

        Some(current)
    }

    /// Documents under `dir` currently held in the cache. No provider I/O.
    pub fn list_snapshot_files(&self, dir: &ExternalFile) -> Vec<ExternalFile> {
        let key = dir.key_segments();
        if key.is_empty() || self.cache.search_mode == SearchMode::Slow {
            return Vec::new();
        }

        let mut files = Vec::new();
        self.trie.visit_every_segment_after_path(&key, false, |node| {
            if let Some(document) = node.value().filter(CachedDocument::exists) {
                files.push(to_external_file(document));
            }
        });
        files
    }

    /// Cached document at `key`. Stale entries are evicted and reported as
    /// misses.
    fn lookup_cache(&self, key: &[String]) -> Option<CachedDocument> {
        if key.is_empty() || self.cache.search_mode == SearchMode::Slow {
            return None;
        }

        let document = self.trie.find(key)?;
        if document.exists() {
            return Some(document);
        }

        warn!(path = %key.join("/"), "evicting stale cache entry");
        self.trie.remove(key);
        None
    }

    pub(crate) fn cache_document(&self, document: &CachedDocument) {
        if self.cache.search_mode == SearchMode::Fast && !document.path().is_empty() {
            self.trie.insert(document.path(), document.clone());
        }
    }

    /// Drops the cached subtree at `key`, returning every document that was
    /// cached in it, the one at `key` first.
    fn evict(&self, key: &[String]) -> Vec<CachedDocument> {
        if key.is_empty() {
            return Vec::new();
        }

        let mut cached: Vec<CachedDocument> = self.trie.find(key).into_iter().collect();
        self.trie.visit_every_segment_after_path(key, true, |node| {
            cached.extend(node.value());
        });

        if self.trie.remove(key) {
            debug!(path = %key.join("/"), evicted = cached.len(), "evicted cache subtree");
        }
        cached
    }

    /// One provider query for the child `name` of `parent`. The result is
    /// cached.
    fn query_child(&self, parent: &CachedDocument, name: &str) -> Option<CachedDocument> {
        if !parent.is_directory() {
            return None;
        }

        let tree_rooted = self.registry.is_registered_root(parent.uri());
        match self.provider.find_child(parent.uri(), name, tree_rooted) {
            Ok(Some(info)) => {
                let document = self.document_from_info(parent, info, name);
                self.cache_document(&document);
                Some(document)
            }
            Ok(None) => {
                trace!(parent = %parent.uri(), name, "child not found");
                None
            }
            Err(error) => {
                self.report_failure(error, "find_child", parent.uri().as_str());
                None
            }
        }
    }

    /// One provider query listing every child of `dir`. Nothing is cached.
    pub(crate) fn fetch_children(&self, dir: &CachedDocument) -> Option<Vec<CachedDocument>> {
        let tree_rooted = self.registry.is_registered_root(dir.uri());
        match self.provider.list_children(dir.uri(), tree_rooted) {
            Ok(rows) => Some(
                rows.into_iter()
                    .map(|info| {
                        let name = display_name(&info);
                        self.document_from_info(dir, info, &name)
                    })
                    .collect(),
            ),
            Err(error) => {
                self.report_failure(error, "list_children", dir.uri().as_str());
                None
            }
        }
    }

    fn create_child(&self, parent: &CachedDocument, segment: &Segment) -> Option<CachedDocument> {
        let mime_type = match segment.kind() {
            SegmentKind::Directory => MIME_TYPE_DIR,
            SegmentKind::File => self.default_mime_type.as_str(),
        };

        match self
            .provider
            .create_document(parent.uri(), mime_type, segment.name())
        {
            Ok(Some(info)) => {
                let document = self.document_from_info(parent, info, segment.name());
                info!(uri = %document.uri(), "created document");
                self.cache_document(&document);
                Some(document)
            }
            Ok(None) => {
                warn!(parent = %parent.uri(), name = segment.name(), "provider refused to create document");
                None
            }
            Err(error) => {
                self.report_failure(error, "create_document", parent.uri().as_str());
                None
            }
        }
    }

    fn document_from_info(
        &self,
        parent: &CachedDocument,
        info: PreloadedInfo,
        name: &str,
    ) -> CachedDocument {
        let uri = self.provider.document_uri(parent.uri(), &info.document_id);
        let path = parent
            .path()
            .iter()
            .cloned()
            .chain(iter::once(name.to_string()))
            .collect();
        CachedDocument::new(uri, path, info)
    }

    fn report_failure(&self, error: ProviderError, operation: &str, target: &str) {
        warn!(%error, operation, target, "provider call failed");
        report_error(
            ErrorContext::new(FsafError::Provider(error), COMPONENT)
                .with_details(format!("{operation} on {target}")),
        );
    }

    fn delete_document(&self, document: &CachedDocument) -> bool {
        match self.provider.delete_document(document.uri()) {
            Ok(deleted) => deleted,
            Err(error) => {
                self.report_failure(error, "delete_document", document.uri().as_str());
                false
            }
        }
    }
}

impl<P: DocumentProvider> BaseFileManager for ExternalFileManager<P> {
    type File = ExternalFile;

    fn exists(&self, file: &ExternalFile) -> bool {
        self.resolve(file).is_some()
    }

    fn is_file(&self, file: &ExternalFile) -> bool {
        self.resolve(file).is_some_and(|document| document.is_file())
    }

    fn is_directory(&self, file: &ExternalFile) -> bool {
        self.resolve(file)
            .is_some_and(|document| document.is_directory())
    }

    fn can_read(&self, file: &ExternalFile) -> bool {
        self.resolve(file).is_some_and(|document| {
            document.can_read() && self.provider.has_uri_permission(document.uri())
        })
    }

    fn can_write(&self, file: &ExternalFile) -> bool {
        self.resolve(file).is_some_and(|document| {
            document.can_write() && self.provider.has_uri_permission(document.uri())
        })
    }

    fn length(&self, file: &ExternalFile) -> Option<u64> {
        self.resolve(file).and_then(|document| document.length())
    }

    fn last_modified(&self, file: &ExternalFile) -> Option<u64> {
        self.resolve(file).map(|document| document.last_modified())
    }

    fn name(&self, file: &ExternalFile) -> Option<String> {
        if let Some(name) = file.known_file_name() {
            return Some(name.to_string());
        }

        self.resolve(file)
            .and_then(|document| document.name().map(str::to_string))
    }

    fn find_file(&self, dir: &ExternalFile, name: &str) -> FsafResult<Option<ExternalFile>> {
        if dir.is_file_name_appended() {
            return Err(FsafError::NotADirectory(dir.full_path()));
        }

        let Some(parent) = self.resolve(dir) else {
            return Ok(None);
        };

        let key: Vec<String> = parent
            .path()
            .iter()
            .cloned()
            .chain(iter::once(name.to_string()))
            .collect();
        if let Some(document) = self.lookup_cache(&key) {
            return Ok(Some(to_external_file(document)));
        }

        Ok(self.query_child(&parent, name).map(to_external_file))
    }

    fn list_files(&self, dir: &ExternalFile) -> FsafResult<Vec<ExternalFile>> {
        if dir.is_file_name_appended() {
            return Err(FsafError::NotADirectory(dir.full_path()));
        }

        let Some(parent) = self.resolve(dir).filter(CachedDocument::is_directory) else {
            return Ok(Vec::new());
        };

        let children = self.fetch_children(&parent).unwrap_or_default();
        for child in &children {
            self.cache_document(child);
        }

        Ok(children.into_iter().map(to_external_file).collect())
    }

    fn delete(&self, file: &ExternalFile) -> bool {
        let Some(document) = self.resolve(file) else {
            debug!(file = %file, "nothing to delete");
            return true;
        };

        let deleted = self.delete_document(&document);

        let mut evicted = self.evict(document.path());
        let key = file.key_segments();
        if key.as_slice() != document.path() {
            evicted.extend(self.evict(&key));
        }

        if deleted {
            document.invalidate();
            invalidate_all(&evicted);
        }
        deleted
    }

    fn delete_content(&self, dir: &ExternalFile) -> bool {
        let Some(parent) = self.resolve(dir) else {
            return true;
        };

        if !parent.is_directory() {
            warn!(file = %dir, "delete_content called on a file");
            return false;
        }

        let Some(children) = self.fetch_children(&parent) else {
            return false;
        };

        let mut all_deleted = true;
        for child in children {
            let evicted = self.evict(child.path());
            if self.delete_document(&child) {
                child.invalidate();
                invalidate_all(&evicted);
            } else {
                all_deleted = false;
            }
        }

        if !all_deleted {
            warn!(dir = %dir, "some children could not be deleted");
        }
        all_deleted
    }

    fn create(&self, file: &ExternalFile) -> Option<ExternalFile> {
        let root = file.root().holder();
        if !root.exists() {
            return None;
        }

        let mut current = root.clone();
        for segment in file.segments() {
            if !current.is_directory() {
                warn!(file = %file, parent = %current.uri(), "cannot create below a file");
                return None;
            }

            let key: Vec<String> = current
                .path()
                .iter()
                .cloned()
                .chain(iter::once(segment.name().to_string()))
                .collect();

            current = match self
                .lookup_cache(&key)
                .or_else(|| self.query_child(&current, segment.name()))
            {
                Some(existing) => existing,
                None => self.create_child(&current, segment)?,
            };
        }

        let wants_directory = file
            .segments()
            .last()
            .map_or(!file.root().is_file(), |segment| !segment.is_file_name());
        if wants_directory != current.is_directory() {
            warn!(file = %file, "existing document has the wrong type");
            return None;
        }

        Some(to_external_file(current))
    }
}

impl<P> fmt::Debug for ExternalFileManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalFileManager")
            .field("registry", &self.registry)
            .field("trie", &self.trie)
            .field("cache", &self.cache)
            .field("default_mime_type", &self.default_mime_type)
            .finish()
    }
}

/// Wraps a resolved document into a handle rooted at it.
pub(crate) fn to_external_file(document: CachedDocument) -> ExternalFile {
    if document.is_directory() {
        return ExternalFile::new(Root::Dir(document));
    }

    let name = document
        .name()
        .map(str::to_string)
        .or_else(|| document.path().last().cloned())
        .unwrap_or_default();
    ExternalFile::new(Root::File {
        holder: document,
        name,
    })
}

fn invalidate_all(documents: &[CachedDocument]) {
    for document in documents {
        document.invalidate();
    }
}

fn display_name(info: &PreloadedInfo) -> String {
    match &info.display_name {
        Some(name) => name.clone(),
        None => info
            .document_id
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}
