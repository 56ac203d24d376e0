//! Document provider interface.
//!
//! A document provider is the slow, authoritative backing store behind
//! [`ExternalFile`](crate::file::ExternalFile) handles. Every method is one
//! round trip to the provider, which is why the file managers cache what the
//! provider returns.

pub mod local;

use crate::document::{DocumentUri, PreloadedInfo};
use crate::error::provider::ProviderResult;

pub use local::LocalDocumentProvider;

/// The operations a file manager needs from a document provider.
///
/// `tree_rooted` tells the provider whether `parent` is a registered root
/// directory (a tree URI) or an ordinary document inside such a tree, which
/// changes how the listing query is addressed.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentProvider {
    /// Metadata of the document at `uri`. `Ok(None)` if it does not exist.
    fn query_document(&self, uri: &DocumentUri) -> ProviderResult<Option<PreloadedInfo>>;

    /// All children of `parent` with preloaded metadata, in one query.
    fn list_children(
        &self,
        parent: &DocumentUri,
        tree_rooted: bool,
    ) -> ProviderResult<Vec<PreloadedInfo>>;

    /// The child of `parent` whose display name is `name`, in one query.
    fn find_child(
        &self,
        parent: &DocumentUri,
        name: &str,
        tree_rooted: bool,
    ) -> ProviderResult<Option<PreloadedInfo>>;

    /// URI of the document `document_id` inside the tree `parent` belongs to.
    fn document_uri(&self, parent: &DocumentUri, document_id: &str) -> DocumentUri;

    /// Creates a child document. `Ok(None)` if the provider refused.
    fn create_document(
        &self,
        parent: &DocumentUri,
        mime_type: &str,
        name: &str,
    ) -> ProviderResult<Option<PreloadedInfo>>;

    /// Deletes a document (directories with their content).
    fn delete_document(&self, uri: &DocumentUri) -> ProviderResult<bool>;

    /// Whether the caller holds a grant for `uri`.
    fn has_uri_permission(&self, uri: &DocumentUri) -> bool;
}
