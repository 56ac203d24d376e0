// Copyright (c) 2025 FSAF Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Node implementation for the segment trie.
//!
//! Ownership flows strictly from the root towards the leaves: a node owns its
//! children through `Arc`s and only holds a `Weak` reference to its parent, so
//! detaching a node from its parent's child map is enough to release the whole
//! subtree.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

/// Shared pointer to a trie node.
pub(crate) type NodeRef<V> = Arc<RwLock<TrieNode<V>>>;

/// Separator used when rendering a node's full path.
pub const PATH_SEPARATOR: char = '/';

/// Distinguishes the nameless entry point of the trie from the nodes created
/// for path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The trie entry point. Has no name and never holds a value.
    Root,
    /// A node reached through the segment with this name.
    Segment(String),
}

/// A node in the segment trie.
#[derive(Debug)]
pub struct TrieNode<V> {
    /// Root or named segment
    pub(crate) kind: NodeKind,

    /// Value cached for the complete path ending at this node
    pub(crate) value: Option<V>,

    /// Non-owning back reference, empty for the root and for detached nodes
    pub(crate) parent: Weak<RwLock<TrieNode<V>>>,

    /// Children keyed by their segment name
    pub(crate) children: BTreeMap<String, NodeRef<V>>,
}

impl<V> TrieNode<V> {
    /// Creates the root node of a trie.
    pub(crate) fn root() -> Self {
        Self {
            kind: NodeKind::Root,
            value: None,
            parent: Weak::new(),
            children: BTreeMap::new(),
        }
    }

    /// Creates an empty intermediate node named `name` below `parent`.
    pub(crate) fn child_of(name: &str, parent: &NodeRef<V>) -> Self {
        Self {
            kind: NodeKind::Segment(name.to_owned()),
            value: None,
            parent: Arc::downgrade(parent),
            children: BTreeMap::new(),
        }
    }

    /// Returns true when this node was reached through a segment called `name`.
    pub(crate) fn is_named(&self, name: &str) -> bool {
        matches!(&self.kind, NodeKind::Segment(own) if own == name)
    }
}

/// A read-only view of a node handed out to visitors and tests.
///
/// Two handles are equal when the nodes they point to have the same full path,
/// even if they are distinct node objects (e.g. one of them was detached and
/// the path was inserted again).
pub struct NodeHandle<V> {
    inner: NodeRef<V>,
}

impl<V> NodeHandle<V> {
    pub(crate) fn new(inner: NodeRef<V>) -> Self {
        Self { inner }
    }

    /// The segment name of this node, `None` for the root.
    pub fn name(&self) -> Option<String> {
        match &self.inner.read().kind {
            NodeKind::Root => None,
            NodeKind::Segment(name) => Some(name.clone()),
        }
    }

    /// Root or segment node.
    pub fn kind(&self) -> NodeKind {
        self.inner.read().kind.clone()
    }

    /// Whether a value was stored exactly at this node.
    pub fn has_value(&self) -> bool {
        self.inner.read().value.is_some()
    }

    /// Returns true for the trie entry point.
    pub fn is_root(&self) -> bool {
        self.inner.read().kind == NodeKind::Root
    }

    /// Returns true for a non-root node without children.
    pub fn is_leaf(&self) -> bool {
        let node = self.inner.read();
        node.kind != NodeKind::Root && node.children.is_empty()
    }

    /// Returns true for a non-root node that has children.
    pub fn is_interior(&self) -> bool {
        let node = self.inner.read();
        node.kind != NodeKind::Root && !node.children.is_empty()
    }

    /// Number of direct children.
    pub fn children_count(&self) -> usize {
        self.inner.read().children.len()
    }

    /// Direct children ordered by segment name.
    pub fn children(&self) -> Vec<NodeHandle<V>> {
        self.inner
            .read()
            .children
            .values()
            .map(|child| NodeHandle::new(Arc::clone(child)))
            .collect()
    }

    /// The direct child reached through `name`, if any.
    pub fn child(&self, name: &str) -> Option<NodeHandle<V>> {
        self.inner
            .read()
            .children
            .get(name)
            .map(|child| NodeHandle::new(Arc::clone(child)))
    }

    /// The parent node. `None` for the root and for detached nodes.
    pub fn parent(&self) -> Option<NodeHandle<V>> {
        self.inner.read().parent.upgrade().map(NodeHandle::new)
    }

    /// Segment names from the root down to this node, root excluded.
    pub fn path_segments(&self) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = Some(Arc::clone(&self.inner));

        while let Some(node) = current {
            let guard = node.read();
            if let NodeKind::Segment(name) = &guard.kind {
                segments.push(name.clone());
            }
            current = guard.parent.upgrade();
        }

        segments.reverse();
        segments
    }

    /// Full path of this node. The root contributes nothing, so the root's
    /// full path is the empty string.
    pub fn full_path(&self) -> String {
        self.path_segments().join(&PATH_SEPARATOR.to_string())
    }
}

impl<V: Clone> NodeHandle<V> {
    /// A copy of the value stored at this node.
    pub fn value(&self) -> Option<V> {
        self.inner.read().value.clone()
    }
}

impl<V> Clone for NodeHandle<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> PartialEq for NodeHandle<V> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.full_path() == other.full_path()
    }
}

impl<V> Eq for NodeHandle<V> {}

impl<V> Hash for NodeHandle<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_path().hash(state);
    }
}

impl<V> fmt::Debug for NodeHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("path", &self.full_path())
            .field("children", &self.children_count())
            .finish()
    }
}

impl<V> fmt::Display for NodeHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(&name),
            None => f.write_str("<root>"),
        }
    }
}
