// Copyright (c) 2025 FSAF Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Segment Trie Implementation
//!
//! A mutable prefix tree keyed by path segments. Every node below the root is
//! reached through exactly one segment name, and a value is stored only on the
//! node that terminates an `insert` call. Intermediate hops created on the way
//! exist structurally but hold no value until a separate insert ends there.
//!
//! The trie is used to cache resolved documents so that repeated lookups of the
//! same path are answered from memory instead of one provider round trip per
//! segment.
//!
//! # Example
//!
//! ```
//! use fsaf_lib::data_structures::SegmentTrie;
//!
//! let trie = SegmentTrie::new();
//! assert!(trie.insert(&["music", "album", "track.mp3"], 42));
//!
//! assert_eq!(trie.find(&["music", "album", "track.mp3"]), Some(42));
//! assert!(trie.contains(&["music", "album"]));
//! assert_eq!(trie.find(&["music", "album"]), None);
//! ```
//!
//! All operations take a non-empty segment list. An empty list cannot denote
//! a node and is treated as a caller bug: the operation panics.

mod node;

use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

pub use node::{NodeHandle, NodeKind, PATH_SEPARATOR};
use node::{NodeRef, TrieNode};

/// A trie mapping ordered segment sequences to cached values.
pub struct SegmentTrie<V> {
    /// The nameless entry point
    root: NodeRef<V>,
}

impl<V> SegmentTrie<V> {
    /// Creates a trie that only contains the root node.
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(TrieNode::root())),
        }
    }

    /// Returns a handle to the root node.
    pub fn root(&self) -> NodeHandle<V> {
        NodeHandle::new(Arc::clone(&self.root))
    }

    /// Stores `value` on the node reached by `segments`, creating every missing
    /// node along the way. A value already stored at that exact path is
    /// overwritten.
    ///
    /// # Returns
    ///
    /// Always `true`. Storage never fails silently: a corrupted child map is a
    /// bug and aborts the operation.
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty or if a child is keyed under a name that
    /// differs from its own.
    pub fn insert<S: AsRef<str>>(&self, segments: &[S], value: V) -> bool {
        check_not_empty(segments, "insert");

        let mut node = Arc::clone(&self.root);

        for segment in segments {
            let name = segment.as_ref();

            let next = {
                let mut current = node.write();
                match current.children.get(name) {
                    Some(child) => Arc::clone(child),
                    None => {
                        let child = Arc::new(RwLock::new(TrieNode::child_of(name, &node)));
                        current.children.insert(name.to_owned(), Arc::clone(&child));
                        child
                    }
                }
            };

            {
                let reached = next.read();
                assert!(
                    reached.is_named(name),
                    "trie child keyed by '{}' is named {:?}",
                    name,
                    reached.kind
                );
            }

            node = next;
        }

        node.write().value = Some(value);
        true
    }

    /// Inserts every `(segments, value)` pair.
    pub fn insert_many<S, I>(&self, entries: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (Vec<S>, V)>,
    {
        entries
            .into_iter()
            .all(|(segments, value)| self.insert(&segments, value))
    }

    /// Returns true if walking `segments` from the root ends at an existing
    /// node. Whether that node holds a value is irrelevant.
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty.
    pub fn contains<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        check_not_empty(segments, "contains");
        self.walk(segments).is_some()
    }

    /// Removes the node at `segments` together with its entire subtree.
    ///
    /// # Returns
    ///
    /// `true` if a node was detached, `false` if nothing existed at that path.
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty.
    pub fn remove<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        check_not_empty(segments, "remove");

        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return false,
        };

        let parent = if parents.is_empty() {
            Arc::clone(&self.root)
        } else {
            match self.walk(parents) {
                Some(parent) => parent,
                None => return false,
            }
        };

        let detached = parent.write().children.remove(last.as_ref());
        match detached {
            Some(node) => {
                node.write().parent = Weak::new();
                true
            }
            None => false,
        }
    }

    /// Calls `visitor` on every node below the node at `segments`. With
    /// `recursive == false` only the direct children are visited, otherwise
    /// the whole subtree in pre-order (parent before its children, siblings
    /// ordered by name). Nothing is visited if the path does not exist.
    ///
    /// No lock is held while the visitor runs.
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty.
    pub fn visit_every_segment_after_path<S, F>(&self, segments: &[S], recursive: bool, mut visitor: F)
    where
        S: AsRef<str>,
        F: FnMut(&NodeHandle<V>),
    {
        check_not_empty(segments, "visit_every_segment_after_path");

        let start = match self.walk(segments) {
            Some(node) => node,
            None => return,
        };

        let mut collected = Vec::new();
        collect_descendants(&start, recursive, &mut collected);

        for node in collected {
            visitor(&NodeHandle::new(node));
        }
    }

    /// Walks `segments` from the root and calls `visitor(index, node)` for the
    /// node reached by `segments[..=index]`. The walk stops when the visitor
    /// returns `false` or when the next segment does not exist.
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty.
    pub fn visit_path<S, F>(&self, segments: &[S], mut visitor: F)
    where
        S: AsRef<str>,
        F: FnMut(usize, &NodeHandle<V>) -> bool,
    {
        check_not_empty(segments, "visit_path");

        let mut node = Arc::clone(&self.root);
        for (index, segment) in segments.iter().enumerate() {
            let next = match node.read().children.get(segment.as_ref()) {
                Some(child) => Arc::clone(child),
                None => return,
            };

            if !visitor(index, &NodeHandle::new(Arc::clone(&next))) {
                return;
            }

            node = next;
        }
    }

    /// Visits the root and then every node in pre-order. Returning `false`
    /// from the visitor skips the subtree of the node just visited.
    pub fn visit<F>(&self, mut visitor: F)
    where
        F: FnMut(&NodeHandle<V>) -> bool,
    {
        let mut stack = vec![Arc::clone(&self.root)];

        while let Some(node) = stack.pop() {
            if !visitor(&NodeHandle::new(Arc::clone(&node))) {
                continue;
            }

            let guard = node.read();
            // Reversed so that siblings pop off the stack in name order.
            stack.extend(guard.children.values().rev().map(Arc::clone));
        }
    }

    /// Detaches everything below the root.
    pub fn clear(&self) {
        let children = std::mem::take(&mut self.root.write().children);
        for child in children.into_values() {
            child.write().parent = Weak::new();
        }
    }

    /// Number of nodes holding a value.
    pub fn len(&self) -> usize {
        let mut count = 0;
        self.visit(|node| {
            if node.has_value() {
                count += 1;
            }
            true
        });
        count
    }

    /// Number of nodes below the root, with or without a value.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.visit(|node| {
            if !node.is_root() {
                count += 1;
            }
            true
        });
        count
    }

    /// Returns true when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.root.read().children.is_empty()
    }

    /// Returns the node at `segments` if the whole path exists.
    fn walk<S: AsRef<str>>(&self, segments: &[S]) -> Option<NodeRef<V>> {
        let mut node = Arc::clone(&self.root);

        for segment in segments {
            let next = node.read().children.get(segment.as_ref()).map(Arc::clone)?;
            node = next;
        }

        Some(node)
    }
}

impl<V: Clone> SegmentTrie<V> {
    /// Returns the value stored exactly at `segments`.
    ///
    /// A path that only exists as a prefix of longer inserted paths holds no
    /// value and yields `None`, the same as a path that does not exist.
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty.
    pub fn find<S: AsRef<str>>(&self, segments: &[S]) -> Option<V> {
        check_not_empty(segments, "find");
        self.walk(segments).and_then(|node| node.read().value.clone())
    }
}

impl<V> Default for SegmentTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for SegmentTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentTrie")
            .field("nodes", &self.node_count())
            .field("values", &self.len())
            .finish()
    }
}

fn check_not_empty<S>(segments: &[S], operation: &str) {
    assert!(
        !segments.is_empty(),
        "{operation}: segment list must not be empty"
    );
}

fn collect_descendants<V>(node: &NodeRef<V>, recursive: bool, out: &mut Vec<NodeRef<V>>) {
    let children: Vec<NodeRef<V>> = node.read().children.values().map(Arc::clone).collect();

    for child in children {
        out.push(Arc::clone(&child));
        if recursive {
            collect_descendants(&child, recursive, out);
        }
    }
}
