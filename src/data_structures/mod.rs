//! Data structures used by the file managers.
//!
//! The segment trie backs the document lookup cache: resolved documents are
//! stored under the path segments that lead to them, so that a second lookup
//! of the same path costs no provider round trip.

pub mod segment_trie;

pub use segment_trie::{NodeHandle, NodeKind, SegmentTrie};
