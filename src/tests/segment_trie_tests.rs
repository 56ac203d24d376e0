//! Property-based tests for the segment trie.

use proptest::prelude::*;

use super::test_utils::{segment_strategy, segments_strategy};
use crate::data_structures::SegmentTrie;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_insert_then_find(segments in segments_strategy(), value in any::<u32>()) {
        let trie = SegmentTrie::new();
        prop_assert!(trie.insert(&segments, value));
        prop_assert_eq!(trie.find(&segments), Some(value));
    }

    #[test]
    fn prop_repeated_insert_keeps_shape(segments in segments_strategy(), value in any::<u32>()) {
        let trie = SegmentTrie::new();
        trie.insert(&segments, value);
        let nodes = trie.node_count();

        trie.insert(&segments, value);
        prop_assert_eq!(trie.node_count(), nodes);
        prop_assert_eq!(trie.node_count(), segments.len());
        prop_assert_eq!(trie.find(&segments), Some(value));
    }

    #[test]
    fn prop_prefixes_exist_without_value(segments in segments_strategy(), extra in segment_strategy()) {
        let trie = SegmentTrie::new();
        let mut longer = segments.clone();
        longer.push(extra);
        trie.insert(&longer, 1u8);

        for end in 1..longer.len() {
            prop_assert!(trie.contains(&longer[..end]));
            prop_assert_eq!(trie.find(&longer[..end]), None);
        }
    }

    #[test]
    fn prop_remove_prefix_cascades(segments in segments_strategy(), extra in segment_strategy()) {
        let trie = SegmentTrie::new();
        let mut longer = segments.clone();
        longer.push(extra);
        trie.insert(&longer, 1u8);

        prop_assert!(trie.remove(&longer[..1]));
        for end in 1..=longer.len() {
            prop_assert!(!trie.contains(&longer[..end]));
        }
    }

    #[test]
    fn prop_remove_leaf_is_local(segments in segments_strategy(), extra in segment_strategy()) {
        let trie = SegmentTrie::new();
        let mut longer = segments.clone();
        longer.push(extra);
        trie.insert(&longer, 1u8);

        prop_assert!(trie.remove(&longer));
        prop_assert!(!trie.contains(&longer));
        for end in 1..longer.len() {
            prop_assert!(trie.contains(&longer[..end]));
        }
    }

    #[test]
    fn prop_miss_is_not_an_error(inserted in segments_strategy(), queried in segments_strategy()) {
        prop_assume!(!queried.starts_with(&inserted) && !inserted.starts_with(&queried));

        let trie = SegmentTrie::new();
        trie.insert(&inserted, 1u8);
        prop_assert!(!trie.contains(&queried));
        prop_assert_eq!(trie.find(&queried), None);
        prop_assert!(!trie.remove(&queried));
    }

    #[test]
    fn prop_leaf_count_matches_paths(leaves in 1usize..40, depth in 1usize..6) {
        let trie = SegmentTrie::new();
        for leaf in 0..leaves {
            let path: Vec<String> = (0..depth)
                .map(|level| format!("{leaf}-{level}"))
                .collect();
            trie.insert(&path, leaf);
        }

        let mut leaf_nodes = 0;
        let mut root_nodes = 0;
        trie.visit(|node| {
            if node.is_root() {
                root_nodes += 1;
            }
            if node.is_leaf() {
                leaf_nodes += 1;
            }
            true
        });

        prop_assert_eq!(leaf_nodes, leaves);
        prop_assert_eq!(root_nodes, 1);
        prop_assert_eq!(trie.len(), leaves);
    }
}
