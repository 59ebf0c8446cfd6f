//! Property-based tests for digest determinism

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;
use timevouch::tree::hasher::{digest_bytes, digest_reader};
use timevouch::tree::walker::Walker;

proptest! {
    /// Chunk size never changes a content digest
    #[test]
    fn test_chunking_is_transparent(
        content in proptest::collection::vec(any::<u8>(), 0..4096),
        chunk_size in 1usize..512,
    ) {
        let streamed = digest_reader(content.as_slice(), chunk_size).unwrap();
        prop_assert_eq!(streamed, digest_bytes(&content));
    }

    /// Listings come back in name order whatever the creation order
    #[test]
    fn test_listing_is_sorted(
        names in proptest::collection::vec("[a-z]{1,8}", 1..12),
    ) {
        let temp_dir = TempDir::new().unwrap();
        for name in &names {
            fs::write(temp_dir.path().join(name), name).unwrap();
        }

        let listing = Walker::new(temp_dir.path().to_path_buf())
            .list_children(temp_dir.path())
            .unwrap();
        let listed: Vec<String> = listing
            .files
            .iter()
            .map(|c| c.name.to_string_lossy().into_owned())
            .collect();
        let expected: Vec<String> = names.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();

        prop_assert_eq!(listed, expected);
    }
}
