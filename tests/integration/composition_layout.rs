//! Byte-level checks of the directory composition layout

use sha2::{Digest as _, Sha256};
use std::fs;
use tempfile::TempDir;
use timevouch::client::MemoryRegistry;
use timevouch::progress::NullSink;
use timevouch::walk::register_tree;

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Root holding file `a` ("foo") and an empty directory `d`
#[tokio::test]
async fn test_root_digest_matches_hand_built_layout() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("a"), "foo").unwrap();
    fs::create_dir(root.join("d")).unwrap();

    let empty_dir = sha256_hex(b"DIRS\0FILES");
    let foo = sha256_hex(b"foo");
    assert_eq!(
        foo,
        "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae"
    );

    let mut layout = Vec::new();
    layout.extend_from_slice(b"DIRS");
    layout.push(0);
    layout.extend_from_slice(empty_dir.as_bytes());
    layout.extend_from_slice(b"d");
    layout.extend_from_slice(b"\0FILES");
    layout.push(0);
    layout.extend_from_slice(foo.as_bytes());
    layout.extend_from_slice(b"a");
    let expected = sha256_hex(&layout);

    let registry = MemoryRegistry::new();
    let outcome = register_tree(&registry, root, None, false, &mut NullSink)
        .await
        .unwrap();

    assert_eq!(outcome.result().digest.as_str(), expected);
}

/// Subdirectories precede files regardless of name order
#[tokio::test]
async fn test_subdirectories_before_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("a"), "").unwrap();
    fs::create_dir(root.join("z")).unwrap();

    let empty_file = sha256_hex(b"");
    let empty_dir = sha256_hex(b"DIRS\0FILES");
    let layout = format!("DIRS\0{}z\0FILES\0{}a", empty_dir, empty_file);

    let registry = MemoryRegistry::new();
    let outcome = register_tree(&registry, root, None, false, &mut NullSink)
        .await
        .unwrap();

    assert_eq!(
        outcome.result().digest.as_str(),
        sha256_hex(layout.as_bytes())
    );
}
