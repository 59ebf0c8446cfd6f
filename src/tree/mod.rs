//! Directory Tree Digests
//!
//! Content digests for files and composed digests for directories, plus the
//! ordered traversal that feeds them.

pub mod composer;
pub mod hasher;
pub mod walker;
