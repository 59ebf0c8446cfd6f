//! Digest computation using SHA-256
//!
//! Content digests stream their source through a single hash state in
//! fixed-size chunks. Directory digests are built with [`DirectoryAccumulator`],
//! which owns the composition byte layout.

use crate::error::StorageError;
use crate::types::{Digest, Hash};
use sha2::{Digest as _, Sha256};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Default read size when streaming content into the hasher.
pub const DIGEST_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Composition scheme version implemented by [`DirectoryAccumulator`].
///
/// Version 1 layout:
///
/// ```text
/// "DIRS"
/// ( 0x00 || subdir_digest_hex || subdir_name )*   sorted by name bytes
/// 0x00 || "FILES"
/// ( 0x00 || file_digest_hex || file_name )*       sorted by name bytes
/// ```
///
/// Digests are the 64 lowercase hex characters, names are the raw bytes of
/// the final path component. Changing any of this changes every directory
/// digest ever registered, so a new layout must get a new version.
pub const COMPOSITION_VERSION: u32 = 1;

const DIRS_MARKER: &[u8] = b"DIRS";
const FILES_MARKER: &[u8] = b"FILES";
const SEPARATOR: u8 = 0;

/// Hash arbitrary in-memory data.
pub fn digest_bytes(data: &[u8]) -> Digest {
    Digest::from_hash(&compute_hash(data))
}

/// Compute raw SHA-256 of in-memory data
pub fn compute_hash(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Stream a reader through SHA-256, `chunk_size` bytes at a time.
pub fn digest_reader<R: Read>(mut source: R, chunk_size: usize) -> std::io::Result<Digest> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    loop {
        let read = match source.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
    }
    Ok(Digest::from_hash(&hasher.finalize().into()))
}

/// Digest a file's contents. The name and path play no part.
pub fn digest_file(path: &Path, chunk_size: usize) -> Result<Digest, StorageError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => StorageError::NotFound(path.to_path_buf()),
        _ => StorageError::read(path, e),
    })?;
    // Small files don't need a full chunk allocated
    let len = file.metadata().map(|m| m.len()).unwrap_or(u64::MAX);
    let buffer_size = usize::try_from(len.saturating_add(1))
        .unwrap_or(usize::MAX)
        .min(chunk_size);
    digest_reader(file, buffer_size).map_err(|e| StorageError::read(path, e))
}

/// Raw bytes of a file or directory name as folded into a composition.
#[cfg(unix)]
pub fn name_bytes(name: &OsStr) -> std::borrow::Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    std::borrow::Cow::Borrowed(name.as_bytes())
}

/// Raw bytes of a file or directory name as folded into a composition.
#[cfg(not(unix))]
pub fn name_bytes(name: &OsStr) -> std::borrow::Cow<'_, [u8]> {
    match name.to_string_lossy() {
        std::borrow::Cow::Borrowed(s) => std::borrow::Cow::Borrowed(s.as_bytes()),
        std::borrow::Cow::Owned(s) => std::borrow::Cow::Owned(s.into_bytes()),
    }
}

/// First phase of a directory composition: subdirectories.
///
/// Callers feed children in ascending name order; the accumulator does not
/// sort. Call [`DirectoryAccumulator::files`] to move on to the file section.
pub struct DirectoryAccumulator {
    hasher: Sha256,
}

/// Second phase of a directory composition: files.
pub struct FileAccumulator {
    hasher: Sha256,
}

impl DirectoryAccumulator {
    pub fn new() -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DIRS_MARKER);
        Self { hasher }
    }

    /// Fold in a subdirectory's digest and bare name.
    pub fn subdirectory(&mut self, digest: &Digest, name: &OsStr) {
        fold_child(&mut self.hasher, digest, name);
    }

    /// Close the subdirectory section and start the file section.
    pub fn files(mut self) -> FileAccumulator {
        self.hasher.update([SEPARATOR]);
        self.hasher.update(FILES_MARKER);
        FileAccumulator {
            hasher: self.hasher,
        }
    }
}

impl Default for DirectoryAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl FileAccumulator {
    /// Fold in a file's registered digest and bare name.
    pub fn file(&mut self, digest: &Digest, name: &OsStr) {
        fold_child(&mut self.hasher, digest, name);
    }

    pub fn finalize(self) -> Digest {
        Digest::from_hash(&self.hasher.finalize().into())
    }
}

fn fold_child(hasher: &mut Sha256, digest: &Digest, name: &OsStr) {
    hasher.update([SEPARATOR]);
    hasher.update(digest.as_bytes());
    hasher.update(name_bytes(name));
}
