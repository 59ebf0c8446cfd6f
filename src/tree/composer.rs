//! Tree Digest Composer
//!
//! Reduces one directory at a time to a digest: subdirectory digests come out
//! of the working state, files are digested and registered on the spot, and
//! the composed directory digest is registered and stored for the parent.

use crate::client::{RegistrationClient, RegistrationResult};
use crate::error::{ApiError, StorageError};
use crate::progress::{NodeKind, WalkStep};
use crate::tree::hasher::{self, DirectoryAccumulator};
use crate::tree::walker::DirectoryListing;
use crate::types::Digest;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};

/// Composed digests of finished directories that no parent has folded yet.
#[derive(Debug, Default)]
pub struct DirectoryDigestState {
    digests: HashMap<PathBuf, Digest>,
}

impl DirectoryDigestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: PathBuf, digest: Digest) {
        self.digests.insert(path, digest);
    }

    /// Remove and return the digest stored for `path`.
    pub fn take(&mut self, path: &Path) -> Option<Digest> {
        self.digests.remove(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.digests.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

/// Where the composer is within the current node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePhase {
    Hashing,
    Registering,
    Folding,
}

/// Result of composing one directory
#[derive(Debug, Clone)]
pub enum Composition {
    /// The directory digest was registered and stored
    Registered(RegistrationResult),
    /// The step callback asked to stop after this registration
    Halted {
        step: WalkStep,
        result: RegistrationResult,
    },
}

/// Composes directories bottom-up against a registration client
pub struct TreeComposer<'a, C: RegistrationClient + ?Sized> {
    client: &'a C,
    secret: Option<&'a str>,
    chunk_size: usize,
    state: DirectoryDigestState,
    phase: NodePhase,
}

impl<'a, C: RegistrationClient + ?Sized> TreeComposer<'a, C> {
    pub fn new(client: &'a C, secret: Option<&'a str>, chunk_size: usize) -> Self {
        Self {
            client,
            secret,
            chunk_size,
            state: DirectoryDigestState::new(),
            phase: NodePhase::Hashing,
        }
    }

    pub fn state(&self) -> &DirectoryDigestState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DirectoryDigestState {
        &mut self.state
    }

    /// Phase of the node being processed, or of the last one processed.
    pub fn phase(&self) -> NodePhase {
        self.phase
    }

    /// Digest a file's contents and register the digest.
    pub async fn register_file(&mut self, path: &Path) -> Result<RegistrationResult, ApiError> {
        self.phase = NodePhase::Hashing;
        let digest = hasher::digest_file(path, self.chunk_size)?;
        trace!(path = %path.display(), digest = %digest, "Hashed file");

        self.phase = NodePhase::Registering;
        self.client.register(&digest, self.secret).await
    }

    /// Compose, register and store the digest of `dir`.
    ///
    /// Every subdirectory in `listing` must already have been composed.
    /// `on_step` sees each file registration and then the directory's own;
    /// returning `Break` stops composition right after that registration.
    #[instrument(skip(self, listing, on_step), fields(dir = %dir.display()))]
    pub async fn compose_directory<F>(
        &mut self,
        dir: &Path,
        listing: &DirectoryListing,
        mut on_step: F,
    ) -> Result<Composition, ApiError>
    where
        F: FnMut(&WalkStep) -> ControlFlow<()>,
    {
        self.phase = NodePhase::Folding;
        let mut subdirs = DirectoryAccumulator::new();
        for child in &listing.subdirectories {
            let digest = self
                .state
                .take(&child.path)
                .ok_or_else(|| StorageError::MissingChildDigest(child.path.clone()))?;
            subdirs.subdirectory(&digest, &child.name);
        }

        let mut files = subdirs.files();
        for child in &listing.files {
            let result = self.register_file(&child.path).await?;
            let step = WalkStep {
                path: child.path.clone(),
                kind: NodeKind::File,
                digest: result.digest.clone(),
                previously_registered: result.previously_registered,
            };
            if on_step(&step).is_break() {
                return Ok(Composition::Halted { step, result });
            }

            self.phase = NodePhase::Folding;
            files.file(&result.digest, &child.name);
        }

        let digest = files.finalize();
        debug!(
            digest = %digest,
            subdirectories = listing.subdirectories.len(),
            files = listing.files.len(),
            "Composed directory"
        );

        self.phase = NodePhase::Registering;
        let result = self.client.register(&digest, self.secret).await?;
        let step = WalkStep {
            path: dir.to_path_buf(),
            kind: NodeKind::Directory,
            digest: result.digest.clone(),
            previously_registered: result.previously_registered,
        };
        if on_step(&step).is_break() {
            return Ok(Composition::Halted { step, result });
        }

        self.state.insert(dir.to_path_buf(), result.digest.clone());
        Ok(Composition::Registered(result))
    }
}
