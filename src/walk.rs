//! Walk Controller
//!
//! Drives the composer over a tree, deepest directories first, and decides
//! after every registration whether to keep going.

use crate::client::{RegistrationClient, RegistrationResult};
use crate::error::{ApiError, StorageError};
use crate::progress::{ProgressSink, WalkStep};
use crate::tree::composer::{Composition, NodePhase, TreeComposer};
use crate::tree::hasher::DIGEST_CHUNK_SIZE;
use crate::tree::walker::{Walker, WalkerConfig};
use crate::types::Digest;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Options for one tree walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Stop at the first digest the service had not seen before
    pub stop_on_first_change: bool,
    pub chunk_size: usize,
    pub walker: WalkerConfig,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            stop_on_first_change: false,
            chunk_size: DIGEST_CHUNK_SIZE,
            walker: WalkerConfig::default(),
        }
    }
}

/// How a walk ended
#[derive(Debug, Clone)]
pub enum WalkOutcome {
    /// The whole tree was composed; holds the root's registration
    Completed(RegistrationResult),
    /// New or changed content was found and the walk stopped there
    ChangeDetected {
        path: PathBuf,
        result: RegistrationResult,
    },
}

impl WalkOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, WalkOutcome::Completed(_))
    }

    /// Registration of the last node the walk touched.
    pub fn result(&self) -> &RegistrationResult {
        match self {
            WalkOutcome::Completed(result) => result,
            WalkOutcome::ChangeDetected { result, .. } => result,
        }
    }
}

/// Lifecycle of a [`WalkController`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkState {
    Idle,
    Walking { directory: PathBuf, phase: NodePhase },
    Completed(Digest),
    Aborted(PathBuf),
    Failed { directory: Option<PathBuf>, error: String },
}

/// Registers whole directory trees
pub struct WalkController<'a, C: RegistrationClient + ?Sized> {
    client: &'a C,
    options: WalkOptions,
    state: WalkState,
}

impl<'a, C: RegistrationClient + ?Sized> WalkController<'a, C> {
    pub fn new(client: &'a C, options: WalkOptions) -> Self {
        Self {
            client,
            options,
            state: WalkState::Idle,
        }
    }

    pub fn state(&self) -> &WalkState {
        &self.state
    }

    /// Register every file and directory under `root`, bottom-up.
    ///
    /// The root's own name is not part of any digest. Nodes registered before
    /// a failure stay registered with the service.
    #[instrument(skip(self, secret, sink), fields(root = %root.display()))]
    pub async fn register_tree(
        &mut self,
        root: &Path,
        secret: Option<&str>,
        sink: &mut dyn ProgressSink,
    ) -> Result<WalkOutcome, ApiError> {
        let start = Instant::now();
        info!(
            stop_on_first_change = self.options.stop_on_first_change,
            client = self.client.name(),
            "Starting tree registration"
        );

        let walker = Walker::with_config(root.to_path_buf(), self.options.walker.clone());
        let directories = match walker.directories_bottom_up() {
            Ok(dirs) => dirs,
            Err(e) => return Err(self.fail(None, e.into())),
        };
        debug!(directory_count = directories.len(), "Planned walk");

        let stop_on_first_change = self.options.stop_on_first_change;
        let mut composer = TreeComposer::new(self.client, secret, self.options.chunk_size);
        let mut last = None;

        for dir in directories {
            self.state = WalkState::Walking {
                directory: dir.clone(),
                phase: NodePhase::Hashing,
            };

            let listing = match walker.list_children(&dir) {
                Ok(listing) => listing,
                Err(e) => return Err(self.fail(Some(dir), e.into())),
            };

            let composed = composer
                .compose_directory(&dir, &listing, |step: &WalkStep| {
                    sink.on_step(step);
                    if stop_on_first_change && step.is_change() {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                })
                .await;

            match composed {
                Ok(Composition::Registered(result)) => last = Some((dir, result)),
                Ok(Composition::Halted { step, result }) => {
                    info!(
                        path = %step.path.display(),
                        duration_ms = start.elapsed().as_millis(),
                        "Change detected, stopping walk"
                    );
                    self.state = WalkState::Aborted(step.path.clone());
                    return Ok(WalkOutcome::ChangeDetected {
                        path: step.path,
                        result,
                    });
                }
                Err(e) => {
                    self.state = WalkState::Walking {
                        directory: dir.clone(),
                        phase: composer.phase(),
                    };
                    return Err(self.fail(Some(dir), e));
                }
            }
        }

        // The root comes last and nothing folds it
        let (root_dir, result) = match last {
            Some(last) => last,
            None => {
                return Err(self.fail(None, StorageError::NotWalkable(root.to_path_buf()).into()))
            }
        };
        composer.state_mut().take(&root_dir);
        debug_assert!(composer.state().is_empty());

        info!(
            digest = %result.digest,
            previously_registered = result.previously_registered,
            duration_ms = start.elapsed().as_millis(),
            "Tree registration completed"
        );
        self.state = WalkState::Completed(result.digest.clone());
        Ok(WalkOutcome::Completed(result))
    }

    fn fail(&mut self, directory: Option<PathBuf>, err: ApiError) -> ApiError {
        if let WalkState::Walking { phase, .. } = &self.state {
            error!(phase = ?phase, "Tree registration failed: {}", err);
        } else {
            error!("Tree registration failed: {}", err);
        }
        self.state = WalkState::Failed {
            directory,
            error: err.to_string(),
        };
        err
    }
}

/// Register a tree with default walker settings.
pub async fn register_tree<C: RegistrationClient + ?Sized>(
    client: &C,
    root: &Path,
    secret: Option<&str>,
    stop_on_first_change: bool,
    sink: &mut dyn ProgressSink,
) -> Result<WalkOutcome, ApiError> {
    let options = WalkOptions {
        stop_on_first_change,
        ..WalkOptions::default()
    };
    WalkController::new(client, options)
        .register_tree(root, secret, sink)
        .await
}
