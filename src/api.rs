//! Registration API
//!
//! Entry point for callers: register a digest, a string, a file or a whole
//! directory tree with one configured client and secret word.

use crate::client::{MemoryRegistry, RegistrationClient, RegistrationResult, TimeVouchClient};
use crate::config::TimeVouchConfig;
use crate::error::ApiError;
use crate::progress::ProgressSink;
use crate::tree::hasher;
use crate::types::Digest;
use crate::walk::{WalkController, WalkOptions, WalkOutcome};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Registers content with a [`RegistrationClient`]
pub struct Registrar {
    client: Arc<dyn RegistrationClient>,
    secret: Option<String>,
    options: WalkOptions,
}

impl Registrar {
    pub fn new(client: Arc<dyn RegistrationClient>) -> Self {
        Self {
            client,
            secret: None,
            options: WalkOptions::default(),
        }
    }

    /// Registrar talking to the configured service endpoint.
    pub fn from_config(config: &TimeVouchConfig) -> Result<Self, ApiError> {
        let client = TimeVouchClient::new(&config.service)?;
        Ok(Self::new(Arc::new(client)).with_options(config.walk_options()))
    }

    /// Registrar backed by a fresh in-memory registry.
    pub fn offline(config: &TimeVouchConfig) -> Self {
        Self::new(Arc::new(MemoryRegistry::new())).with_options(config.walk_options())
    }

    /// Send `secret` with every registration. Empty strings mean no secret.
    pub fn with_secret(mut self, secret: Option<String>) -> Self {
        self.secret = secret.filter(|s| !s.is_empty());
        self
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// Register a precomputed digest.
    pub async fn register_digest(&self, digest: &Digest) -> Result<RegistrationResult, ApiError> {
        self.client.register(digest, self.secret()).await
    }

    /// Digest a string and register it.
    pub async fn register_string(&self, data: &str) -> Result<RegistrationResult, ApiError> {
        let digest = hasher::digest_bytes(data.as_bytes());
        self.register_digest(&digest).await
    }

    /// Digest a file's contents and register it. The file name plays no part.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn register_file(&self, path: &Path) -> Result<RegistrationResult, ApiError> {
        let digest = hasher::digest_file(path, self.options.chunk_size)?;
        debug!(digest = %digest, "Hashed file");
        self.register_digest(&digest).await
    }

    /// Register a directory tree, reporting each node to `sink`.
    pub async fn register_tree(
        &self,
        root: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<WalkOutcome, ApiError> {
        self.register_tree_with(root, self.options.clone(), sink).await
    }

    /// Register a directory tree with one-off walk options.
    pub async fn register_tree_with(
        &self,
        root: &Path,
        options: WalkOptions,
        sink: &mut dyn ProgressSink,
    ) -> Result<WalkOutcome, ApiError> {
        WalkController::new(self.client.as_ref(), options)
            .register_tree(root, self.secret(), sink)
            .await
    }
}
