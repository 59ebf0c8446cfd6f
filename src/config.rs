//! Configuration System
//!
//! Layered configuration: built-in defaults, then the user's global file,
//! then `timevouch.toml` in the working directory, then `TIMEVOUCH__*`
//! environment variables.

use crate::client::{ProtocolVersion, TIMEVOUCH_URL};
use crate::logging::LoggingConfig;
use crate::tree::hasher::DIGEST_CHUNK_SIZE;
use crate::tree::walker::WalkerConfig;
use crate::walk::WalkOptions;
use serde::{Deserialize, Serialize};
use std::fmt;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeVouchConfig {
    /// Registration service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Content digest settings
    #[serde(default)]
    pub digest: DigestConfig,

    /// Tree walk settings
    #[serde(default)]
    pub walk: WalkConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Registration service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Field naming generation spoken by the service
    #[serde(default)]
    pub protocol: ProtocolVersion,

    /// Override for the "already registered" response field
    #[serde(default)]
    pub known_field: Option<String>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    TIMEVOUCH_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            protocol: ProtocolVersion::default(),
            known_field: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            ));
        }
        if matches!(&self.known_field, Some(f) if f.trim().is_empty()) {
            return Err("known_field cannot be empty".to_string());
        }
        if self.connect_timeout_secs == 0 {
            return Err("connect_timeout_secs must be greater than zero".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Content digest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Bytes read per chunk while hashing
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    DIGEST_CHUNK_SIZE
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

/// Tree walk settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkConfig {
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Entry names skipped everywhere in the tree
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    #[serde(default)]
    pub stop_on_first_change: bool,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Service(String),
    Digest(String),
    Logging(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Service(msg) => write!(f, "service: {}", msg),
            ValidationError::Digest(msg) => write!(f, "digest: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl TimeVouchConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.service.validate() {
            errors.push(ValidationError::Service(e));
        }
        if self.digest.chunk_size == 0 {
            errors.push(ValidationError::Digest(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Walk options derived from the `digest` and `walk` sections.
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            stop_on_first_change: self.walk.stop_on_first_change,
            chunk_size: self.digest.chunk_size,
            walker: WalkerConfig {
                follow_symlinks: self.walk.follow_symlinks,
                ignore_patterns: self.walk.ignore_patterns.clone(),
            },
        }
    }
}
