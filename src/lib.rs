//! TimeVouch: Content Registration Client
//!
//! Computes SHA-256 content digests for strings, files and whole directory
//! trees and registers them with a TimeVouch timestamping service. Directory
//! digests are composed bottom-up from the digests the service echoes back
//! for each child.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;
pub mod tree;
pub mod types;
pub mod walk;

pub use api::Registrar;
pub use client::{RegistrationClient, RegistrationResult};
pub use error::ApiError;
pub use types::Digest;
pub use walk::{WalkOutcome, WalkState};
