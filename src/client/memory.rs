//! In-process registry with the same contract as the remote service.
//!
//! Used for offline dry runs: a fresh registry reports every digest as new,
//! so a walk against it lists what would be registered.

use super::{RegistrationClient, RegistrationResult};
use crate::error::ApiError;
use crate::types::Digest;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct RegistryState {
    registered: HashMap<Digest, String>,
    requests: Vec<Digest>,
}

/// Registry held in memory
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    state: Mutex<RegistryState>,
    required_secret: Option<String>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every request whose secret word differs from `secret`.
    pub fn with_required_secret(mut self, secret: impl Into<String>) -> Self {
        self.required_secret = Some(secret.into());
        self
    }

    /// Mark `digest` as already known, registered at `registered`.
    pub fn preload(&self, digest: Digest, registered: impl Into<String>) {
        self.state
            .lock()
            .registered
            .insert(digest, registered.into());
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.state.lock().registered.contains_key(digest)
    }

    /// Every digest submitted so far, in order.
    pub fn requests(&self) -> Vec<Digest> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }
}

#[async_trait]
impl RegistrationClient for MemoryRegistry {
    async fn register(
        &self,
        digest: &Digest,
        secret: Option<&str>,
    ) -> Result<RegistrationResult, ApiError> {
        if let Some(required) = &self.required_secret {
            if secret != Some(required.as_str()) {
                return Err(ApiError::RegistrationRejected {
                    status: 400,
                    error: "badsecret".to_string(),
                    message: "The secret word does not match".to_string(),
                });
            }
        }

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut state = self.state.lock();
        state.requests.push(digest.clone());

        let (registered, previously_registered) = match state.registered.get(digest) {
            Some(at) => (at.clone(), true),
            None => {
                state.registered.insert(digest.clone(), now.clone());
                (now.clone(), false)
            }
        };

        Ok(RegistrationResult {
            digest: digest.clone(),
            registered: registered.clone(),
            previously_registered,
            current_time: Some(now.clone()),
            validation: None,
            raw: json!({
                "digest": digest.as_str(),
                "registered": registered,
                "currenttime": now,
                "olddigest": previously_registered,
            }),
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
