//! Registration Client
//!
//! One remote call per digest: the digest (plus an optional secret word) goes
//! out, a [`RegistrationResult`] comes back. Structured 4xx answers become
//! [`ApiError::RegistrationRejected`]; every other failure is
//! [`ApiError::Transport`]. No retries happen here.

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::types::Digest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub mod memory;
pub mod protocol;

pub use memory::MemoryRegistry;
pub use protocol::{ProtocolVersion, ResponseSchema};

/// Default service endpoint
pub const TIMEVOUCH_URL: &str = "https://timevouch.com/api";

/// Outcome of registering one digest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationResult {
    /// Digest as confirmed by the service
    pub digest: Digest,
    /// Time of first registration, as sent by the service
    pub registered: String,
    /// The service had seen this digest before
    pub previously_registered: bool,
    pub current_time: Option<String>,
    pub validation: Option<ExtendedValidation>,
    /// Full response body
    #[serde(skip)]
    pub raw: Value,
}

impl RegistrationResult {
    /// First registration time, if the service sent an RFC 3339 timestamp.
    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.registered)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Service-side check of a previously registered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedValidation {
    pub summary: ValidationSummary,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSummary {
    Unavailable,
    Successful,
    Unsuccessful,
    Other(String),
}

impl ValidationSummary {
    pub fn parse(value: &str) -> Self {
        match value {
            "unavailable" => ValidationSummary::Unavailable,
            "successful" => ValidationSummary::Successful,
            "unsuccessful" => ValidationSummary::Unsuccessful,
            other => ValidationSummary::Other(other.to_string()),
        }
    }
}

/// Anything that can register a digest
#[async_trait]
pub trait RegistrationClient: Send + Sync {
    /// Register `digest`, sending `secret` alongside when present.
    async fn register(
        &self,
        digest: &Digest,
        secret: Option<&str>,
    ) -> Result<RegistrationResult, ApiError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

fn map_http_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Transport(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::Transport(format!("Connection error: {}", error))
    } else {
        ApiError::Transport(format!("HTTP error: {}", error))
    }
}

fn build_http_client(config: &ServiceConfig) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))
}

/// HTTP client for the TimeVouch registration endpoint
pub struct TimeVouchClient {
    client: Client,
    endpoint: String,
    schema: ResponseSchema,
}

impl TimeVouchClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, ApiError> {
        let client = build_http_client(config)?;
        let mut schema = ResponseSchema::new(config.protocol);
        if let Some(field) = &config.known_field {
            schema = schema.with_known_field(field.clone());
        }
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            schema,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn schema(&self) -> &ResponseSchema {
        &self.schema
    }
}

#[async_trait]
impl RegistrationClient for TimeVouchClient {
    #[instrument(skip(self, secret), fields(endpoint = %self.endpoint))]
    async fn register(
        &self,
        digest: &Digest,
        secret: Option<&str>,
    ) -> Result<RegistrationResult, ApiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&self.schema.form(digest, secret))
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_http_error)?;

        if status.is_client_error() {
            if let Some(rejection) = protocol::parse_rejection(status.as_u16(), &body) {
                warn!(status = status.as_u16(), "Registration rejected");
                return Err(rejection);
            }
        }
        if !status.is_success() {
            return Err(ApiError::Transport(format!(
                "Request failed with status {}: {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        let json: Value = serde_json::from_slice(&body)
            .map_err(|e| ApiError::Transport(format!("Failed to parse response: {}", e)))?;
        let result = self.schema.parse_success(json)?;
        debug!(
            digest = %result.digest,
            previously_registered = result.previously_registered,
            "Registered digest"
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        "timevouch"
    }
}
