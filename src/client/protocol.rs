//! Wire protocol details: request field names and response decoding.
//!
//! The service renamed its fields between client generations (`docid` /
//! `olddocid` became `digest` / `olddigest`). Which names to use is a
//! configuration choice, never guessed from the response.

use super::{ExtendedValidation, RegistrationResult, ValidationSummary};
use crate::error::ApiError;
use crate::types::Digest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Service protocol generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// `digest` / `olddigest`
    #[default]
    Current,
    /// `docid` / `olddocid`
    Legacy,
}

impl ProtocolVersion {
    /// Form field carrying the digest, also echoed back in the response.
    pub fn digest_field(self) -> &'static str {
        match self {
            ProtocolVersion::Current => "digest",
            ProtocolVersion::Legacy => "docid",
        }
    }

    /// Response field telling whether the digest was already registered.
    pub fn known_field(self) -> &'static str {
        match self {
            ProtocolVersion::Current => "olddigest",
            ProtocolVersion::Legacy => "olddocid",
        }
    }
}

pub const SECRET_FIELD: &str = "secretword";

/// Field names used for one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    pub version: ProtocolVersion,
    pub digest_field: String,
    pub known_field: String,
}

impl ResponseSchema {
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            version,
            digest_field: version.digest_field().to_string(),
            known_field: version.known_field().to_string(),
        }
    }

    /// Override the "already known" field name.
    pub fn with_known_field(mut self, field: impl Into<String>) -> Self {
        self.known_field = field.into();
        self
    }

    /// Form body for a registration request.
    pub fn form<'a>(&'a self, digest: &'a Digest, secret: Option<&'a str>) -> Vec<(&'a str, &'a str)> {
        let mut form = vec![(self.digest_field.as_str(), digest.as_str())];
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            form.push((SECRET_FIELD, secret));
        }
        form
    }

    /// Decode a success body into a [`RegistrationResult`].
    pub fn parse_success(&self, body: Value) -> Result<RegistrationResult, ApiError> {
        let object = body
            .as_object()
            .ok_or_else(|| ApiError::Transport("response is not a JSON object".to_string()))?;

        let digest = object
            .get(&self.digest_field)
            .and_then(Value::as_str)
            .ok_or_else(|| missing(&self.digest_field))?;
        let digest = Digest::from_hex(digest).map_err(|e| {
            ApiError::Transport(format!("service returned malformed digest: {}", e))
        })?;

        let registered = object
            .get("registered")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("registered"))?
            .to_string();

        let known = object
            .get(&self.known_field)
            .ok_or_else(|| missing(&self.known_field))?;

        let current_time = object
            .get("currenttime")
            .and_then(Value::as_str)
            .map(str::to_string);

        let validation = object
            .get("validatesummary")
            .and_then(Value::as_str)
            .map(|summary| ExtendedValidation {
                summary: ValidationSummary::parse(summary),
                message: object
                    .get("validatemessage")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });

        Ok(RegistrationResult {
            digest,
            registered,
            previously_registered: truthy(known),
            current_time,
            validation,
            raw: body,
        })
    }
}

impl Default for ResponseSchema {
    fn default() -> Self {
        Self::new(ProtocolVersion::default())
    }
}

/// Structured error body returned with 4xx statuses
#[derive(Debug, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
    pub message: String,
}

/// Decode a 4xx body. `None` means it was not a structured rejection.
pub fn parse_rejection(status: u16, body: &[u8]) -> Option<ApiError> {
    let parsed: ServiceErrorBody = serde_json::from_slice(body).ok()?;
    Some(ApiError::RegistrationRejected {
        status,
        error: parsed.error,
        message: parsed.message,
    })
}

fn missing(field: &str) -> ApiError {
    ApiError::Transport(format!("response is missing field '{}'", field))
}

/// Boolean-equivalent reading of a JSON value.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
