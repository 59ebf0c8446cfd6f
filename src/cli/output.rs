//! CLI output: rendering of registration results and walk steps.

use crate::client::{RegistrationResult, ValidationSummary};
use crate::error::ApiError;
use crate::progress::WalkStep;
use crate::types::Digest;
use crate::walk::WalkOutcome;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::RegistrationRejected { error, message, .. } => {
            format!("Error condition - {}: {}", error, message)
        }
        other => other.to_string(),
    }
}

/// One line per walk step; new content is highlighted when `color` is set.
pub fn format_step(step: &WalkStep, format: OutputFormat, color: bool) -> String {
    match format {
        // Paths that are not UTF-8 cannot be JSON strings
        OutputFormat::Json => serde_json::to_string(step).unwrap_or_else(|_| step.to_string()),
        OutputFormat::Text if color && step.is_change() => step.to_string().yellow().to_string(),
        OutputFormat::Text => step.to_string(),
    }
}

pub fn format_result(
    result: &RegistrationResult,
    format: OutputFormat,
) -> Result<String, ApiError> {
    match format {
        OutputFormat::Json => to_pretty_json(result),
        OutputFormat::Text => Ok(format_result_text(result)),
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render output: {}", e)))
}

fn format_result_text(result: &RegistrationResult) -> String {
    let mut lines = Vec::new();
    if result.previously_registered {
        lines.push(
            "Verified registration: this content was registered before and has not changed since."
                .to_string(),
        );
    } else {
        lines.push("New registration: this content had never been seen before.".to_string());
    }
    lines.push(format!("Digest:       {}", result.digest));
    lines.push(format!("Registered:   {}", result.registered));
    if let Some(now) = &result.current_time {
        lines.push(format!("Current time: {}", now));
    }
    if let Some(validation) = &result.validation {
        let summary = match &validation.summary {
            ValidationSummary::Unavailable => "unavailable",
            ValidationSummary::Successful => "successful",
            ValidationSummary::Unsuccessful => "unsuccessful",
            ValidationSummary::Other(other) => other.as_str(),
        };
        lines.push(format!("Extended validation: {}", summary));
        if let Some(message) = &validation.message {
            lines.push(message.clone());
        }
    }
    lines.join("\n")
}

#[derive(Serialize)]
struct ChangeReport<'a> {
    change_detected: bool,
    path: &'a Path,
    digest: &'a Digest,
}

pub fn format_outcome(outcome: &WalkOutcome, format: OutputFormat) -> Result<String, ApiError> {
    match (outcome, format) {
        (WalkOutcome::Completed(result), _) => format_result(result, format),
        (WalkOutcome::ChangeDetected { path, result }, OutputFormat::Json) => {
            to_pretty_json(&ChangeReport {
                change_detected: true,
                path,
                digest: &result.digest,
            })
        }
        (WalkOutcome::ChangeDetected { path, .. }, OutputFormat::Text) => {
            Ok(format!("Change detected at {}", path.display()))
        }
    }
}
