//! Per-node progress reporting for tree walks.

use crate::types::Digest;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// One registration performed during a walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkStep {
    pub path: PathBuf,
    pub kind: NodeKind,
    pub digest: Digest,
    pub previously_registered: bool,
}

impl WalkStep {
    /// New or changed content.
    pub fn is_change(&self) -> bool {
        !self.previously_registered
    }
}

/// `<digest> <path>` for known content, `<digest>!<path>` for new content.
/// Directory paths end with `/`.
impl fmt::Display for WalkStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.previously_registered { ' ' } else { '!' };
        write!(f, "{}{}{}", self.digest, marker, self.path.display())?;
        if self.kind == NodeKind::Directory {
            f.write_str("/")?;
        }
        Ok(())
    }
}

/// Receives every step of a walk as it happens
pub trait ProgressSink {
    fn on_step(&mut self, step: &WalkStep);
}

impl<F> ProgressSink for F
where
    F: FnMut(&WalkStep),
{
    fn on_step(&mut self, step: &WalkStep) {
        self(step)
    }
}

/// Discards all steps
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_step(&mut self, _step: &WalkStep) {}
}

/// Emits each step as a structured `info` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn on_step(&mut self, step: &WalkStep) {
        info!(
            path = %step.path.display(),
            kind = ?step.kind,
            digest = %step.digest,
            previously_registered = step.previously_registered,
            "Registered node"
        );
    }
}
