//! Config composition: defaults, sources, precedence.

pub mod merge_policy;
pub mod service;
