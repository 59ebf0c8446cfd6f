//! Merge rules: defaults, override order, conflict handling.

use crate::client::TIMEVOUCH_URL;
use crate::tree::hasher::DIGEST_CHUNK_SIZE;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("service.endpoint", TIMEVOUCH_URL)?
        .set_default("service.protocol", "current")?
        .set_default("digest.chunk_size", DIGEST_CHUNK_SIZE as u64)?
        .set_default("walk.stop_on_first_change", false)
}
