//! CLI route: single route table and run context.

use crate::api::Registrar;
use crate::config::{ConfigLoader, TimeVouchConfig};
use crate::error::ApiError;
use crate::progress::{ProgressSink, TracingSink, WalkStep};
use crate::tree::hasher;
use crate::types::Digest;
use crate::walk::WalkOutcome;
use std::io::IsTerminal;
use std::path::Path;
use tracing::info;

use crate::cli::output::{format_outcome, format_result, format_step, OutputFormat};
use crate::cli::parse::{Cli, Commands, FormatArg};

/// Exit status when a tree walk stopped on a change.
pub const EXIT_CHANGE_DETECTED: i32 = 2;

/// Text to print and the process exit code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: i32,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self { text, exit_code: 0 }
    }
}

/// Runtime context for CLI execution: effective config and the registrar.
pub struct RunContext {
    config: TimeVouchConfig,
    registrar: Registrar,
    format: OutputFormat,
}

impl RunContext {
    /// Build the context from parsed arguments. Uses ConfigLoader only.
    pub fn new(cli: &Cli) -> Result<Self, ApiError> {
        let mut config = match &cli.config {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&cli.workspace)?,
        };
        if let Some(endpoint) = &cli.endpoint {
            config.service.endpoint = endpoint.clone();
        }
        let format = match cli.format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        };
        Self::from_config(config, cli.secret.clone(), cli.offline, format)
    }

    pub fn from_config(
        config: TimeVouchConfig,
        secret: Option<String>,
        offline: bool,
        format: OutputFormat,
    ) -> Result<Self, ApiError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;

        let registrar = if offline {
            info!("Using in-memory registry");
            Registrar::offline(&config)
        } else {
            Registrar::from_config(&config)?
        };

        Ok(Self {
            registrar: registrar.with_secret(secret),
            config,
            format,
        })
    }

    pub fn config(&self) -> &TimeVouchConfig {
        &self.config
    }

    /// Run one command. Tree walks print each step as it happens.
    pub async fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        match command {
            Commands::Digest { path } => {
                let digest = hasher::digest_file(path, self.config.digest.chunk_size)?;
                Ok(CommandOutput::ok(format!("{}  {}", digest, path.display())))
            }
            Commands::RegisterString { data } => {
                let result = self.registrar.register_string(data).await?;
                Ok(CommandOutput::ok(format_result(&result, self.format)?))
            }
            Commands::RegisterFile { path } => {
                let result = self.registrar.register_file(path).await?;
                Ok(CommandOutput::ok(format_result(&result, self.format)?))
            }
            Commands::RegisterDigest { digest } => {
                let digest = Digest::from_hex(digest.trim())?;
                let result = self.registrar.register_digest(&digest).await?;
                Ok(CommandOutput::ok(format_result(&result, self.format)?))
            }
            Commands::RegisterTree {
                path,
                stop_on_first_change,
            } => self.register_tree(path, *stop_on_first_change).await,
            Commands::Config => {
                let text = toml::to_string_pretty(&self.config).map_err(|e| {
                    ApiError::ConfigError(format!("Failed to render configuration: {}", e))
                })?;
                Ok(CommandOutput::ok(text))
            }
        }
    }

    async fn register_tree(
        &self,
        path: &Path,
        stop_on_first_change: bool,
    ) -> Result<CommandOutput, ApiError> {
        let mut options = self.registrar.options().clone();
        options.stop_on_first_change |= stop_on_first_change;

        let format = self.format;
        let color = format == OutputFormat::Text && std::io::stdout().is_terminal();
        let mut log = TracingSink;
        let mut sink = |step: &WalkStep| {
            log.on_step(step);
            println!("{}", format_step(step, format, color));
        };

        let outcome = self
            .registrar
            .register_tree_with(path, options, &mut sink)
            .await?;

        let exit_code = match outcome {
            WalkOutcome::Completed(_) => 0,
            WalkOutcome::ChangeDetected { .. } => EXIT_CHANGE_DETECTED,
        };
        Ok(CommandOutput {
            text: format_outcome(&outcome, self.format)?,
            exit_code,
        })
    }
}
