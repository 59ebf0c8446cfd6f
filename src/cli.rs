//! CLI domain: parse, route and output only.
//! Registration logic lives in [`crate::api`]; this layer only renders it.

mod output;
mod parse;
mod route;

pub use output::{format_outcome, format_result, format_step, map_error, OutputFormat};
pub use parse::{Cli, Commands, FormatArg};
pub use route::{CommandOutput, RunContext, EXIT_CHANGE_DETECTED};
