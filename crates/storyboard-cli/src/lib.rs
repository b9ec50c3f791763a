//! Storyboard CLI Library
//!
//! Command-line interface for dry-running Storyboard scripts, exporting
//! their scheduled timelines and checking rendered output against them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    CheckArgs, Cli, ColorArg, Commands, InitArgs, OutputFormat, RunArgs, TimelineArgs,
    ValidateArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{render_check_text, render_run_text, Reporter};
