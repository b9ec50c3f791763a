//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Storyboard: dry-run, export and verify staged protocol animations
#[derive(Parser, Debug)]
#[command(name = "storyboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dry-run a script on the recording surface and report its stages
    Run(RunArgs),

    /// Validate a script without running it
    Validate(ValidateArgs),

    /// Print the scheduled timeline as JSON
    Timeline(TimelineArgs),

    /// Check observed event times against a scheduled timeline
    Check(CheckArgs),

    /// Write the default FROST DKG script as YAML
    Init(InitArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Script file (YAML or JSON); the built-in FROST DKG script when omitted
    pub script: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the scheduled timeline JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the recorded surface commands JSON to this file
    #[arg(long)]
    pub commands: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Script file (YAML or JSON)
    pub script: PathBuf,
}

/// Arguments for the timeline command
#[derive(Parser, Debug)]
pub struct TimelineArgs {
    /// Script file (YAML or JSON); the built-in FROST DKG script when omitted
    pub script: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the scheduled timeline JSON
    #[arg(long)]
    pub timeline: PathBuf,

    /// Path to observed events JSON (`[{"name": ..., "time_secs": ...}]`)
    #[arg(long)]
    pub observed: PathBuf,

    /// Allowed difference in milliseconds
    #[arg(long, default_value = "20")]
    pub tolerance_ms: f64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Where to write the script
    #[arg(default_value = "storyboard.yaml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::ColorChoice;

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["storyboard", "run"]).unwrap();
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Commands::Run(args) => {
                assert!(args.script.is_none());
                assert_eq!(args.format, OutputFormat::Text);
                assert!(args.output.is_none());
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["storyboard", "run", "-vv", "--color", "never"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(ColorChoice::from(cli.color), ColorChoice::Never);
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "storyboard",
            "check",
            "--timeline",
            "t.json",
            "--observed",
            "o.json",
            "--tolerance-ms",
            "5",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert!((args.tolerance_ms - 5.0).abs() < f64::EPSILON);
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("expected check, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_requires_script() {
        assert!(Cli::try_parse_from(["storyboard", "validate"]).is_err());
    }

    #[test]
    fn test_init_default_path() {
        let cli = Cli::try_parse_from(["storyboard", "init"]).unwrap();
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.path, PathBuf::from("storyboard.yaml"));
                assert!(!args.force);
            }
            other => panic!("expected init, got {other:?}"),
        }
    }
}
