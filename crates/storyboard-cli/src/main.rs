//! Storyboard CLI: dry-run and verify staged protocol animations
//!
//! ## Usage
//!
//! ```bash
//! storyboard run                          # Dry-run the built-in FROST DKG script
//! storyboard run script.yaml -o t.json    # Dry-run a script, export its timeline
//! storyboard validate script.yaml         # Check a script without running it
//! storyboard check --timeline t.json --observed o.json
//! storyboard init                         # Write storyboard.yaml
//! ```

use clap::Parser;
use std::process::ExitCode;
use storyboard_cli::{handlers, logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(config.verbosity, config.color.should_color());

    match cli.command {
        Commands::Run(args) => handlers::execute_run(&config, &args),
        Commands::Validate(args) => handlers::execute_validate(&config, &args),
        Commands::Timeline(args) => handlers::execute_timeline(&config, &args),
        Commands::Check(args) => handlers::execute_check(&config, &args),
        Commands::Init(args) => handlers::execute_init(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(ColorChoice::from(cli.color.clone()))
}
