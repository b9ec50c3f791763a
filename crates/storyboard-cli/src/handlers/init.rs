//! Init command handler

use crate::commands::InitArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use storyboard::ScriptConfig;

/// Execute the init command
pub fn execute_init(config: &CliConfig, args: &InitArgs) -> CliResult<()> {
    if args.path.exists() && !args.force {
        return Err(CliError::invalid_argument(format!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        )));
    }
    super::write_file(&args.path, &default_script_yaml()?)?;
    Reporter::new(config.color.should_color(), config.verbosity.is_quiet())
        .success(&format!("Created {}", args.path.display()));
    Ok(())
}

/// The built-in FROST DKG script as YAML
pub fn default_script_yaml() -> CliResult<String> {
    let yaml = ScriptConfig::default().to_yaml()?;
    Ok(format!(
        "# Storyboard script: three participants narrating FROST DKG\n{yaml}"
    ))
}
