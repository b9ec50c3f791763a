//! Validate command handler

use super::load_script;
use crate::commands::ValidateArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::Reporter;

/// Execute the validate command.
///
/// Loading builds the whole script, so every participant reference and
/// timing value is checked. Compiling additionally plans every directive.
pub fn execute_validate(config: &CliConfig, args: &ValidateArgs) -> CliResult<()> {
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let script = load_script(Some(args.script.as_path()))?;
    let compiled = script.compile()?;

    if config.verbosity.is_verbose() {
        for stage in &compiled.outline {
            reporter.info(&format!(
                "{}: {} sub-steps, {:.2}s",
                stage.title,
                stage.sub_steps.len(),
                stage.end_secs - stage.start_secs
            ));
        }
    }
    reporter.success(&format!(
        "{} is valid: {} participants, {} stages, {:.2}s",
        args.script.display(),
        script.scene().len(),
        script.stages().len(),
        compiled.sequencer.planned_duration_secs()
    ));
    Ok(())
}
