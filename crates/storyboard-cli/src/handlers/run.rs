//! Run command handler: dry-run a script on the recording surface.

use super::{load_script, write_file};
use crate::commands::{OutputFormat, RunArgs};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::{render_run_text, Reporter};
use storyboard::RecordingSurface;

/// Execute the run command
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let script = load_script(args.script.as_deref())?;

    let mut surface = RecordingSurface::new();
    let run = script.run(&mut surface)?;
    tracing::info!(
        script = script.name(),
        elapsed_secs = run.summary.elapsed_secs,
        commands = surface.commands().len(),
        "dry run finished"
    );

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&run)?),
        OutputFormat::Text => print!("{}", render_run_text(script.name(), &run)),
    }

    if let Some(path) = &args.output {
        write_file(path, &serde_json::to_string_pretty(&run.summary.timeline)?)?;
        reporter.info(&format!("Timeline written to {}", path.display()));
    }
    if let Some(path) = &args.commands {
        write_file(path, &surface.to_json()?)?;
        reporter.info(&format!("Surface commands written to {}", path.display()));
    }

    reporter.success(&format!(
        "{}: {} stages played in {:.2}s",
        script.name(),
        run.outline.len(),
        run.summary.elapsed_secs
    ));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};
    use storyboard::AnimationTimeline;
    use tempfile::TempDir;

    fn quiet() -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never)
    }

    #[test]
    fn test_run_writes_timeline_and_commands() {
        let dir = TempDir::new().unwrap();
        let timeline_path = dir.path().join("timeline.json");
        let commands_path = dir.path().join("commands.json");
        let args = RunArgs {
            script: None,
            format: OutputFormat::Json,
            output: Some(timeline_path.clone()),
            commands: Some(commands_path.clone()),
        };

        execute_run(&quiet(), &args).unwrap();

        let timeline: AnimationTimeline =
            serde_json::from_str(&std::fs::read_to_string(&timeline_path).unwrap()).unwrap();
        assert!(timeline.find("title:enter").is_some());

        let commands: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&commands_path).unwrap()).unwrap();
        let commands = commands.as_array().unwrap();
        assert!(!commands.is_empty());
        assert!(commands.iter().all(|c| c.get("command").is_some()));
    }

    #[test]
    fn test_run_missing_script_fails() {
        let args = RunArgs {
            script: Some("/nonexistent/script.yaml".into()),
            format: OutputFormat::Text,
            output: None,
            commands: None,
        };
        assert!(execute_run(&quiet(), &args).is_err());
    }
}
