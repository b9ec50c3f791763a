//! Timeline command handler: export the scheduled events as JSON.

use super::{load_script, write_file};
use crate::commands::TimelineArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::Reporter;
use storyboard::{AnimationTimeline, RecordingSurface, StageScript};

/// Execute the timeline command
pub fn execute_timeline(config: &CliConfig, args: &TimelineArgs) -> CliResult<()> {
    let script = load_script(args.script.as_deref())?;
    let timeline = scheduled_timeline(&script)?;
    let json = serde_json::to_string_pretty(&timeline)?;

    match &args.output {
        Some(path) => {
            write_file(path, &json)?;
            Reporter::new(config.color.should_color(), config.verbosity.is_quiet()).success(
                &format!("{} events written to {}", timeline.event_count(), path.display()),
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Play `script` on a recording surface and return the events it scheduled.
pub fn scheduled_timeline(script: &StageScript) -> CliResult<AnimationTimeline> {
    let run = script.run(&mut RecordingSurface::new())?;
    Ok(run.summary.timeline)
}
