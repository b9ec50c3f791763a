//! Check command handler.
//!
//! Orchestrates: parse timeline -> parse observed -> verify -> render report.

use crate::commands::{CheckArgs, OutputFormat};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::render_check_text;
use std::path::Path;
use storyboard::{verify_timeline, AnimationReport, AnimationTimeline, AnimationVerdict, ObservedEvent};

/// Execute the check command
pub fn execute_check(config: &CliConfig, args: &CheckArgs) -> CliResult<()> {
    let timeline: AnimationTimeline = read_json(&args.timeline, "Timeline")?;
    let observed: Vec<ObservedEvent> = read_json(&args.observed, "Observed events")?;

    if config.verbosity.is_verbose() {
        eprintln!("Verifying timeline: {}", args.timeline.display());
    }

    let report = verify_timeline(&timeline, &observed, args.tolerance_ms)?;
    tracing::info!(
        scene = %report.scene_id,
        verdict = %report.verdict,
        verified = report.verified_events,
        total = report.total_events,
        "timing check finished"
    );

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render_check_text(&report, args.tolerance_ms)),
    }

    verdict_result(&report)
}

/// Map a report to the command outcome. Only `PASS` succeeds.
pub fn verdict_result(report: &AnimationReport) -> CliResult<()> {
    if report.verdict == AnimationVerdict::Pass {
        Ok(())
    } else {
        Err(CliError::verification(format!(
            "{} ({}/{} events passed)",
            report.scene_id, report.verified_events, report.total_events
        )))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> CliResult<T> {
    if !path.exists() {
        return Err(CliError::invalid_argument(format!(
            "{what} file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Verbosity;
    use storyboard::{AnimationEvent, AnimationEventType};
    use tempfile::TempDir;

    fn timeline() -> AnimationTimeline {
        let mut timeline = AnimationTimeline::new("demo");
        timeline.events.push(AnimationEvent {
            name: "title:enter".to_string(),
            event_type: AnimationEventType::Enter,
            expected_secs: 0.0,
            duration_secs: Some(1.0),
            easing: Some("linear".to_string()),
        });
        timeline.events.push(AnimationEvent {
            name: "P1:transition".to_string(),
            event_type: AnimationEventType::Transition,
            expected_secs: 1.5,
            duration_secs: Some(0.5),
            easing: None,
        });
        timeline
    }

    fn write_inputs(dir: &TempDir, observed: &[(&str, f64)]) -> CheckArgs {
        let timeline_path = dir.path().join("timeline.json");
        let observed_path = dir.path().join("observed.json");
        std::fs::write(&timeline_path, serde_json::to_string(&timeline()).unwrap()).unwrap();
        let events: Vec<ObservedEvent> = observed
            .iter()
            .map(|(name, time_secs)| ObservedEvent {
                name: (*name).to_string(),
                time_secs: *time_secs,
            })
            .collect();
        std::fs::write(&observed_path, serde_json::to_string(&events).unwrap()).unwrap();
        CheckArgs {
            timeline: timeline_path,
            observed: observed_path,
            tolerance_ms: 20.0,
            format: OutputFormat::Json,
        }
    }

    fn quiet() -> CliConfig {
        CliConfig::new().with_verbosity(Verbosity::Quiet)
    }

    #[test]
    fn test_check_passes_within_tolerance() {
        let dir = TempDir::new().unwrap();
        let args = write_inputs(&dir, &[("title:enter", 0.01), ("P1:transition", 1.49)]);
        execute_check(&quiet(), &args).unwrap();
    }

    #[test]
    fn test_check_fails_on_missing_event() {
        let dir = TempDir::new().unwrap();
        let args = write_inputs(&dir, &[("title:enter", 0.0)]);
        let err = execute_check(&quiet(), &args).unwrap_err();
        assert!(matches!(err, CliError::Verification { .. }));
        assert!(err.to_string().contains("1/2 events passed"));
    }

    #[test]
    fn test_check_missing_timeline_file() {
        let dir = TempDir::new().unwrap();
        let mut args = write_inputs(&dir, &[]);
        args.timeline = dir.path().join("absent.json");
        let err = execute_check(&quiet(), &args).unwrap_err();
        assert!(err.to_string().contains("Timeline file not found"));
    }

    #[test]
    fn test_check_rejects_negative_tolerance() {
        let dir = TempDir::new().unwrap();
        let mut args = write_inputs(&dir, &[("title:enter", 0.0)]);
        args.tolerance_ms = -1.0;
        let err = execute_check(&quiet(), &args).unwrap_err();
        assert!(matches!(err, CliError::Storyboard(_)));
    }
}
