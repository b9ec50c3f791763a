//! Output formatting for run reports

use console::{style, Term};
use storyboard::{AnimationReport, ScriptRun, StageOutline};

/// Status reporter writing to stderr
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }
}

/// Render a dry run as plain text
#[must_use]
pub fn render_run_text(name: &str, run: &ScriptRun) -> String {
    let mut out = format!(
        "Script: {name} ({:.2}s, {} directives, {} ops)\n",
        run.summary.elapsed_secs, run.summary.directives, run.summary.ops
    );
    for stage in &run.outline {
        out.push_str(&render_stage_line(stage));
        out.push('\n');
        for step in &stage.sub_steps {
            out.push_str(&format!(
                "    {}: {} connectors, {} labels, {} marks\n",
                step.active,
                step.connectors.len(),
                step.labels.len(),
                step.marks.len()
            ));
        }
        if !stage.persistent.is_empty() {
            let ids: Vec<String> = stage.persistent.iter().map(ToString::to_string).collect();
            out.push_str(&format!("    persistent: {}\n", ids.join(", ")));
        }
    }
    out.push_str(&format!(
        "Timeline: {} events, ends at {:.2}s\n",
        run.summary.timeline.event_count(),
        run.summary.timeline.end_secs()
    ));
    out
}

fn render_stage_line(stage: &StageOutline) -> String {
    format!(
        "  [{:>6.2}s - {:>6.2}s] {}",
        stage.start_secs, stage.end_secs, stage.title
    )
}

/// Render a timing report as plain text
#[must_use]
pub fn render_check_text(report: &AnimationReport, tolerance_ms: f64) -> String {
    let mut out = format!("Scene: {} (tolerance: {tolerance_ms:.0}ms)\n", report.scene_id);
    for event in &report.events {
        let status = if event.passed { "PASS" } else { "FAIL" };
        match (event.actual_secs, event.delta_ms) {
            (Some(actual), Some(delta)) => out.push_str(&format!(
                "  {}: expected={:.3}s actual={actual:.3}s delta={delta:.1}ms {status}\n",
                event.name, event.expected_secs
            )),
            _ => out.push_str(&format!(
                "  {}: expected={:.3}s actual=MISSING {status}\n",
                event.name, event.expected_secs
            )),
        }
    }
    out.push_str(&format!(
        "Verdict: {} ({}/{} events, max delta: {:.1}ms, mean delta: {:.1}ms)\n",
        report.verdict,
        report.verified_events,
        report.total_events,
        report.max_delta_ms,
        report.mean_delta_ms
    ));
    out
}
