//! Timing verification.
//!
//! Compares a scheduled [`AnimationTimeline`] with event times observed in
//! rendered output (from render logs, metadata or frame analysis).

use super::types::{AnimationEvent, AnimationReport, AnimationTimeline, AnimationVerdict, EventResult};
use crate::result::{StoryboardError, StoryboardResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An event time observed in rendered output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservedEvent {
    /// Event name (must match the scheduled name)
    pub name: String,
    /// Observed time in seconds
    pub time_secs: f64,
}

/// Check every scheduled event against its observed time.
///
/// An event passes when it was observed within `tolerance_ms` of its
/// scheduled start. Missing observations fail. When several observations
/// share a name the first one counts.
pub fn verify_timeline(
    timeline: &AnimationTimeline,
    observed: &[ObservedEvent],
    tolerance_ms: f64,
) -> StoryboardResult<AnimationReport> {
    if !tolerance_ms.is_finite() || tolerance_ms < 0.0 {
        return Err(StoryboardError::Timing {
            message: format!("tolerance must be a non-negative number of ms, got {tolerance_ms}"),
        });
    }

    if !timeline.has_events() {
        return Ok(AnimationReport {
            scene_id: timeline.scene_id.clone(),
            verdict: AnimationVerdict::NoEvents,
            events: Vec::new(),
            total_events: 0,
            verified_events: 0,
            max_delta_ms: 0.0,
            mean_delta_ms: 0.0,
        });
    }

    let mut by_name: HashMap<&str, f64> = HashMap::with_capacity(observed.len());
    for obs in observed {
        by_name.entry(obs.name.as_str()).or_insert(obs.time_secs);
    }

    let results: Vec<EventResult> = timeline
        .events
        .iter()
        .map(|event| check_event(event, by_name.get(event.name.as_str()).copied(), tolerance_ms))
        .collect();

    let deltas: Vec<f64> = results
        .iter()
        .filter_map(|r| r.delta_ms.map(f64::abs))
        .collect();
    let max_delta_ms = deltas.iter().copied().fold(0.0, f64::max);
    let mean_delta_ms = if deltas.is_empty() {
        0.0
    } else {
        deltas.iter().sum::<f64>() / deltas.len() as f64
    };
    let verified_events = results.iter().filter(|r| r.passed).count();
    let verdict = if verified_events == results.len() {
        AnimationVerdict::Pass
    } else {
        AnimationVerdict::Fail
    };

    Ok(AnimationReport {
        scene_id: timeline.scene_id.clone(),
        verdict,
        total_events: results.len(),
        verified_events,
        max_delta_ms,
        mean_delta_ms,
        events: results,
    })
}

fn check_event(event: &AnimationEvent, actual_secs: Option<f64>, tolerance_ms: f64) -> EventResult {
    let delta_ms = actual_secs.map(|actual| (actual - event.expected_secs) * 1000.0);
    EventResult {
        name: event.name.clone(),
        event_type: event.event_type,
        expected_secs: event.expected_secs,
        actual_secs,
        delta_ms,
        passed: delta_ms.is_some_and(|d| d.abs() <= tolerance_ms),
    }
}
