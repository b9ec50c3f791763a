//! Schedule records emitted by the sequencer.
//!
//! A run writes one [`AnimationTimeline`] describing when every visual
//! change was scheduled to start. Renderers can store it next to their output
//! and [`super::verify_timeline`] checks observed timings against it.

use serde::{Deserialize, Serialize};

/// Every scheduled event of one run, in start order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationTimeline {
    /// Script identifier
    pub scene_id: String,
    /// Scheduled events
    pub events: Vec<AnimationEvent>,
}

impl AnimationTimeline {
    /// Empty timeline for `scene_id`.
    #[must_use]
    pub fn new(scene_id: impl Into<String>) -> Self {
        Self {
            scene_id: scene_id.into(),
            events: Vec::new(),
        }
    }

    /// Total number of events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Check if timeline has any events.
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Time at which the last event finishes.
    #[must_use]
    pub fn end_secs(&self) -> f64 {
        self.events
            .iter()
            .map(AnimationEvent::end_secs)
            .fold(0.0, f64::max)
    }

    /// Events of one type.
    pub fn of_type(&self, event_type: AnimationEventType) -> impl Iterator<Item = &AnimationEvent> {
        self.events.iter().filter(move |e| e.event_type == event_type)
    }

    /// Look an event up by its unique name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&AnimationEvent> {
        self.events.iter().find(|e| e.name == name)
    }
}

/// A scheduled visual change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationEvent {
    /// Unique name, e.g. `P1->P2:enter` or `P1->P2:enter#2` for repeats
    pub name: String,
    /// Event type
    pub event_type: AnimationEventType,
    /// Scheduled start in seconds from the beginning of the run
    pub expected_secs: f64,
    /// Duration in seconds (for events with duration)
    pub duration_secs: Option<f64>,
    /// Easing curve name (for transitions)
    pub easing: Option<String>,
}

impl AnimationEvent {
    /// Scheduled end time.
    #[must_use]
    pub fn end_secs(&self) -> f64 {
        self.expected_secs + self.duration_secs.unwrap_or(0.0)
    }
}

/// Types of scheduled events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationEventType {
    /// Element appears
    Enter,
    /// Element disappears
    Exit,
    /// Existing element changes state or position
    Transition,
    /// Nothing changes for a while
    Hold,
}

impl std::fmt::Display for AnimationEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enter => write!(f, "enter"),
            Self::Exit => write!(f, "exit"),
            Self::Transition => write!(f, "transition"),
            Self::Hold => write!(f, "hold"),
        }
    }
}

/// Timing verification report.
#[derive(Clone, Debug, Serialize)]
pub struct AnimationReport {
    /// Script identifier
    pub scene_id: String,
    /// Overall verdict
    pub verdict: AnimationVerdict,
    /// Per-event results
    pub events: Vec<EventResult>,
    /// Total events scheduled
    pub total_events: usize,
    /// Events observed within tolerance
    pub verified_events: usize,
    /// Maximum timing delta in milliseconds
    pub max_delta_ms: f64,
    /// Mean timing delta in milliseconds
    pub mean_delta_ms: f64,
}

/// Per-event verification result.
#[derive(Clone, Debug, Serialize)]
pub struct EventResult {
    /// Event name
    pub name: String,
    /// Event type
    pub event_type: AnimationEventType,
    /// Scheduled time in seconds
    pub expected_secs: f64,
    /// Observed time in seconds (None if not observed)
    pub actual_secs: Option<f64>,
    /// Observed minus scheduled, in milliseconds
    pub delta_ms: Option<f64>,
    /// Whether the event passed timing check
    pub passed: bool,
}

/// Overall timing verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationVerdict {
    /// All events observed within tolerance
    Pass,
    /// One or more events missing or late
    Fail,
    /// No events to verify
    NoEvents,
}

impl std::fmt::Display for AnimationVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
            Self::NoEvents => write!(f, "NO EVENTS"),
        }
    }
}
