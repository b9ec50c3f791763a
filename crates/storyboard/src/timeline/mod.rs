//! Timeline records: easing curves, the emitted schedule, timing checks.
//!
//! # Architecture
//!
//! ```text
//! Sequencer::run ──→ AnimationTimeline (JSON) ──→ verify_timeline ──→ AnimationReport
//!                                                       ▲
//! rendered output ──→ ObservedEvent[] ──────────────────┘
//! ```

pub mod easing;
pub mod timing;
pub mod types;

pub use easing::Easing;
pub use timing::{verify_timeline, ObservedEvent};
pub use types::{
    AnimationEvent, AnimationEventType, AnimationReport, AnimationTimeline, AnimationVerdict,
    EventResult,
};
