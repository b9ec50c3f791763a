//! Storyboard: staged animation timelines for narrating multi-party protocols
//!
//! Storyboard drives a small cast of labelled boxes, arrows and transient
//! labels through an ordered list of stages. It performs none of the
//! narrated protocol's computation; it only decides what appears where and
//! when, and issues those decisions to a rendering surface.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  STORYBOARD Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Stage      │    │ Group      │    │ Timeline   │            │
//! │   │ Script     │───►│ Composer   │───►│ Sequencer  │            │
//! │   │ (config)   │    │ (units)    │    │ (directives)│           │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │         │                 ▲                 │                   │
//! │         ▼                 │                 ▼                   │
//! │   ┌────────────┐    ┌─────┴──────┐    ┌────────────┐            │
//! │   │ Visual     │───►│ Connector  │    │ Render     │            │
//! │   │ Entity     │    │ Builder    │    │ Surface    │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         └──── Geometry Helper ────┘                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use storyboard::{RecordingSurface, StageScript};
//!
//! let script = StageScript::frost_dkg()?;
//! let mut surface = RecordingSurface::new();
//! let run = script.run(&mut surface)?;
//! assert_eq!(run.outline.len(), 3);
//! # Ok::<(), storyboard::StoryboardError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(clippy::cast_precision_loss, clippy::missing_errors_doc)]
pub mod config;
pub mod connector;
pub mod entity;
pub mod geometry;
#[allow(clippy::missing_errors_doc)]
pub mod group;
mod result;
#[allow(clippy::missing_errors_doc)]
pub mod script;
#[allow(clippy::missing_errors_doc)]
pub mod sequencer;
pub mod style;
#[allow(clippy::missing_errors_doc)]
pub mod surface;
#[allow(clippy::cast_precision_loss)]
pub mod timeline;

pub use config::{
    ParticipantConfig, ScriptConfig, StageConfig, StageKind, SummaryLayout, TimingConfig,
    TurnConfig, SCHEMA_VERSION,
};
pub use connector::{
    broadcast_bundle, caption_above, confirmation_mark, directed_share, Connector,
    ConnectorTarget, ElementId, Label, LabelKind,
};
pub use entity::{EntityAppearance, EntityId, EntityState, Scene, VisualEntity};
pub use geometry::{
    bounding_center, connector_endpoints, edge_point, label_normal, Anchored, Size, Vec2,
    DEFAULT_EDGE_MARGIN,
};
pub use group::{GroupUnit, ScheduledOp, TimedOp, VisualOp};
pub use result::{ErrorContext, StoryboardError, StoryboardResult};
pub use script::{
    CompiledScript, ScriptRun, Stage, StageOutline, StageScript, SubStep, SubStepOutline,
};
pub use sequencer::{AnnotationStyle, Directive, RunSummary, Sequencer, SequencerState};
pub use style::{Color, ConnectorStyle, Palette, TextStyle};
pub use surface::{
    CompletionSignal, Handle, PropertyDelta, RecordingSurface, RenderSurface, ShapeHandle,
    ShapeSpec, SurfaceCommand, TextHandle, TextSpec, Transition,
};
pub use timeline::{
    verify_timeline, AnimationEvent, AnimationEventType, AnimationReport, AnimationTimeline,
    AnimationVerdict, Easing, EventResult, ObservedEvent,
};
