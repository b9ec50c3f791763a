//! Timeline sequencer: the single writer to a rendering surface.
//!
//! The sequencer owns a queue of [`Directive`]s and runs them strictly in
//! order. A `Play` directive schedules every leaf of its [`GroupUnit`] at
//! `start + offset`; `Pause` and `Annotate` are barriers. Each leaf is
//! committed to the [`Scene`] before it reaches the surface, so the scene
//! never shows a half-applied unit.
//!
//! ```text
//!   Idle ──run()──→ Running ──queue drained / error──→ Finished
//! ```

use crate::connector::ElementId;
use crate::entity::{EntityId, Scene};
use crate::geometry::Vec2;
use crate::group::{validate_duration, GroupUnit, ScheduledOp, VisualOp};
use crate::result::{StoryboardError, StoryboardResult};
use crate::style::{Color, Palette};
use crate::surface::{Handle, PropertyDelta, RenderSurface, ShapeSpec, TextSpec, Transition};
use crate::timeline::{AnimationEvent, AnimationEventType, AnimationTimeline, Easing};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::{debug, info};

/// Corner radius of participant boxes
pub const ENTITY_CORNER_RADIUS: f64 = 0.2;

/// Font size of participant labels
pub const ENTITY_FONT_SIZE: f64 = 28.0;

/// One queued instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Schedule a unit and wait for it to complete
    Play(GroupUnit),
    /// Hold the current frame
    Pause {
        /// Hold length
        secs: f64,
    },
    /// Show a transient text overlay, hold it, then remove it
    Annotate {
        /// Overlay text
        text: String,
        /// Hold length between fade-in and fade-out
        secs: f64,
    },
}

impl Directive {
    /// Validated pause.
    pub fn pause(secs: f64) -> StoryboardResult<Self> {
        Ok(Self::Pause {
            secs: validate_duration(secs, "pause")?,
        })
    }

    /// Validated annotation overlay.
    pub fn annotate(text: impl Into<String>, secs: f64) -> StoryboardResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(StoryboardError::config("annotation text is empty"));
        }
        Ok(Self::Annotate {
            secs: validate_duration(secs, "annotation")?,
            text,
        })
    }

    /// Time this directive occupies on the run clock.
    #[must_use]
    pub fn duration_secs(&self, annotation: &AnnotationStyle) -> f64 {
        match self {
            Self::Play(unit) => unit.duration_secs(),
            Self::Pause { secs } => *secs,
            Self::Annotate { secs, .. } => annotation.fade_in_secs + secs + annotation.fade_out_secs,
        }
    }
}

impl From<GroupUnit> for Directive {
    fn from(unit: GroupUnit) -> Self {
        Self::Play(unit)
    }
}

/// Lifecycle of a sequencer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencerState {
    /// Accepting directives
    #[default]
    Idle,
    /// Executing the queue
    Running,
    /// Done (successfully or not); cannot be reused
    Finished,
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// How annotation overlays look and fade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    /// Font size
    pub font_size: f64,
    /// Text colour
    pub color: Color,
    /// Centre of the overlay
    pub position: Vec2,
    /// Fade-in (write) length
    pub fade_in_secs: f64,
    /// Fade-out length
    pub fade_out_secs: f64,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            font_size: 28.0,
            color: Color::WHITE,
            position: Vec2::new(0.0, -3.2),
            fade_in_secs: 1.0,
            fade_out_secs: 1.0,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Run clock when the last directive finished
    pub elapsed_secs: f64,
    /// Directives executed
    pub directives: usize,
    /// Leaf operations issued
    pub ops: usize,
    /// Every scheduled event
    pub timeline: AnimationTimeline,
}

#[derive(Debug, Clone, Copy)]
struct EntityHandles {
    shape: Handle,
    text: Handle,
}

impl EntityHandles {
    const fn both(self) -> [Handle; 2] {
        [self.shape, self.text]
    }
}

/// Ordered executor of directives against a [`RenderSurface`].
#[derive(Debug)]
pub struct Sequencer {
    scene_id: String,
    queue: VecDeque<Directive>,
    state: SequencerState,
    clock_secs: f64,
    palette: Palette,
    annotation: AnnotationStyle,
    entities: HashMap<EntityId, EntityHandles>,
    elements: HashMap<ElementId, Handle>,
    pending_removals: Vec<(f64, Handle)>,
    event_names: HashMap<String, usize>,
    timeline: AnimationTimeline,
    annotations: usize,
}

impl Sequencer {
    /// Create an idle sequencer for `scene_id`.
    #[must_use]
    pub fn new(scene_id: impl Into<String>) -> Self {
        let scene_id = scene_id.into();
        Self {
            timeline: AnimationTimeline::new(scene_id.clone()),
            scene_id,
            queue: VecDeque::new(),
            state: SequencerState::Idle,
            clock_secs: 0.0,
            palette: Palette::default(),
            annotation: AnnotationStyle::default(),
            entities: HashMap::new(),
            elements: HashMap::new(),
            pending_removals: Vec::new(),
            event_names: HashMap::new(),
            annotations: 0,
        }
    }

    /// Palette used when drawing revealed entities
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Style of annotation overlays
    #[must_use]
    pub fn with_annotation_style(mut self, style: AnnotationStyle) -> Self {
        self.annotation = style;
        self
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SequencerState {
        self.state
    }

    /// Script identifier
    #[must_use]
    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }

    /// Directives waiting to run
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queued directives in order
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.queue.iter()
    }

    /// Run clock
    #[must_use]
    pub const fn clock_secs(&self) -> f64 {
        self.clock_secs
    }

    /// Total length of everything still queued.
    #[must_use]
    pub fn planned_duration_secs(&self) -> f64 {
        self.queue
            .iter()
            .map(|d| d.duration_secs(&self.annotation))
            .sum()
    }

    /// Append a directive. Only allowed before the run starts.
    pub fn enqueue(&mut self, directive: impl Into<Directive>) -> StoryboardResult<()> {
        if self.state != SequencerState::Idle {
            return Err(StoryboardError::invalid_state(format!(
                "cannot enqueue while the sequencer is {}",
                self.state
            )));
        }
        self.queue.push_back(directive.into());
        Ok(())
    }

    /// Execute the whole queue.
    ///
    /// The sequencer ends up `Finished` whether or not the run succeeds; any
    /// error aborts the remaining directives.
    pub fn run(
        &mut self,
        scene: &mut Scene,
        surface: &mut dyn RenderSurface,
    ) -> StoryboardResult<RunSummary> {
        if self.state != SequencerState::Idle {
            return Err(StoryboardError::invalid_state(format!(
                "cannot run a sequencer that is {}",
                self.state
            )));
        }
        self.state = SequencerState::Running;
        info!(
            scene = %self.scene_id,
            directives = self.queue.len(),
            planned_secs = self.planned_duration_secs(),
            "run started"
        );
        let outcome = self.drive(scene, surface);
        self.state = SequencerState::Finished;
        let (directives, ops) = outcome?;
        info!(
            scene = %self.scene_id,
            elapsed_secs = self.clock_secs,
            ops,
            "run finished"
        );
        Ok(RunSummary {
            elapsed_secs: self.clock_secs,
            directives,
            ops,
            timeline: std::mem::take(&mut self.timeline),
        })
    }

    fn drive(
        &mut self,
        scene: &mut Scene,
        surface: &mut dyn RenderSurface,
    ) -> StoryboardResult<(usize, usize)> {
        let mut directives = 0;
        let mut ops = 0;
        while let Some(directive) = self.queue.pop_front() {
            debug!(at_secs = self.clock_secs, index = directives, "directive");
            match directive {
                Directive::Play(unit) => ops += self.play(&unit, scene, surface)?,
                Directive::Pause { secs } => self.pause(secs, surface)?,
                Directive::Annotate { text, secs } => self.annotate(&text, secs, surface)?,
            }
            directives += 1;
        }
        self.flush_removals(f64::INFINITY, surface)?;
        Ok((directives, ops))
    }

    fn play(
        &mut self,
        unit: &GroupUnit,
        scene: &mut Scene,
        surface: &mut dyn RenderSurface,
    ) -> StoryboardResult<usize> {
        let start = self.clock_secs;
        let schedule = unit.schedule();
        for scheduled in &schedule {
            let at = start + scheduled.offset_secs;
            self.seek(at, surface)?;
            scene.commit(scheduled.op)?;
            self.issue(scheduled, at, scene, surface)?;
            self.record(
                scheduled.op.subject(),
                scheduled.op.event_type(),
                at,
                Some((scheduled.duration_secs, scheduled.easing)),
            );
        }
        self.clock_secs = start + unit.duration_secs();
        self.seek(self.clock_secs, surface)?;
        Ok(schedule.len())
    }

    fn issue(
        &mut self,
        scheduled: &ScheduledOp<'_>,
        at: f64,
        scene: &Scene,
        surface: &mut dyn RenderSurface,
    ) -> StoryboardResult<()> {
        debug!(op = scheduled.op.subject(), kind = %scheduled.op.event_type(), at_secs = at, "issue");
        let fade = |value: f64| [PropertyDelta::Opacity { value }];
        match scheduled.op {
            VisualOp::Reveal { entity } => {
                let e = scene.require(entity)?;
                let look = e.appearance(&self.palette);
                let shape = surface.draw_shape(&ShapeSpec::RoundedRect {
                    center: e.position(),
                    size: e.size(),
                    corner_radius: ENTITY_CORNER_RADIUS,
                    fill: look.fill,
                    fill_opacity: look.fill_opacity,
                    border: look.border,
                })?;
                let text = surface.draw_text(&TextSpec {
                    text: e.label().to_string(),
                    position: e.position(),
                    font_size: ENTITY_FONT_SIZE,
                    color: look.label,
                })?;
                let handles = EntityHandles {
                    shape: shape.into(),
                    text: text.into(),
                };
                self.entities.insert(entity.clone(), handles);
                self.transition(surface, &handles.both(), &fade(1.0), at, scheduled)?;
            }
            // Unrevealed entities pick their state and position up when drawn.
            VisualOp::SetState {
                entity, appearance, ..
            } => {
                if let Some(handles) = self.entities.get(entity).copied() {
                    let deltas = [
                        PropertyDelta::Fill {
                            color: appearance.fill,
                            opacity: appearance.fill_opacity,
                        },
                        PropertyDelta::Stroke {
                            color: appearance.border,
                        },
                        PropertyDelta::TextColor {
                            color: appearance.label,
                        },
                    ];
                    self.transition(surface, &handles.both(), &deltas, at, scheduled)?;
                }
            }
            VisualOp::Move { entity, to } => {
                if let Some(handles) = self.entities.get(entity).copied() {
                    let deltas = [PropertyDelta::Position { to: *to }];
                    self.transition(surface, &handles.both(), &deltas, at, scheduled)?;
                }
            }
            VisualOp::ShowConnector(connector) => {
                let handle: Handle = surface
                    .draw_shape(&ShapeSpec::Arrow {
                        start: connector.start,
                        end: connector.end,
                        color: connector.style.color,
                        stroke_width: connector.style.stroke_width,
                        tip_ratio: connector.style.tip_ratio,
                    })?
                    .into();
                self.elements.insert(connector.id.clone(), handle);
                self.transition(surface, &[handle], &fade(1.0), at, scheduled)?;
            }
            VisualOp::ShowLabel(label) => {
                let handle: Handle = surface
                    .draw_text(&TextSpec {
                        text: label.text.clone(),
                        position: label.position,
                        font_size: label.style.font_size,
                        color: label.style.color,
                    })?
                    .into();
                self.elements.insert(label.id.clone(), handle);
                self.transition(surface, &[handle], &fade(1.0), at, scheduled)?;
            }
            VisualOp::HideConnector { id } | VisualOp::HideLabel { id } => {
                let handle = self.elements.remove(id).ok_or_else(|| {
                    StoryboardError::invalid_state(format!("'{id}' has no surface handle"))
                })?;
                let done = self.transition(surface, &[handle], &fade(0.0), at, scheduled)?;
                self.pending_removals.push((done, handle));
            }
        }
        Ok(())
    }

    fn transition(
        &self,
        surface: &mut dyn RenderSurface,
        handles: &[Handle],
        deltas: &[PropertyDelta],
        at: f64,
        scheduled: &ScheduledOp<'_>,
    ) -> StoryboardResult<f64> {
        let signal = surface.apply_transition(&Transition {
            handles,
            deltas,
            start_secs: at,
            duration_secs: scheduled.duration_secs,
            easing: scheduled.easing,
        })?;
        Ok(signal.completes_at_secs)
    }

    fn pause(&mut self, secs: f64, surface: &mut dyn RenderSurface) -> StoryboardResult<()> {
        self.record("pause", AnimationEventType::Hold, self.clock_secs, Some((secs, Easing::Linear)));
        self.clock_secs += secs;
        self.seek(self.clock_secs, surface)
    }

    fn annotate(
        &mut self,
        text: &str,
        hold_secs: f64,
        surface: &mut dyn RenderSurface,
    ) -> StoryboardResult<()> {
        self.annotations += 1;
        let subject = format!("annotation#{}", self.annotations);
        let style = self.annotation.clone();
        let start = self.clock_secs;
        debug!(%subject, text, at_secs = start, "annotate");

        self.seek(start, surface)?;
        let handle: Handle = surface
            .draw_text(&TextSpec {
                text: text.to_string(),
                position: style.position,
                font_size: style.font_size,
                color: style.color,
            })?
            .into();
        surface.apply_transition(&Transition {
            handles: &[handle],
            deltas: &[PropertyDelta::Opacity { value: 1.0 }],
            start_secs: start,
            duration_secs: style.fade_in_secs,
            easing: Easing::Linear,
        })?;
        self.record(
            &subject,
            AnimationEventType::Enter,
            start,
            Some((style.fade_in_secs, Easing::Linear)),
        );

        let fade_out_at = start + style.fade_in_secs + hold_secs;
        self.seek(fade_out_at, surface)?;
        let done = surface.apply_transition(&Transition {
            handles: &[handle],
            deltas: &[PropertyDelta::Opacity { value: 0.0 }],
            start_secs: fade_out_at,
            duration_secs: style.fade_out_secs,
            easing: Easing::Linear,
        })?;
        self.record(
            &subject,
            AnimationEventType::Exit,
            fade_out_at,
            Some((style.fade_out_secs, Easing::Linear)),
        );

        self.clock_secs = done.completes_at_secs;
        self.seek(self.clock_secs, surface)?;
        surface.remove(handle)
    }

    /// Flush removals due by `at`, then move the surface clock.
    fn seek(&mut self, at: f64, surface: &mut dyn RenderSurface) -> StoryboardResult<()> {
        self.flush_removals(at, surface)?;
        surface.advance_to(at);
        Ok(())
    }

    fn flush_removals(&mut self, until: f64, surface: &mut dyn RenderSurface) -> StoryboardResult<()> {
        if self.pending_removals.is_empty() {
            return Ok(());
        }
        self.pending_removals.sort_by(|a, b| a.0.total_cmp(&b.0));
        let due = self
            .pending_removals
            .iter()
            .take_while(|(t, _)| *t <= until)
            .count();
        for (t, handle) in self.pending_removals.drain(..due) {
            surface.advance_to(t);
            surface.remove(handle)?;
        }
        Ok(())
    }

    fn record(
        &mut self,
        subject: &str,
        event_type: AnimationEventType,
        at: f64,
        timing: Option<(f64, Easing)>,
    ) {
        let base = format!("{subject}:{event_type}");
        let seen = self.event_names.entry(base.clone()).or_insert(0);
        *seen += 1;
        let name = if *seen == 1 {
            base
        } else {
            format!("{base}#{seen}")
        };
        self.timeline.events.push(AnimationEvent {
            name,
            event_type,
            expected_secs: at,
            duration_secs: timing.map(|(secs, _)| secs),
            easing: timing.map(|(_, easing)| easing.to_string()),
        });
    }
}
