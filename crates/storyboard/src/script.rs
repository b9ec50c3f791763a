//! Stage script: the ordered narration and the planner that turns it into
//! sequencer directives.
//!
//! Planning happens against a clone of the script's [`Scene`]: every unit is
//! committed to that clone as it is enqueued, so unknown entities, duplicate
//! elements and bad durations surface as configuration errors before a
//! single command reaches a surface.
//!
//! ```text
//! intro ─→ stage 1 ─→ stage 2 ─→ ... ─→ closing brief
//!           │
//!           ├─ title enter, settle, brief
//!           ├─ sub-step 1..n (spotlight) │ combination
//!           └─ hold, title exit
//! ```

use crate::config::{ScriptConfig, StageKind, SummaryLayout, TimingConfig};
use crate::connector::{
    broadcast_bundle, caption_above, confirmation_mark, directed_share, Connector, ElementId,
    Label, LabelKind,
};
use crate::entity::{EntityId, Scene, VisualEntity};
use crate::geometry::{bounding_center, Vec2, GEOMETRY_EPSILON};
use crate::group::GroupUnit;
use crate::result::{ErrorContext, StoryboardError, StoryboardResult};
use crate::sequencer::{AnnotationStyle, Directive, RunSummary, Sequencer};
use crate::style::{Color, ConnectorStyle, Palette, TextStyle};
use crate::surface::RenderSurface;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

/// Caption shown above a broadcasting participant
pub const POLYNOMIAL_CAPTION: &str = "f(x)=a_0+a_1x";

/// Id of the stage title overlay
pub const TITLE_ID: &str = "title";

/// Id of the public result group
pub const PUBLIC_RESULT_ID: &str = "result/public";

/// Id of the private result group
pub const PRIVATE_RESULT_ID: &str = "result/private";

const TITLE_POSITION: Vec2 = Vec2::new(0.0, 3.2);
const TITLE_FONT_SIZE: f64 = 38.0;
const CAPTION_FONT_SIZE: f64 = 26.0;

/// One participant's turn within a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubStep {
    /// Spotlighted participant
    pub active: EntityId,
    /// Participants it sends to, in connector order
    pub peers: Vec<EntityId>,
}

impl SubStep {
    /// Create a sub-step
    #[must_use]
    pub fn new(active: impl Into<EntityId>, peers: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            active: active.into(),
            peers: peers.into_iter().collect(),
        }
    }
}

/// One narrative stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    /// What happens
    pub kind: StageKind,
    /// Title overlay
    pub title: String,
    /// Brief shown before the sub-steps
    pub brief: String,
    /// Turns (empty for combination stages)
    pub sub_steps: Vec<SubStep>,
    /// Pause after the title; timing default when `None`
    pub settle_secs: Option<f64>,
}

/// The full narration: cast, stages and presentation settings.
#[derive(Debug, Clone)]
pub struct StageScript {
    name: String,
    scene: Scene,
    stages: Vec<Stage>,
    palette: Palette,
    timing: TimingConfig,
    layout: SummaryLayout,
    closing_brief: Option<String>,
}

/// What one sub-step put on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubStepOutline {
    /// Spotlighted participant
    pub active: EntityId,
    /// Connectors drawn
    pub connectors: Vec<ElementId>,
    /// Inline labels and captions
    pub labels: Vec<ElementId>,
    /// Confirmation marks
    pub marks: Vec<ElementId>,
}

/// Planned shape and timing of one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutline {
    /// Stage title
    pub title: String,
    /// Stage kind
    pub kind: StageKind,
    /// Planned start on the run clock
    pub start_secs: f64,
    /// Planned end on the run clock
    pub end_secs: f64,
    /// Per-turn detail
    pub sub_steps: Vec<SubStepOutline>,
    /// Connectors drawn outside of turns (combination stage)
    pub connectors: Vec<ElementId>,
    /// Elements that stay on screen after the stage
    pub persistent: Vec<ElementId>,
}

/// A planned script: a loaded sequencer plus the stage outline.
#[derive(Debug)]
pub struct CompiledScript {
    /// Sequencer holding every directive
    pub sequencer: Sequencer,
    /// Stage outline in order
    pub outline: Vec<StageOutline>,
}

/// Result of running a script.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptRun {
    /// Sequencer summary including the timeline
    pub summary: RunSummary,
    /// Stage outline
    pub outline: Vec<StageOutline>,
    /// Final entity state
    #[serde(skip)]
    pub scene: Scene,
}

impl StageScript {
    /// Assemble a script, checking every sub-step against the scene.
    pub fn new(name: impl Into<String>, scene: Scene, stages: Vec<Stage>) -> StoryboardResult<Self> {
        if scene.is_empty() {
            return Err(StoryboardError::config("script has no participants"));
        }
        for stage in &stages {
            check_stage(stage, &scene)?;
        }
        warn_on_overlap(&scene);
        Ok(Self {
            name: name.into(),
            scene,
            stages,
            palette: Palette::default(),
            timing: TimingConfig::default(),
            layout: SummaryLayout::default(),
            closing_brief: None,
        })
    }

    /// Build a script from a validated configuration.
    pub fn from_config(config: &ScriptConfig) -> StoryboardResult<Self> {
        config.validate()?;
        let scene = Scene::new(
            config
                .participants
                .iter()
                .map(|p| VisualEntity::new(p.id.as_str(), p.display_label(), p.position))
                .collect(),
        )?;
        let stages = config
            .stages
            .iter()
            .map(|stage| Stage {
                kind: stage.kind,
                title: stage.title.clone(),
                brief: stage.brief.clone(),
                sub_steps: config
                    .turns_for(stage)
                    .into_iter()
                    .map(|turn| {
                        SubStep::new(
                            turn.active.as_str(),
                            turn.peers.iter().map(|p| EntityId::new(p.as_str())),
                        )
                    })
                    .collect(),
                settle_secs: stage.settle_secs,
            })
            .collect();
        let mut script = Self::new(config.name.clone(), scene, stages)?
            .with_palette(config.palette.clone())
            .with_timing(config.timing.clone());
        script.layout = config.summary_layout.clone();
        if let Some(brief) = &config.closing_brief {
            script = script.with_closing_brief(brief.as_str());
        }
        Ok(script)
    }

    /// The three-party FROST DKG narration.
    pub fn frost_dkg() -> StoryboardResult<Self> {
        Self::from_config(&ScriptConfig::default())
    }

    /// Override the palette
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Override the timings
    #[must_use]
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set the brief shown after the last stage
    #[must_use]
    pub fn with_closing_brief(mut self, brief: impl Into<String>) -> Self {
        self.closing_brief = Some(brief.into());
        self
    }

    /// Script name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Initial entity set
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Stages in order
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Plan every directive without touching a surface.
    pub fn compile(&self) -> StoryboardResult<CompiledScript> {
        self.palette.validate()?;
        self.timing.validate()?;
        let annotation = AnnotationStyle {
            fade_in_secs: self.timing.brief_fade_secs,
            fade_out_secs: self.timing.brief_fade_secs,
            ..AnnotationStyle::default()
        };
        let mut planner = Planner {
            scene: self.scene.clone(),
            sequencer: Sequencer::new(self.name.clone())
                .with_palette(self.palette.clone())
                .with_annotation_style(annotation),
            palette: &self.palette,
            timing: &self.timing,
            layout: &self.layout,
        };

        planner.intro()?;
        let mut outline = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let context = ErrorContext::stage(&stage.title);
            let span = info_span!("stage", title = %stage.title);
            let _guard = span.enter();
            let planned = planner
                .stage(stage, &context)
                .map_err(|e| e.in_context(&context))?;
            info!(
                stage = %stage.title,
                sub_steps = planned.sub_steps.len(),
                start_secs = planned.start_secs,
                end_secs = planned.end_secs,
                "stage planned"
            );
            outline.push(planned);
        }
        if let Some(brief) = &self.closing_brief {
            planner.annotate(brief)?;
        }

        Ok(CompiledScript {
            sequencer: planner.sequencer,
            outline,
        })
    }

    /// Plan the script and play it on `surface`.
    ///
    /// Each run starts from the script's initial scene; the script itself is
    /// never changed.
    pub fn run(&self, surface: &mut dyn RenderSurface) -> StoryboardResult<ScriptRun> {
        let CompiledScript {
            mut sequencer,
            outline,
        } = self.compile()?;
        let mut scene = self.scene.clone();
        let summary = sequencer.run(&mut scene, surface)?;
        Ok(ScriptRun {
            summary,
            outline,
            scene,
        })
    }
}

/// Contributions of entities left of the row centre sit left of their
/// arrow; the others sit to the right.
fn contribution_side(entity: &VisualEntity) -> Vec2 {
    if entity.position().x < -GEOMETRY_EPSILON {
        Vec2::LEFT
    } else {
        Vec2::RIGHT
    }
}

fn check_stage(stage: &Stage, scene: &Scene) -> StoryboardResult<()> {
    let context = ErrorContext::stage(&stage.title);
    match (stage.kind.has_turns(), stage.sub_steps.is_empty()) {
        (true, true) => {
            return Err(StoryboardError::config_at(context, "stage has no sub-steps"));
        }
        (false, false) => {
            return Err(StoryboardError::config_at(
                context,
                "combination stages take no sub-steps",
            ));
        }
        _ => {}
    }
    for (i, step) in stage.sub_steps.iter().enumerate() {
        let context = context.clone().with_sub_step(i + 1);
        scene
            .require(&step.active)
            .map_err(|e| e.in_context(&context))?;
        if step.peers.is_empty() {
            return Err(StoryboardError::config_at(context, "sub-step has no peers"));
        }
        for peer in &step.peers {
            scene.require(peer).map_err(|e| e.in_context(&context))?;
            if peer == &step.active {
                return Err(StoryboardError::config_at(
                    context,
                    format!("participant '{peer}' cannot send to itself"),
                ));
            }
        }
    }
    Ok(())
}

fn warn_on_overlap(scene: &Scene) {
    let entities: Vec<&VisualEntity> = scene.iter().collect();
    for (i, a) in entities.iter().enumerate() {
        for b in &entities[i + 1..] {
            if a.position().distance(b.position()) < GEOMETRY_EPSILON {
                warn!(a = %a.id(), b = %b.id(), "participants share a position; connectors between them collapse");
            }
        }
    }
}

struct Planner<'a> {
    scene: Scene,
    sequencer: Sequencer,
    palette: &'a Palette,
    timing: &'a TimingConfig,
    layout: &'a SummaryLayout,
}

impl Planner<'_> {
    fn play(&mut self, unit: GroupUnit) -> StoryboardResult<()> {
        self.scene.commit_unit(&unit)?;
        debug!(ops = unit.op_count(), secs = unit.duration_secs(), "play");
        self.sequencer.enqueue(unit)
    }

    fn pause(&mut self, secs: f64) -> StoryboardResult<()> {
        self.sequencer.enqueue(Directive::pause(secs)?)
    }

    fn annotate(&mut self, text: &str) -> StoryboardResult<()> {
        self.sequencer
            .enqueue(Directive::annotate(text, self.timing.brief_hold_secs)?)
    }

    fn planned_secs(&self) -> f64 {
        self.sequencer.planned_duration_secs()
    }

    fn intro(&mut self) -> StoryboardResult<()> {
        let reveals = self
            .scene
            .iter()
            .map(|e| e.reveal(self.timing.reveal_secs))
            .collect::<StoryboardResult<Vec<_>>>()?;
        self.play(GroupUnit::concurrent(reveals)?)?;

        let positions: Vec<Vec2> = self.scene.iter().map(VisualEntity::position).collect();
        if let Some(center) = bounding_center(&positions) {
            if center.length() > GEOMETRY_EPSILON {
                let moves = self
                    .scene
                    .iter()
                    .map(|e| e.move_to(e.position() - center, self.timing.recenter_secs))
                    .collect::<StoryboardResult<Vec<_>>>()?;
                self.play(GroupUnit::concurrent(moves)?)?;
            }
        }
        self.pause(self.timing.intro_hold_secs)
    }

    fn stage(&mut self, stage: &Stage, context: &ErrorContext) -> StoryboardResult<StageOutline> {
        let start_secs = self.planned_secs();
        let title = Label::new(
            TITLE_ID,
            stage.title.as_str(),
            TITLE_POSITION,
            TextStyle::new(TITLE_FONT_SIZE, Color::WHITE),
            LabelKind::Title,
        );
        self.play(title.show(self.timing.title_fade_secs)?)?;
        self.pause(stage.settle_secs.unwrap_or(self.timing.title_settle_secs))?;
        self.annotate(&stage.brief)?;

        let mut outline = StageOutline {
            title: stage.title.clone(),
            kind: stage.kind,
            start_secs,
            end_secs: start_secs,
            sub_steps: Vec::with_capacity(stage.sub_steps.len()),
            connectors: Vec::new(),
            persistent: Vec::new(),
        };

        if stage.kind.has_turns() {
            for (i, step) in stage.sub_steps.iter().enumerate() {
                let step_context = context.clone().with_sub_step(i + 1);
                let span = info_span!("sub_step", index = i + 1, active = %step.active);
                let _guard = span.enter();
                let planned = self
                    .spotlight(step, stage.kind)
                    .map_err(|e| e.in_context(&step_context))?;
                outline.sub_steps.push(planned);
            }
            self.pause(self.timing.stage_end_secs)?;
        } else {
            let (connectors, persistent) = self.combine()?;
            outline.connectors = connectors;
            outline.persistent = persistent;
            self.pause(self.timing.result_hold_secs)?;
        }

        self.play(title.hide(self.timing.title_fade_secs)?)?;
        outline.end_secs = self.planned_secs();
        Ok(outline)
    }

    /// One turn: spotlight the active participant, draw its connectors and
    /// labels, hold, then retract everything and deactivate it.
    fn spotlight(&mut self, step: &SubStep, kind: StageKind) -> StoryboardResult<SubStepOutline> {
        let t = self.timing;
        let active = self.scene.require(&step.active)?.clone();
        let peers = step
            .peers
            .iter()
            .map(|id| self.scene.require(id).cloned())
            .collect::<StoryboardResult<Vec<_>>>()?;

        let mut spotlight = vec![active.activate(self.palette, t.activation_secs)?];
        for other in self.scene.active_ids() {
            if other != active.id() {
                let entity = self.scene.require(other)?;
                spotlight.push(entity.deactivate(self.palette, t.activation_secs)?);
            }
        }
        self.play(GroupUnit::concurrent(spotlight)?)?;

        let mut captions = Vec::new();
        let (connectors, labels, draw_secs, hold_secs) = match kind {
            StageKind::CommitmentBroadcast => {
                let caption = caption_above(
                    &active,
                    POLYNOMIAL_CAPTION,
                    TextStyle::new(CAPTION_FONT_SIZE, Color::WHITE),
                );
                self.play(caption.show(t.caption_secs)?)?;
                captions.push(caption);
                let peer_refs: Vec<&VisualEntity> = peers.iter().collect();
                let (connectors, labels) =
                    broadcast_bundle(&active, &peer_refs, &ConnectorStyle::broadcast());
                (connectors, labels, t.broadcast_secs, t.broadcast_hold_secs)
            }
            StageKind::ShareDistribution => {
                let style = ConnectorStyle::share();
                let (connectors, labels): (Vec<Connector>, Vec<Label>) = peers
                    .iter()
                    .map(|peer| directed_share(&active, peer, &style))
                    .unzip();
                (connectors, labels, t.share_secs, t.share_hold_secs)
            }
            StageKind::Combination => {
                return Err(StoryboardError::config(
                    "combination stages have no spotlight turns",
                ));
            }
        };

        self.play(concurrent_shows(&connectors, draw_secs)?)?;
        self.play(GroupUnit::concurrent(
            labels
                .iter()
                .map(|l| l.show(t.label_secs))
                .collect::<StoryboardResult<Vec<_>>>()?,
        )?)?;

        let marks: Vec<Label> = if kind == StageKind::ShareDistribution {
            peers
                .iter()
                .map(|peer| confirmation_mark(peer, self.palette.active))
                .collect()
        } else {
            Vec::new()
        };
        if !marks.is_empty() {
            self.play(GroupUnit::concurrent(
                marks
                    .iter()
                    .map(|m| m.show(t.mark_secs))
                    .collect::<StoryboardResult<Vec<_>>>()?,
            )?)?;
        }
        self.pause(hold_secs)?;

        let mut retract = Vec::new();
        for connector in &connectors {
            retract.push(connector.hide(t.retract_secs)?);
        }
        for label in labels.iter().chain(&marks).chain(&captions) {
            retract.push(label.hide(t.retract_secs)?);
        }
        retract.push(active.deactivate(self.palette, t.retract_secs)?);
        self.play(GroupUnit::concurrent(retract)?)?;

        Ok(SubStepOutline {
            active: active.id().clone(),
            connectors: connectors.iter().map(|c| c.id.clone()).collect(),
            labels: labels
                .iter()
                .chain(&captions)
                .map(|l| l.id.clone())
                .collect(),
            marks: marks.iter().map(|m| m.id.clone()).collect(),
        })
    }

    /// Move the cast into a row, converge on the result groups and leave
    /// them on screen.
    fn combine(&mut self) -> StoryboardResult<(Vec<ElementId>, Vec<ElementId>)> {
        let t = self.timing;
        let layout = self.layout;

        let mut by_x: Vec<&VisualEntity> = self.scene.iter().collect();
        by_x.sort_by(|a, b| a.position().x.total_cmp(&b.position().x));
        let moves = by_x
            .iter()
            .zip(layout.slots(by_x.len()))
            .map(|(e, slot)| e.move_to(slot, t.move_secs))
            .collect::<StoryboardResult<Vec<_>>>()?;
        self.play(GroupUnit::concurrent(moves)?)?;

        let row: Vec<VisualEntity> = self.scene.iter().cloned().collect();
        let row_bottom = row
            .iter()
            .map(|e| e.bottom().y)
            .fold(f64::INFINITY, f64::min);
        let text_height = layout.font_size / 100.0;
        let public_top = Vec2::new(0.0, row_bottom - layout.result_drop);
        let public_center = public_top + Vec2::DOWN * (text_height / 2.0);
        let private_center = public_center + Vec2::DOWN * (text_height + layout.result_gap);

        let style = ConnectorStyle::converge();
        let public_id = ElementId::from(PUBLIC_RESULT_ID);
        let connectors: Vec<Connector> = row
            .iter()
            .map(|e| Connector::converging(e, &public_id, public_top, &style))
            .collect();
        let contributions: Vec<Label> = row
            .iter()
            .zip(&connectors)
            .map(|(e, c)| {
                let text = style.label_text(e.ordinal() - 1, e.ordinal(), 0);
                Label::new(
                    format!("{}#label", c.id),
                    text,
                    c.beside(contribution_side(e)),
                    TextStyle::new(layout.font_size, style.color),
                    LabelKind::Contribution,
                )
            })
            .collect();

        self.play(concurrent_shows(&connectors, t.converge_secs)?)?;
        self.play(GroupUnit::concurrent(
            contributions
                .iter()
                .map(|l| l.show(t.label_secs))
                .collect::<StoryboardResult<Vec<_>>>()?,
        )?)?;

        let count = row.len();
        let results = [
            Label::new(
                PUBLIC_RESULT_ID,
                public_equation(count),
                public_center,
                TextStyle::new(layout.font_size, Color::WHITE),
                LabelKind::ResultGroup,
            ),
            Label::new(
                PRIVATE_RESULT_ID,
                private_equation(count),
                private_center,
                TextStyle::new(layout.font_size, Color::WHITE),
                LabelKind::ResultGroup,
            ),
        ];
        for result in &results {
            self.play(result.show(t.result_secs)?)?;
        }

        let connector_ids: Vec<ElementId> = connectors.iter().map(|c| c.id.clone()).collect();
        let persistent = connector_ids
            .iter()
            .cloned()
            .chain(contributions.iter().map(|l| l.id.clone()))
            .chain(results.iter().map(|l| l.id.clone()))
            .collect();
        Ok((connector_ids, persistent))
    }
}

fn concurrent_shows(connectors: &[Connector], secs: f64) -> StoryboardResult<GroupUnit> {
    GroupUnit::concurrent(
        connectors
            .iter()
            .map(|c| c.show(secs))
            .collect::<StoryboardResult<Vec<_>>>()?,
    )
}

/// `Group public key  P_{group} = g^{a_0^{(1)}+...+a_0^{(n)}}`
fn public_equation(count: usize) -> String {
    let terms: Vec<String> = (1..=count).map(|i| format!("a_0^{{({i})}}")).collect();
    format!("Group public key  P_{{group}} = g^{{{}}}", terms.join("+"))
}

/// `Group private key  s_{group} = s_{0}+...+s_{n-1}`
fn private_equation(count: usize) -> String {
    let terms: Vec<String> = (0..count).map(|i| format!("s_{{{i}}}")).collect();
    format!("Group private key  s_{{group}} = {}", terms.join("+"))
}
