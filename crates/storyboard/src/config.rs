//! Script configuration schema (YAML / JSON).
//!
//! A [`ScriptConfig`] describes the cast, palette, timings and stages of one
//! narration. [`ScriptConfig::default`] is the three-party FROST DKG
//! walk-through; custom scripts are loaded with [`ScriptConfig::from_yaml`],
//! [`ScriptConfig::from_json`] or [`ScriptConfig::from_path`], all of which
//! validate before returning.
//!
//! ```yaml
//! version: "1.0"
//! name: frost-dkg
//! participants:
//!   - id: P1
//!     position: { x: -3.0, y: 0.5 }
//! stages:
//!   - kind: commitment_broadcast
//!     title: "Stage 1 – Commitments"
//!     brief: "Each node chooses a secret curve & broadcasts commitments"
//! ```

use crate::geometry::Vec2;
use crate::result::{ErrorContext, StoryboardError, StoryboardResult};
use crate::style::Palette;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Supported schema version
pub const SCHEMA_VERSION: &str = "1.0";

/// Root script configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Schema version (must be "1.0")
    pub version: String,
    /// Script name, used as the timeline scene id
    #[serde(default = "default_name")]
    pub name: String,
    /// Cast, in participant order
    pub participants: Vec<ParticipantConfig>,
    /// Entity colours
    #[serde(default)]
    pub palette: Palette,
    /// Durations
    #[serde(default)]
    pub timing: TimingConfig,
    /// Summary layout of the combination stage
    #[serde(default)]
    pub summary_layout: SummaryLayout,
    /// Stages in narration order
    pub stages: Vec<StageConfig>,
    /// Brief shown after the last stage
    #[serde(default)]
    pub closing_brief: Option<String>,
}

fn default_name() -> String {
    "storyboard".to_string()
}

/// One participant box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantConfig {
    /// Unique id referenced by turns
    pub id: String,
    /// Text in the box (defaults to the id)
    #[serde(default)]
    pub label: Option<String>,
    /// Initial centre, before the intro re-centres the cast
    pub position: Vec2,
}

impl ParticipantConfig {
    /// Text shown inside the box
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Kind of narrative stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Each participant broadcasts a connector bundle to every peer
    CommitmentBroadcast,
    /// Each participant sends pairwise shares; peers get a confirmation mark
    ShareDistribution,
    /// Participants converge on persistent result groups
    Combination,
}

impl StageKind {
    /// Whether the stage is made of per-participant turns.
    #[must_use]
    pub const fn has_turns(self) -> bool {
        !matches!(self, Self::Combination)
    }
}

/// One stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// What happens in the stage
    pub kind: StageKind,
    /// Title overlay text
    pub title: String,
    /// Narrative brief shown before the first sub-step
    pub brief: String,
    /// Explicit turns; derived round-robin when omitted
    #[serde(default)]
    pub turns: Option<Vec<TurnConfig>>,
    /// Pause after the title fades in (overrides the timing default)
    #[serde(default)]
    pub settle_secs: Option<f64>,
}

/// One sub-step: an active participant and the peers it talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnConfig {
    /// Spotlighted participant
    pub active: String,
    /// Receiving participants, in connector order
    pub peers: Vec<String>,
}

/// Durations in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Intro fade-in of the cast
    pub reveal_secs: f64,
    /// Intro re-centring move
    pub recenter_secs: f64,
    /// Pause after the intro
    pub intro_hold_secs: f64,
    /// Title fade in / out
    pub title_fade_secs: f64,
    /// Pause after a title appears
    pub title_settle_secs: f64,
    /// Activation / deactivation of a participant
    pub activation_secs: f64,
    /// Caption fade
    pub caption_secs: f64,
    /// Drawing a broadcast bundle
    pub broadcast_secs: f64,
    /// Drawing pairwise shares
    pub share_secs: f64,
    /// Inline label fade
    pub label_secs: f64,
    /// Confirmation mark fade
    pub mark_secs: f64,
    /// Hold after a broadcast sub-step
    pub broadcast_hold_secs: f64,
    /// Hold after a share sub-step
    pub share_hold_secs: f64,
    /// Retraction of a sub-step's connectors and labels
    pub retract_secs: f64,
    /// Pause before a stage's title fades out
    pub stage_end_secs: f64,
    /// How long a brief stays fully visible
    pub brief_hold_secs: f64,
    /// Fade in / out of a brief
    pub brief_fade_secs: f64,
    /// Move to the summary layout
    pub move_secs: f64,
    /// Drawing the converging connectors
    pub converge_secs: f64,
    /// Result group fade-in
    pub result_secs: f64,
    /// Hold after the results appear
    pub result_hold_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reveal_secs: 1.0,
            recenter_secs: 1.0,
            intro_hold_secs: 0.5,
            title_fade_secs: 1.0,
            title_settle_secs: 0.3,
            activation_secs: 1.0,
            caption_secs: 1.0,
            broadcast_secs: 0.8,
            share_secs: 1.0,
            label_secs: 1.0,
            mark_secs: 1.0,
            broadcast_hold_secs: 0.3,
            share_hold_secs: 0.5,
            retract_secs: 1.0,
            stage_end_secs: 1.0,
            brief_hold_secs: 2.0,
            brief_fade_secs: 1.0,
            move_secs: 1.0,
            converge_secs: 1.0,
            result_secs: 1.0,
            result_hold_secs: 2.0,
        }
    }
}

impl TimingConfig {
    fn named(&self) -> [(&'static str, f64); 21] {
        [
            ("reveal_secs", self.reveal_secs),
            ("recenter_secs", self.recenter_secs),
            ("intro_hold_secs", self.intro_hold_secs),
            ("title_fade_secs", self.title_fade_secs),
            ("title_settle_secs", self.title_settle_secs),
            ("activation_secs", self.activation_secs),
            ("caption_secs", self.caption_secs),
            ("broadcast_secs", self.broadcast_secs),
            ("share_secs", self.share_secs),
            ("label_secs", self.label_secs),
            ("mark_secs", self.mark_secs),
            ("broadcast_hold_secs", self.broadcast_hold_secs),
            ("share_hold_secs", self.share_hold_secs),
            ("retract_secs", self.retract_secs),
            ("stage_end_secs", self.stage_end_secs),
            ("brief_hold_secs", self.brief_hold_secs),
            ("brief_fade_secs", self.brief_fade_secs),
            ("move_secs", self.move_secs),
            ("converge_secs", self.converge_secs),
            ("result_secs", self.result_secs),
            ("result_hold_secs", self.result_hold_secs),
        ]
    }

    /// Every duration must be positive and finite.
    pub fn validate(&self) -> StoryboardResult<()> {
        for (name, secs) in self.named() {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(StoryboardError::config(format!(
                    "timing.{name} must be positive, got {secs}"
                )));
            }
        }
        Ok(())
    }
}

/// Where things go in the combination stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryLayout {
    /// Height of the participant row
    pub row_y: f64,
    /// Horizontal distance between neighbouring participants
    pub spacing: f64,
    /// Gap between the middle participant's bottom and the public result
    pub result_drop: f64,
    /// Gap between the public and the private result
    pub result_gap: f64,
    /// Font size of result groups and contribution labels
    pub font_size: f64,
}

impl Default for SummaryLayout {
    fn default() -> Self {
        Self {
            row_y: 1.3,
            spacing: 4.0,
            result_drop: 3.0,
            result_gap: 0.4,
            font_size: 24.0,
        }
    }
}

impl SummaryLayout {
    /// Row slots for `count` participants, centred on x = 0.
    #[must_use]
    pub fn slots(&self, count: usize) -> Vec<Vec2> {
        let half = (count.saturating_sub(1)) as f64 / 2.0;
        (0..count)
            .map(|i| Vec2::new((i as f64 - half) * self.spacing, self.row_y))
            .collect()
    }

    fn validate(&self) -> StoryboardResult<()> {
        let values = [
            ("row_y", self.row_y, false),
            ("spacing", self.spacing, true),
            ("result_drop", self.result_drop, true),
            ("result_gap", self.result_gap, true),
            ("font_size", self.font_size, true),
        ];
        for (name, value, positive) in values {
            if !value.is_finite() || (positive && value <= 0.0) {
                return Err(StoryboardError::config(format!(
                    "summary_layout.{name} is invalid: {value}"
                )));
            }
        }
        Ok(())
    }
}

impl ScriptConfig {
    /// Parse and validate a YAML script.
    pub fn from_yaml(yaml: &str) -> StoryboardResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON script.
    pub fn from_json(json: &str) -> StoryboardResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a script file; `.json` is parsed as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> StoryboardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Serialize as YAML.
    pub fn to_yaml(&self) -> StoryboardResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check the script before anything is built from it.
    pub fn validate(&self) -> StoryboardResult<()> {
        if self.version != SCHEMA_VERSION {
            return Err(StoryboardError::config(format!(
                "unsupported version '{}', expected '{SCHEMA_VERSION}'",
                self.version
            )));
        }

        if self.participants.is_empty() {
            return Err(StoryboardError::config("script has no participants"));
        }
        let mut ids = HashSet::new();
        for participant in &self.participants {
            if participant.id.trim().is_empty() {
                return Err(StoryboardError::config("participant id is empty"));
            }
            if !ids.insert(participant.id.as_str()) {
                return Err(StoryboardError::config(format!(
                    "duplicate participant id '{}'",
                    participant.id
                )));
            }
            if !participant.position.x.is_finite() || !participant.position.y.is_finite() {
                return Err(StoryboardError::config(format!(
                    "participant '{}' has a non-finite position",
                    participant.id
                )));
            }
        }

        self.palette.validate()?;
        self.timing.validate()?;
        self.summary_layout.validate()?;

        if self.stages.is_empty() {
            return Err(StoryboardError::config("script has no stages"));
        }
        for stage in &self.stages {
            let context = ErrorContext::stage(&stage.title);
            if stage.title.trim().is_empty() {
                return Err(StoryboardError::config_at(context, "stage title is empty"));
            }
            if stage.brief.trim().is_empty() {
                return Err(StoryboardError::config_at(context, "stage brief is empty"));
            }
            if let Some(secs) = stage.settle_secs {
                if !secs.is_finite() || secs <= 0.0 {
                    return Err(StoryboardError::config_at(
                        context,
                        format!("settle_secs must be positive, got {secs}"),
                    ));
                }
            }
            match (&stage.turns, stage.kind.has_turns()) {
                (Some(_), false) => {
                    return Err(StoryboardError::config_at(
                        context,
                        "combination stages take no turns",
                    ));
                }
                (Some(turns), true) => {
                    for (i, turn) in turns.iter().enumerate() {
                        validate_turn(turn, &ids, context.clone().with_sub_step(i + 1))?;
                    }
                }
                (None, _) => {}
            }
            if stage.kind.has_turns() && stage.turns.is_none() && self.participants.len() < 2 {
                return Err(StoryboardError::config_at(
                    context,
                    "round-robin turns need at least two participants",
                ));
            }
        }

        if let Some(brief) = &self.closing_brief {
            if brief.trim().is_empty() {
                return Err(StoryboardError::config("closing brief is empty"));
            }
        }
        Ok(())
    }

    /// Turns of a stage: the explicit ones, or every participant in order
    /// talking to all the others.
    #[must_use]
    pub fn turns_for(&self, stage: &StageConfig) -> Vec<TurnConfig> {
        if !stage.kind.has_turns() {
            return Vec::new();
        }
        if let Some(turns) = &stage.turns {
            return turns.clone();
        }
        self.participants
            .iter()
            .map(|active| TurnConfig {
                active: active.id.clone(),
                peers: self
                    .participants
                    .iter()
                    .filter(|p| p.id != active.id)
                    .map(|p| p.id.clone())
                    .collect(),
            })
            .collect()
    }
}

fn validate_turn(
    turn: &TurnConfig,
    ids: &HashSet<&str>,
    context: ErrorContext,
) -> StoryboardResult<()> {
    if !ids.contains(turn.active.as_str()) {
        return Err(StoryboardError::config_at(
            context,
            format!("unknown participant '{}'", turn.active),
        ));
    }
    if turn.peers.is_empty() {
        return Err(StoryboardError::config_at(context, "turn has no peers"));
    }
    let mut seen = HashSet::new();
    for peer in &turn.peers {
        if !ids.contains(peer.as_str()) {
            return Err(StoryboardError::config_at(
                context,
                format!("unknown participant '{peer}'"),
            ));
        }
        if peer == &turn.active {
            return Err(StoryboardError::config_at(
                context,
                format!("participant '{peer}' cannot send to itself"),
            ));
        }
        if !seen.insert(peer.as_str()) {
            return Err(StoryboardError::config_at(
                context,
                format!("peer '{peer}' listed twice"),
            ));
        }
    }
    Ok(())
}

impl Default for ScriptConfig {
    fn default() -> Self {
        let participant = |id: &str, x: f64, y: f64| ParticipantConfig {
            id: id.to_string(),
            label: None,
            position: Vec2::new(x, y),
        };
        let stage = |kind, title: &str, brief: &str, settle_secs| StageConfig {
            kind,
            title: title.to_string(),
            brief: brief.to_string(),
            turns: None,
            settle_secs,
        };
        Self {
            version: SCHEMA_VERSION.to_string(),
            name: "frost-dkg".to_string(),
            participants: vec![
                participant("P1", -3.0, 0.5),
                participant("P2", 3.0, 0.5),
                participant("P3", 0.0, -2.0),
            ],
            palette: Palette::default(),
            timing: TimingConfig::default(),
            summary_layout: SummaryLayout::default(),
            stages: vec![
                stage(
                    StageKind::CommitmentBroadcast,
                    "Stage 1 – Commitments",
                    "Each node chooses a secret curve & broadcasts commitments",
                    None,
                ),
                stage(
                    StageKind::ShareDistribution,
                    "Stage 2 – Share distribution",
                    "Nodes exchange secret shares and verify them",
                    None,
                ),
                stage(
                    StageKind::Combination,
                    "Stage 3 – Combine keys",
                    "Commitments ➜ group public key & Shares ➜ group private key",
                    Some(0.5),
                ),
            ],
            closing_brief: Some(
                "Threshold signing possible – any 2 of 3 shares can sign".to_string(),
            ),
        }
    }
}
