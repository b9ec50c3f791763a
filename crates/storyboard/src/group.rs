//! Group composer: atomic visual operations bundled into schedulable units.
//!
//! A [`GroupUnit`] is a tree. Leaves are single operations with a duration;
//! `Concurrent` nodes start all members together and finish with the longest
//! one; `Sequential` nodes run members back to back. Every way of building a
//! unit validates eagerly, so a unit that exists can always be scheduled.

use crate::connector::{Connector, ElementId, Label};
use crate::entity::{EntityAppearance, EntityId, EntityState};
use crate::geometry::Vec2;
use crate::result::{StoryboardError, StoryboardResult};
use crate::timeline::{AnimationEventType, Easing};

/// One indivisible visual change.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualOp {
    /// Fade an entity in where it stands
    Reveal {
        /// Entity to show
        entity: EntityId,
    },
    /// Switch an entity's display state (border, fill and label together)
    SetState {
        /// Entity to change
        entity: EntityId,
        /// New state
        state: EntityState,
        /// Properties the entity ends up with
        appearance: EntityAppearance,
    },
    /// Translate an entity
    Move {
        /// Entity to move
        entity: EntityId,
        /// Destination centre
        to: Vec2,
    },
    /// Draw a connector
    ShowConnector(Connector),
    /// Fade a connector out and drop it
    HideConnector {
        /// Connector id
        id: ElementId,
    },
    /// Fade a label in
    ShowLabel(Label),
    /// Fade a label out and drop it
    HideLabel {
        /// Label id
        id: ElementId,
    },
}

impl VisualOp {
    /// Name of the thing this op changes.
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::Reveal { entity } | Self::SetState { entity, .. } | Self::Move { entity, .. } => {
                entity.as_str()
            }
            Self::ShowConnector(connector) => connector.id.as_str(),
            Self::ShowLabel(label) => label.id.as_str(),
            Self::HideConnector { id } | Self::HideLabel { id } => id.as_str(),
        }
    }

    /// Kind of timeline event this op produces.
    #[must_use]
    pub const fn event_type(&self) -> AnimationEventType {
        match self {
            Self::Reveal { .. } | Self::ShowConnector(_) | Self::ShowLabel(_) => {
                AnimationEventType::Enter
            }
            Self::HideConnector { .. } | Self::HideLabel { .. } => AnimationEventType::Exit,
            Self::SetState { .. } | Self::Move { .. } => AnimationEventType::Transition,
        }
    }
}

/// A leaf operation with its timing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedOp {
    /// The change
    pub op: VisualOp,
    /// How long it takes
    pub duration_secs: f64,
    /// Rate curve
    pub easing: Easing,
}

/// Schedulable bundle of visual operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupUnit {
    /// Single operation
    Atomic(TimedOp),
    /// Members start together
    Concurrent(Vec<GroupUnit>),
    /// Members run one after another
    Sequential(Vec<GroupUnit>),
}

/// A leaf placed on the unit's local time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledOp<'a> {
    /// Start relative to the start of the unit
    pub offset_secs: f64,
    /// Leaf duration
    pub duration_secs: f64,
    /// Leaf easing
    pub easing: Easing,
    /// The change
    pub op: &'a VisualOp,
}

/// Reject durations that are zero, negative or not finite.
pub fn validate_duration(secs: f64, what: &str) -> StoryboardResult<f64> {
    if secs.is_finite() && secs > 0.0 {
        Ok(secs)
    } else {
        Err(StoryboardError::config(format!(
            "{what} needs a positive duration, got {secs}"
        )))
    }
}

impl GroupUnit {
    /// Wrap one operation.
    pub fn atomic(op: VisualOp, duration_secs: f64) -> StoryboardResult<Self> {
        let duration_secs = validate_duration(duration_secs, op.subject())?;
        Ok(Self::Atomic(TimedOp {
            op,
            duration_secs,
            easing: Easing::default(),
        }))
    }

    /// Members that start together; done when the longest finishes.
    pub fn concurrent(units: impl IntoIterator<Item = GroupUnit>) -> StoryboardResult<Self> {
        let members: Vec<_> = units.into_iter().collect();
        if members.is_empty() {
            return Err(StoryboardError::config("concurrent group has no members"));
        }
        Ok(Self::Concurrent(members))
    }

    /// Members that run back to back.
    pub fn sequential(units: impl IntoIterator<Item = GroupUnit>) -> StoryboardResult<Self> {
        let members: Vec<_> = units.into_iter().collect();
        if members.is_empty() {
            return Err(StoryboardError::config("sequential group has no members"));
        }
        Ok(Self::Sequential(members))
    }

    /// Total time until the unit reports completion.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        match self {
            Self::Atomic(leaf) => leaf.duration_secs,
            Self::Concurrent(members) => members
                .iter()
                .map(Self::duration_secs)
                .fold(0.0, f64::max),
            Self::Sequential(members) => members.iter().map(Self::duration_secs).sum(),
        }
    }

    /// Number of leaf operations.
    #[must_use]
    pub fn op_count(&self) -> usize {
        match self {
            Self::Atomic(_) => 1,
            Self::Concurrent(members) | Self::Sequential(members) => {
                members.iter().map(Self::op_count).sum()
            }
        }
    }

    /// Leaves with their start offsets, ordered by offset.
    ///
    /// Leaves that start together keep their declaration order.
    #[must_use]
    pub fn schedule(&self) -> Vec<ScheduledOp<'_>> {
        let mut out = Vec::with_capacity(self.op_count());
        self.collect_into(0.0, &mut out);
        out.sort_by(|a, b| a.offset_secs.total_cmp(&b.offset_secs));
        out
    }

    fn collect_into<'a>(&'a self, base: f64, out: &mut Vec<ScheduledOp<'a>>) {
        match self {
            Self::Atomic(leaf) => out.push(ScheduledOp {
                offset_secs: base,
                duration_secs: leaf.duration_secs,
                easing: leaf.easing,
                op: &leaf.op,
            }),
            Self::Concurrent(members) => {
                for member in members {
                    member.collect_into(base, out);
                }
            }
            Self::Sequential(members) => {
                let mut offset = base;
                for member in members {
                    member.collect_into(offset, out);
                    offset += member.duration_secs();
                }
            }
        }
    }
}

impl Connector {
    /// Unit that draws this connector.
    pub fn show(&self, duration_secs: f64) -> StoryboardResult<GroupUnit> {
        GroupUnit::atomic(VisualOp::ShowConnector(self.clone()), duration_secs)
    }

    /// Unit that fades this connector out.
    pub fn hide(&self, duration_secs: f64) -> StoryboardResult<GroupUnit> {
        GroupUnit::atomic(VisualOp::HideConnector { id: self.id.clone() }, duration_secs)
    }
}

impl Label {
    /// Unit that fades this label in.
    pub fn show(&self, duration_secs: f64) -> StoryboardResult<GroupUnit> {
        GroupUnit::atomic(VisualOp::ShowLabel(self.clone()), duration_secs)
    }

    /// Unit that fades this label out.
    pub fn hide(&self, duration_secs: f64) -> StoryboardResult<GroupUnit> {
        GroupUnit::atomic(VisualOp::HideLabel { id: self.id.clone() }, duration_secs)
    }
}
