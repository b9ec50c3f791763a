//! Visual entities: labelled participant boxes and the set that owns them.
//!
//! Entities never change themselves. Every method that describes a change
//! returns a [`GroupUnit`]; the change lands only when the sequencer commits
//! that unit through [`Scene::commit`].

use crate::connector::ElementId;
use crate::geometry::{Anchored, Size, Vec2};
use crate::group::{GroupUnit, VisualOp};
use crate::result::{StoryboardError, StoryboardResult};
use crate::style::{Color, Palette};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a participant box.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Display state of a participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    /// Dim fill, neutral border
    #[default]
    Inactive,
    /// Highlighted fill, accent border
    Active,
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Concrete visual properties of a box in one state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityAppearance {
    /// Fill colour
    pub fill: Color,
    /// Fill opacity (0.0-1.0)
    pub fill_opacity: f64,
    /// Border colour
    pub border: Color,
    /// Label text colour
    pub label: Color,
}

impl EntityAppearance {
    /// Properties for `state` under `palette`.
    #[must_use]
    pub fn for_state(state: EntityState, palette: &Palette) -> Self {
        match state {
            EntityState::Inactive => Self {
                fill: palette.inactive,
                fill_opacity: palette.inactive_opacity,
                border: palette.inactive,
                label: palette.inactive_label,
            },
            EntityState::Active => Self {
                fill: palette.active,
                fill_opacity: palette.active_opacity,
                border: palette.active,
                label: palette.active_label,
            },
        }
    }
}

/// Rounded box with a text label representing one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualEntity {
    id: EntityId,
    label: String,
    position: Vec2,
    size: Size,
    state: EntityState,
    visible: bool,
    ordinal: usize,
}

impl VisualEntity {
    /// Create an inactive, not yet revealed entity.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, label: impl Into<String>, position: Vec2) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            position,
            size: Size::default(),
            state: EntityState::Inactive,
            visible: false,
            ordinal: 0,
        }
    }

    /// Override the box size
    #[must_use]
    pub const fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Identifier
    #[must_use]
    pub const fn id(&self) -> &EntityId {
        &self.id
    }

    /// Text shown in the box
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current centre
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Box size
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Current display state
    #[must_use]
    pub const fn state(&self) -> EntityState {
        self.state
    }

    /// Whether the entity has been revealed on the surface
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// 1-based position within its [`Scene`] (0 when not in a scene).
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Properties this entity shows in its current state.
    #[must_use]
    pub fn appearance(&self, palette: &Palette) -> EntityAppearance {
        EntityAppearance::for_state(self.state, palette)
    }

    /// Midpoint of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> Vec2 {
        self.position + Vec2::DOWN * (self.size.height / 2.0)
    }

    /// Midpoint of the top edge.
    #[must_use]
    pub fn top(&self) -> Vec2 {
        self.position + Vec2::UP * (self.size.height / 2.0)
    }

    /// Midpoint of the right edge.
    #[must_use]
    pub fn right(&self) -> Vec2 {
        self.position + Vec2::RIGHT * (self.size.width / 2.0)
    }

    /// Highlight this entity: border, fill and label change in one unit.
    pub fn activate(&self, palette: &Palette, duration_secs: f64) -> StoryboardResult<GroupUnit> {
        self.transition_to(EntityState::Active, palette, duration_secs)
    }

    /// Return this entity to its dim state in one unit.
    pub fn deactivate(&self, palette: &Palette, duration_secs: f64) -> StoryboardResult<GroupUnit> {
        self.transition_to(EntityState::Inactive, palette, duration_secs)
    }

    fn transition_to(
        &self,
        state: EntityState,
        palette: &Palette,
        duration_secs: f64,
    ) -> StoryboardResult<GroupUnit> {
        GroupUnit::atomic(
            VisualOp::SetState {
                entity: self.id.clone(),
                state,
                appearance: EntityAppearance::for_state(state, palette),
            },
            duration_secs,
        )
    }

    /// Translate the entity to `position`.
    pub fn move_to(&self, position: Vec2, duration_secs: f64) -> StoryboardResult<GroupUnit> {
        GroupUnit::atomic(
            VisualOp::Move {
                entity: self.id.clone(),
                to: position,
            },
            duration_secs,
        )
    }

    /// Fade the entity in at its current position.
    pub fn reveal(&self, duration_secs: f64) -> StoryboardResult<GroupUnit> {
        GroupUnit::atomic(
            VisualOp::Reveal {
                entity: self.id.clone(),
            },
            duration_secs,
        )
    }
}

impl Anchored for VisualEntity {
    fn center(&self) -> Vec2 {
        self.position
    }

    fn bounding_half_extent(&self) -> f64 {
        self.size.bounding_half_extent()
    }
}

/// The entity set of a script plus the ids of live connectors and labels.
///
/// Scripts plan against a clone of their scene, so every reference in a
/// unit is checked before the real scene is touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    entities: Vec<VisualEntity>,
    live: BTreeSet<ElementId>,
}

impl Scene {
    /// Build a scene, numbering entities 1..=n in order.
    pub fn new(entities: Vec<VisualEntity>) -> StoryboardResult<Self> {
        let mut seen = BTreeSet::new();
        let mut numbered = Vec::with_capacity(entities.len());
        for (i, mut entity) in entities.into_iter().enumerate() {
            if !seen.insert(entity.id.clone()) {
                return Err(StoryboardError::config(format!(
                    "duplicate entity id '{}'",
                    entity.id
                )));
            }
            entity.ordinal = i + 1;
            numbered.push(entity);
        }
        Ok(Self {
            entities: numbered,
            live: BTreeSet::new(),
        })
    }

    /// Number of entities
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene has no entities
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in scene order
    pub fn iter(&self) -> impl Iterator<Item = &VisualEntity> {
        self.entities.iter()
    }

    /// Look an entity up by id.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&VisualEntity> {
        self.entities.iter().find(|e| &e.id == id)
    }

    /// Look an entity up, failing with a configuration error.
    pub fn require(&self, id: &EntityId) -> StoryboardResult<&VisualEntity> {
        self.get(id)
            .ok_or_else(|| StoryboardError::config(format!("unknown entity '{id}'")))
    }

    /// Entities currently in the active state
    #[must_use]
    pub fn active_ids(&self) -> Vec<&EntityId> {
        self.entities
            .iter()
            .filter(|e| e.state == EntityState::Active)
            .map(|e| &e.id)
            .collect()
    }

    /// Whether a connector or label with this id is on the surface.
    #[must_use]
    pub fn is_live(&self, id: &ElementId) -> bool {
        self.live.contains(id)
    }

    /// Ids of all live connectors and labels
    pub fn live_elements(&self) -> impl Iterator<Item = &ElementId> {
        self.live.iter()
    }

    /// Apply every op of `unit` in schedule order.
    pub fn commit_unit(&mut self, unit: &GroupUnit) -> StoryboardResult<()> {
        for scheduled in unit.schedule() {
            self.commit(scheduled.op)?;
        }
        Ok(())
    }

    /// Apply one op to entity state and the live element set.
    pub fn commit(&mut self, op: &VisualOp) -> StoryboardResult<()> {
        match op {
            VisualOp::Reveal { entity } => {
                let e = self.entity_mut(entity)?;
                if e.visible {
                    return Err(StoryboardError::config(format!(
                        "entity '{entity}' is already revealed"
                    )));
                }
                e.visible = true;
            }
            VisualOp::SetState { entity, state, .. } => self.entity_mut(entity)?.state = *state,
            VisualOp::Move { entity, to } => self.entity_mut(entity)?.position = *to,
            VisualOp::ShowConnector(connector) => {
                self.require(&connector.from)?;
                if let Some(target) = connector.target_entity() {
                    self.require(target)?;
                }
                self.insert_live(&connector.id)?;
            }
            VisualOp::ShowLabel(label) => self.insert_live(&label.id)?,
            VisualOp::HideConnector { id } | VisualOp::HideLabel { id } => {
                if !self.live.remove(id) {
                    return Err(StoryboardError::config(format!(
                        "cannot hide '{id}': it is not on screen"
                    )));
                }
            }
        }
        Ok(())
    }

    fn insert_live(&mut self, id: &ElementId) -> StoryboardResult<()> {
        if self.live.insert(id.clone()) {
            Ok(())
        } else {
            Err(StoryboardError::config(format!(
                "element '{id}' is already on screen"
            )))
        }
    }

    fn entity_mut(&mut self, id: &EntityId) -> StoryboardResult<&mut VisualEntity> {
        self.entities
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| StoryboardError::config(format!("unknown entity '{id}'")))
    }
}
