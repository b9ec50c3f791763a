//! Connector builder: arrows between entities and the labels that ride them.
//!
//! Connectors are values. They are computed from entity positions at the
//! moment a sub-step is planned and are never updated afterwards.

use crate::entity::{EntityId, VisualEntity};
use crate::geometry::{connector_endpoints, label_normal, Anchored, Vec2, DEFAULT_EDGE_MARGIN};
use crate::style::{Color, ConnectorStyle, TextStyle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Approximate half width of the confirmation glyph.
const MARK_HALF_WIDTH: f64 = 0.2;
/// Gap between a box and the caption above it.
const CAPTION_GAP: f64 = 0.4;

/// Identifier of a connector or label on the surface.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
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

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What a connector points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorTarget {
    /// Another participant box
    Entity(EntityId),
    /// A free-standing element such as a result group
    Element(ElementId),
}

/// A directional line between two boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    /// Surface id
    pub id: ElementId,
    /// Source entity
    pub from: EntityId,
    /// Destination
    pub to: ConnectorTarget,
    /// Tail position
    pub start: Vec2,
    /// Head position
    pub end: Vec2,
    /// Stroke and label style
    pub style: ConnectorStyle,
    /// Text carried by the connector, if any
    pub inline_label: Option<String>,
}

impl Connector {
    /// Connector from `from`'s boundary to `to`'s boundary.
    #[must_use]
    pub fn between(from: &VisualEntity, to: &VisualEntity, style: &ConnectorStyle) -> Self {
        let (start, end) = connector_endpoints(from, to);
        Self {
            id: ElementId::new(format!("{}->{}", from.id(), to.id())),
            from: from.id().clone(),
            to: ConnectorTarget::Entity(to.id().clone()),
            start,
            end,
            style: style.clone(),
            inline_label: None,
        }
    }

    /// Connector from the bottom of `from` to a fixed point of another element.
    #[must_use]
    pub fn converging(
        from: &VisualEntity,
        target: &ElementId,
        target_point: Vec2,
        style: &ConnectorStyle,
    ) -> Self {
        Self {
            id: ElementId::new(format!("{}->{}", from.id(), target)),
            from: from.id().clone(),
            to: ConnectorTarget::Element(target.clone()),
            start: from.bottom(),
            end: target_point,
            style: style.clone(),
            inline_label: None,
        }
    }

    /// Attach an inline label
    #[must_use]
    pub fn with_label(mut self, text: impl Into<String>) -> Self {
        self.inline_label = Some(text.into());
        self
    }

    /// Destination entity, if the connector points at one.
    #[must_use]
    pub const fn target_entity(&self) -> Option<&EntityId> {
        match &self.to {
            ConnectorTarget::Entity(id) => Some(id),
            ConnectorTarget::Element(_) => None,
        }
    }

    /// Length of the stroke
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Midpoint of the stroke
    #[must_use]
    pub fn midpoint(&self) -> Vec2 {
        self.start.midpoint(self.end)
    }

    /// Where the inline label sits: the midpoint pushed off the line.
    #[must_use]
    pub fn label_anchor(&self) -> Vec2 {
        self.midpoint() + label_normal(self.start, self.end) * self.style.label_offset
    }

    /// The midpoint pushed `label_offset` along the unit vector `side`.
    #[must_use]
    pub fn beside(&self, side: Vec2) -> Vec2 {
        self.midpoint() + side * self.style.label_offset
    }

    /// Positioned label for this connector's inline text.
    #[must_use]
    pub fn inline(&self) -> Option<Label> {
        self.inline_label.as_deref().map(|text| self.inline_for(text))
    }

    fn inline_for(&self, text: &str) -> Label {
        Label::new(
            format!("{}#label", self.id),
            text,
            self.label_anchor(),
            TextStyle::new(self.style.label_font_size, self.style.color),
            LabelKind::Inline,
        )
    }
}

/// Role of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    /// Rides a connector
    Inline,
    /// Sits next to an entity (e.g. a polynomial)
    Caption,
    /// Cosmetic confirmation mark; performs no check
    Mark,
    /// Stage title overlay
    Title,
    /// Narrative brief overlay
    Annotation,
    /// Per-entity contribution next to a converging connector
    Contribution,
    /// Persistent result group
    ResultGroup,
}

/// A positioned piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Surface id
    pub id: ElementId,
    /// Text (TeX-like notation is passed through untouched)
    pub text: String,
    /// Centre of the text
    pub position: Vec2,
    /// Font and colour
    pub style: TextStyle,
    /// Role
    pub kind: LabelKind,
}

impl Label {
    /// Create a label
    #[must_use]
    pub fn new(
        id: impl Into<ElementId>,
        text: impl Into<String>,
        position: Vec2,
        style: TextStyle,
        kind: LabelKind,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            position,
            style,
            kind,
        }
    }
}

/// Connectors from `from` to every peer, each with an index-tagged label.
///
/// Output order matches `to`. Callers pair connector `k` with peer `k`.
#[must_use]
pub fn broadcast_bundle(
    from: &VisualEntity,
    to: &[&VisualEntity],
    style: &ConnectorStyle,
) -> (Vec<Connector>, Vec<Label>) {
    let mut connectors = Vec::with_capacity(to.len());
    let mut labels = Vec::with_capacity(to.len());
    for (index, peer) in to.iter().enumerate() {
        let text = style.label_text(index + 1, from.ordinal(), peer.ordinal());
        let connector = Connector::between(from, peer, style);
        labels.push(connector.inline_for(&text));
        connectors.push(connector.with_label(text));
    }
    (connectors, labels)
}

/// Single connector/label pair for a pairwise exchange.
#[must_use]
pub fn directed_share(
    from: &VisualEntity,
    to: &VisualEntity,
    style: &ConnectorStyle,
) -> (Connector, Label) {
    let text = style.label_text(1, from.ordinal(), to.ordinal());
    let connector = Connector::between(from, to, style);
    let label = connector.inline_for(&text);
    (connector.with_label(text), label)
}

/// Tick shown to the right of a receiving peer.
#[must_use]
pub fn confirmation_mark(peer: &VisualEntity, color: Color) -> Label {
    Label::new(
        format!("{}#mark", peer.id()),
        "✓",
        peer.right() + Vec2::RIGHT * (DEFAULT_EDGE_MARGIN + MARK_HALF_WIDTH),
        TextStyle::new(36.0, color),
        LabelKind::Mark,
    )
}

/// Caption floating above an entity.
#[must_use]
pub fn caption_above(entity: &VisualEntity, text: &str, style: TextStyle) -> Label {
    let lift = CAPTION_GAP + style.font_size / 100.0;
    Label::new(
        format!("{}#caption", entity.id()),
        text,
        entity.top() + Vec2::UP * lift,
        style,
        LabelKind::Caption,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::Scene;
    use crate::geometry::GEOMETRY_EPSILON;

    fn scene() -> Scene {
        Scene::new(vec![
            VisualEntity::new("P1", "P1", Vec2::new(-3.0, 0.5)),
            VisualEntity::new("P2", "P2", Vec2::new(3.0, 0.5)),
            VisualEntity::new("P3", "P3", Vec2::new(0.0, -2.0)),
        ])
        .unwrap()
    }

    fn get<'a>(scene: &'a Scene, id: &str) -> &'a VisualEntity {
        scene.get(&EntityId::from(id)).unwrap()
    }

    #[test]
    fn test_broadcast_bundle_order_and_anchors() {
        let scene = scene();
        let p = get(&scene, "P1");
        let (q, r) = (get(&scene, "P2"), get(&scene, "P3"));
        let (connectors, labels) = broadcast_bundle(p, &[q, r], &ConnectorStyle::broadcast());

        assert_eq!(connectors.len(), 2);
        assert_eq!(labels.len(), 2);
        assert_eq!(connectors[0].target_entity(), Some(q.id()));
        assert_eq!(connectors[1].target_entity(), Some(r.id()));
        for (connector, peer) in connectors.iter().zip([q, r]) {
            let from_center = connector.start.distance(p.position());
            let to_center = connector.end.distance(peer.position());
            assert!((from_center - p.bounding_half_extent()).abs() < GEOMETRY_EPSILON);
            assert!((to_center - peer.bounding_half_extent()).abs() < GEOMETRY_EPSILON);
        }
        assert_eq!(labels[0].text, "g^{c_1}");
        assert_eq!(labels[1].text, "g^{c_2}");
    }

    #[test]
    fn test_inline_label_sits_above_horizontal_connector() {
        let scene = scene();
        let (c, label) = directed_share(
            get(&scene, "P1"),
            get(&scene, "P2"),
            &ConnectorStyle::share(),
        );
        assert!(label
            .position
            .approx_eq(c.midpoint() + Vec2::UP * 0.25, GEOMETRY_EPSILON));
        assert_eq!(label.text, "s_{12}");
        assert_eq!(label.kind, LabelKind::Inline);
        assert_eq!(label.id.as_str(), "P1->P2#label");
    }

    #[test]
    fn test_directed_share_reverse_direction_numbers() {
        let scene = scene();
        let (_, label) = directed_share(
            get(&scene, "P3"),
            get(&scene, "P1"),
            &ConnectorStyle::share(),
        );
        assert_eq!(label.text, "s_{31}");
    }

    #[test]
    fn test_converging_connector() {
        let scene = scene();
        let target = ElementId::from("result/public");
        let c = Connector::converging(
            get(&scene, "P3"),
            &target,
            Vec2::new(0.0, -4.0),
            &ConnectorStyle::converge(),
        );
        assert_eq!(c.start, Vec2::new(0.0, -2.5));
        assert_eq!(c.target_entity(), None);
        assert!((c.length() - 1.5).abs() < GEOMETRY_EPSILON);
        assert_eq!(c.id.as_str(), "P3->result/public");
    }

    #[test]
    fn test_confirmation_mark_right_of_peer() {
        let scene = scene();
        let peer = get(&scene, "P2");
        let mark = confirmation_mark(peer, Color::GREEN_E);
        assert_eq!(mark.kind, LabelKind::Mark);
        assert!(mark.position.x > peer.right().x);
        assert!((mark.position.y - peer.position().y).abs() < GEOMETRY_EPSILON);
    }

    #[test]
    fn test_caption_above() {
        let scene = scene();
        let e = get(&scene, "P1");
        let caption = caption_above(e, "f(x)=a_0+a_1x", TextStyle::new(26.0, Color::WHITE));
        assert!(caption.position.y > e.top().y);
        assert_eq!(caption.kind, LabelKind::Caption);
    }
}
