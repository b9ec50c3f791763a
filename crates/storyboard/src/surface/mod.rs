//! Rendering surface boundary.
//!
//! The sequencer is the only writer to a surface. It creates primitives,
//! animates their properties and removes them; how pixels are produced is up
//! to the implementation. [`RecordingSurface`] keeps everything in memory for
//! dry runs and tests.

mod recording;

pub use recording::{RecordingSurface, SurfaceCommand};

use crate::geometry::{Size, Vec2};
use crate::result::StoryboardResult;
use crate::style::Color;
use crate::timeline::Easing;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a drawn shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapeHandle(pub u64);

/// Handle to drawn text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextHandle(pub u64);

/// Either kind of primitive handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    /// A shape
    Shape(ShapeHandle),
    /// A text
    Text(TextHandle),
}

impl From<ShapeHandle> for Handle {
    fn from(value: ShapeHandle) -> Self {
        Self::Shape(value)
    }
}

impl From<TextHandle> for Handle {
    fn from(value: TextHandle) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape(h) => write!(f, "shape#{}", h.0),
            Self::Text(h) => write!(f, "text#{}", h.0),
        }
    }
}

/// Geometry and paint of a shape primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeSpec {
    /// Participant box
    RoundedRect {
        /// Centre
        center: Vec2,
        /// Width and height
        size: Size,
        /// Corner radius
        corner_radius: f64,
        /// Fill colour
        fill: Color,
        /// Fill opacity
        fill_opacity: f64,
        /// Border colour
        border: Color,
    },
    /// Directional connector
    Arrow {
        /// Tail
        start: Vec2,
        /// Head
        end: Vec2,
        /// Stroke colour
        color: Color,
        /// Stroke width
        stroke_width: f64,
        /// Maximum tip length relative to arrow length
        tip_ratio: f64,
    },
}

/// Text primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpec {
    /// Content
    pub text: String,
    /// Centre
    pub position: Vec2,
    /// Font size in points
    pub font_size: f64,
    /// Colour
    pub color: Color,
}

/// A property change animated by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", rename_all = "snake_case")]
pub enum PropertyDelta {
    /// Shape fill
    Fill {
        /// Target colour
        color: Color,
        /// Target fill opacity
        opacity: f64,
    },
    /// Shape border
    Stroke {
        /// Target colour
        color: Color,
    },
    /// Text colour
    TextColor {
        /// Target colour
        color: Color,
    },
    /// Centre position
    Position {
        /// Target centre
        to: Vec2,
    },
    /// Overall opacity
    Opacity {
        /// Target opacity (0.0-1.0)
        value: f64,
    },
}

/// One animated change applied to a set of primitives.
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a> {
    /// Primitives to animate
    pub handles: &'a [Handle],
    /// Property targets; each primitive applies the ones that make sense for it
    pub deltas: &'a [PropertyDelta],
    /// Start on the run clock
    pub start_secs: f64,
    /// Length of the animation
    pub duration_secs: f64,
    /// Rate curve
    pub easing: Easing,
}

/// Reported by a surface when a transition has been accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSignal {
    /// Run-clock time at which the transition finishes
    pub completes_at_secs: f64,
}

/// Something the sequencer can draw on.
///
/// Primitives are created fully transparent; the sequencer fades them in
/// with an [`PropertyDelta::Opacity`] transition.
pub trait RenderSurface {
    /// Create a shape.
    fn draw_shape(&mut self, spec: &ShapeSpec) -> StoryboardResult<ShapeHandle>;

    /// Create a text.
    fn draw_text(&mut self, spec: &TextSpec) -> StoryboardResult<TextHandle>;

    /// Animate properties of existing primitives.
    fn apply_transition(&mut self, transition: &Transition<'_>)
        -> StoryboardResult<CompletionSignal>;

    /// Detach a primitive.
    fn remove(&mut self, handle: Handle) -> StoryboardResult<()>;

    /// Move the surface clock forward. Called before every command.
    fn advance_to(&mut self, _now_secs: f64) {}
}
