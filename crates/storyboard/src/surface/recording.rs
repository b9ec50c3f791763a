//! In-memory surface that records every command.
//!
//! Used for dry runs (`storyboard run`) and as the test double for the
//! sequencer. It keeps the latest properties of every live primitive and the
//! opacity keyframes needed to answer "how visible was X at time t".

use super::{
    CompletionSignal, Handle, PropertyDelta, RenderSurface, ShapeHandle, ShapeSpec, TextHandle,
    TextSpec, Transition,
};
use crate::result::{StoryboardError, StoryboardResult};
use crate::timeline::Easing;
use serde::Serialize;
use std::collections::BTreeMap;

/// A command received by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SurfaceCommand {
    /// `draw_shape`
    DrawShape {
        /// Surface clock
        at_secs: f64,
        /// Assigned handle
        handle: ShapeHandle,
        /// Shape
        spec: ShapeSpec,
    },
    /// `draw_text`
    DrawText {
        /// Surface clock
        at_secs: f64,
        /// Assigned handle
        handle: TextHandle,
        /// Text
        spec: TextSpec,
    },
    /// `apply_transition`
    Transition {
        /// Start time
        at_secs: f64,
        /// Animated primitives
        handles: Vec<Handle>,
        /// Property targets
        deltas: Vec<PropertyDelta>,
        /// Length
        duration_secs: f64,
        /// Rate curve
        easing: Easing,
    },
    /// `remove`
    Remove {
        /// Surface clock
        at_secs: f64,
        /// Removed primitive
        handle: Handle,
    },
}

#[derive(Debug, Clone)]
enum Primitive {
    Shape(ShapeSpec),
    Text(TextSpec),
}

#[derive(Debug, Clone, Copy)]
struct OpacityRamp {
    start_secs: f64,
    duration_secs: f64,
    from: f64,
    to: f64,
    easing: Easing,
}

#[derive(Debug, Clone)]
struct LiveEntry {
    primitive: Primitive,
    ramps: Vec<OpacityRamp>,
}

impl LiveEntry {
    fn settled_opacity(&self) -> f64 {
        self.ramps.last().map_or(0.0, |r| r.to)
    }

    fn opacity_at(&self, secs: f64) -> f64 {
        let mut value = 0.0;
        for ramp in &self.ramps {
            if secs < ramp.start_secs {
                break;
            }
            let end = ramp.start_secs + ramp.duration_secs;
            if secs >= end {
                value = ramp.to;
            } else {
                let t = (secs - ramp.start_secs) / ramp.duration_secs;
                return ramp.easing.lerp(ramp.from, ramp.to, t);
            }
        }
        value
    }

    fn apply(&mut self, delta: &PropertyDelta, transition: &Transition<'_>) {
        if let PropertyDelta::Opacity { value } = delta {
            let from = self.settled_opacity();
            self.ramps.push(OpacityRamp {
                start_secs: transition.start_secs,
                duration_secs: transition.duration_secs,
                from,
                to: *value,
                easing: transition.easing,
            });
            return;
        }
        match (delta, &mut self.primitive) {
            (
                PropertyDelta::Fill { color, opacity },
                Primitive::Shape(ShapeSpec::RoundedRect {
                    fill, fill_opacity, ..
                }),
            ) => {
                *fill = *color;
                *fill_opacity = *opacity;
            }
            (
                PropertyDelta::Stroke { color },
                Primitive::Shape(ShapeSpec::RoundedRect { border, .. }),
            )
            | (PropertyDelta::Stroke { color }, Primitive::Shape(ShapeSpec::Arrow { color: border, .. })) => {
                *border = *color;
            }
            (PropertyDelta::TextColor { color }, Primitive::Text(text)) => text.color = *color,
            (
                PropertyDelta::Position { to },
                Primitive::Shape(ShapeSpec::RoundedRect { center, .. }),
            ) => *center = *to,
            (PropertyDelta::Position { to }, Primitive::Text(text)) => text.position = *to,
            _ => {}
        }
    }
}

/// Surface that keeps every command and the live primitive set in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    now_secs: f64,
    next_id: u64,
    commands: Vec<SurfaceCommand>,
    live: BTreeMap<Handle, LiveEntry>,
}

impl RecordingSurface {
    /// Create an empty surface
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands in arrival order
    #[must_use]
    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Current surface clock
    #[must_use]
    pub const fn now_secs(&self) -> f64 {
        self.now_secs
    }

    /// Number of primitives currently on the surface
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether `handle` is still on the surface
    #[must_use]
    pub fn is_live(&self, handle: Handle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Current state of every live text, in creation order
    #[must_use]
    pub fn live_texts(&self) -> Vec<&TextSpec> {
        self.live
            .values()
            .filter_map(|entry| match &entry.primitive {
                Primitive::Text(text) => Some(text),
                Primitive::Shape(_) => None,
            })
            .collect()
    }

    /// Current state of every live shape, in creation order
    #[must_use]
    pub fn live_shapes(&self) -> Vec<&ShapeSpec> {
        self.live
            .values()
            .filter_map(|entry| match &entry.primitive {
                Primitive::Shape(shape) => Some(shape),
                Primitive::Text(_) => None,
            })
            .collect()
    }

    /// Eased opacity of a live primitive at `secs`.
    #[must_use]
    pub fn opacity_at(&self, handle: Handle, secs: f64) -> Option<f64> {
        self.live.get(&handle).map(|entry| entry.opacity_at(secs))
    }

    /// Serialize the command log as pretty JSON.
    pub fn to_json(&self) -> StoryboardResult<String> {
        Ok(serde_json::to_string_pretty(&self.commands)?)
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn entry_mut(&mut self, handle: Handle) -> StoryboardResult<&mut LiveEntry> {
        self.live
            .get_mut(&handle)
            .ok_or_else(|| StoryboardError::surface(format!("{handle} is not on the surface")))
    }
}

fn check_finite(values: &[f64], what: &str) -> StoryboardResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(StoryboardError::surface(format!("{what} has non-finite geometry")))
    }
}

impl RenderSurface for RecordingSurface {
    fn draw_shape(&mut self, spec: &ShapeSpec) -> StoryboardResult<ShapeHandle> {
        match spec {
            ShapeSpec::RoundedRect { center, size, .. } => check_finite(
                &[center.x, center.y, size.width, size.height],
                "rounded rectangle",
            )?,
            ShapeSpec::Arrow { start, end, .. } => {
                check_finite(&[start.x, start.y, end.x, end.y], "arrow")?;
            }
        }
        let handle = ShapeHandle(self.allocate());
        self.live.insert(
            Handle::Shape(handle),
            LiveEntry {
                primitive: Primitive::Shape(spec.clone()),
                ramps: Vec::new(),
            },
        );
        self.commands.push(SurfaceCommand::DrawShape {
            at_secs: self.now_secs,
            handle,
            spec: spec.clone(),
        });
        Ok(handle)
    }

    fn draw_text(&mut self, spec: &TextSpec) -> StoryboardResult<TextHandle> {
        check_finite(&[spec.position.x, spec.position.y], "text")?;
        let handle = TextHandle(self.allocate());
        self.live.insert(
            Handle::Text(handle),
            LiveEntry {
                primitive: Primitive::Text(spec.clone()),
                ramps: Vec::new(),
            },
        );
        self.commands.push(SurfaceCommand::DrawText {
            at_secs: self.now_secs,
            handle,
            spec: spec.clone(),
        });
        Ok(handle)
    }

    fn apply_transition(
        &mut self,
        transition: &Transition<'_>,
    ) -> StoryboardResult<CompletionSignal> {
        for handle in transition.handles {
            let entry = self.entry_mut(*handle)?;
            for delta in transition.deltas {
                entry.apply(delta, transition);
            }
        }
        self.commands.push(SurfaceCommand::Transition {
            at_secs: transition.start_secs,
            handles: transition.handles.to_vec(),
            deltas: transition.deltas.to_vec(),
            duration_secs: transition.duration_secs,
            easing: transition.easing,
        });
        Ok(CompletionSignal {
            completes_at_secs: transition.start_secs + transition.duration_secs,
        })
    }

    fn remove(&mut self, handle: Handle) -> StoryboardResult<()> {
        if self.live.remove(&handle).is_none() {
            return Err(StoryboardError::surface(format!(
                "cannot remove {handle}: not on the surface"
            )));
        }
        self.commands.push(SurfaceCommand::Remove {
            at_secs: self.now_secs,
            handle,
        });
        Ok(())
    }

    fn advance_to(&mut self, now_secs: f64) {
        if now_secs > self.now_secs {
            self.now_secs = now_secs;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;
    use crate::style::Color;

    fn text(s: &str) -> TextSpec {
        TextSpec {
            text: s.to_string(),
            position: Vec2::ZERO,
            font_size: 28.0,
            color: Color::WHITE,
        }
    }

    fn fade(surface: &mut RecordingSurface, handle: Handle, start: f64, to: f64) -> CompletionSignal {
        surface
            .apply_transition(&Transition {
                handles: &[handle],
                deltas: &[PropertyDelta::Opacity { value: to }],
                start_secs: start,
                duration_secs: 1.0,
                easing: Easing::Linear,
            })
            .unwrap()
    }

    #[test]
    fn test_draw_records_and_tracks() {
        let mut s = RecordingSurface::new();
        let h = s.draw_text(&text("Stage 1")).unwrap();
        assert_eq!(s.live_count(), 1);
        assert!(s.is_live(Handle::Text(h)));
        assert_eq!(s.commands().len(), 1);
        assert_eq!(s.live_texts()[0].text, "Stage 1");
    }

    #[test]
    fn test_opacity_follows_ramps() {
        let mut s = RecordingSurface::new();
        let h = Handle::Text(s.draw_text(&text("brief")).unwrap());
        let done = fade(&mut s, h, 2.0, 1.0);
        assert!((done.completes_at_secs - 3.0).abs() < f64::EPSILON);
        fade(&mut s, h, 5.0, 0.0);

        assert!(s.opacity_at(h, 1.0).unwrap().abs() < f64::EPSILON);
        assert!((s.opacity_at(h, 2.5).unwrap() - 0.5).abs() < 1e-12);
        assert!((s.opacity_at(h, 4.0).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!((s.opacity_at(h, 5.25).unwrap() - 0.75).abs() < 1e-12);
        assert!(s.opacity_at(h, 7.0).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_transition_updates_properties() {
        let mut s = RecordingSurface::new();
        let rect = s
            .draw_shape(&ShapeSpec::RoundedRect {
                center: Vec2::ZERO,
                size: crate::geometry::Size::default(),
                corner_radius: 0.2,
                fill: Color::GREY_A,
                fill_opacity: 0.4,
                border: Color::GREY_A,
            })
            .unwrap();
        s.apply_transition(&Transition {
            handles: &[Handle::Shape(rect)],
            deltas: &[
                PropertyDelta::Fill {
                    color: Color::GREEN_E,
                    opacity: 0.8,
                },
                PropertyDelta::Stroke {
                    color: Color::GREEN_E,
                },
                PropertyDelta::Position {
                    to: Vec2::new(1.0, 2.0),
                },
            ],
            start_secs: 0.0,
            duration_secs: 1.0,
            easing: Easing::Smooth,
        })
        .unwrap();
        match s.live_shapes()[0] {
            ShapeSpec::RoundedRect {
                center,
                fill,
                fill_opacity,
                border,
                ..
            } => {
                assert_eq!(*center, Vec2::new(1.0, 2.0));
                assert_eq!(*fill, Color::GREEN_E);
                assert!((fill_opacity - 0.8).abs() < f64::EPSILON);
                assert_eq!(*border, Color::GREEN_E);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_unknown_handles_rejected() {
        let mut s = RecordingSurface::new();
        let ghost = Handle::Text(TextHandle(42));
        assert!(matches!(s.remove(ghost), Err(StoryboardError::Surface { .. })));
        let err = s
            .apply_transition(&Transition {
                handles: &[ghost],
                deltas: &[],
                start_secs: 0.0,
                duration_secs: 1.0,
                easing: Easing::Linear,
            })
            .unwrap_err();
        assert!(err.to_string().contains("text#42"));
    }

    #[test]
    fn test_remove_stamps_clock() {
        let mut s = RecordingSurface::new();
        let h = Handle::Text(s.draw_text(&text("x")).unwrap());
        s.advance_to(3.5);
        s.advance_to(1.0);
        s.remove(h).unwrap();
        assert_eq!(
            s.commands().last(),
            Some(&SurfaceCommand::Remove {
                at_secs: 3.5,
                handle: h
            })
        );
        assert_eq!(s.live_count(), 0);
    }

    #[test]
    fn test_non_finite_geometry_rejected() {
        let mut s = RecordingSurface::new();
        let mut spec = text("nan");
        spec.position = Vec2::new(f64::NAN, 0.0);
        assert!(s.draw_text(&spec).is_err());
    }

    #[test]
    fn test_command_log_json() {
        let mut s = RecordingSurface::new();
        s.draw_text(&text("x")).unwrap();
        let json = s.to_json().unwrap();
        assert!(json.contains("\"command\": \"draw_text\""));
    }
}
