//! Geometry helpers: vectors, boundary anchors and connector endpoints.
//!
//! Coordinates follow the usual diagram convention: `x` grows to the right,
//! `y` grows upwards, and the scene origin sits at the frame centre.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Margin used by [`edge_point`] callers that want a little air between a
/// shape and whatever points at it.
pub const DEFAULT_EDGE_MARGIN: f64 = 0.1;

/// Tolerance for comparing positions produced by floating point arithmetic.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

/// A point or direction in scene units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component
    pub x: f64,
    /// Vertical component (up is positive)
    pub y: f64,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    /// Unit vector pointing up.
    pub const UP: Self = Self { x: 0.0, y: 1.0 };
    /// Unit vector pointing down.
    pub const DOWN: Self = Self { x: 0.0, y: -1.0 };
    /// Unit vector pointing left.
    pub const LEFT: Self = Self { x: -1.0, y: 0.0 };
    /// Unit vector pointing right.
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };

    /// Create a new vector
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            None
        } else {
            Some(self * (1.0 / len))
        }
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        (self + other) * 0.5
    }

    /// Whether both components are within `eps` of `other`.
    #[must_use]
    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Width and height of a box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent
    pub width: f64,
    /// Vertical extent
    pub height: f64,
}

impl Size {
    /// Create a new size
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Larger of the two half extents.
    #[must_use]
    pub fn bounding_half_extent(self) -> f64 {
        self.width.max(self.height) / 2.0
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(2.0, 1.0)
    }
}

/// Anything with a centre and a circular boundary approximation.
pub trait Anchored {
    /// Centre of the shape.
    fn center(&self) -> Vec2;
    /// Radius used as the boundary approximation.
    fn bounding_half_extent(&self) -> f64;
}

/// Point on `shape`'s boundary facing `towards`, pushed outward by `margin`.
///
/// The boundary is approximated by a circle of radius
/// [`Anchored::bounding_half_extent`]. When `towards` coincides with the
/// centre there is no direction to follow and the centre is returned.
#[must_use]
pub fn edge_point<A: Anchored + ?Sized>(shape: &A, towards: Vec2, margin: f64) -> Vec2 {
    let center = shape.center();
    match (towards - center).normalized() {
        Some(unit) => center + unit * (shape.bounding_half_extent() + margin),
        None => center,
    }
}

/// Start and end of a connector from `a` to `b`, each on its own boundary.
#[must_use]
pub fn connector_endpoints<A, B>(a: &A, b: &B) -> (Vec2, Vec2)
where
    A: Anchored + ?Sized,
    B: Anchored + ?Sized,
{
    (
        edge_point(a, b.center(), 0.0),
        edge_point(b, a.center(), 0.0),
    )
}

/// Unit normal to the segment `start -> end`, preferring the upward side.
///
/// Vertical segments resolve to the right-hand side. Degenerate segments
/// resolve to [`Vec2::UP`].
#[must_use]
pub fn label_normal(start: Vec2, end: Vec2) -> Vec2 {
    let Some(dir) = (end - start).normalized() else {
        return Vec2::UP;
    };
    let normal = Vec2::new(-dir.y, dir.x);
    if normal.y < -GEOMETRY_EPSILON || (normal.y.abs() <= GEOMETRY_EPSILON && normal.x < 0.0) {
        -normal
    } else {
        normal
    }
}

/// Centre of the axis-aligned box enclosing all `points`.
#[must_use]
pub fn bounding_center(points: &[Vec2]) -> Option<Vec2> {
    let first = points.first()?;
    let (mut min, mut max) = (*first, *first);
    for p in &points[1..] {
        min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
        max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
    }
    Some(min.midpoint(max))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Disc {
        center: Vec2,
        radius: f64,
    }

    impl Anchored for Disc {
        fn center(&self) -> Vec2 {
            self.center
        }
        fn bounding_half_extent(&self) -> f64 {
            self.radius
        }
    }

    fn disc(x: f64, y: f64) -> Disc {
        Disc {
            center: Vec2::new(x, y),
            radius: 1.0,
        }
    }

    #[test]
    fn test_edge_point_axis_aligned() {
        let d = disc(0.0, 0.0);
        let p = edge_point(&d, Vec2::new(5.0, 0.0), 0.0);
        assert!(p.approx_eq(Vec2::new(1.0, 0.0), GEOMETRY_EPSILON));

        let p = edge_point(&d, Vec2::new(0.0, -3.0), 0.5);
        assert!(p.approx_eq(Vec2::new(0.0, -1.5), GEOMETRY_EPSILON));
    }

    #[test]
    fn test_edge_point_degenerate_returns_center() {
        let d = disc(2.0, -1.0);
        assert_eq!(edge_point(&d, Vec2::new(2.0, -1.0), 0.3), Vec2::new(2.0, -1.0));
    }

    #[test]
    fn test_connector_endpoints_face_each_other() {
        let a = disc(-3.0, 0.0);
        let b = disc(3.0, 0.0);
        let (start, end) = connector_endpoints(&a, &b);
        assert!(start.approx_eq(Vec2::new(-2.0, 0.0), GEOMETRY_EPSILON));
        assert!(end.approx_eq(Vec2::new(2.0, 0.0), GEOMETRY_EPSILON));
    }

    #[test]
    fn test_label_normal_prefers_up() {
        let n = label_normal(Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0));
        assert!(n.approx_eq(Vec2::UP, GEOMETRY_EPSILON));
        let n = label_normal(Vec2::new(4.0, 0.0), Vec2::new(0.0, 0.0));
        assert!(n.approx_eq(Vec2::UP, GEOMETRY_EPSILON));
        let n = label_normal(Vec2::new(0.0, 2.0), Vec2::new(0.0, -2.0));
        assert!(n.approx_eq(Vec2::RIGHT, GEOMETRY_EPSILON));
        assert_eq!(label_normal(Vec2::ZERO, Vec2::ZERO), Vec2::UP);
    }

    #[test]
    fn test_bounding_center() {
        assert_eq!(bounding_center(&[]), None);
        let c = bounding_center(&[
            Vec2::new(-3.0, 0.5),
            Vec2::new(3.0, 0.5),
            Vec2::new(0.0, -2.0),
        ]);
        assert_eq!(c, Some(Vec2::new(0.0, -0.75)));
    }

    #[test]
    fn test_size_half_extent() {
        assert!((Size::default().bounding_half_extent() - 1.0).abs() < f64::EPSILON);
        assert!((Size::new(1.0, 3.0).bounding_half_extent() - 1.5).abs() < f64::EPSILON);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_edge_point_distance(
                cx in -50.0f64..50.0, cy in -50.0f64..50.0,
                tx in -50.0f64..50.0, ty in -50.0f64..50.0,
                radius in 0.1f64..5.0, margin in 0.0f64..2.0,
            ) {
                let d = Disc { center: Vec2::new(cx, cy), radius };
                let towards = Vec2::new(tx, ty);
                prop_assume!(towards.distance(d.center) > 1e-6);
                let p = edge_point(&d, towards, margin);
                prop_assert!((p.distance(d.center) - (radius + margin)).abs() < 1e-9);
            }

            #[test]
            fn prop_endpoints_mirror(
                ax in -20.0f64..20.0, ay in -20.0f64..20.0,
                bx in -20.0f64..20.0, by in -20.0f64..20.0,
            ) {
                let a = disc(ax, ay);
                let b = disc(bx, by);
                let (s1, e1) = connector_endpoints(&a, &b);
                let (s2, e2) = connector_endpoints(&b, &a);
                prop_assert!(s1.approx_eq(e2, 1e-9));
                prop_assert!(e1.approx_eq(s2, 1e-9));
            }
        }
    }
}
