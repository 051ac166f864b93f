//! Planar geometry kernel for collision checks.
//!
//! Everything here works in the floor plane (x, y). Elevation is handled by
//! the floor bookkeeping in [`crate::placement`], never by these functions.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, RangeInclusive, Sub};

/// A point or vector in the floor plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `degrees` (0° = +x, 90° = +y).
    pub fn from_angle_degrees(degrees: f32) -> Self {
        let rad = degrees.to_radians();
        Self::new(rad.cos(), rad.sin())
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Component-wise equality within `epsilon`.
    pub fn approx_eq(self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle, `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive containment (points on the border count).
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Corners in counter-clockwise order starting at the bottom-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y),
            Vec2::new(self.x + self.width, self.y + self.height),
            Vec2::new(self.x, self.y + self.height),
        ]
    }
}

/// How segment endpoints are treated by [`segments_intersect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TangentMode {
    /// Closed parametric range `[0, 1]`: touching endpoints intersect.
    Inclusive,
    /// Open range `(0, 1)`: only true crossings count, shared vertices do not.
    Exclusive,
}

// ── Segment tests ───────────────────────────────────────────────────────

/// Whether segment `a1→a2` crosses segment `b1→b2`.
///
/// Solves the 2×2 system for the parameters `r` (along a) and `s` (along b).
/// A zero determinant means parallel or collinear, which never counts.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2, mode: TangentMode) -> bool {
    let det = (a2.x - a1.x) * (b2.y - b1.y) - (a2.y - a1.y) * (b2.x - b1.x);
    if det == 0.0 {
        return false;
    }

    let q = (a1.y - b1.y) * (b2.x - b1.x) - (a1.x - b1.x) * (b2.y - b1.y);
    let r = q / det;
    let q = (a1.y - b1.y) * (a2.x - a1.x) - (a1.x - b1.x) * (a2.y - a1.y);
    let s = q / det;

    match mode {
        TangentMode::Inclusive => (0.0..=1.0).contains(&r) && (0.0..=1.0).contains(&s),
        TangentMode::Exclusive => r > 0.0 && r < 1.0 && s > 0.0 && s < 1.0,
    }
}

/// Whether a segment touches any side of `rect` or lies entirely inside it.
pub fn segment_intersects_rect(p1: Vec2, p2: Vec2, rect: &Rect) -> bool {
    let c = rect.corners();
    (0..4).any(|i| segments_intersect(p1, p2, c[i], c[(i + 1) % 4], TangentMode::Inclusive))
        || (rect.contains(p1) && rect.contains(p2))
}

/// Count inclusive crossings of a horizontal ray from `origin` against the
/// edges of a closed point loop (consecutive pairs, first == last).
///
/// The ray reaches at least `reach` units and always past the loop's right
/// extent, so no edge to the right of `origin` is missed.
pub fn ray_crossings(origin: Vec2, points: &[Vec2], reach: f32) -> usize {
    let max_x = points.iter().fold(origin.x, |m, p| m.max(p.x));
    let end = Vec2::new((origin.x + reach).max(max_x + 1.0), origin.y);
    points
        .windows(2)
        .filter(|w| segments_intersect(origin, end, w[0], w[1], TangentMode::Inclusive))
        .count()
}

/// Odd crossing count: `point` lies inside the loop's outline.
pub fn point_in_polygon_parity(point: Vec2, points: &[Vec2], reach: f32) -> bool {
    ray_crossings(point, points, reach) % 2 == 1
}

/// Whether any edge of loop `a` truly crosses an edge of loop `b`.
/// Shared vertices and tangencies are ignored.
pub fn loops_cross(a: &[Vec2], b: &[Vec2]) -> bool {
    a.windows(2).any(|ea| {
        b.windows(2)
            .any(|eb| segments_intersect(ea[0], ea[1], eb[0], eb[1], TangentMode::Exclusive))
    })
}

// ── Point loops ─────────────────────────────────────────────────────────

/// Drop points equal (within `epsilon`) to their predecessor, then make the
/// loop exactly closed: a last point near the first is snapped onto it, an
/// open loop gets the first point appended.
pub fn dedup_consecutive_points(points: &mut Vec<Vec2>, epsilon: f32) {
    points.dedup_by(|cur, prev| cur.approx_eq(*prev, epsilon));

    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return;
    };
    if points.len() == 1 {
        return;
    }
    if last.approx_eq(first, epsilon) {
        let n = points.len();
        points[n - 1] = first;
    } else {
        points.push(first);
    }
}

/// Point on the cubic Bezier `p0 → p3` with handles `p1`, `p2`.
pub fn cubic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

/// `divisions` evenly parameterized points from `start` to `end` inclusive.
pub fn bezier_points(
    start: Vec2,
    start_handle: Vec2,
    end_handle: Vec2,
    end: Vec2,
    divisions: usize,
) -> Vec<Vec2> {
    if divisions < 2 {
        return vec![start, end];
    }
    let last = (divisions - 1) as f32;
    (0..divisions)
        .map(|i| cubic_bezier(start, start_handle, end_handle, end, i as f32 / last))
        .collect()
}

/// Tiles overlapping the span `(lo, hi)` with positive length. Both ends are
/// in tile units; an end lying exactly on a tile border excludes the tile
/// beyond it.
pub fn tiles_spanned(lo: f32, hi: f32) -> RangeInclusive<i32> {
    (lo.floor() as i32)..=(hi.ceil() as i32 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn square(x: f32, y: f32, size: f32) -> Vec<Vec2> {
        vec![
            v(x, y),
            v(x, y + size),
            v(x + size, y + size),
            v(x + size, y),
            v(x, y),
        ]
    }

    #[test]
    fn test_crossing_segments() {
        let a = (v(0.0, 0.0), v(1.0, 1.0));
        let b = (v(0.0, 1.0), v(1.0, 0.0));
        assert!(segments_intersect(a.0, a.1, b.0, b.1, TangentMode::Inclusive));
        assert!(segments_intersect(a.0, a.1, b.0, b.1, TangentMode::Exclusive));
    }

    #[test]
    fn test_disjoint_segments() {
        assert!(!segments_intersect(
            v(0.0, 0.0),
            v(1.0, 0.0),
            v(0.0, 1.0),
            v(1.0, 2.0),
            TangentMode::Inclusive
        ));
    }

    #[test]
    fn test_intersection_symmetric() {
        let cases = [
            (v(0.0, 0.0), v(2.0, 1.0), v(1.0, -1.0), v(1.0, 3.0)),
            (v(-1.0, 0.5), v(3.0, 0.5), v(0.2, 0.0), v(0.9, 2.0)),
            (v(0.0, 0.0), v(1.0, 0.0), v(2.0, -1.0), v(2.0, 1.0)),
            (v(0.0, 0.0), v(1.0, 1.0), v(1.0, 1.0), v(2.0, 0.0)),
        ];
        for (a1, a2, b1, b2) in cases {
            for mode in [TangentMode::Inclusive, TangentMode::Exclusive] {
                assert_eq!(
                    segments_intersect(a1, a2, b1, b2, mode),
                    segments_intersect(b1, b2, a1, a2, mode),
                    "asymmetric for {:?} {:?} {:?} {:?} {:?}",
                    a1,
                    a2,
                    b1,
                    b2,
                    mode
                );
            }
        }
    }

    #[test]
    fn test_shared_endpoint_policies() {
        let (a1, a2) = (v(0.0, 0.0), v(1.0, 1.0));
        let (b1, b2) = (v(1.0, 1.0), v(2.0, 0.0));
        assert!(segments_intersect(a1, a2, b1, b2, TangentMode::Inclusive));
        assert!(!segments_intersect(a1, a2, b1, b2, TangentMode::Exclusive));

        // Shared start points
        let (c1, c2) = (v(0.0, 0.0), v(0.0, 1.0));
        assert!(segments_intersect(a1, a2, c1, c2, TangentMode::Inclusive));
        assert!(!segments_intersect(a1, a2, c1, c2, TangentMode::Exclusive));
    }

    #[test]
    fn test_collinear_never_intersects() {
        assert!(!segments_intersect(
            v(0.0, 0.0),
            v(2.0, 0.0),
            v(1.0, 0.0),
            v(3.0, 0.0),
            TangentMode::Inclusive
        ));
    }

    #[test]
    fn test_segment_crosses_rect_side() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!(segment_intersects_rect(v(-1.0, 0.5), v(0.5, 0.5), &r));
        assert!(!segment_intersects_rect(v(-1.0, 2.0), v(2.0, 2.0), &r));
    }

    #[test]
    fn test_segment_inside_rect() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!(segment_intersects_rect(v(0.2, 0.2), v(0.7, 0.6), &r));
    }

    #[test]
    fn test_ray_parity_inside_and_outside() {
        let sq = square(0.0, 0.0, 1.0);
        assert!(point_in_polygon_parity(v(0.4, 0.45), &sq, 100.0));
        assert!(!point_in_polygon_parity(v(1.5, 0.45), &sq, 100.0));
        assert!(!point_in_polygon_parity(v(-1.5, 0.45), &sq, 100.0));
        assert_eq!(ray_crossings(v(-1.5, 0.45), &sq, 100.0), 2);
    }

    #[test]
    fn test_ray_reaches_past_short_length() {
        let sq = square(50.0, 0.0, 1.0);
        assert!(point_in_polygon_parity(v(50.5, 0.45), &sq, 0.1));
    }

    #[test]
    fn test_loops_cross_and_touch() {
        let a = square(0.0, 0.0, 1.0);
        let overlapping = square(0.5, 0.5, 1.0);
        let touching = square(1.0, 0.0, 1.0);
        assert!(loops_cross(&a, &overlapping));
        assert!(!loops_cross(&a, &touching));
    }

    #[test]
    fn test_dedup_removes_repeats_and_closes() {
        let mut pts = vec![
            v(0.0, 0.0),
            v(0.0, 1.0),
            v(0.0, 1.0),
            v(1.0, 1.0),
            v(1.0, 1.0),
            v(1.0, 0.0),
            v(0.0, 0.000001),
        ];
        dedup_consecutive_points(&mut pts, 1e-5);
        assert_eq!(pts.len(), 5);
        assert_eq!(pts.first(), pts.last());
        for w in pts.windows(2) {
            assert!(!w[0].approx_eq(w[1], 1e-5));
        }
    }

    #[test]
    fn test_dedup_appends_missing_closure() {
        let mut pts = vec![v(0.0, 0.0), v(0.0, 1.0), v(1.0, 0.0)];
        dedup_consecutive_points(&mut pts, 1e-5);
        assert_eq!(pts.len(), 4);
        assert_eq!(pts[3], v(0.0, 0.0));
    }

    #[test]
    fn test_bezier_endpoints_and_count() {
        let pts = bezier_points(v(0.0, 0.0), v(0.0, 1.0), v(1.0, 1.0), v(1.0, 0.0), 16);
        assert_eq!(pts.len(), 16);
        assert_eq!(pts[0], v(0.0, 0.0));
        assert!(pts[15].approx_eq(v(1.0, 0.0), 1e-6));
        // Symmetric handles peak at t = 0.5 with y = 0.75
        let mid = cubic_bezier(v(0.0, 0.0), v(0.0, 1.0), v(1.0, 1.0), v(1.0, 0.0), 0.5);
        assert!(mid.approx_eq(v(0.5, 0.75), 1e-6));
    }

    #[test]
    fn test_tiles_spanned() {
        assert_eq!(tiles_spanned(2.0, 3.0), 2..=2);
        assert_eq!(tiles_spanned(2.5, 3.5), 2..=3);
        assert_eq!(tiles_spanned(-0.25, 0.75), -1..=0);
        assert_eq!(tiles_spanned(0.0, 10.0), 0..=9);
        // A sliver past the border still counts
        assert_eq!(tiles_spanned(1.0001, 2.0001), 1..=2);
    }
}
