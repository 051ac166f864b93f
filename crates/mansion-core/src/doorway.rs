//! Doorways derived from door segments.
//!
//! Angles are in degrees in `[0, 360)`. Boundaries are wound clockwise in the
//! floor plan, so rotating a door segment's direction by +90° points away
//! from the room.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

/// An attachment point on a floor outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Doorway {
    /// Index of the owning door segment in the floor boundary.
    pub segment: usize,
    pub start: Vec2,
    pub end: Vec2,
    /// Outward-facing angle in degrees.
    pub angle: f32,
    /// Distance between `start` and `end`.
    pub width: f32,
}

impl Doorway {
    pub fn derive(segment: usize, start: Vec2, end: Vec2) -> Self {
        Self {
            segment,
            start,
            end,
            angle: outward_angle(start, end),
            width: (end - start).length(),
        }
    }

    /// Recompute angle and width from the current endpoints.
    pub fn refresh(&mut self) {
        *self = Doorway::derive(self.segment, self.start, self.end);
    }

    /// Unit vector pointing out of the room.
    pub fn outward(&self) -> Vec2 {
        Vec2::from_angle_degrees(self.angle)
    }
}

fn normalize_degrees(degrees: f32) -> f32 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// Direction of `start → end` rotated by 90°, in `[0, 360)`.
pub fn outward_angle(start: Vec2, end: Vec2) -> f32 {
    let dir = end - start;
    let along = normalize_degrees(dir.y.atan2(dir.x).to_degrees());
    normalize_degrees(along + 90.0)
}

/// Two doors can be joined when they face each other within `epsilon` degrees.
pub fn doorways_compatible(a: &Doorway, b: &Doorway, epsilon: f32) -> bool {
    angles_face(a.angle, b.angle, epsilon)
}

/// `|a - b|` is within `epsilon` of 180°.
pub fn angles_face(a: f32, b: f32, epsilon: f32) -> bool {
    ((a - b).abs() - 180.0).abs() <= epsilon
}

/// Optional width gate: both doors have the same width within `epsilon`.
pub fn widths_match(a: &Doorway, b: &Doorway, epsilon: f32) -> bool {
    (a.width - b.width).abs() <= epsilon
}
