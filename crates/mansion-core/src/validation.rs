//! Post-generation checks for a finished layout.
//!
//! Pure functions over a [`MansionLayout`]. An overlap is an error; an
//! isolated room or a room poking above the configured floors is a warning.

use crate::collision::outlines_overlap;
use crate::config::GenerationConfig;
use crate::placement::MansionLayout;

/// A layout validation finding.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

/// Every room must have been placed.
pub fn check_rooms_placed(layout: &MansionLayout) -> Vec<ValidationError> {
    layout
        .rooms
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_placed() || r.assigned_floor.is_none())
        .map(|(i, r)| ValidationError {
            category: "placement",
            severity: Severity::Error,
            message: format!("Room #{} '{}' has no world position", i, r.name),
        })
        .collect()
}

/// No two rooms may overlap on any shared floor.
pub fn check_overlaps(layout: &MansionLayout, ray_length: f32) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, a) in layout.rooms.iter().enumerate() {
        for (j, b) in layout.rooms.iter().enumerate().skip(i + 1) {
            for global in a.global_floors() {
                let (Some(la), Some(lb)) = (a.local_floor(global), b.local_floor(global)) else {
                    continue;
                };
                let (Some(ia), Some(ib)) = (a.world_interior_point(la), b.world_interior_point(lb))
                else {
                    continue;
                };
                if outlines_overlap(&a.world_loop(la), ia, &b.world_loop(lb), ib, ray_length) {
                    errors.push(ValidationError {
                        category: "overlap",
                        severity: Severity::Error,
                        message: format!(
                            "Rooms #{} '{}' and #{} '{}' overlap on floor {}",
                            i, a.name, j, b.name, global
                        ),
                    });
                }
            }
        }
    }
    errors
}

/// A room that shares a floor with others should be joined to something.
pub fn check_isolated_rooms(layout: &MansionLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, room) in layout.rooms.iter().enumerate() {
        let joined = room.floors.iter().any(|f| !f.closed.is_empty());
        if joined {
            continue;
        }
        let has_neighbours = room
            .global_floors()
            .any(|g| layout.rooms_on_floor(g).count() > 1);
        if has_neighbours {
            errors.push(ValidationError {
                category: "connectivity",
                severity: Severity::Warning,
                message: format!("Room #{} '{}' is not joined to any other room", i, room.name),
            });
        }
    }
    errors
}

/// Multi-floor rooms placed near the top can reach past `floor_count`.
pub fn check_floor_range(layout: &MansionLayout, floor_count: u32) -> Vec<ValidationError> {
    layout
        .rooms
        .iter()
        .enumerate()
        .filter(|(_, r)| r.global_floors().end > floor_count)
        .map(|(i, r)| ValidationError {
            category: "floors",
            severity: Severity::Warning,
            message: format!(
                "Room #{} '{}' reaches floor {} of {}",
                i,
                r.name,
                r.global_floors().end - 1,
                floor_count
            ),
        })
        .collect()
}

/// Run every layout check.
pub fn validate_layout(layout: &MansionLayout, config: &GenerationConfig) -> Vec<ValidationError> {
    let mut errors = check_rooms_placed(layout);
    errors.extend(check_overlaps(layout, config.boundary.ray_length));
    errors.extend(check_isolated_rooms(layout));
    errors.extend(check_floor_range(layout, config.floor_count));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BoundarySegment, TileGrid};
    use crate::config::BoundaryConfig;
    use crate::geometry::Vec2;
    use crate::placement::PlacementStats;
    use crate::room::{FloorTemplate, Room, RoomPrefab, RoomTemplate};

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn make_floor() -> FloorTemplate {
        FloorTemplate {
            segments: vec![
                BoundarySegment::straight(v(0.0, 0.0)),
                BoundarySegment::door(v(0.0, 1.0)),
                BoundarySegment::straight(v(1.0, 1.0)),
                BoundarySegment::straight(v(1.0, 0.0)),
            ],
            grid: TileGrid::from_rows(&["#"]).unwrap(),
            grid_offset: Vec2::ZERO,
            interior_point: v(0.47, 0.53),
        }
    }

    fn make_room(floors: usize, at: Vec2, floor: u32) -> Room {
        let template = RoomTemplate {
            name: "room".to_string(),
            floors: (0..floors).map(|_| make_floor()).collect(),
        };
        let mut room = RoomPrefab::build(&template, &BoundaryConfig::default())
            .unwrap()
            .spawn(0);
        room.place(at, floor as f32, floor);
        room
    }

    fn make_layout(rooms: Vec<Room>) -> MansionLayout {
        MansionLayout {
            seed: 0,
            rooms,
            floors: Vec::new(),
            stats: PlacementStats::default(),
        }
    }

    #[test]
    fn test_overlap_detected() {
        let layout = make_layout(vec![
            make_room(1, Vec2::ZERO, 0),
            make_room(1, v(0.5, 0.2), 0),
        ]);
        let errors = check_overlaps(&layout, 100.0);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Error);
    }

    #[test]
    fn test_different_floors_do_not_overlap() {
        let layout = make_layout(vec![
            make_room(1, Vec2::ZERO, 0),
            make_room(1, v(0.5, 0.2), 1),
        ]);
        assert!(check_overlaps(&layout, 100.0).is_empty());
    }

    #[test]
    fn test_isolated_room_warned() {
        let mut a = make_room(1, Vec2::ZERO, 0);
        let mut b = make_room(1, v(0.0, 1.00001), 0);
        let c = make_room(1, v(5.0, 0.0), 0);
        a.close_doorway(0, 1);
        b.close_doorway(0, 1);
        let errors = check_isolated_rooms(&make_layout(vec![a, b, c]));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("#2"));
    }

    #[test]
    fn test_lone_room_not_isolated() {
        let layout = make_layout(vec![make_room(1, Vec2::ZERO, 0)]);
        assert!(check_isolated_rooms(&layout).is_empty());
    }

    #[test]
    fn test_floor_range_warning() {
        let layout = make_layout(vec![make_room(2, Vec2::ZERO, 1)]);
        let errors = check_floor_range(&layout, 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Warning);
        assert!(check_floor_range(&layout, 3).is_empty());
    }

    #[test]
    fn test_unplaced_room_is_error() {
        let template = RoomTemplate {
            name: "loose".to_string(),
            floors: vec![make_floor()],
        };
        let room = RoomPrefab::build(&template, &BoundaryConfig::default())
            .unwrap()
            .spawn(0);
        let errors = check_rooms_placed(&make_layout(vec![room]));
        assert_eq!(errors.len(), 1);
    }
}
