//! Collision resolution between a candidate room and the placed layout.
//!
//! Both strategies answer the same question through [`CollisionResolver`]:
//! can `candidate`, with its floor 0 on `bottom_floor` and its origin at
//! `offset`, be added without overlapping anything already placed?
//! `accepts` never mutates; state only changes in `commit`, which the
//! placement search calls after a successful query.

use std::collections::HashMap;

use crate::boundary::{Edge, TileState};
use crate::config::{BoundaryConfig, CollisionStrategy};
use crate::geometry::{
    loops_cross, point_in_polygon_parity, segment_intersects_rect, segments_intersect,
    tiles_spanned, Rect, TangentMode, Vec2,
};
use crate::room::{Floor, Room};

pub trait CollisionResolver {
    /// Pure query: does the candidate fit at `offset`?
    fn accepts(&self, placed: &[Room], candidate: &Room, bottom_floor: u32, offset: Vec2) -> bool;

    /// Record an accepted candidate.
    fn commit(&mut self, candidate: &Room, bottom_floor: u32, offset: Vec2);
}

/// Build the resolver selected in the configuration.
pub fn resolver_for(
    strategy: CollisionStrategy,
    config: &BoundaryConfig,
) -> Box<dyn CollisionResolver> {
    match strategy {
        CollisionStrategy::Polygon => Box::new(PolygonResolver::new(config.ray_length)),
        CollisionStrategy::Grid => Box::new(GridResolver::new(config.tile_size)),
    }
}

/// Whether two world-space outlines overlap: an exclusive edge crossing, or
/// either reference point inside the other outline.
pub fn outlines_overlap(
    a_loop: &[Vec2],
    a_interior: Vec2,
    b_loop: &[Vec2],
    b_interior: Vec2,
    ray_length: f32,
) -> bool {
    loops_cross(a_loop, b_loop)
        || point_in_polygon_parity(a_interior, b_loop, ray_length)
        || point_in_polygon_parity(b_interior, a_loop, ray_length)
}

// ── Polygon strategy ────────────────────────────────────────────────────

/// Exact outline tests against every placed room sharing a floor.
#[derive(Debug, Clone)]
pub struct PolygonResolver {
    ray_length: f32,
}

impl PolygonResolver {
    pub fn new(ray_length: f32) -> Self {
        Self { ray_length }
    }
}

impl CollisionResolver for PolygonResolver {
    fn accepts(&self, placed: &[Room], candidate: &Room, bottom_floor: u32, offset: Vec2) -> bool {
        candidate.floors.iter().enumerate().all(|(local, floor)| {
            let global = bottom_floor + local as u32;
            let cand_loop = floor.loop_at(offset);
            let cand_interior = floor.interior_at(offset);

            placed.iter().all(|room| {
                let Some(other) = room.local_floor(global) else {
                    return true;
                };
                let other_floor = &room.floors[other];
                !outlines_overlap(
                    &cand_loop,
                    cand_interior,
                    &other_floor.loop_at(room.world_position()),
                    other_floor.interior_at(room.world_position()),
                    self.ray_length,
                )
            })
        })
    }

    fn commit(&mut self, _candidate: &Room, _bottom_floor: u32, _offset: Vec2) {}
}

// ── Grid strategy ───────────────────────────────────────────────────────

/// Global occupancy of one floor, keyed by world tile index.
#[derive(Debug, Clone, Default)]
struct FloorOccupancy {
    cells: HashMap<(i32, i32), TileState>,
    /// World-space edges recorded for partial cells.
    edges: HashMap<(i32, i32), Vec<Edge>>,
}

impl FloorOccupancy {
    fn state(&self, cell: (i32, i32)) -> TileState {
        self.cells.get(&cell).copied().unwrap_or_default()
    }

    fn edges(&self, cell: (i32, i32)) -> &[Edge] {
        self.edges.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One world tile touched by a floor at some offset.
#[derive(Debug, Clone)]
struct WorldCell {
    key: (i32, i32),
    state: TileState,
    /// Loop edges touching the tile, empty for full cells.
    edges: Vec<Edge>,
}

/// Coarse tile test per floor, refined by edge checks where two partial
/// tiles meet.
///
/// Rooms keep their exact offsets, so a room's tiles rarely line up with the
/// world lattice. Each floor is rasterised onto world tiles: a world tile is
/// full only when every room tile under it is full, and partial when it is
/// touched at all otherwise.
#[derive(Debug, Clone)]
pub struct GridResolver {
    tile_size: f32,
    floors: HashMap<u32, FloorOccupancy>,
}

impl GridResolver {
    pub fn new(tile_size: f32) -> Self {
        Self {
            tile_size,
            floors: HashMap::new(),
        }
    }

    /// Merged state of a world tile on a global floor.
    pub fn state_at(&self, global_floor: u32, cell: (i32, i32)) -> TileState {
        self.floors
            .get(&global_floor)
            .map(|f| f.state(cell))
            .unwrap_or_default()
    }

    /// World tiles covered by `floor` with its room origin at `offset`.
    fn footprint(&self, floor: &Floor, offset: Vec2) -> Vec<WorldCell> {
        let Some(bounds) = floor.bounds else {
            return Vec::new();
        };
        let t = self.tile_size;
        // Grid origin in world tile units
        let origin = offset + floor.grid_offset;
        let (u, w) = (origin.x / t, origin.y / t);
        let world_loop = floor.loop_at(offset);

        let columns = tiles_spanned(u + bounds.left as f32, u + bounds.right as f32 + 1.0);
        let rows = tiles_spanned(w + bounds.bottom as f32, w + bounds.top as f32 + 1.0);

        let mut cells = Vec::new();
        for i in columns {
            let xs = tiles_spanned(i as f32 - u, i as f32 + 1.0 - u);
            for j in rows.clone() {
                let ys = tiles_spanned(j as f32 - w, j as f32 + 1.0 - w);
                let under: Vec<TileState> = xs
                    .clone()
                    .flat_map(|x| ys.clone().map(move |y| floor.grid.tile(x, y)))
                    .collect();

                if under.iter().all(|&s| s == TileState::Empty) {
                    continue;
                }
                if under.iter().all(|&s| s == TileState::Full) {
                    cells.push(WorldCell {
                        key: (i, j),
                        state: TileState::Full,
                        edges: Vec::new(),
                    });
                    continue;
                }

                let rect = Rect::new(i as f32 * t, j as f32 * t, t, t);
                let edges = world_loop
                    .windows(2)
                    .filter(|e| segment_intersects_rect(e[0], e[1], &rect))
                    .map(|e| Edge::new(e[0], e[1]))
                    .collect();
                cells.push(WorldCell {
                    key: (i, j),
                    state: TileState::Partial,
                    edges,
                });
            }
        }
        cells
    }

    fn floor_fits(&self, floor: &Floor, global: u32, offset: Vec2) -> bool {
        let Some(occupancy) = self.floors.get(&global) else {
            return true;
        };

        self.footprint(floor, offset).iter().all(|cell| {
            match (cell.state, occupancy.state(cell.key)) {
                (_, TileState::Empty) | (TileState::Empty, _) => true,
                (TileState::Full, _) | (_, TileState::Full) => false,
                (TileState::Partial, TileState::Partial) => {
                    !edges_cross(&cell.edges, occupancy.edges(cell.key))
                }
            }
        })
    }
}

/// Whether any edge of `a` truly crosses any edge of `b`.
fn edges_cross(a: &[Edge], b: &[Edge]) -> bool {
    a.iter().any(|e| {
        b.iter()
            .any(|r| segments_intersect(e.a, e.b, r.a, r.b, TangentMode::Exclusive))
    })
}

impl CollisionResolver for GridResolver {
    fn accepts(&self, _placed: &[Room], candidate: &Room, bottom_floor: u32, offset: Vec2) -> bool {
        candidate
            .floors
            .iter()
            .enumerate()
            .all(|(local, floor)| self.floor_fits(floor, bottom_floor + local as u32, offset))
    }

    fn commit(&mut self, candidate: &Room, bottom_floor: u32, offset: Vec2) {
        for (local, floor) in candidate.floors.iter().enumerate() {
            let cells = self.footprint(floor, offset);
            let occupancy = self.floors.entry(bottom_floor + local as u32).or_default();

            for cell in cells {
                let merged = match (occupancy.state(cell.key), cell.state) {
                    (TileState::Partial, TileState::Partial) | (TileState::Full, _) => {
                        TileState::Full
                    }
                    (_, state) => state,
                };
                occupancy.cells.insert(cell.key, merged);
                if !cell.edges.is_empty() {
                    occupancy.edges.entry(cell.key).or_default().extend(cell.edges);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BoundarySegment, TileGrid};
    use crate::room::{FloorTemplate, RoomPrefab, RoomTemplate};

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn make_room(size: f32, rows: &[&str]) -> Room {
        let template = RoomTemplate {
            name: "box".to_string(),
            floors: vec![FloorTemplate {
                segments: vec![
                    BoundarySegment::straight(v(0.0, 0.0)),
                    BoundarySegment::straight(v(0.0, size)),
                    BoundarySegment::straight(v(size, size)),
                    BoundarySegment::straight(v(size, 0.0)),
                ],
                grid: TileGrid::from_rows(rows).unwrap(),
                grid_offset: Vec2::ZERO,
                interior_point: v(size * 0.47, size * 0.53),
            }],
        };
        // One grid tile per world unit
        let config = BoundaryConfig {
            tile_size: 1.0,
            ..Default::default()
        };
        RoomPrefab::build(&template, &config).unwrap().spawn(0)
    }

    fn make_placed(size: f32, at: Vec2) -> Room {
        let mut room = make_room(size, &["#"]);
        room.place(at, 0.0, 0);
        room
    }

    #[test]
    fn test_polygon_rejects_crossing() {
        let resolver = PolygonResolver::new(100.0);
        let placed = vec![make_placed(1.0, Vec2::ZERO)];
        let candidate = make_room(1.0, &["#"]);
        assert!(!resolver.accepts(&placed, &candidate, 0, v(0.5, 0.5)));
    }

    #[test]
    fn test_polygon_accepts_adjacent() {
        let resolver = PolygonResolver::new(100.0);
        let placed = vec![make_placed(1.0, Vec2::ZERO)];
        let candidate = make_room(1.0, &["#"]);
        assert!(resolver.accepts(&placed, &candidate, 0, v(1.00001, 0.0)));
    }

    #[test]
    fn test_polygon_rejects_containment() {
        let resolver = PolygonResolver::new(100.0);
        let placed = vec![make_placed(4.0, Vec2::ZERO)];
        let candidate = make_room(1.0, &["#"]);
        // No edges cross; only the parity test catches this
        assert!(!resolver.accepts(&placed, &candidate, 0, v(1.5, 1.5)));
    }

    #[test]
    fn test_polygon_ignores_other_floors() {
        let resolver = PolygonResolver::new(100.0);
        let placed = vec![make_placed(1.0, Vec2::ZERO)];
        let candidate = make_room(1.0, &["#"]);
        assert!(resolver.accepts(&placed, &candidate, 1, v(0.5, 0.5)));
    }

    #[test]
    fn test_grid_full_room_same_and_disjoint_cell() {
        let mut resolver = GridResolver::new(1.0);
        let room = make_room(1.0, &["#"]);
        assert!(resolver.accepts(&[], &room, 0, Vec2::ZERO));
        resolver.commit(&room, 0, Vec2::ZERO);

        assert!(!resolver.accepts(&[], &room, 0, Vec2::ZERO));
        assert!(resolver.accepts(&[], &room, 0, v(1.0, 0.0)));
        assert!(resolver.accepts(&[], &room, 1, Vec2::ZERO));
    }

    #[test]
    fn test_grid_rejected_query_leaves_no_trace() {
        let mut resolver = GridResolver::new(1.0);
        let room = make_room(1.0, &["#"]);
        resolver.commit(&room, 0, Vec2::ZERO);
        assert!(!resolver.accepts(&[], &room, 0, Vec2::ZERO));
        assert_eq!(resolver.state_at(0, (0, 0)), TileState::Full);
        assert_eq!(resolver.state_at(0, (1, 0)), TileState::Empty);
    }

    #[test]
    fn test_grid_partial_tiles_checked_by_edges() {
        let mut resolver = GridResolver::new(1.0);
        let room = make_room(0.4, &["+"]);
        resolver.commit(&room, 0, Vec2::ZERO);

        // Both partial in world tile (0, 0); outlines cross
        assert!(!resolver.accepts(&[], &room, 0, v(0.2, 0.2)));
        // Both partial in world tile (0, 0); outlines apart
        assert!(resolver.accepts(&[], &room, 0, v(0.45, 0.0)));

        resolver.commit(&room, 0, v(0.45, 0.0));
        assert_eq!(resolver.state_at(0, (0, 0)), TileState::Full);
    }

    #[test]
    fn test_grid_unaligned_overlap_rejected() {
        let mut resolver = GridResolver::new(1.0);
        let room = make_room(1.0, &["#"]);
        resolver.commit(&room, 0, Vec2::ZERO);

        // Overlaps by 0.4; world tile (0, 0) is full on one side
        assert!(!resolver.accepts(&[], &room, 0, v(0.6, 0.0)));
        assert!(!resolver.accepts(&[], &room, 0, v(-0.6, 0.3)));
        assert!(resolver.accepts(&[], &room, 0, v(1.0, 0.4)));
    }

    #[test]
    fn test_grid_straddling_rooms_resolved_by_edges() {
        let mut resolver = GridResolver::new(1.0);
        let room = make_room(1.0, &["#"]);
        resolver.commit(&room, 0, v(0.5, 0.0));
        assert_eq!(resolver.state_at(0, (0, 0)), TileState::Partial);
        assert_eq!(resolver.state_at(0, (1, 0)), TileState::Partial);

        // Walls cross inside world tile (1, 0)
        assert!(!resolver.accepts(&[], &room, 0, v(1.2, 0.3)));
        // Shares world tile (1, 0) without touching
        assert!(resolver.accepts(&[], &room, 0, v(1.6, 0.3)));

        resolver.commit(&room, 0, v(1.6, 0.3));
        assert_eq!(resolver.state_at(0, (1, 0)), TileState::Full);
        assert_eq!(resolver.state_at(0, (2, 1)), TileState::Partial);
    }

    #[test]
    fn test_grid_agrees_with_outline_check() {
        let mut grid = GridResolver::new(1.0);
        let polygon = PolygonResolver::new(100.0);
        let anchor = make_placed(1.0, v(0.5, 0.0));
        grid.commit(&anchor, 0, v(0.5, 0.0));
        let placed = vec![anchor];
        let candidate = make_room(1.0, &["#"]);

        for offset in [v(1.2, 0.3), v(0.9, -0.7), v(-0.3, 0.5), v(1.6, 0.3), v(-0.6, -1.2)] {
            let overlapping = !polygon.accepts(&placed, &candidate, 0, offset);
            if overlapping {
                assert!(!grid.accepts(&placed, &candidate, 0, offset), "{:?}", offset);
            }
        }
    }

    #[test]
    fn test_partial_over_empty_stays_partial() {
        let mut resolver = GridResolver::new(1.0);
        let room = make_room(1.0, &["+"]);
        resolver.commit(&room, 0, v(1.0, 0.0));
        assert_eq!(resolver.state_at(0, (1, 0)), TileState::Partial);
        assert_eq!(resolver.state_at(0, (0, 0)), TileState::Empty);
    }

    #[test]
    fn test_resolver_for_strategy() {
        let config = BoundaryConfig::default();
        let placed = vec![make_placed(1.0, Vec2::ZERO)];
        let candidate = make_room(1.0, &["#"]);
        let polygon = resolver_for(CollisionStrategy::Polygon, &config);
        assert!(!polygon.accepts(&placed, &candidate, 0, v(0.5, 0.5)));
    }
}
