//! Room templates, built floors, and placed room instances.
//!
//! A [`RoomTemplate`] is the authored input. Building it validates every
//! floor and derives the collision data once, producing a [`RoomPrefab`].
//! Generation spawns [`Room`] instances from prefabs; only a room's
//! placement and its doorway lists change after that.

use serde::{Deserialize, Serialize};

use crate::boundary::{
    classify_partial_cells, Boundary, BoundarySegment, PartialCell, TileBounds, TileGrid,
};
use crate::config::BoundaryConfig;
use crate::doorway::Doorway;
use crate::error::TemplateError;
use crate::geometry::{point_in_polygon_parity, Vec2};

// ── Authored data ───────────────────────────────────────────────────────

/// One authored floor: outline, paint grid and interior reference point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorTemplate {
    pub segments: Vec<BoundarySegment>,
    pub grid: TileGrid,
    /// Floor-local position of tile (0, 0)'s bottom-left corner.
    #[serde(default)]
    pub grid_offset: Vec2,
    pub interior_point: Vec2,
}

/// An authored room shape, floor 0 first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub name: String,
    pub floors: Vec<FloorTemplate>,
}

// ── Built floors ────────────────────────────────────────────────────────

/// A validated floor with its derived collision data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Floor {
    /// Level relative to the room's floor 0.
    pub index: usize,
    pub boundary: Boundary,
    pub grid: TileGrid,
    pub grid_offset: Vec2,
    pub bounds: Option<TileBounds>,
    pub interior_point: Vec2,
    /// Closed, deduplicated outline points (first == last).
    pub collision_loop: Vec<Vec2>,
    /// Doorways still available for attachment.
    pub doorways: Vec<Doorway>,
    /// Doorways consumed by a join.
    pub closed: Vec<Doorway>,
    pub partial_cells: Vec<PartialCell>,
}

impl Floor {
    pub fn build(
        template_name: &str,
        index: usize,
        template: &FloorTemplate,
        config: &BoundaryConfig,
    ) -> Result<Self, TemplateError> {
        let boundary = Boundary::new(template.segments.clone());
        if boundary.len() < 3 {
            return Err(TemplateError::TooFewSegments {
                template: template_name.to_string(),
                floor: index,
                count: boundary.len(),
            });
        }
        if let Some(segment) = boundary.first_open_segment(config.dedup_epsilon) {
            return Err(TemplateError::OpenLoop {
                template: template_name.to_string(),
                floor: index,
                segment,
            });
        }
        let grid = template.grid.clone();
        if grid.width() == 0 || grid.height() == 0 {
            return Err(TemplateError::InvalidGrid {
                template: template_name.to_string(),
                floor: index,
                width: grid.width(),
                height: grid.height(),
            });
        }

        let collision_loop = boundary.collision_loop(config);
        // A closed loop repeats its first point
        if collision_loop.len() < 4 {
            return Err(TemplateError::DegenerateLoop {
                template: template_name.to_string(),
                floor: index,
                points: collision_loop.len().saturating_sub(1),
            });
        }
        if !point_in_polygon_parity(template.interior_point, &collision_loop, config.ray_length) {
            return Err(TemplateError::InteriorPointOutside {
                template: template_name.to_string(),
                floor: index,
            });
        }

        let doorways = boundary
            .door_segments()
            .map(|(segment, start, end)| Doorway::derive(segment, start, end))
            .collect();
        let partial_cells = classify_partial_cells(
            &grid,
            template.grid_offset,
            config.tile_size,
            &collision_loop,
        );

        Ok(Self {
            index,
            bounds: grid.bounds(),
            boundary,
            grid,
            grid_offset: template.grid_offset,
            interior_point: template.interior_point,
            collision_loop,
            doorways,
            closed: Vec::new(),
            partial_cells,
        })
    }

    /// Collision loop translated by `offset`.
    pub fn loop_at(&self, offset: Vec2) -> Vec<Vec2> {
        self.collision_loop.iter().map(|&p| p + offset).collect()
    }

    pub fn interior_at(&self, offset: Vec2) -> Vec2 {
        self.interior_point + offset
    }

    /// Remove the doorway on `segment` from the open list. Returns false if it
    /// was already closed.
    pub fn close_doorway(&mut self, segment: usize) -> bool {
        let Some(i) = self.doorways.iter().position(|d| d.segment == segment) else {
            return false;
        };
        let door = self.doorways.remove(i);
        self.closed.push(door);
        true
    }
}

// ── Prefabs and instances ───────────────────────────────────────────────

/// A built template, ready to spawn rooms from.
#[derive(Debug, Clone)]
pub struct RoomPrefab {
    pub name: String,
    pub floors: Vec<Floor>,
}

impl RoomPrefab {
    pub fn build(template: &RoomTemplate, config: &BoundaryConfig) -> Result<Self, TemplateError> {
        if template.floors.is_empty() {
            return Err(TemplateError::NoFloors {
                template: template.name.clone(),
            });
        }
        let floors = template
            .floors
            .iter()
            .enumerate()
            .map(|(i, f)| Floor::build(&template.name, i, f, config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: template.name.clone(),
            floors,
        })
    }

    /// A fresh, unplaced instance. `prefab` is this prefab's catalogue index.
    pub fn spawn(&self, prefab: usize) -> Room {
        Room {
            name: self.name.clone(),
            prefab,
            floors: self.floors.clone(),
            position: None,
            elevation: 0.0,
            assigned_floor: None,
            finalized: false,
        }
    }
}

/// A room instance in a generated layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    /// Catalogue index of the prefab this room was spawned from.
    pub prefab: usize,
    pub floors: Vec<Floor>,
    /// World position of the floor-local origin, set once on placement.
    pub position: Option<Vec2>,
    pub elevation: f32,
    /// Global floor occupied by this room's floor 0, set once on placement.
    pub assigned_floor: Option<u32>,
    pub finalized: bool,
}

impl Room {
    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    pub fn floor(&self, i: usize) -> Option<&Floor> {
        self.floors.get(i)
    }

    /// Open doorways of local floor `i` (empty if there is no such floor).
    pub fn open_doorways(&self, i: usize) -> &[Doorway] {
        self.floors.get(i).map(|f| f.doorways.as_slice()).unwrap_or(&[])
    }

    /// Permanently consume the doorway on `segment` of local floor `i`.
    /// Closing an already-closed doorway does nothing.
    pub fn close_doorway(&mut self, i: usize, segment: usize) -> bool {
        self.floors.get_mut(i).is_some_and(|f| f.close_doorway(segment))
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    /// Fix the room in the world. Placement happens exactly once.
    pub fn place(&mut self, position: Vec2, elevation: f32, global_floor: u32) {
        debug_assert!(!self.is_placed(), "room '{}' placed twice", self.name);
        self.position = Some(position);
        self.elevation = elevation;
        self.assigned_floor = Some(global_floor);
    }

    pub fn world_position(&self) -> Vec2 {
        self.position.unwrap_or(Vec2::ZERO)
    }

    /// Global floors this room occupies (empty until placed).
    pub fn global_floors(&self) -> std::ops::Range<u32> {
        match self.assigned_floor {
            Some(base) => base..base + self.floors.len() as u32,
            None => 0..0,
        }
    }

    /// Local floor index that sits on `global`, if the room reaches it.
    pub fn local_floor(&self, global: u32) -> Option<usize> {
        let base = self.assigned_floor?;
        let local = global.checked_sub(base)? as usize;
        (local < self.floors.len()).then_some(local)
    }

    /// World-space collision loop of local floor `i`.
    pub fn world_loop(&self, i: usize) -> Vec<Vec2> {
        self.floors
            .get(i)
            .map(|f| f.loop_at(self.world_position()))
            .unwrap_or_default()
    }

    pub fn world_interior_point(&self, i: usize) -> Option<Vec2> {
        self.floors.get(i).map(|f| f.interior_at(self.world_position()))
    }

    /// Recompute derived doorway data and mark the room done.
    pub fn finalize(&mut self) {
        for floor in &mut self.floors {
            for door in &mut floor.doorways {
                door.refresh();
            }
        }
        self.finalized = true;
    }
}
