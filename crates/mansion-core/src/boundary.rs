//! Floor outlines and occupancy grids.
//!
//! A floor's outline is a closed loop of [`BoundarySegment`]s stored as an
//! index-addressed array: segment `i` ends where segment `(i + 1) % n`
//! starts. The loop is flattened into a point sequence for polygon collision,
//! and the authored [`TileGrid`] is annotated with the loop edges that pass
//! through each partial tile.
//!
//! # Grid text form
//!
//! Grids are authored as rows of characters, bottom row first:
//!
//! ```text
//! row 0 (y = 0)   "##++"
//! row 1 (y = 1)   "#+.."
//! ```
//!
//! `.` is empty, `+` partial, `#` full.

use serde::{Deserialize, Serialize};

use crate::config::BoundaryConfig;
use crate::geometry::{bezier_points, dedup_consecutive_points, segment_intersects_rect, Rect, Vec2};

/// What kind of edge a boundary segment is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Straight,
    /// A doorway; other rooms attach here.
    Door,
    /// Cubic Bezier from this segment's start to the next one's start.
    Curve {
        start_handle: Vec2,
        end_handle: Vec2,
    },
}

/// One edge of a floor outline, in floor-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundarySegment {
    pub kind: SegmentKind,
    pub start: Vec2,
    /// Optional authored end point. When present it must match the next
    /// segment's start; the loop itself always uses the next start.
    #[serde(default)]
    pub end: Option<Vec2>,
}

impl BoundarySegment {
    pub fn straight(start: Vec2) -> Self {
        Self {
            kind: SegmentKind::Straight,
            start,
            end: None,
        }
    }

    pub fn door(start: Vec2) -> Self {
        Self {
            kind: SegmentKind::Door,
            start,
            end: None,
        }
    }

    pub fn curve(start: Vec2, start_handle: Vec2, end_handle: Vec2) -> Self {
        Self {
            kind: SegmentKind::Curve {
                start_handle,
                end_handle,
            },
            start,
            end: None,
        }
    }
}

/// A closed loop of boundary segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    segments: Vec<BoundarySegment>,
}

impl Boundary {
    pub fn new(segments: Vec<BoundarySegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[BoundarySegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End point of segment `i`: the start of the next segment, wrapping.
    pub fn end_of(&self, i: usize) -> Vec2 {
        self.segments[(i + 1) % self.segments.len()].start
    }

    /// Index of the first segment whose authored end does not match the next
    /// segment's start.
    pub fn first_open_segment(&self, epsilon: f32) -> Option<usize> {
        (0..self.segments.len()).find(|&i| {
            self.segments[i]
                .end
                .is_some_and(|end| !end.approx_eq(self.end_of(i), epsilon))
        })
    }

    /// Points segment `i` contributes to the collision loop.
    pub fn segment_points(&self, i: usize, bezier_divisions: usize) -> Vec<Vec2> {
        let seg = &self.segments[i];
        let end = self.end_of(i);
        match seg.kind {
            SegmentKind::Straight | SegmentKind::Door => vec![seg.start, end],
            SegmentKind::Curve {
                start_handle,
                end_handle,
            } => bezier_points(seg.start, start_handle, end_handle, end, bezier_divisions),
        }
    }

    /// Flattened, deduplicated, closed point loop (first == last).
    pub fn collision_loop(&self, config: &BoundaryConfig) -> Vec<Vec2> {
        let mut points: Vec<Vec2> = (0..self.segments.len())
            .flat_map(|i| self.segment_points(i, config.bezier_divisions))
            .collect();
        dedup_consecutive_points(&mut points, config.dedup_epsilon);
        points
    }

    /// `(segment index, start, end)` for every door segment.
    pub fn door_segments(&self) -> impl Iterator<Item = (usize, Vec2, Vec2)> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == SegmentKind::Door)
            .map(move |(i, s)| (i, s.start, self.end_of(i)))
    }
}

// ── Occupancy grid ──────────────────────────────────────────────────────

/// Coverage of one grid tile by the floor outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileState {
    #[default]
    Empty,
    Partial,
    Full,
}

impl TileState {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(TileState::Empty),
            '+' => Some(TileState::Partial),
            '#' => Some(TileState::Full),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            TileState::Empty => '.',
            TileState::Partial => '+',
            TileState::Full => '#',
        }
    }
}

/// Dense `width × height` grid of tile states, indexed `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<TileState>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![TileState::Empty; width * height],
        }
    }

    /// Parse the text form (bottom row first). Rows must all be the same
    /// length and use only `.`, `+`, `#`.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, String> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        let mut grid = TileGrid::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(format!(
                    "grid row {} has {} tiles, expected {}",
                    y,
                    row.chars().count(),
                    width
                ));
            }
            for (x, c) in row.chars().enumerate() {
                let state = TileState::from_char(c)
                    .ok_or_else(|| format!("grid row {} has invalid tile '{}'", y, c))?;
                grid.set(x, y, state);
            }
        }
        Ok(grid)
    }

    /// Text form, bottom row first.
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| (0..self.width).map(|x| self.get(x, y).to_char()).collect())
            .collect()
    }

    /// Multi-line dump, top row first, for logs.
    pub fn dump(&self) -> String {
        let mut rows = self.to_rows();
        rows.reverse();
        rows.join("\n")
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> TileState {
        self.cells[x * self.height + y]
    }

    /// Like [`TileGrid::get`], but tiles outside the grid read as empty.
    pub fn tile(&self, x: i32, y: i32) -> TileState {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return TileState::Empty;
        }
        self.get(x as usize, y as usize)
    }

    pub fn set(&mut self, x: usize, y: usize, state: TileState) {
        self.cells[x * self.height + y] = state;
    }

    /// Tightest box around every non-empty tile, or `None` for an empty grid.
    pub fn bounds(&self) -> Option<TileBounds> {
        let occupied = |x: usize, y: usize| self.get(x, y) != TileState::Empty;
        let column_used = |x: usize| (0..self.height).any(|y| occupied(x, y));
        let row_used = |y: usize| (0..self.width).any(|x| occupied(x, y));

        let left = (0..self.width).find(|&x| column_used(x))?;
        let right = (0..self.width).rev().find(|&x| column_used(x))?;
        let bottom = (0..self.height).find(|&y| row_used(y))?;
        let top = (0..self.height).rev().find(|&y| row_used(y))?;
        Some(TileBounds {
            left,
            right,
            bottom,
            top,
        })
    }

    /// All `(x, y, state)` tiles inside `bounds` that are not empty.
    pub fn occupied_in(&self, bounds: TileBounds) -> impl Iterator<Item = (usize, usize, TileState)> + '_ {
        (bounds.left..=bounds.right).flat_map(move |x| {
            (bounds.bottom..=bounds.top).filter_map(move |y| {
                let state = self.get(x, y);
                (state != TileState::Empty).then_some((x, y, state))
            })
        })
    }
}

impl TryFrom<Vec<String>> for TileGrid {
    type Error = String;

    fn try_from(rows: Vec<String>) -> Result<Self, Self::Error> {
        TileGrid::from_rows(&rows)
    }
}

impl From<TileGrid> for Vec<String> {
    fn from(grid: TileGrid) -> Self {
        grid.to_rows()
    }
}

/// Inclusive tile index bounds of a grid's occupied region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileBounds {
    pub left: usize,
    pub right: usize,
    pub bottom: usize,
    pub top: usize,
}

// ── Partial cells ───────────────────────────────────────────────────────

/// One edge of a collision loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: Vec2,
    pub b: Vec2,
}

impl Edge {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    pub fn translated(self, offset: Vec2) -> Edge {
        Edge::new(self.a + offset, self.b + offset)
    }
}

/// A partial tile and the loop edges passing through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialCell {
    pub x: usize,
    pub y: usize,
    pub edges: Vec<Edge>,
}

/// Floor-local rectangle covered by tile `(x, y)`.
pub fn tile_rect(x: usize, y: usize, grid_offset: Vec2, tile_size: f32) -> Rect {
    Rect::new(
        grid_offset.x + x as f32 * tile_size,
        grid_offset.y + y as f32 * tile_size,
        tile_size,
        tile_size,
    )
}

/// For every partial tile, collect the loop edges that touch its rectangle.
/// The result is ordered by `(x, y)`.
///
/// Consecutive edges meeting at a corner are both kept. Recorded edges are
/// only ever tested against another room's edges, never against their own
/// loop, so a shared vertex cannot register as a crossing.
pub fn classify_partial_cells(
    grid: &TileGrid,
    grid_offset: Vec2,
    tile_size: f32,
    collision_loop: &[Vec2],
) -> Vec<PartialCell> {
    let Some(bounds) = grid.bounds() else {
        return Vec::new();
    };

    grid.occupied_in(bounds)
        .filter(|&(_, _, state)| state == TileState::Partial)
        .map(|(x, y, _)| {
            let rect = tile_rect(x, y, grid_offset, tile_size);
            let edges = collision_loop
                .windows(2)
                .filter(|w| segment_intersects_rect(w[0], w[1], &rect))
                .map(|w| Edge::new(w[0], w[1]))
                .collect();
            PartialCell { x, y, edges }
        })
        .collect()
}
