//! Placement search - grows a mansion one global floor at a time.
//!
//! Every room after the first on a floor is attached to an open doorway of a
//! room already reaching that floor. One attempt draws, in this order, an
//! anchor room, one of its open doorways, one doorway of the new room, and
//! the gap between the two doors. The RNG is seeded once per run and only
//! consumed here, so a seed fully determines the layout.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::catalogue::Catalogue;
use crate::collision::{resolver_for, CollisionResolver};
use crate::config::{validate_config, GenerationConfig};
use crate::doorway::{doorways_compatible, widths_match};
use crate::error::GenerationError;
use crate::geometry::Vec2;
use crate::room::Room;

/// Counters describing how a run went.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementStats {
    /// Attachment attempts made (bootstraps excluded).
    pub attempts: u32,
    /// Attempts whose anchor floor had no open doorway.
    pub wasted_anchors: u32,
    /// Attempts where the new room had no open doorway on floor 0.
    pub missing_doorways: u32,
    /// Door pairs that did not face each other (or differed in width).
    pub incompatible_pairs: u32,
    /// Candidate positions rejected by the collision resolver.
    pub collisions: u32,
    pub collision_queries: u32,
    pub placed: u32,
    pub discarded: u32,
}

/// Outcome of one global floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorReport {
    pub floor: u32,
    pub requested: u32,
    pub placed: u32,
    pub discarded: u32,
}

/// Result of a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MansionLayout {
    /// Seed the run actually used.
    pub seed: u64,
    /// Placed rooms in placement order.
    pub rooms: Vec<Room>,
    pub floors: Vec<FloorReport>,
    pub stats: PlacementStats,
}

impl MansionLayout {
    /// Rooms with any floor on `floor`.
    pub fn rooms_on_floor(&self, floor: u32) -> impl Iterator<Item = &Room> {
        self.rooms
            .iter()
            .filter(move |r| r.local_floor(floor).is_some())
    }

    /// `(world position, assigned floor)` per room, in placement order.
    pub fn positions(&self) -> Vec<(Vec2, u32)> {
        self.rooms
            .iter()
            .map(|r| (r.world_position(), r.assigned_floor.unwrap_or(0)))
            .collect()
    }

    pub fn open_doorway_count(&self) -> usize {
        self.rooms
            .iter()
            .flat_map(|r| &r.floors)
            .map(|f| f.doorways.len())
            .sum()
    }

    pub fn closed_doorway_count(&self) -> usize {
        self.rooms
            .iter()
            .flat_map(|r| &r.floors)
            .map(|f| f.closed.len())
            .sum()
    }
}

/// An accepted attachment, applied by `commit`.
#[derive(Debug, Clone, Copy)]
struct Join {
    anchor: usize,
    anchor_floor: usize,
    anchor_segment: usize,
    new_segment: usize,
    position: Vec2,
}

#[derive(Debug)]
enum Attempt {
    Joined(Join),
    WastedAnchor,
    MissingDoorway,
    Incompatible,
    Collision,
}

/// Stateful driver for one generation run.
pub struct MansionGenerator<'a> {
    catalogue: &'a Catalogue,
    config: &'a GenerationConfig,
    seed: u64,
    rng: StdRng,
    resolver: Box<dyn CollisionResolver>,
    rooms: Vec<Room>,
    floors: Vec<FloorReport>,
    stats: PlacementStats,
}

impl<'a> MansionGenerator<'a> {
    pub fn new(
        catalogue: &'a Catalogue,
        config: &'a GenerationConfig,
    ) -> Result<Self, GenerationError> {
        let errors = validate_config(config);
        if !errors.is_empty() {
            return Err(GenerationError::InvalidConfig(errors));
        }
        if catalogue.is_empty() {
            return Err(GenerationError::EmptyCatalogue);
        }

        let seed = config.resolve_seed(None);
        log::info!("Seed: {}", seed);

        Ok(Self {
            catalogue,
            config,
            seed,
            rng: StdRng::seed_from_u64(seed),
            resolver: resolver_for(config.collision, &config.boundary),
            rooms: Vec::new(),
            floors: Vec::new(),
            stats: PlacementStats::default(),
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn stats(&self) -> &PlacementStats {
        &self.stats
    }

    /// `(room index, local floor)` for every placed room reaching `floor`.
    fn anchors_on(&self, floor: u32) -> Vec<(usize, usize)> {
        self.rooms
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.local_floor(floor).map(|local| (i, local)))
            .collect()
    }

    /// Place the configured number of rooms on `floor`, then finalize them.
    pub fn generate_floor(&mut self, floor: u32) -> FloorReport {
        let requested = self.config.rooms_on_floor(floor);
        let first_new = self.rooms.len();
        let mut placed = 0;

        for _ in 0..requested {
            let index = self.rng.gen_range(0..self.catalogue.len());
            let Some(prefab) = self.catalogue.get(index) else {
                continue;
            };
            let room = prefab.spawn(index);
            if self.place_room(room, floor) {
                placed += 1;
            }
        }

        for room in &mut self.rooms[first_new..] {
            room.finalize();
        }

        let report = FloorReport {
            floor,
            requested,
            placed,
            discarded: requested - placed,
        };
        log::info!(
            "Floor {}: placed {}/{} rooms ({} discarded)",
            floor,
            report.placed,
            report.requested,
            report.discarded
        );
        self.floors.push(report.clone());
        report
    }

    /// Try to add `room` with its floor 0 on global `floor`. Returns false
    /// when the attempt budget runs out and the room is dropped.
    pub fn place_room(&mut self, room: Room, floor: u32) -> bool {
        let anchors = self.anchors_on(floor);
        if anchors.is_empty() {
            log::debug!("Floor {}: '{}' starts the floor at the origin", floor, room.name);
            self.commit(room, floor, Vec2::ZERO, None);
            return true;
        }

        for attempt in 1..=self.config.place_attempts {
            self.stats.attempts += 1;
            let outcome = try_attach(
                &mut self.rng,
                self.config,
                &self.rooms,
                &anchors,
                &room,
                floor,
                self.resolver.as_ref(),
            );
            match outcome {
                Attempt::Joined(join) => {
                    self.stats.collision_queries += 1;
                    self.commit(room, floor, join.position, Some(join));
                    return true;
                }
                Attempt::WastedAnchor => self.stats.wasted_anchors += 1,
                Attempt::MissingDoorway => self.stats.missing_doorways += 1,
                Attempt::Incompatible => self.stats.incompatible_pairs += 1,
                Attempt::Collision => {
                    self.stats.collision_queries += 1;
                    self.stats.collisions += 1;
                }
            }
            log::debug!("'{}' attempt {}: {:?}", room.name, attempt, outcome);
        }

        log::warn!(
            "Discarded '{}' on floor {} after {} attempts",
            room.name,
            floor,
            self.config.place_attempts
        );
        self.stats.discarded += 1;
        false
    }

    /// Fix the room in place and consume the joined doorways. Only called
    /// after the resolver accepted the position.
    fn commit(&mut self, mut room: Room, floor: u32, position: Vec2, join: Option<Join>) {
        self.resolver.commit(&room, floor, position);
        room.place(position, self.config.floor_height * floor as f32, floor);

        if let Some(join) = join {
            self.rooms[join.anchor].close_doorway(join.anchor_floor, join.anchor_segment);
            room.close_doorway(0, join.new_segment);
        }

        self.stats.placed += 1;
        self.rooms.push(room);
    }

    pub fn finish(self) -> MansionLayout {
        MansionLayout {
            seed: self.seed,
            rooms: self.rooms,
            floors: self.floors,
            stats: self.stats,
        }
    }
}

/// One attachment attempt. Never mutates placement state.
fn try_attach(
    rng: &mut impl Rng,
    config: &GenerationConfig,
    placed: &[Room],
    anchors: &[(usize, usize)],
    room: &Room,
    floor: u32,
    resolver: &dyn CollisionResolver,
) -> Attempt {
    let (anchor_index, anchor_floor) = anchors[rng.gen_range(0..anchors.len())];
    let anchor = &placed[anchor_index];
    let open = anchor.open_doorways(anchor_floor);
    if open.is_empty() {
        return Attempt::WastedAnchor;
    }
    let selected = open[rng.gen_range(0..open.len())];

    let candidates = room.open_doorways(0);
    if candidates.is_empty() {
        return Attempt::MissingDoorway;
    }
    let new_door = candidates[rng.gen_range(0..candidates.len())];

    if !doorways_compatible(&selected, &new_door, config.angle_epsilon) {
        return Attempt::Incompatible;
    }
    if config.match_door_width && !widths_match(&selected, &new_door, config.width_epsilon) {
        return Attempt::Incompatible;
    }

    let gap = if config.min_gap < config.max_gap {
        rng.gen_range(config.min_gap..config.max_gap)
    } else {
        config.min_gap
    };
    let anchor_end = anchor.world_position() + selected.end;
    let position = anchor_end - new_door.start + selected.outward() * gap;

    if !resolver.accepts(placed, room, floor, position) {
        return Attempt::Collision;
    }

    Attempt::Joined(Join {
        anchor: anchor_index,
        anchor_floor,
        anchor_segment: selected.segment,
        new_segment: new_door.segment,
        position,
    })
}

/// Run the full placement search over every configured floor.
pub fn generate_mansion(
    catalogue: &Catalogue,
    config: &GenerationConfig,
) -> Result<MansionLayout, GenerationError> {
    let mut generator = MansionGenerator::new(catalogue, config)?;
    for floor in 0..config.floor_count {
        generator.generate_floor(floor);
    }
    let layout = generator.finish();
    log::info!(
        "Generated {} rooms over {} floors ({} discarded)",
        layout.rooms.len(),
        config.floor_count,
        layout.stats.discarded
    );
    Ok(layout)
}
