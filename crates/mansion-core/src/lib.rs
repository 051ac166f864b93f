//! Mansion Core - Procedural Mansion Generation
//!
//! Assembles a multi-floor building from a catalogue of prefabricated room
//! shapes by attaching new rooms to the open doorways of rooms already
//! placed, rejecting any position that overlaps the existing layout.
//!
//! # Architecture
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `geometry` | Segment intersection, ray parity, point loops, Bezier sampling |
//! | `boundary` | Floor outlines, occupancy grids, partial-cell edge sets |
//! | `doorway` | Doorway derivation and facing test |
//! | `room` | Templates, built floors, prefabs, placed room instances |
//! | `catalogue` | Template validation and JSON loading |
//! | `collision` | Polygon and grid collision resolvers |
//! | `placement` | Seeded placement search and the generated layout |
//! | `config` | Generation settings and their validation |
//! | `validation` | Post-generation layout checks |
//! | `persistence` | Binary save/load of layouts |
//!
//! # Example
//!
//! ```rust,no_run
//! use mansion_core::prelude::*;
//!
//! let json = std::fs::read_to_string("data/room_catalogue.json").unwrap();
//! let config = GenerationConfig {
//!     seed: Some(7),
//!     ..Default::default()
//! };
//! let catalogue = Catalogue::from_json(&json, &config.boundary).unwrap();
//! let layout = generate_mansion(&catalogue, &config).unwrap();
//! for room in &layout.rooms {
//!     println!("{} at {:?}", room.name, room.position);
//! }
//! ```

pub mod boundary;
pub mod catalogue;
pub mod collision;
pub mod config;
pub mod doorway;
pub mod error;
pub mod geometry;
pub mod persistence;
pub mod placement;
pub mod room;
pub mod validation;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::catalogue::Catalogue;
    pub use crate::config::{CollisionStrategy, GenerationConfig};
    pub use crate::error::GenerationError;
    pub use crate::geometry::Vec2;
    pub use crate::placement::{generate_mansion, MansionGenerator, MansionLayout};
    pub use crate::room::Room;
}
