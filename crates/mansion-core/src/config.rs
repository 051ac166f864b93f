//! Generation configuration.
//!
//! `GenerationConfig` carries every tunable of a generation run. It is plain
//! serde data so a harness can load it from JSON; `validate_config` reports
//! every problem at once instead of failing on the first.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Which collision strategy the placement search uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionStrategy {
    /// Edge crossing + interior-point parity against every overlapping room.
    #[default]
    Polygon,
    /// Global per-floor occupancy grid with partial-cell edge checks.
    Grid,
}

/// Settings for turning authored outlines into collision data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Points emitted per curved segment.
    pub bezier_divisions: usize,
    /// Side length of one occupancy-grid tile in world units.
    pub tile_size: f32,
    /// Two collision points closer than this are the same point.
    pub dedup_epsilon: f32,
    /// Minimum length of the parity ray used for containment tests.
    pub ray_length: f32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            bezier_divisions: 16,
            tile_size: 0.1,
            dedup_epsilon: 1e-5,
            ray_length: 100.0,
        }
    }
}

/// Configuration for one mansion generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed (None = derive from the current time).
    pub seed: Option<u64>,
    /// Number of global floors to generate.
    pub floor_count: u32,
    /// Rooms requested per floor, indexed by global floor.
    pub rooms_per_floor: Vec<u32>,
    /// Attempts before a room is discarded.
    pub place_attempts: u32,
    /// Lower bound of the outward gap between joined doorways.
    pub min_gap: f32,
    /// Upper bound (exclusive) of the outward gap.
    pub max_gap: f32,
    /// Tolerance in degrees when checking that two doors face each other.
    pub angle_epsilon: f32,
    /// Elevation step between global floors.
    pub floor_height: f32,
    pub collision: CollisionStrategy,
    /// Also require joined doorways to have the same width.
    pub match_door_width: bool,
    pub width_epsilon: f32,
    pub boundary: BoundaryConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            floor_count: 1,
            rooms_per_floor: vec![10],
            place_attempts: 10,
            min_gap: 0.00001,
            max_gap: 0.0001,
            angle_epsilon: 0.001,
            floor_height: 1.0,
            collision: CollisionStrategy::Polygon,
            match_door_width: false,
            width_epsilon: 0.001,
            boundary: BoundaryConfig::default(),
        }
    }
}

impl GenerationConfig {
    /// Requested room count for a global floor (0 past the configured list).
    pub fn rooms_on_floor(&self, floor: u32) -> u32 {
        self.rooms_per_floor.get(floor as usize).copied().unwrap_or(0)
    }

    /// The seed this run will use: `override_seed`, then the configured
    /// seed, then the current time.
    pub fn resolve_seed(&self, override_seed: Option<u64>) -> u64 {
        override_seed.or(self.seed).unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No floors requested.
    NoFloors,
    /// `rooms_per_floor` shorter than `floor_count`.
    MissingRoomCounts { floors: u32, counts: usize },
    /// Attempt budget of zero.
    NoPlaceAttempts,
    /// Gap bounds negative or inverted.
    InvalidGapRange { min: f32, max: f32 },
    NegativeAngleEpsilon(f32),
    NegativeWidthEpsilon(f32),
    InvalidFloorHeight(f32),
    InvalidTileSize(f32),
    /// Curves need at least both endpoints.
    TooFewBezierDivisions(usize),
    InvalidRayLength(f32),
    NegativeDedupEpsilon(f32),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoFloors => write!(f, "floor_count must be at least 1"),
            ConfigError::MissingRoomCounts { floors, counts } => write!(
                f,
                "rooms_per_floor has {} entries but {} floors are requested",
                counts, floors
            ),
            ConfigError::NoPlaceAttempts => write!(f, "place_attempts must be at least 1"),
            ConfigError::InvalidGapRange { min, max } => {
                write!(f, "invalid gap range [{}, {})", min, max)
            }
            ConfigError::NegativeAngleEpsilon(e) => write!(f, "angle_epsilon {} is negative", e),
            ConfigError::NegativeWidthEpsilon(e) => write!(f, "width_epsilon {} is negative", e),
            ConfigError::InvalidFloorHeight(h) => write!(f, "floor_height {} must be > 0", h),
            ConfigError::InvalidTileSize(s) => write!(f, "tile_size {} must be > 0", s),
            ConfigError::TooFewBezierDivisions(n) => {
                write!(f, "bezier_divisions {} must be at least 2", n)
            }
            ConfigError::InvalidRayLength(l) => write!(f, "ray_length {} must be > 0", l),
            ConfigError::NegativeDedupEpsilon(e) => write!(f, "dedup_epsilon {} is negative", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate a generation configuration, returning all errors found.
pub fn validate_config(config: &GenerationConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.floor_count == 0 {
        errors.push(ConfigError::NoFloors);
    }
    if config.rooms_per_floor.len() < config.floor_count as usize {
        errors.push(ConfigError::MissingRoomCounts {
            floors: config.floor_count,
            counts: config.rooms_per_floor.len(),
        });
    }
    if config.place_attempts == 0 {
        errors.push(ConfigError::NoPlaceAttempts);
    }
    if config.min_gap < 0.0 || config.max_gap < config.min_gap {
        errors.push(ConfigError::InvalidGapRange {
            min: config.min_gap,
            max: config.max_gap,
        });
    }
    if config.angle_epsilon < 0.0 {
        errors.push(ConfigError::NegativeAngleEpsilon(config.angle_epsilon));
    }
    if config.width_epsilon < 0.0 {
        errors.push(ConfigError::NegativeWidthEpsilon(config.width_epsilon));
    }
    if config.floor_height <= 0.0 {
        errors.push(ConfigError::InvalidFloorHeight(config.floor_height));
    }

    let b = &config.boundary;
    if b.tile_size <= 0.0 {
        errors.push(ConfigError::InvalidTileSize(b.tile_size));
    }
    if b.bezier_divisions < 2 {
        errors.push(ConfigError::TooFewBezierDivisions(b.bezier_divisions));
    }
    if b.ray_length <= 0.0 {
        errors.push(ConfigError::InvalidRayLength(b.ray_length));
    }
    if b.dedup_epsilon < 0.0 {
        errors.push(ConfigError::NegativeDedupEpsilon(b.dedup_epsilon));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let errors = validate_config(&GenerationConfig::default());
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_missing_room_counts() {
        let config = GenerationConfig {
            floor_count: 3,
            rooms_per_floor: vec![5, 5],
            ..Default::default()
        };
        let errors = validate_config(&config);
        assert_eq!(
            errors,
            vec![ConfigError::MissingRoomCounts {
                floors: 3,
                counts: 2
            }]
        );
    }

    #[test]
    fn test_inverted_gap_range() {
        let config = GenerationConfig {
            min_gap: 0.5,
            max_gap: 0.1,
            ..Default::default()
        };
        let errors = validate_config(&config);
        assert!(matches!(errors[0], ConfigError::InvalidGapRange { .. }));
    }

    #[test]
    fn test_multiple_errors_reported() {
        let mut config = GenerationConfig {
            floor_count: 0,
            place_attempts: 0,
            ..Default::default()
        };
        config.boundary.tile_size = 0.0;
        config.boundary.bezier_divisions = 1;
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_resolve_seed_precedence() {
        let config = GenerationConfig {
            seed: Some(7),
            ..Default::default()
        };
        assert_eq!(config.resolve_seed(Some(3)), 3);
        assert_eq!(config.resolve_seed(None), 7);
    }

    #[test]
    fn test_rooms_on_floor_past_list() {
        let config = GenerationConfig {
            rooms_per_floor: vec![4, 2],
            ..Default::default()
        };
        assert_eq!(config.rooms_on_floor(1), 2);
        assert_eq!(config.rooms_on_floor(5), 0);
    }

    #[test]
    fn test_strategy_serializes_snake_case() {
        let config = GenerationConfig {
            collision: CollisionStrategy::Grid,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"grid\""));
    }
}
