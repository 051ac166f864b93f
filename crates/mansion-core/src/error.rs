//! Error types for catalogue building and generation runs.
//!
//! Placement failures are not errors: a room that cannot be attached is
//! discarded and counted in [`crate::placement::PlacementStats`].

use crate::config::ConfigError;

/// A defect in an authored room template. Fatal for that template only.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// Template has no floors at all.
    NoFloors { template: String },
    /// Boundary loop shorter than a triangle.
    TooFewSegments {
        template: String,
        floor: usize,
        count: usize,
    },
    /// A segment's explicit end point is not the next segment's start.
    OpenLoop {
        template: String,
        floor: usize,
        segment: usize,
    },
    /// Occupancy grid with a zero dimension.
    InvalidGrid {
        template: String,
        floor: usize,
        width: usize,
        height: usize,
    },
    /// Fewer than three distinct collision points after dedup.
    DegenerateLoop {
        template: String,
        floor: usize,
        points: usize,
    },
    /// Interior reference point fails the parity test against its own outline.
    InteriorPointOutside { template: String, floor: usize },
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::NoFloors { template } => {
                write!(f, "Template '{}' has no floors", template)
            }
            TemplateError::TooFewSegments {
                template,
                floor,
                count,
            } => write!(
                f,
                "Template '{}' floor {}: boundary has {} segments (need at least 3)",
                template, floor, count
            ),
            TemplateError::OpenLoop {
                template,
                floor,
                segment,
            } => write!(
                f,
                "Template '{}' floor {}: segment {} does not end where the next one starts",
                template, floor, segment
            ),
            TemplateError::InvalidGrid {
                template,
                floor,
                width,
                height,
            } => write!(
                f,
                "Template '{}' floor {}: invalid grid dimensions {}×{}",
                template, floor, width, height
            ),
            TemplateError::DegenerateLoop {
                template,
                floor,
                points,
            } => write!(
                f,
                "Template '{}' floor {}: collision loop collapsed to {} points",
                template, floor, points
            ),
            TemplateError::InteriorPointOutside { template, floor } => write!(
                f,
                "Template '{}' floor {}: interior point lies outside the outline",
                template, floor
            ),
        }
    }
}

impl std::error::Error for TemplateError {}

/// Errors loading a room catalogue.
#[derive(Debug)]
pub enum CatalogueError {
    /// Malformed JSON, unknown segment kind or bad grid rows.
    Parse(serde_json::Error),
}

impl From<serde_json::Error> for CatalogueError {
    fn from(e: serde_json::Error) -> Self {
        CatalogueError::Parse(e)
    }
}

impl std::fmt::Display for CatalogueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogueError::Parse(e) => write!(f, "Catalogue parse error: {}", e),
        }
    }
}

impl std::error::Error for CatalogueError {}

/// Errors that stop a generation run before any room is placed.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    InvalidConfig(Vec<ConfigError>),
    /// No template survived validation.
    EmptyCatalogue,
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::InvalidConfig(errors) => {
                write!(f, "Invalid generation config: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
            GenerationError::EmptyCatalogue => write!(f, "Room catalogue has no usable templates"),
        }
    }
}

impl std::error::Error for GenerationError {}
