//! Room template catalogue.
//!
//! Templates are validated one by one: a defective template is rejected and
//! reported, the rest of the catalogue stays usable.

use crate::config::BoundaryConfig;
use crate::error::{CatalogueError, TemplateError};
use crate::room::{RoomPrefab, RoomTemplate};

/// Built prefabs plus the templates that failed to build.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    prefabs: Vec<RoomPrefab>,
    rejected: Vec<TemplateError>,
}

impl Catalogue {
    pub fn build(templates: &[RoomTemplate], config: &BoundaryConfig) -> Self {
        let mut catalogue = Catalogue::default();
        for template in templates {
            match RoomPrefab::build(template, config) {
                Ok(prefab) => catalogue.prefabs.push(prefab),
                Err(e) => {
                    log::warn!("Rejected room template: {}", e);
                    catalogue.rejected.push(e);
                }
            }
        }
        log::info!(
            "Room catalogue: {} templates usable, {} rejected",
            catalogue.prefabs.len(),
            catalogue.rejected.len()
        );
        catalogue
    }

    /// Parse a JSON array of templates and build them.
    pub fn from_json(json: &str, config: &BoundaryConfig) -> Result<Self, CatalogueError> {
        let templates: Vec<RoomTemplate> = serde_json::from_str(json)?;
        Ok(Catalogue::build(&templates, config))
    }

    pub fn prefabs(&self) -> &[RoomPrefab] {
        &self.prefabs
    }

    pub fn rejected(&self) -> &[TemplateError] {
        &self.rejected
    }

    pub fn get(&self, index: usize) -> Option<&RoomPrefab> {
        self.prefabs.get(index)
    }

    pub fn find(&self, name: &str) -> Option<(usize, &RoomPrefab)> {
        self.prefabs.iter().enumerate().find(|(_, p)| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r###"{
        "name": "square",
        "floors": [{
            "segments": [
                { "kind": "straight", "start": { "x": 0.0, "y": 0.0 } },
                { "kind": "door", "start": { "x": 0.0, "y": 1.0 } },
                { "kind": "straight", "start": { "x": 1.0, "y": 1.0 } },
                { "kind": "straight", "start": { "x": 1.0, "y": 0.0 } }
            ],
            "grid": ["##", "##"],
            "interior_point": { "x": 0.47, "y": 0.53 }
        }]
    }"###;

    const BROKEN: &str = r###"{
        "name": "sliver",
        "floors": [{
            "segments": [
                { "kind": "straight", "start": { "x": 0.0, "y": 0.0 } },
                { "kind": "door", "start": { "x": 0.0, "y": 1.0 } }
            ],
            "grid": ["#"],
            "interior_point": { "x": 0.1, "y": 0.5 }
        }]
    }"###;

    #[test]
    fn test_from_json_keeps_valid_templates() {
        let json = format!("[{}, {}]", SQUARE, BROKEN);
        let catalogue = Catalogue::from_json(&json, &BoundaryConfig::default()).unwrap();
        assert_eq!(catalogue.len(), 1);
        assert_eq!(catalogue.rejected().len(), 1);
        assert!(matches!(
            catalogue.rejected()[0],
            TemplateError::TooFewSegments { count: 2, .. }
        ));
        let (index, prefab) = catalogue.find("square").unwrap();
        assert_eq!(index, 0);
        assert_eq!(catalogue.get(index).map(|p| p.name.as_str()), Some("square"));
        assert_eq!(prefab.floors[0].doorways.len(), 1);
    }

    #[test]
    fn test_unknown_segment_kind_is_parse_error() {
        let json = format!("[{}]", SQUARE.replace("\"door\"", "\"window\""));
        let result = Catalogue::from_json(&json, &BoundaryConfig::default());
        assert!(matches!(result, Err(CatalogueError::Parse(_))));
    }

    #[test]
    fn test_bad_grid_row_is_parse_error() {
        let json = format!("[{}]", SQUARE.replace("[\"##\", \"##\"]", "[\"##\", \"#\"]"));
        let result = Catalogue::from_json(&json, &BoundaryConfig::default());
        assert!(matches!(result, Err(CatalogueError::Parse(_))));
    }
}
