use serde::{Deserialize, Serialize};

use crate::types::{AntimeridianStrategy, GeometrySource};

/// Item creation options suitable for config files and CLI flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemOptions {
    pub geometry: GeometrySource,
    /// If true, every sibling COG must exist before the item is built
    pub check_existence: bool,
    pub antimeridian_strategy: AntimeridianStrategy,
    /// Footprint simplification tolerance in degrees; None means the default
    /// for raster footprints and no simplification for CMR polygons
    pub simplify_tolerance: Option<f64>,
}

impl Default for ItemOptions {
    fn default() -> Self {
        Self {
            geometry: GeometrySource::Raster,
            check_existence: false,
            antimeridian_strategy: AntimeridianStrategy::Split,
            simplify_tolerance: None,
        }
    }
}
