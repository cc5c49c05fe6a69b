//! Shared types and enums used across hls-stac.
//! Includes `Product`, `GeometrySource` and `AntimeridianStrategy`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::constants::{
    INSTRUMENTS_L30, INSTRUMENTS_S30, L30_BANDS, S30_BANDS, SCIENTIFIC_L30, SCIENTIFIC_S30,
    Scientific,
};

/// HLS product family. `L30` is derived from Landsat 8/9 OLI/TIRS,
/// `S30` from Sentinel-2 MSI.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Product {
    L30,
    S30,
}

impl Product {
    pub const ALL: [Product; 2] = [Product::L30, Product::S30];

    /// Parse a product code as it appears in a granule filename.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "L30" => Some(Product::L30),
            "S30" => Some(Product::S30),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Product::L30 => "L30",
            Product::S30 => "S30",
        }
    }

    /// EO band table: (band code, asset key)
    pub fn bands(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Product::L30 => L30_BANDS,
            Product::S30 => S30_BANDS,
        }
    }

    /// Asset key for an EO band code, if the band belongs to this product
    pub fn asset_key(&self, band: &str) -> Option<&'static str> {
        self.bands()
            .iter()
            .find(|(code, _)| *code == band)
            .map(|(_, key)| *key)
    }

    pub fn is_eo_band(&self, band: &str) -> bool {
        self.asset_key(band).is_some()
    }

    pub fn instruments(&self) -> &'static [&'static str] {
        match self {
            Product::L30 => INSTRUMENTS_L30,
            Product::S30 => INSTRUMENTS_S30,
        }
    }

    pub fn scientific(&self) -> &'static Scientific {
        match self {
            Product::L30 => &SCIENTIFIC_L30,
            Product::S30 => &SCIENTIFIC_S30,
        }
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Where the item footprint comes from
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GeometrySource {
    /// Valid-pixel boundary of the source COG
    #[default]
    Raster,
    /// GPolygon boundary points of the granule's `.cmr.xml`
    Cmr,
}

impl std::fmt::Display for GeometrySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometrySource::Raster => write!(f, "raster"),
            GeometrySource::Cmr => write!(f, "cmr"),
        }
    }
}

/// How geometries crossing the antimeridian are written
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AntimeridianStrategy {
    /// Shift longitudes so the polygon is contiguous (may leave the ±180 range)
    Normalize,
    /// Split into two polygons at ±180
    #[default]
    Split,
}

impl std::fmt::Display for AntimeridianStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AntimeridianStrategy::Normalize => write!(f, "normalize"),
            AntimeridianStrategy::Split => write!(f, "split"),
        }
    }
}
