//! Static reference tables: band tables, instruments, platforms, DOIs and
//! extension schema URIs. Versioned constants, never computed.

pub const STAC_VERSION: &str = "1.0.0";

pub const COG_MEDIA_TYPE: &str = "image/tiff; application=geotiff; profile=cloud-optimized";
pub const JSON_MEDIA_TYPE: &str = "application/json";

pub const EO_EXTENSION_HREF: &str = "https://stac-extensions.github.io/eo/v1.1.0/schema.json";
pub const VIEW_EXTENSION_HREF: &str = "https://stac-extensions.github.io/view/v1.0.0/schema.json";
pub const PROJECTION_EXTENSION_HREF: &str =
    "https://stac-extensions.github.io/projection/v1.1.0/schema.json";
pub const RASTER_EXTENSION_HREF: &str =
    "https://stac-extensions.github.io/raster/v1.1.0/schema.json";
pub const SCIENTIFIC_EXTENSION_HREF: &str =
    "https://stac-extensions.github.io/scientific/v1.0.0/schema.json";
pub const MGRS_EXTENSION_HREF: &str = "https://stac-extensions.github.io/mgrs/v1.0.0/schema.json";
pub const CLASSIFICATION_EXTENSION_HREF: &str =
    "https://stac-extensions.github.io/classification/v1.0.0/schema.json";
pub const ITEM_ASSETS_EXTENSION_HREF: &str =
    "https://stac-extensions.github.io/item-assets/v1.0.0/schema.json";

/// Interpolated points inserted per footprint segment before reprojection
pub const FOOTPRINT_DENSIFICATION_FACTOR: usize = 10;
/// Footprint simplification tolerance in degrees (~60 m)
pub const FOOTPRINT_SIMPLIFICATION_TOLERANCE: f64 = 0.0006;

/// Quality and angle bands shared by both products: (band code, asset key)
pub const COMMON_BANDS: &[(&str, &str)] = &[
    ("Fmask", "fmask"),
    ("SAA", "saa"),
    ("SZA", "sza"),
    ("VAA", "vaa"),
    ("VZA", "vza"),
];

pub const L30_BANDS: &[(&str, &str)] = &[
    ("B01", "coastal"),
    ("B02", "blue"),
    ("B03", "green"),
    ("B04", "red"),
    ("B05", "nir08"),
    ("B06", "swir16"),
    ("B07", "swir22"),
    ("B09", "cirrus"),
    ("B10", "lwir11"),
    ("B11", "lwir12"),
];

pub const S30_BANDS: &[(&str, &str)] = &[
    ("B01", "coastal"),
    ("B02", "blue"),
    ("B03", "green"),
    ("B04", "red"),
    ("B05", "rededge071"),
    ("B06", "rededge075"),
    ("B07", "rededge078"),
    ("B08", "nir"),
    ("B8A", "nir08"),
    ("B09", "water_vapor"),
    ("B10", "cirrus"),
    ("B11", "swir16"),
    ("B12", "swir22"),
];

pub const INSTRUMENTS_L30: &[&str] = &["oli", "tirs"];
pub const INSTRUMENTS_S30: &[&str] = &["msi"];

pub const PLATFORMS: &[&str] = &["landsat-8", "landsat-9", "sentinel-2a", "sentinel-2b"];

/// DOI and citation link of a product
#[derive(Debug, Clone, Copy)]
pub struct Scientific {
    pub doi: &'static str,
    pub cite_as: &'static str,
    pub title: &'static str,
}

pub const SCIENTIFIC_L30: Scientific = Scientific {
    doi: "10.5067/HLS/HLSL30.002",
    cite_as: "https://doi.org/10.5067/HLS/HLSL30.002",
    title: "HLS Operational Land Imager Surface Reflectance and TOA Brightness Daily Global 30m v2.0",
};

pub const SCIENTIFIC_S30: Scientific = Scientific {
    doi: "10.5067/HLS/HLSS30.002",
    cite_as: "https://doi.org/10.5067/HLS/HLSS30.002",
    title: "HLS Sentinel-2 Multi-spectral Instrument Surface Reflectance Daily Global 30m v2.0",
};
