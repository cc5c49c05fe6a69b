//! Granule metadata extraction from a band COG (and optionally its CMR XML).
use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDateTime, Utc};
use geo::Geometry;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::footprint::{CmrFootprint, FootprintSource, RasterFootprint};
use crate::core::identifier::GranuleIdentity;
use crate::core::params::ItemOptions;
use crate::error::{Error, Result};
use crate::io::href::{gdal_path, modify_href, read_text, sibling_href};
use crate::io::{GdalRasterReader, RasterMetadata, ReadHrefModifier, parse_cmr_xml};
use crate::types::{GeometrySource, Product};

static UTM_ZONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"UTM Zone (\d+)").expect("UTM zone pattern is valid"));

pub const TAG_SUN_AZIMUTH: &str = "MEAN_SUN_AZIMUTH_ANGLE";
pub const TAG_VIEW_AZIMUTH: &str = "MEAN_VIEW_AZIMUTH_ANGLE";
pub const TAG_PROCESSING_TIME: &str = "HLS_PROCESSING_TIME";
pub const TAG_SENSING_TIME: &str = "SENSING_TIME";
pub const TAG_DATASTRIP_ID: &str = "DATASTRIP_ID";
pub const TAG_LANDSAT_PRODUCT_ID: &str = "LANDSAT_PRODUCT_ID";
pub const TAG_CLOUD_COVERAGE: &str = "cloud_coverage";

/// MGRS grid fields sliced from a tile id such as `T19LDD`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mgrs {
    pub utm_zone: u8,
    pub latitude_band: String,
    pub grid_square: String,
}

impl Mgrs {
    pub fn from_tile_id(tile_id: &str) -> Result<Self> {
        let malformed = || Error::malformed(tile_id, "bad MGRS tile id");
        let utm_zone = tile_id
            .get(1..3)
            .and_then(|z| z.parse::<u8>().ok())
            .ok_or_else(malformed)?;
        let latitude_band = tile_id.get(3..4).ok_or_else(malformed)?.to_string();
        let grid_square = tile_id.get(4..).ok_or_else(malformed)?.to_string();
        Ok(Self {
            utm_zone,
            latitude_band,
            grid_square,
        })
    }
}

/// Validated access to the raster's default-domain tags
pub struct Tags<'a>(&'a HashMap<String, String>);

impl<'a> Tags<'a> {
    pub fn new(tags: &'a HashMap<String, String>) -> Self {
        Self(tags)
    }

    pub fn required(&self, key: &'static str) -> Result<&'a str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .ok_or(Error::MissingTag(key))
    }

    pub fn optional(&self, key: &str) -> Option<&'a str> {
        self.0.get(key).map(|v| v.trim())
    }

    pub fn required_f64(&self, key: &'static str) -> Result<f64> {
        let value = self.required(key)?;
        value.parse::<f64>().map_err(|_| Error::InvalidTag {
            key,
            value: value.to_string(),
        })
    }

    pub fn required_datetime(&self, key: &'static str) -> Result<DateTime<Utc>> {
        let value = self.required(key)?;
        parse_datetime(value).ok_or_else(|| Error::InvalidTag {
            key,
            value: value.to_string(),
        })
    }

    /// `;`-delimited timestamps
    pub fn required_datetimes(&self, key: &'static str) -> Result<Vec<DateTime<Utc>>> {
        let value = self.required(key)?;
        value
            .split(';')
            .map(|s| {
                parse_datetime(s).ok_or_else(|| Error::InvalidTag {
                    key,
                    value: s.trim().to_string(),
                })
            })
            .collect()
    }
}

/// RFC 3339, or a naive ISO 8601 timestamp taken as UTC
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.fZ"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// EPSG code from the CRS authority, falling back to a `UTM Zone NN` name in the WKT
pub fn resolve_epsg(auth_code: Option<u32>, wkt: &str) -> Result<u32> {
    if let Some(code) = auth_code {
        return Ok(code);
    }
    let zone = UTM_ZONE
        .captures(wkt)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(|| Error::MissingUtmZone {
            wkt: wkt.to_string(),
        })?;
    debug!("No EPSG authority code, using UTM zone {} from WKT", zone);
    Ok(32600 + zone)
}

/// Platform labels from the per-product source ids, deduplicated and joined with `", "`
pub fn platforms(product: Product, tags: &Tags) -> Result<String> {
    let (key, index, prefix) = match product {
        Product::S30 => (TAG_DATASTRIP_ID, 2, "sentinel-2"),
        Product::L30 => (TAG_LANDSAT_PRODUCT_ID, 3, "landsat-"),
    };
    let ids = tags.required(key)?;
    let mut labels = BTreeSet::new();
    for id in ids.split(';') {
        let id = id.trim();
        let c = id.chars().nth(index).ok_or_else(|| Error::InvalidTag {
            key,
            value: id.to_string(),
        })?;
        labels.insert(format!("{}{}", prefix, c.to_ascii_lowercase()));
    }
    Ok(labels.into_iter().collect::<Vec<_>>().join(", "))
}

/// Everything the catalog assembler needs to know about one granule
#[derive(Debug, Clone)]
pub struct GranuleMetadata {
    pub id: String,
    pub product: Product,
    pub version: String,
    pub tile_id: String,
    /// Earliest sensing time
    pub acquisition_datetime: DateTime<Utc>,
    /// Only present when the granule has more than one sensing time
    pub start_end_datetime: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub platform: String,
    pub instruments: Vec<String>,
    pub processing_datetime: DateTime<Utc>,
    pub cloud_cover: Option<u8>,
    pub sun_azimuth: f64,
    pub azimuth: f64,
    /// (rows, cols)
    pub shape: [usize; 2],
    /// Affine order (a, b, c, d, e, f)
    pub transform: [f64; 6],
    pub epsg: u32,
    pub mgrs: Mgrs,
    pub geometry: Geometry<f64>,
}

impl GranuleMetadata {
    /// Assemble from the parsed identity, the raster metadata and a footprint
    pub fn from_parts(
        identity: &GranuleIdentity,
        raster: &RasterMetadata,
        geometry: Geometry<f64>,
    ) -> Result<Self> {
        let tags = Tags::new(&raster.tags);

        let sun_azimuth = round1(tags.required_f64(TAG_SUN_AZIMUTH)?);
        let azimuth = round1(tags.required_f64(TAG_VIEW_AZIMUTH)?);
        let processing_datetime = tags.required_datetime(TAG_PROCESSING_TIME)?;
        let sensing = tags.required_datetimes(TAG_SENSING_TIME)?;
        let platform = platforms(identity.product, &tags)?;

        let cloud_cover = tags
            .optional(TAG_CLOUD_COVERAGE)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| (0.0..=100.0).contains(v))
            .map(|v| v.round() as u8);
        if cloud_cover.is_none() {
            debug!("No usable {} tag for {}", TAG_CLOUD_COVERAGE, identity.id);
        }

        let start = sensing.iter().min().copied().ok_or(Error::MissingTag(TAG_SENSING_TIME))?;
        let end = sensing.iter().max().copied().unwrap_or(start);
        let start_end_datetime = (sensing.len() > 1).then_some((start, end));

        Ok(Self {
            id: identity.id.clone(),
            product: identity.product,
            version: identity.version.clone(),
            tile_id: identity.tile_id.clone(),
            acquisition_datetime: start,
            start_end_datetime,
            platform,
            instruments: identity
                .product
                .instruments()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            processing_datetime,
            cloud_cover,
            sun_azimuth,
            azimuth,
            shape: raster.shape(),
            transform: raster.affine(),
            epsg: resolve_epsg(raster.auth_code, &raster.projection)?,
            mgrs: Mgrs::from_tile_id(&identity.tile_id)?,
            geometry,
        })
    }
}

/// Extract granule metadata from the HREF of one EO band COG.
///
/// Fmask and angle band HREFs are rejected. The raster handle is closed before returning.
pub fn hls_metadata(
    cog_href: &str,
    options: &ItemOptions,
    modifier: Option<&ReadHrefModifier>,
) -> Result<GranuleMetadata> {
    let identity = GranuleIdentity::from_href(cog_href)?;
    if !identity.product.is_eo_band(&identity.band) {
        return Err(Error::IncorrectAssetHref {
            band: identity.band,
        });
    }

    let read_href = modify_href(cog_href, modifier);
    info!("Reading granule metadata: {}", cog_href);
    let (raster, raster_footprint) = {
        let reader = GdalRasterReader::open(&gdal_path(&read_href))?;
        let footprint = match options.geometry {
            GeometrySource::Raster => {
                Some(RasterFootprint::new(&reader, options.simplify_tolerance).footprint()?)
            }
            GeometrySource::Cmr => None,
        };
        (reader.metadata.clone(), footprint)
    };

    let geometry = match raster_footprint {
        Some(geometry) => geometry,
        None => cmr_footprint(cog_href, &identity, options, modifier)?,
    };
    GranuleMetadata::from_parts(&identity, &raster, geometry)
}

fn cmr_footprint(
    cog_href: &str,
    identity: &GranuleIdentity,
    options: &ItemOptions,
    modifier: Option<&ReadHrefModifier>,
) -> Result<Geometry<f64>> {
    let cmr_href = sibling_href(cog_href, &format!("{}.cmr.xml", identity.id));
    debug!("Reading CMR metadata: {}", cmr_href);
    let cmr = parse_cmr_xml(&read_text(&modify_href(&cmr_href, modifier))?)?;
    if let Some(granule_ur) = cmr.granule_ur.as_deref() {
        if granule_ur != identity.id {
            warn!(
                "CMR GranuleUR {} does not match granule id {}",
                granule_ur, identity.id
            );
        }
    }
    CmrFootprint::new(cmr.polygons, options.simplify_tolerance).footprint()
}
