//! Minimal STAC object model: Item, Collection, Asset, Link and friends,
//! serialized with serde to STAC 1.0.0 JSON.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    CLASSIFICATION_EXTENSION_HREF, EO_EXTENSION_HREF, RASTER_EXTENSION_HREF, STAC_VERSION,
};

pub mod fragments;
pub use fragments::{CollectionFragments, StacFragments};

/// STAC Item (Feature)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub type_: String,
    pub stac_version: String,
    #[serde(default)]
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub geometry: Option<geojson::Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            type_: "Feature".to_string(),
            stac_version: STAC_VERSION.to_string(),
            stac_extensions: Vec::new(),
            id: id.into(),
            geometry: None,
            bbox: None,
            properties: Map::new(),
            links: Vec::new(),
            assets: BTreeMap::new(),
            collection: None,
        }
    }

    pub fn set_geometry(&mut self, geometry: &geo::Geometry<f64>, bbox: Vec<f64>) {
        self.geometry = Some(geojson::Geometry::new(geojson::Value::from(geometry)));
        self.bbox = Some(bbox);
    }

    pub fn set_property<V: Into<Value>>(&mut self, key: &str, value: V) {
        self.properties.insert(key.to_string(), value.into());
    }

    /// Datetime of the item, or `start_datetime` for range items
    pub fn datetime(&self) -> Option<&str> {
        self.properties
            .get("datetime")
            .and_then(Value::as_str)
            .or_else(|| self.properties.get("start_datetime").and_then(Value::as_str))
    }

    pub fn start_datetime(&self) -> Option<&str> {
        self.properties
            .get("start_datetime")
            .and_then(Value::as_str)
            .or_else(|| self.datetime())
    }

    pub fn end_datetime(&self) -> Option<&str> {
        self.properties
            .get("end_datetime")
            .and_then(Value::as_str)
            .or_else(|| self.datetime())
    }
}

/// STAC Collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: String,
    pub stac_version: String,
    #[serde(default)]
    pub stac_extensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    pub license: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub providers: Vec<Provider>,
    pub extent: Extent,
    #[serde(default)]
    pub summaries: Map<String, Value>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub item_assets: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl Collection {
    /// Replace the extent by the union of the items' bboxes and datetimes
    pub fn update_extent_from_items(&mut self, items: &[Item]) {
        let bboxes: Vec<&Vec<f64>> = items
            .iter()
            .filter_map(|i| i.bbox.as_ref())
            .filter(|b| b.len() == 4)
            .collect();
        if !bboxes.is_empty() {
            let south = bboxes.iter().map(|b| b[1]).fold(f64::INFINITY, f64::min);
            let north = bboxes.iter().map(|b| b[3]).fold(f64::NEG_INFINITY, f64::max);
            let (west, east) = if bboxes.iter().any(|b| b[0] > b[2]) {
                crossing_lon_union(&bboxes)
            } else {
                (
                    bboxes.iter().map(|b| b[0]).fold(f64::INFINITY, f64::min),
                    bboxes.iter().map(|b| b[2]).fold(f64::NEG_INFINITY, f64::max),
                )
            };
            self.extent.spatial.bbox = vec![vec![west, south, east, north]];
        }

        // RFC 3339 UTC strings sort chronologically
        let start = items.iter().filter_map(Item::start_datetime).min();
        let end = items.iter().filter_map(Item::end_datetime).max();
        if start.is_some() || end.is_some() {
            self.extent.temporal.interval = vec![vec![
                start.map(str::to_string),
                end.map(str::to_string),
            ]];
        }
    }
}

/// Longitude union of bboxes when at least one crosses the antimeridian (`west > east`).
///
/// Intervals are unioned in a 0..360 frame and mapped back, so the result also has
/// `west > east`. Falls back to the full -180..180 range when an interval spans the
/// prime meridian or the union wraps the globe.
fn crossing_lon_union(bboxes: &[&Vec<f64>]) -> (f64, f64) {
    let to_360 = |lon: f64| if lon < 0.0 { lon + 360.0 } else { lon };
    let from_360 = |lon: f64| if lon > 180.0 { lon - 360.0 } else { lon };

    let mut west = f64::INFINITY;
    let mut east = f64::NEG_INFINITY;
    for b in bboxes {
        let (w, e) = (to_360(b[0]), to_360(b[2]));
        if w > e {
            return (-180.0, 180.0);
        }
        west = west.min(w);
        east = east.max(e);
    }
    if east - west >= 360.0 {
        return (-180.0, 180.0);
    }
    (from_360(west), from_360(east))
}

/// STAC Provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// STAC Extent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub interval: Vec<Vec<Option<String>>>,
}

/// STAC Link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(rel: &str, href: impl Into<String>) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.into(),
            type_: None,
            title: None,
        }
    }

    pub fn json(rel: &str, href: impl Into<String>) -> Self {
        Self {
            type_: Some(crate::constants::JSON_MEDIA_TYPE.to_string()),
            ..Self::new(rel, href)
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// STAC Asset. Band-specific fields (`eo:bands`, `raster:bands`,
/// `classification:*`) are kept in `extra_fields`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

/// Extension schemas implied by the fields present on assets.
///
/// Classification fields are looked up on the asset itself, not inside `raster:bands`.
pub fn find_extensions<'a, I>(assets: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    let mut extensions = BTreeSet::new();
    for fields in assets {
        if fields.contains_key("classification:classes")
            || fields.contains_key("classification:bitfields")
        {
            extensions.insert(CLASSIFICATION_EXTENSION_HREF.to_string());
        }
        if fields.contains_key("eo:bands") {
            extensions.insert(EO_EXTENSION_HREF.to_string());
        }
        if fields.contains_key("raster:bands") {
            extensions.insert(RASTER_EXTENSION_HREF.to_string());
        }
    }
    extensions
}

/// Deduplicated, lexicographically sorted extension list
pub fn sorted_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    extensions
        .into_iter()
        .map(Into::into)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extensions_are_sorted_and_deduplicated() {
        let exts = sorted_extensions(["b", "a", "b", "c"]);
        assert_eq!(exts, vec!["a", "b", "c"]);
    }

    #[test]
    fn find_extensions_from_asset_fields() {
        let mut fmask = Map::new();
        fmask.insert("classification:bitfields".into(), json!([]));
        fmask.insert("raster:bands".into(), json!([]));
        let mut blue = Map::new();
        blue.insert("eo:bands".into(), json!([]));
        let found = find_extensions([&fmask, &blue]);
        assert_eq!(found.len(), 3);
        assert!(found.contains(CLASSIFICATION_EXTENSION_HREF));
    }

    #[test]
    fn deserializes_item_with_assets() {
        let item: Item = serde_json::from_value(json!({
            "type": "Feature",
            "stac_version": "1.0.0",
            "id": "test-item",
            "geometry": null,
            "properties": { "datetime": "2022-06-14T14:40:27Z" },
            "assets": {
                "blue": { "href": "./b.tif", "eo:bands": [{"name": "B02"}] }
            }
        }))
        .unwrap();
        assert_eq!(item.datetime(), Some("2022-06-14T14:40:27Z"));
        assert!(item.assets["blue"].extra_fields.contains_key("eo:bands"));
    }

    fn empty_collection() -> Collection {
        serde_json::from_value(json!({
            "type": "Collection",
            "id": "c",
            "stac_version": "1.0.0",
            "description": "d",
            "license": "proprietary",
            "extent": {
                "spatial": { "bbox": [[-180.0, -90.0, 180.0, 90.0]] },
                "temporal": { "interval": [["2013-04-11T00:00:00Z", null]] }
            }
        }))
        .unwrap()
    }

    #[test]
    fn extent_keeps_antimeridian_items() {
        let mut a = Item::new("a");
        a.bbox = Some(vec![-70.0, -12.0, -69.0, -11.0]);
        let mut b = Item::new("b");
        b.bbox = Some(vec![178.98, 59.44, -178.71, 60.43]);

        let mut collection = empty_collection();
        collection.update_extent_from_items(&[a, b]);
        let extent = &collection.extent.spatial.bbox[0];
        assert_eq!(extent[0], 178.98);
        assert_eq!(extent[1], -12.0);
        assert!((extent[2] + 69.0).abs() < 1e-9);
        assert_eq!(extent[3], 60.43);
        assert!(extent[0] > extent[2]);

        let mut c = Item::new("c");
        c.bbox = Some(vec![-1.0, 50.0, 1.0, 51.0]);
        let mut d = Item::new("d");
        d.bbox = Some(vec![178.98, 59.44, -178.71, 60.43]);
        collection.update_extent_from_items(&[c, d]);
        assert_eq!(collection.extent.spatial.bbox, vec![vec![-180.0, 50.0, 180.0, 60.43]]);
    }

    #[test]
    fn extent_follows_items() {
        let mut a = Item::new("a");
        a.bbox = Some(vec![-70.0, -12.0, -69.0, -11.0]);
        a.set_property("datetime", "2022-06-14T14:40:27Z");
        let mut b = Item::new("b");
        b.bbox = Some(vec![-71.0, -13.0, -70.5, -12.5]);
        b.set_property("datetime", Value::Null);
        b.set_property("start_datetime", "2022-02-03T14:57:19Z");
        b.set_property("end_datetime", "2022-02-03T14:57:33Z");

        let mut collection = empty_collection();
        collection.update_extent_from_items(&[a, b]);
        assert_eq!(collection.extent.spatial.bbox, vec![vec![-71.0, -13.0, -69.0, -11.0]]);
        assert_eq!(
            collection.extent.temporal.interval,
            vec![vec![
                Some("2022-02-03T14:57:19Z".to_string()),
                Some("2022-06-14T14:40:27Z".to_string())
            ]]
        );
    }
}
