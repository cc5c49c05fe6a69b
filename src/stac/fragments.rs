//! Bundled JSON templates for assets and collection fields.
use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::constants::{COG_MEDIA_TYPE, COMMON_BANDS};
use crate::core::identifier::GranuleIdentity;
use crate::error::{Error, Result};
use crate::io::href::make_absolute_href;
use crate::stac::{Asset, Extent, Link, Provider};
use crate::types::Product;

const ASSETS_JSON: &str = include_str!("fragments/assets.json");
const COLLECTION_JSON: &str = include_str!("fragments/collection.json");

/// Collection fields that are not computed
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionFragments {
    pub id: String,
    pub title: String,
    pub description: String,
    pub license: String,
    pub keywords: Vec<String>,
    pub providers: Vec<Provider>,
    pub extent: Extent,
    pub links: Vec<Link>,
    #[serde(rename = "sci:publications")]
    pub sci_publications: Value,
}

/// Asset templates keyed by asset name, parsed once
#[derive(Debug, Clone)]
pub struct StacFragments {
    assets: BTreeMap<String, Value>,
}

impl StacFragments {
    pub fn new() -> Result<Self> {
        Ok(Self {
            assets: serde_json::from_str(ASSETS_JSON)?,
        })
    }

    /// Asset key for a band code: common bands first, then the product's EO table
    pub fn asset_key(product: Product, band: &str) -> Option<&'static str> {
        COMMON_BANDS
            .iter()
            .find(|(code, _)| *code == band)
            .map(|(_, key)| *key)
            .or_else(|| product.asset_key(band))
    }

    fn template(&self, key: &str) -> Result<Value> {
        let mut template = self
            .assets
            .get(key)
            .cloned()
            .ok_or_else(|| Error::Fragment(format!("no asset template for `{}`", key)))?;
        if let Value::Object(fields) = &mut template {
            fields.insert("type".into(), Value::from(COG_MEDIA_TYPE));
        }
        Ok(template)
    }

    /// Asset for one band COG, keyed by its asset name
    pub fn asset(&self, href: &str) -> Result<(String, Asset)> {
        let identity = GranuleIdentity::from_href(href)?;
        let key = Self::asset_key(identity.product, &identity.band).ok_or_else(|| {
            Error::malformed(
                href,
                format!("band `{}` is not part of {}", identity.band, identity.product),
            )
        })?;

        let mut template = self.template(key)?;
        if let Some(band) = template
            .get_mut("eo:bands")
            .and_then(Value::as_array_mut)
            .and_then(|bands| bands.first_mut())
            .and_then(Value::as_object_mut)
        {
            band.insert("name".into(), Value::from(identity.band.as_str()));
        }
        if let Value::Object(fields) = &mut template {
            fields.insert("href".into(), Value::from(make_absolute_href(href)));
        }
        Ok((key.to_string(), serde_json::from_value(template)?))
    }

    pub fn collection_fragments(&self) -> Result<CollectionFragments> {
        Ok(serde_json::from_str(COLLECTION_JSON)?)
    }

    /// All asset templates, without href
    pub fn item_assets(&self) -> Result<BTreeMap<String, Value>> {
        self.assets
            .keys()
            .map(|key| Ok((key.clone(), self.template(key)?)))
            .collect()
    }

    /// `{name, common_name}` for every EO band of both products, deduplicated
    pub fn collection_eo_bands_summary(&self) -> Vec<Value> {
        let mut summary: Vec<Value> = Vec::new();
        for product in Product::ALL {
            for (code, key) in product.bands() {
                let common_name = self
                    .assets
                    .get(*key)
                    .and_then(|t| t.pointer("/eo:bands/0/common_name"))
                    .cloned()
                    .unwrap_or(Value::Null);
                let entry = json!({ "name": code, "common_name": common_name });
                if !summary.contains(&entry) {
                    summary.push(entry);
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_cover_every_band() {
        let fragments = StacFragments::new().unwrap();
        let item_assets = fragments.item_assets().unwrap();
        assert_eq!(item_assets.len(), 20);
        for product in Product::ALL {
            for (_, key) in product.bands() {
                assert!(item_assets.contains_key(*key), "missing {}", key);
            }
        }
        for (_, key) in COMMON_BANDS {
            assert!(item_assets.contains_key(*key));
        }
        assert!(item_assets.values().all(|a| a["type"] == COG_MEDIA_TYPE));
    }

    #[test]
    fn asset_uses_real_band_code() {
        let fragments = StacFragments::new().unwrap();
        let (key, asset) = fragments
            .asset("https://example.com/HLS.L30.T19LDD.2022165T144027.v2.0.B06.tif")
            .unwrap();
        assert_eq!(key, "swir16");
        assert_eq!(asset.extra_fields["eo:bands"][0]["name"], "B06");
        assert_eq!(asset.type_.as_deref(), Some(COG_MEDIA_TYPE));
        assert_eq!(
            asset.href,
            "https://example.com/HLS.L30.T19LDD.2022165T144027.v2.0.B06.tif"
        );
    }

    #[test]
    fn fmask_asset_has_bitfields() {
        let fragments = StacFragments::new().unwrap();
        let (key, asset) = fragments
            .asset("https://example.com/HLS.S30.T19LDD.2022166T144741.v2.0.Fmask.tif")
            .unwrap();
        assert_eq!(key, "fmask");
        assert!(asset.extra_fields.contains_key("classification:bitfields"));
        assert!(!asset.extra_fields.contains_key("eo:bands"));
    }

    #[test]
    fn eo_bands_summary_is_deduplicated() {
        let summary = StacFragments::new().unwrap().collection_eo_bands_summary();
        // 10 L30 + 13 S30 bands, B01..B04 shared
        assert_eq!(summary.len(), 19);
        assert!(summary.iter().all(|b| !b["common_name"].is_null()));
    }

    #[test]
    fn collection_fragments_parse() {
        let fragments = StacFragments::new().unwrap().collection_fragments().unwrap();
        assert_eq!(fragments.id, "hls");
        assert!(fragments.sci_publications.is_array());
    }
}
