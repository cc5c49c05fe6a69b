//! High-level library API: create STAC Items from HLS band COGs, the HLS
//! Collection, and batch helpers building a populated collection from a list of
//! HREFs. Prefer these entrypoints over the low-level `core` modules.
use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::constants::{
    CLASSIFICATION_EXTENSION_HREF, COMMON_BANDS, EO_EXTENSION_HREF, ITEM_ASSETS_EXTENSION_HREF,
    MGRS_EXTENSION_HREF, PLATFORMS, PROJECTION_EXTENSION_HREF, RASTER_EXTENSION_HREF,
    SCIENTIFIC_EXTENSION_HREF, STAC_VERSION, Scientific, VIEW_EXTENSION_HREF,
};
use crate::core::antimeridian::{self, fix_geometry, merge_multipolygon};
use crate::core::identifier::{id_from_href, product_from_href};
use crate::core::metadata::{GranuleMetadata, hls_metadata};
use crate::core::params::ItemOptions;
use crate::error::{Error, Result};
use crate::io::ReadHrefModifier;
use crate::io::href::{href_exists, modify_href, sibling_href};
use crate::stac::{
    Collection, Item, Link, StacFragments, find_extensions, sorted_extensions,
};
use crate::types::Product;

fn datetime_to_str(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn cite_as_link(scientific: &Scientific) -> Link {
    Link {
        type_: Some("text/html".to_string()),
        ..Link::new("cite-as", scientific.cite_as)
    }
    .with_title(scientific.title)
}

/// HREFs of every band COG in the granule: the product's EO bands, then the
/// Fmask and angle bands. With `check_existence`, each HREF (after the
/// modifier) must exist.
pub fn create_cog_hrefs(
    href: &str,
    product: Product,
    check_existence: bool,
    modifier: Option<&ReadHrefModifier>,
) -> Result<Vec<String>> {
    let id = id_from_href(href)?;
    let hrefs: Vec<String> = product
        .bands()
        .iter()
        .chain(COMMON_BANDS.iter())
        .map(|(code, _)| sibling_href(href, &format!("{}.{}.tif", id, code)))
        .collect();

    if check_existence {
        let client = reqwest::blocking::Client::builder().build()?;
        for cog_href in &hrefs {
            if !href_exists(&client, &modify_href(cog_href, modifier))? {
                return Err(Error::MissingAsset {
                    href: cog_href.clone(),
                });
            }
        }
        debug!("All {} COGs of {} exist", hrefs.len(), id);
    }
    Ok(hrefs)
}

fn item_properties(item: &mut Item, metadata: &GranuleMetadata) {
    item.set_property("datetime", datetime_to_str(&metadata.acquisition_datetime));
    if let Some((start, end)) = &metadata.start_end_datetime {
        item.set_property("start_datetime", datetime_to_str(start));
        item.set_property("end_datetime", datetime_to_str(end));
    }
    item.set_property("created", datetime_to_str(&Utc::now()));
    item.set_property("platform", metadata.platform.as_str());
    item.set_property("instruments", metadata.instruments.clone());

    if let Some(cloud_cover) = metadata.cloud_cover {
        item.set_property("eo:cloud_cover", cloud_cover);
    }
    item.set_property("view:azimuth", metadata.azimuth);
    item.set_property("view:sun_azimuth", metadata.sun_azimuth);

    item.set_property("proj:epsg", metadata.epsg);
    item.set_property("proj:shape", metadata.shape.to_vec());
    item.set_property("proj:transform", metadata.transform.to_vec());

    item.set_property("mgrs:utm_zone", metadata.mgrs.utm_zone);
    item.set_property("mgrs:latitude_band", metadata.mgrs.latitude_band.as_str());
    item.set_property("mgrs:grid_square", metadata.mgrs.grid_square.as_str());

    item.set_property("sci:doi", metadata.product.scientific().doi);
    item.set_property("hls:product", format!("HLS{}", metadata.product));
    item.set_property(
        "hls:processing_datetime",
        datetime_to_str(&metadata.processing_datetime),
    );
}

/// Create a STAC Item from the HREF of one EO band COG of an HLS granule.
///
/// Footprints touching the antimeridian are merged, then written with
/// `options.antimeridian_strategy`.
pub fn create_item(
    cog_href: &str,
    options: &ItemOptions,
    modifier: Option<&ReadHrefModifier>,
) -> Result<Item> {
    let metadata = hls_metadata(cog_href, options, modifier)?;
    let fragments = StacFragments::new()?;

    let mut item = Item::new(metadata.id.as_str());
    let geometry = merge_multipolygon(metadata.geometry.clone())?;
    let geometry = fix_geometry(geometry, options.antimeridian_strategy)?;
    let bbox = antimeridian::bbox(&geometry)?;
    item.set_geometry(&geometry, bbox);
    item_properties(&mut item, &metadata);

    for href in create_cog_hrefs(cog_href, metadata.product, options.check_existence, modifier)? {
        let (key, asset) = fragments.asset(&href)?;
        item.assets.insert(key, asset);
    }

    let mut extensions = find_extensions(item.assets.values().map(|a| &a.extra_fields));
    extensions.extend(
        [
            EO_EXTENSION_HREF,
            VIEW_EXTENSION_HREF,
            PROJECTION_EXTENSION_HREF,
            MGRS_EXTENSION_HREF,
            RASTER_EXTENSION_HREF,
            SCIENTIFIC_EXTENSION_HREF,
            CLASSIFICATION_EXTENSION_HREF,
        ]
        .map(String::from),
    );
    item.stac_extensions = sorted_extensions(extensions);
    item.links.push(cite_as_link(metadata.product.scientific()));

    info!("Created item {} with {} assets", item.id, item.assets.len());
    Ok(item)
}

/// Create the HLS Collection from the bundled fragments
pub fn create_collection() -> Result<Collection> {
    let fragments = StacFragments::new()?;
    let collection_fragments = fragments.collection_fragments()?;

    let mut summaries = Map::new();
    summaries.insert(
        "instruments".into(),
        json!(
            Product::ALL
                .iter()
                .flat_map(|p| p.instruments().iter().copied())
                .collect::<Vec<_>>()
        ),
    );
    summaries.insert("platform".into(), json!(PLATFORMS));
    summaries.insert(
        "sci:doi".into(),
        json!(
            Product::ALL
                .iter()
                .map(|p| p.scientific().doi)
                .collect::<Vec<_>>()
        ),
    );
    summaries.insert(
        "eo:bands".into(),
        Value::Array(fragments.collection_eo_bands_summary()),
    );

    let mut links = collection_fragments.links;
    links.extend(Product::ALL.iter().map(|p| cite_as_link(p.scientific())));

    let mut extra_fields = Map::new();
    extra_fields.insert(
        "sci:publications".into(),
        collection_fragments.sci_publications,
    );

    Ok(Collection {
        type_: "Collection".to_string(),
        id: collection_fragments.id,
        stac_version: STAC_VERSION.to_string(),
        stac_extensions: sorted_extensions([
            ITEM_ASSETS_EXTENSION_HREF,
            RASTER_EXTENSION_HREF,
            EO_EXTENSION_HREF,
            SCIENTIFIC_EXTENSION_HREF,
            CLASSIFICATION_EXTENSION_HREF,
        ]),
        title: Some(collection_fragments.title),
        description: collection_fragments.description,
        license: collection_fragments.license,
        keywords: collection_fragments.keywords,
        providers: collection_fragments.providers,
        extent: collection_fragments.extent,
        summaries,
        links,
        item_assets: fragments.item_assets()?,
        extra_fields,
    })
}

/// Batch report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Read a list of HREFs, one per line. Blank lines and `#` comments are ignored.
pub fn read_hrefs(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Build the Collection and one Item per granule listed in `hrefs`, in input order.
///
/// Further bands of an already built granule are skipped. Any other failure,
/// including an Fmask/angle band HREF, is an error: if `continue_on_error` is true,
/// errors are counted in the report and processing continues; otherwise, the first
/// error is returned. The collection
/// extent is updated from the created items.
pub fn create_collection_from_hrefs(
    hrefs: &[String],
    options: &ItemOptions,
    modifier: Option<&ReadHrefModifier>,
    continue_on_error: bool,
) -> Result<(Collection, Vec<Item>, BatchReport)> {
    let mut collection = create_collection()?;
    let mut report = BatchReport::default();
    let mut items = Vec::new();
    let mut seen = HashSet::new();

    for href in hrefs {
        let granule = match id_from_href(href).and_then(|id| Ok((id, product_from_href(href)?))) {
            Ok(granule) => granule,
            Err(e) => {
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
                warn!("Skipping {}: {}", href, e);
                continue;
            }
        };
        if seen.contains(&granule.0) {
            debug!("Granule {} already built, skipping {}", granule.0, href);
            report.skipped += 1;
            continue;
        }

        match create_item(href, options, modifier) {
            Ok(mut item) => {
                item.collection = Some(collection.id.clone());
                seen.insert(granule.0);
                items.push(item);
                report.processed += 1;
            }
            Err(e) => {
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
                warn!("Failed to create item from {}: {}", href, e);
            }
        }
    }

    collection.update_extent_from_items(&items);
    info!(
        "Collection {}: processed={} skipped={} errors={}",
        collection.id, report.processed, report.skipped, report.errors
    );
    Ok((collection, items, report))
}
