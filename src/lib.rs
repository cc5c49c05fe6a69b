#![doc = r#"
hls-stac: STAC Items and Collections for Harmonized Landsat Sentinel-2 (HLS) granules.

Given the HREF of one band COG of an HLS granule, this crate derives the full catalog
record: per-band assets, footprint polygon, sensing times, platform and instruments,
cloud cover, view/sun angles, projection metadata and MGRS tile fields. It powers the
`hls-stac` CLI and can be embedded in your own Rust applications.

Requirements
------------
- GDAL development headers and runtime available on your system.
- Rust 2024 edition toolchain.

Create an Item
--------------
```rust,no_run
use hls_stac::{create_item, ItemOptions};

fn main() -> hls_stac::Result<()> {
    let item = create_item(
        "/data/HLS.L30.T19LDD.2022165T144027.v2.0.B01.tif",
        &ItemOptions::default(),
        None,
    )?;
    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}
```

Footprint from the CMR XML, normalized across the antimeridian
-----------------------------------------------------------------
```rust,no_run
use hls_stac::{create_item, AntimeridianStrategy, GeometrySource, ItemOptions};

fn main() -> hls_stac::Result<()> {
    let options = ItemOptions {
        geometry: GeometrySource::Cmr,
        antimeridian_strategy: AntimeridianStrategy::Normalize,
        ..ItemOptions::default()
    };
    // Append an access token to every HREF read
    let add_token = |href: &str| format!("{}?token=abc", href);
    let item = create_item(
        "https://data.example.com/HLS.S30.T60VXR.2022178T233701.v2.0.B02.tif",
        &options,
        Some(&add_token),
    )?;
    assert!(item.bbox.is_some());
    Ok(())
}
```

Batch: a populated Collection
-----------------------------
```rust,no_run
use std::path::Path;
use hls_stac::api::read_hrefs;
use hls_stac::io::writers::write_collection;
use hls_stac::{create_collection_from_hrefs, ItemOptions};

fn main() -> hls_stac::Result<()> {
    let hrefs = read_hrefs(Path::new("/data/hrefs.txt"))?;
    let (collection, items, report) =
        create_collection_from_hrefs(&hrefs, &ItemOptions::default(), None, true)?;
    write_collection(&collection, &items, Path::new("/out/stac"))?;
    println!("processed={} skipped={} errors={}", report.processed, report.skipped, report.errors);
    Ok(())
}
```

Error handling
--------------
All public functions return `hls_stac::Result<T>`; match on `hls_stac::Error` to handle
specific cases.

```rust,no_run
use hls_stac::{create_item, Error, ItemOptions};

fn main() {
    match create_item("/data/HLS.L30.T19LDD.2022165T144027.v2.0.Fmask.tif", &ItemOptions::default(), None) {
        Ok(_) => {}
        Err(Error::IncorrectAssetHref { band }) => eprintln!("not an EO band: {band}"),
        Err(Error::Gdal(e)) => eprintln!("GDAL error: {e}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`]: high-level entry points.
- [`core`]: identifiers, footprints, antimeridian handling, metadata extraction.
- [`stac`]: the STAC object model and bundled fragments.
- [`io`]: GDAL and CMR readers, HREF helpers, JSON writers.
- [`error`]: crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod constants;
pub mod core;
pub mod error;
pub mod io;
pub mod stac;
pub mod types;

// Curated public API surface
pub use crate::core::metadata::{GranuleMetadata, hls_metadata};
pub use crate::core::params::ItemOptions;
pub use error::{Error, Result};
pub use types::{AntimeridianStrategy, GeometrySource, Product};

pub use io::{CmrError, GdalError, GdalRasterReader, ReadHrefModifier};
pub use stac::{Asset, Collection, Item, Link};

pub use api::{
    BatchReport, create_cog_hrefs, create_collection, create_collection_from_hrefs, create_item,
};
