//! I/O layer: the GDAL raster reader, the CMR XML reader, HREF helpers,
//! and `writers` for persisting STAC documents.
pub mod cmr;
pub use cmr::{CmrError, CmrMetadata, parse_cmr_xml};

pub mod gdal;
pub use gdal::{GdalError, GdalRasterReader, RasterMetadata};

pub mod href;
pub use href::ReadHrefModifier;

pub mod writers;
