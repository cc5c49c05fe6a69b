use gdal::raster::ResampleAlg;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use ndarray::Array2;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors encountered when using the GDAL reader
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Dimension mismatch: expected {0}x{1} pixels, read {2}")]
    DimensionMismatch(usize, usize, usize),
}

/// Metadata extracted from a GDAL-supported raster
#[derive(Debug, Clone)]
pub struct RasterMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Projection in WKT format
    pub projection: String,
    /// EPSG code reported by the spatial reference, when it has one
    pub auth_code: Option<u32>,
    /// Nodata value of band 1
    pub nodata: Option<f64>,
    /// Tags of the default metadata domain
    pub tags: HashMap<String, String>,
}

impl RasterMetadata {
    /// Shape as (rows, cols)
    pub fn shape(&self) -> [usize; 2] {
        [self.size_y, self.size_x]
    }

    /// Geotransform in affine order (a, b, c, d, e, f) as used by `proj:transform`
    pub fn affine(&self) -> [f64; 6] {
        affine_from_geotransform(self.geotransform)
    }
}

/// Reorder a GDAL geotransform into affine coefficients
pub fn affine_from_geotransform(gt: [f64; 6]) -> [f64; 6] {
    [gt[1], gt[2], gt[0], gt[4], gt[5], gt[3]]
}

/// Reader for COGs via GDAL. The dataset handle lives as long as the reader.
pub struct GdalRasterReader {
    pub dataset: Dataset,
    pub metadata: RasterMetadata,
}

impl GdalRasterReader {
    /// Open a GDAL-readable path (local file or `/vsicurl/` URL)
    pub fn open(path: &str) -> Result<Self, GdalError> {
        debug!("Opening raster: {}", path);
        let dataset = Dataset::open(path)?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let geotransform = dataset.geo_transform()?;
        let projection = dataset.projection();
        let auth_code = dataset
            .spatial_ref()
            .ok()
            .and_then(|srs| srs.auth_code().ok())
            .and_then(|code| u32::try_from(code).ok());
        let nodata = dataset.rasterband(1)?.no_data_value();

        // Collect metadata entries (domain "")
        let mut tags = HashMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    tags.insert(key.to_string(), val.to_string());
                }
            }
        }
        debug!("Read {} tags, auth code {:?}", tags.len(), auth_code);

        Ok(GdalRasterReader {
            dataset,
            metadata: RasterMetadata {
                size_x,
                size_y,
                bands,
                geotransform,
                projection,
                auth_code,
                nodata,
                tags,
            },
        })
    }

    pub fn spatial_ref(&self) -> Result<SpatialRef, GdalError> {
        Ok(self.dataset.spatial_ref()?)
    }

    /// Read a single band (1-based index) as an f64 ndarray of shape (height, width)
    pub fn read_band(&self, index: usize) -> Result<Array2<f64>, GdalError> {
        if index == 0 || index > self.metadata.bands {
            return Err(GdalError::UnsupportedFormat(format!(
                "Band index {} out of range",
                index
            )));
        }
        let band = self.dataset.rasterband(index)?;
        let window = (self.metadata.size_x, self.metadata.size_y);
        let buf = band.read_as::<f64>(
            (0, 0),
            window,
            window,
            Some(ResampleAlg::NearestNeighbour),
        )?;
        let data_vec = buf.data().to_vec();
        let found = data_vec.len();
        Array2::from_shape_vec((self.metadata.size_y, self.metadata.size_x), data_vec).map_err(
            |_| {
                GdalError::DimensionMismatch(
                    self.metadata.size_x,
                    self.metadata.size_y,
                    found,
                )
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_order_matches_rasterio() {
        let gt = [300000.0, 30.0, 0.0, 8600040.0, 0.0, -30.0];
        assert_eq!(
            affine_from_geotransform(gt),
            [30.0, 0.0, 300000.0, 0.0, -30.0, 8600040.0]
        );
    }
}
