//! Footprint strategies: the valid-pixel boundary of a COG, or the boundary
//! points of the granule's CMR XML. Both produce a lon/lat geometry with
//! counter-clockwise exterior rings.
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use geo::orient::Direction;
use geo::{
    ConvexHull, Coord, Geometry, LineString, MultiPoint, MultiPolygon, Orient, Point, Polygon,
    Simplify,
};
use ndarray::Array2;
use tracing::debug;

use crate::constants::{FOOTPRINT_DENSIFICATION_FACTOR, FOOTPRINT_SIMPLIFICATION_TOLERANCE};
use crate::error::{Error, Result};
use crate::io::{GdalError, GdalRasterReader};

/// Anything that can produce a granule footprint in EPSG:4326
pub trait FootprintSource {
    fn footprint(&self) -> Result<Geometry<f64>>;
}

/// Footprint traced from the valid pixels of band 1
pub struct RasterFootprint<'a> {
    reader: &'a GdalRasterReader,
    densification_factor: usize,
    simplify_tolerance: f64,
}

impl<'a> RasterFootprint<'a> {
    pub fn new(reader: &'a GdalRasterReader, simplify_tolerance: Option<f64>) -> Self {
        Self {
            reader,
            densification_factor: FOOTPRINT_DENSIFICATION_FACTOR,
            simplify_tolerance: simplify_tolerance.unwrap_or(FOOTPRINT_SIMPLIFICATION_TOLERANCE),
        }
    }

    fn to_wgs84(&self, coords: &[Coord<f64>]) -> Result<Vec<Coord<f64>>> {
        let mut src = self.reader.spatial_ref()?;
        src.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        let mut dst = SpatialRef::from_epsg(4326).map_err(GdalError::from)?;
        dst.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        let transform = CoordTransform::new(&src, &dst).map_err(GdalError::from)?;

        let (mut xs, mut ys): (Vec<f64>, Vec<f64>) = coords.iter().map(|c| (c.x, c.y)).unzip();
        let mut zs = vec![0.0; xs.len()];
        transform
            .transform_coords(&mut xs, &mut ys, &mut zs)
            .map_err(GdalError::from)?;
        Ok(xs.into_iter().zip(ys).map(|(x, y)| Coord { x, y }).collect())
    }
}

impl FootprintSource for RasterFootprint<'_> {
    fn footprint(&self) -> Result<Geometry<f64>> {
        let data = self.reader.read_band(1)?;
        let hull = valid_pixel_hull(&data, self.reader.metadata.nodata)?;
        let densified = densify_ring(hull.exterior(), self.densification_factor);

        let gt = self.reader.metadata.geotransform;
        let projected: Vec<Coord<f64>> = densified
            .iter()
            .map(|c| pixel_to_projected(&gt, *c))
            .collect();
        let lonlat = self.to_wgs84(&projected)?;

        let polygon = Polygon::new(LineString::from(lonlat), vec![]);
        let simplified = polygon.simplify(&self.simplify_tolerance);
        debug!(
            "Raster footprint: {} hull points, {} after simplification",
            densified.len(),
            simplified.exterior().0.len()
        );
        Ok(Geometry::Polygon(simplified.orient(Direction::Default)))
    }
}

/// Convex hull, in pixel coordinates, of the outer corners of each row's valid run.
///
/// A pixel is valid when it is not NaN and differs from `nodata`.
pub fn valid_pixel_hull(data: &Array2<f64>, nodata: Option<f64>) -> Result<Polygon<f64>> {
    let is_valid = |v: f64| !v.is_nan() && nodata.is_none_or(|nd| v != nd);

    let mut corners: Vec<Point<f64>> = Vec::new();
    for (row, values) in data.rows().into_iter().enumerate() {
        let first = values.iter().position(|v| is_valid(*v));
        let last = values.iter().rposition(|v| is_valid(*v));
        if let (Some(first), Some(last)) = (first, last) {
            let (top, bottom) = (row as f64, row as f64 + 1.0);
            let (left, right) = (first as f64, last as f64 + 1.0);
            corners.extend([
                Point::new(left, top),
                Point::new(left, bottom),
                Point::new(right, top),
                Point::new(right, bottom),
            ]);
        }
    }
    if corners.is_empty() {
        return Err(Error::Geometry("raster has no valid pixels".into()));
    }
    Ok(MultiPoint::new(corners).convex_hull())
}

/// Insert `factor` evenly spaced points into every segment of a closed ring
pub fn densify_ring(ring: &LineString<f64>, factor: usize) -> Vec<Coord<f64>> {
    let mut out = Vec::with_capacity(ring.0.len() * (factor + 1));
    for line in ring.lines() {
        out.push(line.start);
        for i in 1..=factor {
            let t = i as f64 / (factor + 1) as f64;
            out.push(Coord {
                x: line.start.x + (line.end.x - line.start.x) * t,
                y: line.start.y + (line.end.y - line.start.y) * t,
            });
        }
    }
    if let Some(last) = ring.0.last() {
        out.push(*last);
    }
    out
}

/// Apply a GDAL geotransform to a pixel coordinate
pub fn pixel_to_projected(gt: &[f64; 6], pixel: Coord<f64>) -> Coord<f64> {
    Coord {
        x: gt[0] + pixel.x * gt[1] + pixel.y * gt[2],
        y: gt[3] + pixel.x * gt[4] + pixel.y * gt[5],
    }
}

/// Footprint built from the CMR `GPolygon` boundaries
pub struct CmrFootprint {
    rings: Vec<Vec<(f64, f64)>>,
    simplify_tolerance: Option<f64>,
}

impl CmrFootprint {
    pub fn new(rings: Vec<Vec<(f64, f64)>>, simplify_tolerance: Option<f64>) -> Self {
        Self {
            rings,
            simplify_tolerance,
        }
    }
}

impl FootprintSource for CmrFootprint {
    fn footprint(&self) -> Result<Geometry<f64>> {
        let mut polygons: Vec<Polygon<f64>> = self
            .rings
            .iter()
            .map(|ring| {
                // Polygon::new closes the ring
                let polygon = Polygon::new(LineString::from(ring.clone()), vec![]);
                let polygon = match self.simplify_tolerance {
                    Some(tolerance) => polygon.simplify(&tolerance),
                    None => polygon,
                };
                polygon.orient(Direction::Default)
            })
            .collect();
        match polygons.len() {
            0 => Err(Error::Geometry("CMR metadata contains no polygons".into())),
            1 => Ok(Geometry::Polygon(polygons.remove(0))),
            _ => Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons))),
        }
    }
}
