//! Antimeridian handling for lon/lat footprints.
//!
//! Granules straddling ±180° arrive either as one ring whose longitudes jump across the
//! antimeridian, or as two parts touching it. `merge_multipolygon` glues touching parts
//! back together; `fix_geometry` then writes the result either as one contiguous ring
//! (`Normalize`) or as two parts cut at ±180° (`Split`).
use geo::orient::Direction;
use geo::{BooleanOps, BoundingRect, Coord, Geometry, MapCoords, MultiPolygon, Orient, Polygon, Rect};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::AntimeridianStrategy;

const ANTIMERIDIAN: f64 = 180.0;
// Parts closer than this to ±180 are considered touching it
const EDGE_TOLERANCE: f64 = 1e-6;

fn shift_negative(polygon: &Polygon<f64>) -> Polygon<f64> {
    polygon.map_coords(|c| Coord {
        x: if c.x < 0.0 { c.x + 360.0 } else { c.x },
        y: c.y,
    })
}

fn wrap_east(polygon: &Polygon<f64>) -> Polygon<f64> {
    polygon.map_coords(|c| Coord {
        x: if c.x > ANTIMERIDIAN { c.x - 360.0 } else { c.x },
        y: c.y,
    })
}

fn translate_lon(polygon: &Polygon<f64>, dx: f64) -> Polygon<f64> {
    polygon.map_coords(|c| Coord { x: c.x + dx, y: c.y })
}

fn clamp_lon(polygon: &Polygon<f64>) -> Polygon<f64> {
    polygon.map_coords(|c| Coord {
        x: c.x.clamp(-ANTIMERIDIAN, ANTIMERIDIAN),
        y: c.y,
    })
}

fn from_parts(mut parts: Vec<Polygon<f64>>) -> Result<Geometry<f64>> {
    match parts.len() {
        0 => Err(Error::Geometry("geometry has no polygon parts".into())),
        1 => Ok(Geometry::Polygon(parts.remove(0))),
        _ => Ok(Geometry::MultiPolygon(MultiPolygon::new(parts))),
    }
}

/// Union the parts of a MultiPolygon in a 0..360 longitude frame, then map back to ±180.
///
/// Polygons are returned unchanged; the merged ring may cross the antimeridian. The
/// boolean union snaps vertices, so merged coordinates can move by a few 1e-8 degrees.
pub fn merge_multipolygon(geometry: Geometry<f64>) -> Result<Geometry<f64>> {
    let multi = match geometry {
        Geometry::MultiPolygon(multi) => multi,
        other => return Ok(other),
    };
    let mut shifted = multi.0.iter().map(shift_negative);
    let first = shifted
        .next()
        .ok_or_else(|| Error::Geometry("empty multipolygon".into()))?;
    let merged = shifted.fold(MultiPolygon::new(vec![first]), |acc, part| {
        acc.union(&MultiPolygon::new(vec![part]))
    });
    debug!(
        "Merged {} polygon parts into {}",
        multi.0.len(),
        merged.0.len()
    );
    from_parts(
        merged
            .0
            .iter()
            .map(|p| wrap_east(&p.orient(Direction::Default)))
            .collect(),
    )
}

/// Whether any exterior segment jumps by more than 180° of longitude
pub fn crosses_antimeridian(polygon: &Polygon<f64>) -> bool {
    polygon
        .exterior()
        .lines()
        .any(|line| (line.end.x - line.start.x).abs() > ANTIMERIDIAN)
}

fn normalize_polygon(polygon: &Polygon<f64>) -> Polygon<f64> {
    let shifted = shift_negative(polygon);
    let center = shifted
        .bounding_rect()
        .map(|r| (r.min().x + r.max().x) / 2.0)
        .unwrap_or_default();
    let normalized = if center > ANTIMERIDIAN {
        translate_lon(&shifted, -360.0)
    } else {
        shifted
    };
    normalized.orient(Direction::Default)
}

fn split_polygon(polygon: &Polygon<f64>) -> Vec<Polygon<f64>> {
    let shifted = shift_negative(polygon);
    let west = Rect::new(
        Coord { x: -360.0, y: -90.0 },
        Coord { x: ANTIMERIDIAN, y: 90.0 },
    )
    .to_polygon();
    let east = Rect::new(
        Coord { x: ANTIMERIDIAN, y: -90.0 },
        Coord { x: 540.0, y: 90.0 },
    )
    .to_polygon();

    let mut parts: Vec<Polygon<f64>> = shifted.intersection(&west).0;
    parts.extend(
        shifted
            .intersection(&east)
            .0
            .iter()
            .map(|p| translate_lon(p, -360.0)),
    );
    parts
        .iter()
        .map(|p| clamp_lon(p).orient(Direction::Default))
        .collect()
}

/// Rewrite polygons crossing the antimeridian with the given strategy.
/// Geometries that do not cross pass through unchanged.
pub fn fix_geometry(geometry: Geometry<f64>, strategy: AntimeridianStrategy) -> Result<Geometry<f64>> {
    let polygons = match geometry {
        Geometry::Polygon(p) => vec![p],
        Geometry::MultiPolygon(mp) => mp.0,
        other => return Ok(other),
    };
    if !polygons.iter().any(crosses_antimeridian) {
        return from_parts(polygons);
    }
    debug!("Footprint crosses the antimeridian, applying {}", strategy);

    let mut fixed = Vec::with_capacity(polygons.len() + 1);
    for polygon in &polygons {
        if !crosses_antimeridian(polygon) {
            fixed.push(polygon.clone());
            continue;
        }
        match strategy {
            AntimeridianStrategy::Normalize => fixed.push(normalize_polygon(polygon)),
            AntimeridianStrategy::Split => fixed.extend(split_polygon(polygon)),
        }
    }
    from_parts(fixed)
}

/// Bounding box `[west, south, east, north]`.
///
/// A MultiPolygon with parts touching both +180 and -180 gets `west > east`.
pub fn bbox(geometry: &Geometry<f64>) -> Result<Vec<f64>> {
    let rect = geometry
        .bounding_rect()
        .ok_or_else(|| Error::Geometry("cannot compute bbox of an empty geometry".into()))?;
    let (south, north) = (rect.min().y, rect.max().y);

    if let Geometry::MultiPolygon(multi) = geometry {
        let rects: Vec<Rect<f64>> = multi.0.iter().filter_map(|p| p.bounding_rect()).collect();
        let touches_east = rects
            .iter()
            .any(|r| r.max().x >= ANTIMERIDIAN - EDGE_TOLERANCE);
        let touches_west = rects
            .iter()
            .any(|r| r.min().x <= -ANTIMERIDIAN + EDGE_TOLERANCE);
        if touches_east && touches_west {
            let west = rects
                .iter()
                .filter(|r| r.min().x >= 0.0)
                .map(|r| r.min().x)
                .fold(f64::INFINITY, f64::min);
            let east = rects
                .iter()
                .filter(|r| r.max().x <= 0.0)
                .map(|r| r.max().x)
                .fold(f64::NEG_INFINITY, f64::max);
            if west.is_finite() && east.is_finite() {
                return Ok(vec![west, south, east, north]);
            }
        }
    }
    Ok(vec![rect.min().x, south, rect.max().x, north])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    // Union and intersection snap vertices, so results drift by a few 1e-8 degrees
    const SNAP_TOLERANCE: f64 = 1e-6;

    fn t60vxr_parts() -> Geometry<f64> {
        Geometry::MultiPolygon(MultiPolygon::new(vec![
            polygon![
                (x: 178.98, y: 59.44),
                (x: 180.0, y: 59.44),
                (x: 180.0, y: 60.43),
                (x: 178.98, y: 60.43),
            ],
            polygon![
                (x: -180.0, y: 59.44),
                (x: -178.71, y: 59.44),
                (x: -178.71, y: 60.43),
                (x: -180.0, y: 60.43),
            ],
        ]))
    }

    fn lon_range(geometry: &Geometry<f64>) -> (f64, f64) {
        let rect = geometry.bounding_rect().unwrap();
        (rect.min().x, rect.max().x)
    }

    #[test]
    fn merge_is_identity_on_polygons() {
        let polygon = Geometry::Polygon(polygon![
            (x: -70.0, y: -12.0),
            (x: -69.0, y: -12.0),
            (x: -69.0, y: -11.0),
            (x: -70.0, y: -11.0),
        ]);
        let merged = merge_multipolygon(polygon.clone()).unwrap();
        assert_eq!(merged, polygon);
        assert_eq!(merge_multipolygon(merged).unwrap(), polygon);
    }

    #[test]
    fn merge_glues_parts_touching_the_antimeridian() {
        let merged = merge_multipolygon(t60vxr_parts()).unwrap();
        let Geometry::Polygon(polygon) = merged else {
            panic!("expected a single polygon");
        };
        assert!(crosses_antimeridian(&polygon));
    }

    #[test]
    fn split_yields_two_parts_within_range() {
        let merged = merge_multipolygon(t60vxr_parts()).unwrap();
        let fixed = fix_geometry(merged, AntimeridianStrategy::Split).unwrap();
        let Geometry::MultiPolygon(multi) = &fixed else {
            panic!("expected a multipolygon");
        };
        assert_eq!(multi.0.len(), 2);
        let (min, max) = lon_range(&fixed);
        assert!(min >= -180.0 && max <= 180.0);

        let bbox = bbox(&fixed).unwrap();
        assert!((bbox[0] - 178.98).abs() < SNAP_TOLERANCE);
        assert!((bbox[2] + 178.71).abs() < SNAP_TOLERANCE);
        assert!(bbox[0] > bbox[2]);
        assert!((bbox[1] - 59.44).abs() < SNAP_TOLERANCE);
        assert!((bbox[3] - 60.43).abs() < SNAP_TOLERANCE);
    }

    #[test]
    fn normalize_shifts_west_of_minus_180() {
        let merged = merge_multipolygon(t60vxr_parts()).unwrap();
        let fixed = fix_geometry(merged, AntimeridianStrategy::Normalize).unwrap();
        assert!(matches!(fixed, Geometry::Polygon(_)));
        let (min, max) = lon_range(&fixed);
        assert!((min + 181.02).abs() < SNAP_TOLERANCE, "min lon {}", min);
        assert!((max + 178.71).abs() < SNAP_TOLERANCE, "max lon {}", max);
    }

    #[test]
    fn non_crossing_geometry_passes_through() {
        let polygon = Geometry::Polygon(polygon![
            (x: 10.0, y: 0.0),
            (x: 11.0, y: 0.0),
            (x: 11.0, y: 1.0),
            (x: 10.0, y: 1.0),
        ]);
        let fixed = fix_geometry(polygon.clone(), AntimeridianStrategy::Split).unwrap();
        assert_eq!(fixed, polygon);
        assert_eq!(bbox(&fixed).unwrap(), vec![10.0, 0.0, 11.0, 1.0]);
    }
}
