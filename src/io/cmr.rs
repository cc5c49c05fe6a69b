use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors encountered when reading CMR (ECHO10) granule metadata
#[derive(Debug, Error)]
pub enum CmrError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Missing field `{0}` in CMR metadata")]
    MissingField(&'static str),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Subset of a `.cmr.xml` granule document needed for STAC generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CmrMetadata {
    pub granule_ur: Option<String>,
    /// One (lon, lat) ring per `GPolygon` boundary, in document order
    pub polygons: Vec<Vec<(f64, f64)>>,
}

/// Parse an ECHO10 granule document.
///
/// Points are collected from `GPolygon/Boundary/Point`; boundaries nested in an
/// `ExclusiveZone` (holes) are skipped.
pub fn parse_cmr_xml(xml: &str) -> Result<CmrMetadata, CmrError> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut curr = String::new();

    let mut meta = CmrMetadata::default();
    let mut in_gpolygon = false;
    let mut in_boundary = false;
    let mut in_exclusive_zone = false;
    let mut in_point = false;
    let mut ring: Vec<(f64, f64)> = Vec::new();
    let mut lon: Option<f64> = None;
    let mut lat: Option<f64> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match tag.as_str() {
                    "GPolygon" => in_gpolygon = true,
                    "ExclusiveZone" => in_exclusive_zone = true,
                    "Boundary" if in_gpolygon && !in_exclusive_zone => {
                        in_boundary = true;
                        ring.clear();
                    }
                    "Point" if in_boundary => {
                        in_point = true;
                        lon = None;
                        lat = None;
                    }
                    _ => {}
                }
                curr = tag;
            }
            Event::End(ref e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match tag.as_str() {
                    "GPolygon" => in_gpolygon = false,
                    "ExclusiveZone" => in_exclusive_zone = false,
                    "Boundary" if in_boundary => {
                        in_boundary = false;
                        if ring.len() >= 3 {
                            meta.polygons.push(std::mem::take(&mut ring));
                        } else {
                            warn!("Skipping GPolygon boundary with {} points", ring.len());
                            ring.clear();
                        }
                    }
                    "Point" if in_point => {
                        in_point = false;
                        match (lon, lat) {
                            (Some(x), Some(y)) => ring.push((x, y)),
                            _ => return Err(CmrError::MissingField("PointLongitude/PointLatitude")),
                        }
                    }
                    _ => {}
                }
                curr.clear();
            }
            Event::Text(e) => {
                let txt = e.unescape()?;
                match curr.as_str() {
                    "GranuleUR" if meta.granule_ur.is_none() => {
                        meta.granule_ur = Some(txt.trim().to_string())
                    }
                    "PointLongitude" if in_point => lon = Some(parse_coordinate(&txt)?),
                    "PointLatitude" if in_point => lat = Some(parse_coordinate(&txt)?),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "Parsed CMR metadata: granule {:?}, {} polygon(s)",
        meta.granule_ur,
        meta.polygons.len()
    );
    Ok(meta)
}

fn parse_coordinate(txt: &str) -> Result<f64, CmrError> {
    txt.trim()
        .parse::<f64>()
        .map_err(|_| CmrError::Parse(format!("invalid coordinate `{}`", txt)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_POLYGONS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Granule>
  <GranuleUR>HLS.S30.T60VXR.2022178T233701.v2.0</GranuleUR>
  <Spatial>
    <HorizontalSpatialDomain>
      <Geometry>
        <GPolygon>
          <Boundary>
            <Point><PointLongitude>178.98</PointLongitude><PointLatitude>59.44</PointLatitude></Point>
            <Point><PointLongitude>178.98</PointLongitude><PointLatitude>60.43</PointLatitude></Point>
            <Point><PointLongitude>180.0</PointLongitude><PointLatitude>60.43</PointLatitude></Point>
            <Point><PointLongitude>180.0</PointLongitude><PointLatitude>59.44</PointLatitude></Point>
          </Boundary>
        </GPolygon>
        <GPolygon>
          <Boundary>
            <Point><PointLongitude>-180.0</PointLongitude><PointLatitude>59.44</PointLatitude></Point>
            <Point><PointLongitude>-180.0</PointLongitude><PointLatitude>60.43</PointLatitude></Point>
            <Point><PointLongitude>-178.71</PointLongitude><PointLatitude>60.43</PointLatitude></Point>
            <Point><PointLongitude>-178.71</PointLongitude><PointLatitude>59.44</PointLatitude></Point>
          </Boundary>
          <ExclusiveZone>
            <Boundary>
              <Point><PointLongitude>-179.5</PointLongitude><PointLatitude>59.9</PointLatitude></Point>
              <Point><PointLongitude>-179.5</PointLongitude><PointLatitude>60.0</PointLatitude></Point>
              <Point><PointLongitude>-179.4</PointLongitude><PointLatitude>60.0</PointLatitude></Point>
            </Boundary>
          </ExclusiveZone>
        </GPolygon>
      </Geometry>
    </HorizontalSpatialDomain>
  </Spatial>
</Granule>"#;

    #[test]
    fn reads_granule_ur_and_rings() {
        let meta = parse_cmr_xml(TWO_POLYGONS).unwrap();
        assert_eq!(
            meta.granule_ur.as_deref(),
            Some("HLS.S30.T60VXR.2022178T233701.v2.0")
        );
        assert_eq!(meta.polygons.len(), 2);
        assert_eq!(meta.polygons[0][0], (178.98, 59.44));
        assert_eq!(meta.polygons[1].len(), 4);
    }

    #[test]
    fn document_without_polygons_parses_empty() {
        let meta = parse_cmr_xml("<Granule><GranuleUR>x</GranuleUR></Granule>").unwrap();
        assert!(meta.polygons.is_empty());
    }

    #[test]
    fn bad_coordinate_is_a_parse_error() {
        let xml = "<Granule><GPolygon><Boundary><Point><PointLongitude>east</PointLongitude>\
                   <PointLatitude>1</PointLatitude></Point></Boundary></GPolygon></Granule>";
        assert!(matches!(parse_cmr_xml(xml), Err(CmrError::Parse(_))));
    }
}
