//! Granule identifiers parsed out of HLS filenames.
//!
//! Filenames follow `HLS.<product>.<tile>.<datetime>.v<major>.<minor>.<band>.tif`, or
//! `HLS.<product>.<tile>.<datetime>.v<major>.<minor>.cmr.xml` for the CMR metadata. Fields are
//! taken by position; a filename with any other number of segments is rejected rather than
//! misread.
use crate::error::{Error, Result};
use crate::types::Product;

// Segments of a band filename once the extension is removed
const BAND_SEGMENTS: usize = 7;
// ... and of the granule id
const ID_SEGMENTS: usize = 6;

/// Final path component of an HREF (local path or URL)
pub fn basename(href: &str) -> &str {
    let trimmed = href.split(['?', '#']).next().unwrap_or(href);
    trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
}

/// Dot-delimited parts of the basename, without the extension segment(s)
pub fn parts(href: &str) -> Result<Vec<&str>> {
    let name = basename(href);
    let mut segments: Vec<&str> = name.split('.').collect();
    let (ext_len, expected) = if name.ends_with(".cmr.xml") {
        (2, ID_SEGMENTS)
    } else {
        (1, BAND_SEGMENTS)
    };
    if segments.len() <= ext_len {
        return Err(Error::malformed(href, "missing file extension"));
    }
    segments.truncate(segments.len() - ext_len);
    if segments.len() != expected {
        return Err(Error::malformed(
            href,
            format!(
                "expected {} dot-delimited segments, found {}",
                expected,
                segments.len()
            ),
        ));
    }
    Ok(segments)
}

/// Granule id, e.g. `HLS.L30.T19LDD.2022165T144027.v2.0`
pub fn id_from_href(href: &str) -> Result<String> {
    let parts = parts(href)?;
    Ok(parts[..ID_SEGMENTS].join("."))
}

pub fn product_from_href(href: &str) -> Result<Product> {
    let parts = parts(href)?;
    Product::from_code(parts[1]).ok_or_else(|| Error::UnsupportedProduct(parts[1].to_string()))
}

/// MGRS tile id, e.g. `T19LDD`
pub fn tile_id_from_href(href: &str) -> Result<String> {
    let parts = parts(href)?;
    let tile = parts[2];
    validate_tile_id(tile).map_err(|reason| Error::malformed(href, reason))?;
    Ok(tile.to_string())
}

/// Processing version without the `v` prefix, e.g. `2.0`
pub fn version_from_href(href: &str) -> Result<String> {
    let parts = parts(href)?;
    let major = parts[4]
        .strip_prefix('v')
        .ok_or_else(|| Error::malformed(href, format!("bad version segment `{}`", parts[4])))?;
    Ok(format!("{}.{}", major, parts[5]))
}

/// Band code, e.g. `B01` or `Fmask`
pub fn band_name_from_href(href: &str) -> Result<String> {
    let parts = parts(href)?;
    if parts.len() < BAND_SEGMENTS {
        return Err(Error::malformed(href, "no band segment"));
    }
    Ok(parts[BAND_SEGMENTS - 1].to_string())
}

fn validate_tile_id(tile: &str) -> std::result::Result<(), String> {
    let bytes = tile.as_bytes();
    let ok = bytes.len() == 6
        && bytes[0] == b'T'
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit()
        && bytes[3..].iter().all(|b| b.is_ascii_alphabetic());
    if ok {
        Ok(())
    } else {
        Err(format!("bad MGRS tile id `{}`", tile))
    }
}

/// All identifier fields of a band HREF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranuleIdentity {
    pub id: String,
    pub product: Product,
    pub tile_id: String,
    pub version: String,
    pub band: String,
}

impl GranuleIdentity {
    pub fn from_href(href: &str) -> Result<Self> {
        Ok(Self {
            id: id_from_href(href)?,
            product: product_from_href(href)?,
            tile_id: tile_id_from_href(href)?,
            version: version_from_href(href)?,
            band: band_name_from_href(href)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const L30_B01: &str = "HLS.L30.T19LDD.2022165T144027.v2.0.B01.tif";

    #[test]
    fn parses_l30_band_href() {
        assert_eq!(product_from_href(L30_B01).unwrap(), Product::L30);
        assert_eq!(tile_id_from_href(L30_B01).unwrap(), "T19LDD");
        assert_eq!(
            id_from_href(L30_B01).unwrap(),
            "HLS.L30.T19LDD.2022165T144027.v2.0"
        );
        assert_eq!(version_from_href(L30_B01).unwrap(), "2.0");
        assert_eq!(band_name_from_href(L30_B01).unwrap(), "B01");
    }

    #[rstest]
    #[case("HLS.L30.T19LDD.2022165T144027.v2.0.B01.tif")]
    #[case("HLS.S30.T60VXR.2022178T233701.v2.0.B8A.tif")]
    #[case("HLS.S30.T19LCD.2022034T145719.v2.0.Fmask.tif")]
    fn id_band_and_extension_rebuild_basename(#[case] name: &str) {
        let href = format!("https://example.com/hls/{}", name);
        let rebuilt = format!(
            "{}.{}.tif",
            id_from_href(&href).unwrap(),
            band_name_from_href(&href).unwrap()
        );
        assert_eq!(rebuilt, name);
    }

    #[test]
    fn cmr_xml_has_two_part_extension() {
        let href = "/data/HLS.S30.T19LDD.2022166T144741.v2.0.cmr.xml";
        assert_eq!(id_from_href(href).unwrap(), "HLS.S30.T19LDD.2022166T144741.v2.0");
        assert_eq!(product_from_href(href).unwrap(), Product::S30);
        assert!(matches!(
            band_name_from_href(href),
            Err(Error::MalformedIdentifier { .. })
        ));
    }

    #[rstest]
    #[case("HLS.L30.T19LDD.tif")]
    #[case("B01.tif")]
    #[case("HLS_L30_T19LDD")]
    #[case("HLS.L30.T19LDD.2022165T144027.v2.0.B01.extra.tif")]
    #[case("HLS.L30.T19LDD.2022165T144027.v2.0.B01.cmr.xml")]
    fn filenames_with_wrong_segment_count_are_malformed(#[case] href: &str) {
        assert!(matches!(
            id_from_href(href),
            Err(Error::MalformedIdentifier { .. })
        ));
        assert!(matches!(
            band_name_from_href(href),
            Err(Error::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn unknown_product_is_rejected() {
        let href = "HLS.X30.T19LDD.2022165T144027.v2.0.B01.tif";
        assert!(matches!(
            product_from_href(href),
            Err(Error::UnsupportedProduct(code)) if code == "X30"
        ));
    }

    #[test]
    fn bad_tile_id_is_malformed() {
        let href = "HLS.L30.19LDD.2022165T144027.v2.0.B01.tif";
        assert!(matches!(
            tile_id_from_href(href),
            Err(Error::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn identity_bundles_fields() {
        let identity = GranuleIdentity::from_href(L30_B01).unwrap();
        assert_eq!(identity.id, "HLS.L30.T19LDD.2022165T144027.v2.0");
        assert_eq!(identity.tile_id, "T19LDD");
        assert_eq!(identity.band, "B01");
        assert_eq!(identity.version, "2.0");
    }
}
