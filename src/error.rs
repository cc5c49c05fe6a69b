//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, GDAL, CMR XML, JSON and HTTP errors, and provides semantic
//! variants for identifier, tag and geometry failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL reader error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("CMR reader error: {0}")]
    Cmr(#[from] crate::io::CmrError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed HLS identifier `{href}`: {reason}")]
    MalformedIdentifier { href: String, reason: String },

    #[error("Unsupported HLS product: {0}")]
    UnsupportedProduct(String),

    #[error(
        "A STAC Item can not be created from an Fmask, SAA, SZA, VAA, or VZA COG HREF. A '{band}' COG HREF was supplied."
    )]
    IncorrectAssetHref { band: String },

    #[error("No EPSG code and no 'UTM Zone' found in CRS WKT: {wkt}")]
    MissingUtmZone { wkt: String },

    #[error("Fragment error: {0}")]
    Fragment(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("File not found: {href}")]
    MissingAsset { href: String },

    #[error("Missing required tag `{0}`")]
    MissingTag(&'static str),

    #[error("Invalid value for tag `{key}`: {value}")]
    InvalidTag { key: &'static str, value: String },
}

impl Error {
    pub fn malformed<H: Into<String>, R: Into<String>>(href: H, reason: R) -> Self {
        Error::MalformedIdentifier {
            href: href.into(),
            reason: reason.into(),
        }
    }
}
