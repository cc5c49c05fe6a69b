//! Core building blocks: filename identifiers, footprint strategies,
//! antimeridian handling and granule metadata extraction. These are
//! consumed by the high-level `api` module.
pub mod antimeridian;
pub mod footprint;
pub mod identifier;
pub mod metadata;
pub mod params;
