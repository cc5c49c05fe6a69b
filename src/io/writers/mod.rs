//! Writers persisting STAC documents to disk.
pub mod stac;
pub use stac::{write_collection, write_item};
