use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use hls_stac::{AntimeridianStrategy, GeometrySource, ItemOptions};

use super::errors::AppError;

#[derive(Parser)]
#[command(name = "hls-stac", version, about = "STAC metadata for HLS granules")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable logging (filter with RUST_LOG)
    #[arg(long, global = true, default_value_t = false)]
    pub log: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a STAC Item from the HREF of one EO band COG
    CreateItem {
        /// HREF of an EO band COG (local path or URL)
        source: String,

        /// Directory to write `<id>.json` into
        destination: PathBuf,

        #[command(flatten)]
        item: ItemArgs,
    },
    /// Create the HLS Collection with one Item per granule listed in a file
    CreateCollection {
        /// Text file with one COG HREF per line
        hrefs_file: PathBuf,

        /// Directory to write `collection.json` and the items into
        destination: PathBuf,

        #[command(flatten)]
        item: ItemArgs,

        /// Keep going when an item fails; failures are counted and logged
        #[arg(long, default_value_t = false)]
        continue_on_error: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ItemArgs {
    /// Footprint source (raster or cmr)
    #[arg(long, value_enum, default_value_t = GeometrySource::Raster)]
    pub geometry: GeometrySource,

    /// Check that every band COG of the granule exists
    #[arg(long, default_value_t = false)]
    pub check_existence: bool,

    /// How to write footprints crossing the antimeridian (split or normalize)
    #[arg(long, value_enum, default_value_t = AntimeridianStrategy::Split)]
    pub antimeridian_strategy: AntimeridianStrategy,

    /// Footprint simplification tolerance in degrees
    #[arg(long)]
    pub simplify_tolerance: Option<f64>,
}

impl ItemArgs {
    pub fn options(&self) -> Result<ItemOptions, AppError> {
        if let Some(value) = self.simplify_tolerance {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::InvalidTolerance { value });
            }
        }
        Ok(ItemOptions {
            geometry: self.geometry,
            check_existence: self.check_existence,
            antimeridian_strategy: self.antimeridian_strategy,
            simplify_tolerance: self.simplify_tolerance,
        })
    }
}
