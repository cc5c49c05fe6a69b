use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hls_stac::api::{create_collection_from_hrefs, create_item, read_hrefs};
use hls_stac::io::writers::{write_collection, write_item};
use hls_stac::ItemOptions;

use super::args::{CliArgs, Command};
use super::errors::AppError;

fn create_item_command(source: &str, destination: &Path, options: &ItemOptions) -> Result<(), AppError> {
    info!("Creating item from {}", source);
    let item = create_item(source, options, None)?;
    let path = write_item(&item, destination)?;
    info!("Successfully created item: {} -> {:?}", item.id, path);
    Ok(())
}

fn create_collection_command(
    hrefs_file: &Path,
    destination: &Path,
    options: &ItemOptions,
    continue_on_error: bool,
) -> Result<(), AppError> {
    let hrefs = read_hrefs(hrefs_file)?;
    if hrefs.is_empty() {
        return Err(AppError::EmptyHrefs {
            path: hrefs_file.display().to_string(),
        });
    }
    info!("Creating collection from {} HREFs in {:?}", hrefs.len(), hrefs_file);

    let (collection, items, report) =
        create_collection_from_hrefs(&hrefs, options, None, continue_on_error)?;
    let path = write_collection(&collection, &items, destination)?;

    info!("Collection written: {:?}", path);
    info!("Processed: {}", report.processed);
    info!("Skipped: {}", report.skipped);
    if report.errors > 0 {
        warn!("Errors: {}", report.errors);
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hls_stac=debug"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match args.command {
        Command::CreateItem {
            source,
            destination,
            item,
        } => create_item_command(&source, &destination, &item.options()?)?,
        Command::CreateCollection {
            hrefs_file,
            destination,
            item,
            continue_on_error,
        } => create_collection_command(
            &hrefs_file,
            &destination,
            &item.options()?,
            continue_on_error,
        )?,
    }

    Ok(())
}
