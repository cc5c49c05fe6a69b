//! Command Line Interface (CLI) layer for hls-stac.
//!
//! Argument parsing (`args`), CLI error types (`errors`) and the dispatch
//! logic (`runner`) for the `create-item` and `create-collection` commands.
//! For programmatic use, prefer the library API (`hls_stac::api`).
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
