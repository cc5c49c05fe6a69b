use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid simplify tolerance: {value}. Must be a finite, non-negative number of degrees")]
    InvalidTolerance { value: f64 },

    #[error("No HREFs found in {path}")]
    EmptyHrefs { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Stac(#[from] hls_stac::Error),
}
