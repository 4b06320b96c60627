use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the energy dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV document could not be parsed.
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// A required column is absent from a table header.
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// A cell in a required column could not be interpreted.
    #[error("Invalid value '{value}' in column '{column}' at line {line}")]
    InvalidValue {
        column: String,
        line: u64,
        value: String,
    },

    /// A month value is not an integer in 1..=12.
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    /// A day-of-month range violates `1 <= lo <= hi <= 31`.
    #[error("Invalid day range: {lo}..={hi}")]
    InvalidDayRange { lo: u32, hi: u32 },

    /// Assembly found no readable input files.
    #[error("No data found in {0}")]
    NoData(PathBuf),

    /// The combined dataset file does not exist.
    #[error("Dataset not found: {0}")]
    DatasetNotFound(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
