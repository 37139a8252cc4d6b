use std::path::PathBuf;

use thiserror::Error;

/// Failures the tool reports to the operator instead of crashing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error: The file '{}' could not be found.", .0.display())]
    FileNotFound(PathBuf),

    #[error("Error: The file '{}' is not a CSV file.", .0.display())]
    InvalidFormat(PathBuf),

    #[error("Error loading CSV file: {0:#}")]
    Load(#[source] anyhow::Error),

    #[error("Unknown plot type: {0}")]
    UnknownPlotType(String),

    #[error("Error exporting plot: {0:#}")]
    Export(#[source] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
