//! Geolocation records read from the input CSV.

use std::{fs::File, path::Path};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Columns the input has to provide, in display order.
pub const COLUMNS: [&str; 8] = [
    "latitude",
    "longitude",
    "id",
    "userId",
    "lastSeenAt",
    "speed",
    "direction",
    "source",
];

/// One row of the input. Everything but the position is only shown on hover,
/// so it is kept as written. A blank coordinate reads as `None`; the row stays
/// in the table and the point is simply not drawn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub id: String,
    pub user_id: String,
    pub last_seen_at: String,
    pub speed: String,
    pub direction: String,
    pub source: String,
}

impl Record {
    /// `(latitude, longitude)` when both are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Hover values in the order of [`HOVER_COLUMNS`].
    pub fn hover_data(&self) -> [&str; 5] {
        [
            &self.user_id,
            &self.last_seen_at,
            &self.speed,
            &self.direction,
            &self.source,
        ]
    }
}

/// Columns attached to every point on hover, besides `id`.
pub const HOVER_COLUMNS: [&str; 5] = ["userId", "lastSeenAt", "speed", "direction", "source"];

pub type RecordTable = Vec<Record>;

/// Checks that `path` names an existing `.csv` file.
pub fn validate(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_owned()));
    }
    if !path.to_string_lossy().ends_with(".csv") {
        return Err(Error::InvalidFormat(path.to_owned()));
    }
    Ok(())
}

pub fn load(path: &Path, delimiter: u8) -> Result<RecordTable> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))
        .map_err(Error::Load)?;
    let table = read(file, delimiter).map_err(Error::Load)?;
    info!(path = %path.display(), rows = table.len(), "loaded records");
    Ok(table)
}

fn read(reader: impl std::io::Read, delimiter: u8) -> anyhow::Result<RecordTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = reader.headers()?;
    let missing: Vec<_> = COLUMNS
        .into_iter()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if !missing.is_empty() {
        return Err(anyhow!(
            "missing required columns: {} (found: {})",
            missing.join(", "),
            headers.iter().collect::<Vec<_>>().join(", ")
        ));
    }
    debug!(?headers, "header row");

    let mut table = Vec::new();
    for (i, result) in reader.deserialize().enumerate() {
        // row 1 is the header
        let record: Record = result.with_context(|| format!("Failed to parse row {}", i + 2))?;
        table.push(record);
    }

    Ok(table)
}
