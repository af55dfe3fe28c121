//! Reading pictograph datasets from disk.

use std::fs;
use std::path::Path;

use pg_core::dataset::REFERENCE_DATASET_JSON;
use pg_core::{Dataset, DatasetRow};

use crate::error::{Result, StoreError};

/// Load a dataset file: a JSON array of flat rows.
///
/// Every row must validate; one bad row rejects the whole file with its index.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let json = fs::read_to_string(path).map_err(|e| {
        StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
    })?;
    let rows: Vec<DatasetRow> = serde_json::from_str(&json)?;
    if rows.is_empty() {
        return Err(StoreError::InvalidData(format!(
            "{} contains no rows",
            path.display()
        )));
    }
    let dataset = Dataset::from_rows(rows)?;
    tracing::info!("loaded {} dataset rows from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// The dataset bundled with the engine.
pub fn reference_dataset() -> Result<Dataset> {
    Ok(Dataset::from_json(REFERENCE_DATASET_JSON)?)
}

/// Load `path` when given, otherwise fall back to the bundled dataset.
pub fn load_dataset_or_reference(path: Option<&Path>) -> Result<Dataset> {
    match path {
        Some(path) => load_dataset(path),
        None => {
            tracing::debug!("no dataset path configured, using bundled reference data");
            reference_dataset()
        }
    }
}
