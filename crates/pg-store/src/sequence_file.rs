use std::fs;
use std::path::Path;

use pg_core::{SequenceData, export_sequence_json, import_sequence_json};

use crate::error::{Result, StoreError};

/// Read a legacy-format sequence file and validate it.
pub fn read_sequence(path: &Path) -> Result<SequenceData> {
    let json = fs::read_to_string(path).map_err(|e| {
        StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
    })?;
    let seq = import_sequence_json(&json)?;
    tracing::debug!("read {} beats from {}", seq.len(), path.display());
    Ok(seq)
}

/// Write `seq` as a legacy-format JSON array.
pub fn write_sequence(path: &Path, seq: &SequenceData) -> Result<()> {
    let json = export_sequence_json(seq)?;
    fs::write(path, json).map_err(|e| {
        StoreError::InvalidData(format!("failed to write {}: {e}", path.display()))
    })
}
