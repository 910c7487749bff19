use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::WriteError;
use crate::models::summary::SessionSummary;

/// Sidecar path for a data file: `{data_path}.summary.json` (extension replaced).
pub fn summary_path(data_path: &Path) -> PathBuf {
    data_path.with_extension("summary.json")
}

/// Write the session summary as a JSON sidecar next to the data file.
pub fn write_summary(summary: &SessionSummary, data_path: &Path) -> Result<PathBuf, WriteError> {
    let path = summary_path(data_path);
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| WriteError::Serialize(format!("failed to serialize summary: {}", e)))?;
    fs::write(&path, json)
        .map_err(|e| WriteError::Io(format!("summary: {}", e)))?;
    Ok(path)
}

/// Read a session summary sidecar back.
pub fn read_summary(data_path: &Path) -> Result<SessionSummary, WriteError> {
    let json = fs::read_to_string(summary_path(data_path))
        .map_err(|e| WriteError::Io(format!("failed to read summary: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| WriteError::Serialize(format!("failed to parse summary: {}", e)))
}
