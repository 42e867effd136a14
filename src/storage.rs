use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::models::Record;

pub fn save_records(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(records).context("failed to encode records")?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(count = records.len(), path = %path.display(), "checkpoint saved");
    Ok(())
}

/// Loads a checkpoint, treating a missing file as "no prior checkpoint"
/// rather than an error.
pub fn load_records(path: &Path) -> anyhow::Result<Option<Vec<Record>>> {
    if !path.exists() {
        return Ok(None);
    }
    let body =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<Record> =
        serde_json::from_str(&body).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(records))
}
