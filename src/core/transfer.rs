//! Import and export of whole entry collections as JSON.
//!
//! Validation lives here, at the boundary: the rate engine only ever sees
//! collections that passed `import_entries`.
use crate::core::observation::Observation;
use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import data is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Import data must be a JSON array of entries, found {0}")]
    NotAnArray(&'static str),

    #[error("Entry {index} is malformed: {reason}")]
    MalformedEntry { index: usize, reason: String },
}

/// Serializes entries as a pretty-printed JSON array.
pub fn export_entries(entries: &[Observation]) -> Result<String> {
    serde_json::to_string_pretty(entries).context("Failed to serialize entries")
}

/// Parses a JSON array of entries, rejecting anything else.
pub fn import_entries(data: &str) -> Result<Vec<Observation>, ImportError> {
    let value: Value = serde_json::from_str(data)?;
    let items = match value {
        Value::Array(items) => items,
        other => return Err(ImportError::NotAnArray(json_type_name(&other))),
    };

    let entries = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Observation>(item).map_err(|e| {
                ImportError::MalformedEntry {
                    index,
                    reason: e.to_string(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Parsed {} imported entries", entries.len());
    Ok(entries)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
