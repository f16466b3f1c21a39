use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::models::EarningsPayload;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pretty-print the payload with keys sorted at every level.
pub fn render_payload(payload: &EarningsPayload) -> Result<String, WriteError> {
    let value = sort_keys(serde_json::to_value(payload)?);
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Rebuild every object with its keys in ascending order, independent of
/// whether serde_json was built with `preserve_order`.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Overwrite `path` with the rendered payload. Not atomic.
pub async fn write_payload(path: &Path, payload: &EarningsPayload) -> Result<(), WriteError> {
    let rendered = render_payload(payload)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| WriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, rendered.as_bytes())
        .await
        .map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    info!(
        "Wrote {} tickers to {} ({} bytes)",
        payload.results.len(),
        path.display(),
        rendered.len()
    );
    Ok(())
}
