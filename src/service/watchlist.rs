use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("failed to read watchlist {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse watchlist {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct WatchlistFile {
    #[serde(default)]
    tickers: Vec<Value>,
}

/// Read `{"tickers": [...]}` and return the normalized ticker list.
pub async fn load_watchlist(path: &Path) -> Result<Vec<String>, WatchlistError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| WatchlistError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let file: WatchlistFile =
        serde_json::from_slice(&raw).map_err(|source| WatchlistError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let tickers = normalize_tickers(&file.tickers);
    info!(
        "Loaded {} tickers from {} ({} raw entries)",
        tickers.len(),
        path.display(),
        file.tickers.len()
    );
    Ok(tickers)
}

/// Trim, drop empties and collapse exact duplicates, keeping first-seen order.
///
/// Numbers are kept in their textual form; other non-string entries are dropped.
pub fn normalize_tickers(entries: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for entry in entries {
        let text = match entry {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => continue,
        };
        if text.is_empty() || !seen.insert(text.clone()) {
            continue;
        }
        out.push(text);
    }

    out
}
