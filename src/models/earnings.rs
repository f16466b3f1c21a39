use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Provenance string stamped on every event.
pub const PROVENANCE: &str = "yfinance";

/// Next earnings event for one ticker, in the shape the spreadsheet sync reads.
///
/// Field names are part of the output contract and must not be renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsEvent {
    pub symbol: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub eps_estimate: Option<f64>,
    pub eps_actual: Option<f64>,
    pub surprise_pct: Option<f64>,
    /// Run timestamp, identical for every event in one payload.
    pub last_updated: String,
    pub source: String,
    pub country: String,
}

/// The whole `earnings.json` document. Rewritten from scratch on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsPayload {
    pub generated_at: String,
    pub results: BTreeMap<String, Vec<EarningsEvent>>,
    pub notes: BTreeMap<String, String>,
}

impl EarningsPayload {
    pub fn new(generated_at: impl Into<String>) -> Self {
        Self {
            generated_at: generated_at.into(),
            results: BTreeMap::new(),
            notes: BTreeMap::new(),
        }
    }

    /// Record the outcome for one ticker. A later insert for the same ticker wins.
    pub fn insert(&mut self, symbol: &str, events: Vec<EarningsEvent>, note: String) {
        self.results.insert(symbol.to_string(), events);
        self.notes.insert(symbol.to_string(), note);
    }
}
