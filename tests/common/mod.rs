#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;

use earnings_watch::service::finance::{EarningsProvider, FinanceServiceError, ProviderEvent};
use earnings_watch::service::pipeline::RunStamp;

/// What the scripted provider answers for one symbol.
#[derive(Clone)]
pub enum Scripted {
    Event(ProviderEvent),
    NoDate,
    NotFound,
    Malformed(&'static str),
}

/// Provider double that answers from a fixed script and records every call.
#[derive(Default)]
pub struct ScriptedProvider {
    script: HashMap<String, Scripted>,
    calls: Mutex<Vec<(String, NaiveDate)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, answer: Scripted) -> Self {
        self.script.insert(symbol.to_string(), answer);
        self
    }

    pub fn calls(&self) -> Vec<(String, NaiveDate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EarningsProvider for ScriptedProvider {
    async fn next_event(
        &self,
        symbol: &str,
        today: NaiveDate,
    ) -> Result<Option<ProviderEvent>, FinanceServiceError> {
        self.calls.lock().unwrap().push((symbol.to_string(), today));
        match self.script.get(symbol) {
            Some(Scripted::Event(event)) => Ok(Some(event.clone())),
            Some(Scripted::NoDate) | None => Ok(None),
            Some(Scripted::NotFound) => Err(FinanceServiceError::NotFound(symbol.to_string())),
            Some(Scripted::Malformed(msg)) => Err(FinanceServiceError::Malformed(msg.to_string())),
        }
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn event_on(date: NaiveDate, estimate: Value, actual: Value, surprise: Value) -> Scripted {
    Scripted::Event(ProviderEvent {
        date,
        eps_estimate: estimate,
        eps_actual: actual,
        surprise_pct: surprise,
    })
}

/// 2026-10-17T09:30:00Z
pub fn stamp() -> RunStamp {
    RunStamp::at(Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap())
}

pub fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
