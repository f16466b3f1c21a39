use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{EarningsConfig, DEFAULT_INTER_REQUEST_DELAY_MS};
use crate::models::{EarningsEvent, EarningsPayload, PROVENANCE};
use crate::service::country::country_for_ticker;
use crate::service::finance::{EarningsProvider, ProviderEvent};
use crate::service::numeric::to_float_or_none;
use crate::service::watchlist::{load_watchlist, WatchlistError};
use crate::service::writer::{write_payload, WriteError};

pub const NOTE_OK: &str = "ok";
pub const NOTE_NO_DATE: &str = "no earnings date from provider";
pub const NOTE_ERROR_PREFIX: &str = "error:";

/// Knobs that used to be separate copies of the fetch loop.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// Drop events dated before the current calendar year.
    pub filter_stale_dates: bool,
    /// Fixed pause between consecutive provider calls.
    pub inter_request_delay: Duration,
    /// Reuse one provider session for the whole run.
    pub shared_session: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            filter_stale_dates: false,
            inter_request_delay: Duration::from_millis(DEFAULT_INTER_REQUEST_DELAY_MS),
            shared_session: true,
        }
    }
}

/// The run's single clock reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp {
    generated_at: DateTime<Utc>,
    rendered: String,
}

impl RunStamp {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Truncates to whole seconds.
    pub fn at(instant: DateTime<Utc>) -> Self {
        let generated_at = instant.with_nanosecond(0).unwrap_or(instant);
        let rendered = generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        Self {
            generated_at,
            rendered,
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    pub fn today(&self) -> NaiveDate {
        self.generated_at.date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Event,
    Empty,
    Error,
}

/// Zero or one event for a ticker plus the note explaining it.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerOutcome {
    pub events: Vec<EarningsEvent>,
    pub note: String,
    pub kind: OutcomeKind,
}

impl TickerOutcome {
    fn event(event: EarningsEvent) -> Self {
        Self {
            events: vec![event],
            note: NOTE_OK.to_string(),
            kind: OutcomeKind::Event,
        }
    }

    fn empty(note: String) -> Self {
        Self {
            events: Vec::new(),
            note,
            kind: OutcomeKind::Empty,
        }
    }

    fn error(note: String) -> Self {
        Self {
            events: Vec::new(),
            note,
            kind: OutcomeKind::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tickers: usize,
    pub with_event: usize,
    pub empty: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn record(&mut self, kind: OutcomeKind) {
        self.tickers += 1;
        match kind {
            OutcomeKind::Event => self.with_event += 1,
            OutcomeKind::Empty => self.empty += 1,
            OutcomeKind::Error => self.errors += 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Watchlist(#[from] WatchlistError),
    #[error("watchlist {0} has no usable tickers; refusing to write an empty file")]
    EmptyWatchlist(PathBuf),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Ask the provider for one ticker and fold every outcome into a note.
pub async fn fetch_ticker<P>(
    provider: &P,
    symbol: &str,
    stamp: &RunStamp,
    options: &FetchOptions,
) -> TickerOutcome
where
    P: EarningsProvider + ?Sized,
{
    let today = stamp.today();

    match provider.next_event(symbol, today).await {
        Ok(Some(event)) => {
            if options.filter_stale_dates && event.date.year() < today.year() {
                debug!("{}: dropping stale earnings date {}", symbol, event.date);
                return TickerOutcome::empty(format!(
                    "no earnings date this year (provider returned {})",
                    event.date.format("%Y-%m-%d")
                ));
            }
            TickerOutcome::event(to_earnings_event(symbol, &event, stamp))
        }
        Ok(None) => {
            debug!("{}: provider returned no earnings date", symbol);
            TickerOutcome::empty(NOTE_NO_DATE.to_string())
        }
        Err(err) => {
            warn!("earnings fetch failed for {}: {}", symbol, err);
            TickerOutcome::error(format!("{} {}: {}", NOTE_ERROR_PREFIX, err.kind(), err))
        }
    }
}

fn to_earnings_event(symbol: &str, event: &ProviderEvent, stamp: &RunStamp) -> EarningsEvent {
    EarningsEvent {
        symbol: symbol.to_string(),
        date: event.date.format("%Y-%m-%d").to_string(),
        eps_estimate: to_float_or_none(&event.eps_estimate),
        eps_actual: to_float_or_none(&event.eps_actual),
        surprise_pct: to_float_or_none(&event.surprise_pct),
        last_updated: stamp.as_str().to_string(),
        source: PROVENANCE.to_string(),
        country: country_for_ticker(symbol),
    }
}

/// One sequential pass over the tickers. Every ticker ends up in both maps.
pub async fn build_payload<P>(
    provider: &P,
    tickers: &[String],
    stamp: &RunStamp,
    options: &FetchOptions,
) -> (EarningsPayload, RunSummary)
where
    P: EarningsProvider + ?Sized,
{
    let mut payload = EarningsPayload::new(stamp.as_str());
    let mut summary = RunSummary::default();

    for (idx, symbol) in tickers.iter().enumerate() {
        if idx > 0 && !options.inter_request_delay.is_zero() {
            tokio::time::sleep(options.inter_request_delay).await;
        }

        let outcome = fetch_ticker(provider, symbol, stamp, options).await;
        debug!("{} [{}/{}]: {}", symbol, idx + 1, tickers.len(), outcome.note);
        summary.record(outcome.kind);
        payload.insert(symbol, outcome.events, outcome.note);
    }

    (payload, summary)
}

/// Load, fetch, write. Only an unreadable or empty watchlist and a failed
/// write abort; provider failures end up in the notes.
pub async fn run<P>(
    config: &EarningsConfig,
    provider: &P,
    stamp: &RunStamp,
) -> Result<RunSummary, RunError>
where
    P: EarningsProvider + ?Sized,
{
    let tickers = load_watchlist(&config.watchlist_path).await?;
    if tickers.is_empty() {
        return Err(RunError::EmptyWatchlist(config.watchlist_path.clone()));
    }

    info!(
        "Fetching next earnings for {} tickers (stale filter: {}, delay: {:?})",
        tickers.len(),
        config.fetch.filter_stale_dates,
        config.fetch.inter_request_delay
    );

    let (payload, summary) = build_payload(provider, &tickers, stamp, &config.fetch).await;
    write_payload(&config.output_path, &payload).await?;

    Ok(summary)
}
