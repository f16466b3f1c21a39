use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use finance_query_core::{FetchClient, YahooAuthManager, YahooError, YahooFinanceClient};
use serde_json::Value;
use tracing::debug;

pub mod earnings;

/// quoteSummary modules needed to resolve the next earnings event.
const EARNINGS_MODULES: &[&str] = &["calendarEvents", "earningsHistory"];

#[derive(Debug, thiserror::Error)]
pub enum FinanceServiceError {
    #[error(transparent)]
    Yahoo(#[from] YahooError),
    #[error("No quote summary for symbol {0}")]
    NotFound(String),
    #[error("Malformed earnings response: {0}")]
    Malformed(String),
    #[error("Session setup failed: {0}")]
    Session(String),
}

impl FinanceServiceError {
    /// Short class label used in per-ticker error notes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Yahoo(_) => "YahooError",
            Self::NotFound(_) => "NotFound",
            Self::Malformed(_) => "MalformedResponse",
            Self::Session(_) => "SessionError",
        }
    }
}

/// Next earnings event as the provider reported it.
///
/// The figures stay raw; `service::numeric` decides what counts as a number.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEvent {
    pub date: NaiveDate,
    pub eps_estimate: Value,
    pub eps_actual: Value,
    pub surprise_pct: Value,
}

impl ProviderEvent {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            eps_estimate: Value::Null,
            eps_actual: Value::Null,
            surprise_pct: Value::Null,
        }
    }
}

/// Source of next-earnings data for one ticker at a time.
///
/// `Ok(None)` means the provider answered but had no earnings date.
#[async_trait]
pub trait EarningsProvider: Send + Sync {
    async fn next_event(
        &self,
        symbol: &str,
        today: NaiveDate,
    ) -> Result<Option<ProviderEvent>, FinanceServiceError>;
}

enum Session<C> {
    /// One client (cookie jar and crumb) for the whole run.
    Shared(Arc<C>),
    /// A fresh client per request.
    PerRequest,
}

impl<C> Session<C> {
    /// A client is built up front in both modes, so a bad proxy or TLS setup
    /// aborts the run before the watchlist is read.
    fn establish<F>(shared: bool, build: F) -> Result<Self, FinanceServiceError>
    where
        F: FnOnce() -> Result<C, FinanceServiceError>,
    {
        let client = build()?;
        if shared {
            Ok(Session::Shared(Arc::new(client)))
        } else {
            Ok(Session::PerRequest)
        }
    }
}

pub struct FinanceService {
    session: Session<YahooFinanceClient>,
    proxy: Option<String>,
}

impl FinanceService {
    /// Build a finance service with optional proxy support.
    pub fn new(proxy: Option<String>, shared_session: bool) -> Result<Self, FinanceServiceError> {
        let session = Session::establish(shared_session, || build_client(proxy.clone()))?;

        Ok(Self { session, proxy })
    }

    pub fn is_shared(&self) -> bool {
        matches!(self.session, Session::Shared(_))
    }

    async fn quote_summary(&self, symbol: &str) -> Result<Value, FinanceServiceError> {
        let data = match &self.session {
            Session::Shared(client) => client.get_quote_summary(symbol, EARNINGS_MODULES).await?,
            Session::PerRequest => {
                let client = build_client(self.proxy.clone())?;
                client.get_quote_summary(symbol, EARNINGS_MODULES).await?
            }
        };
        Ok(data)
    }
}

#[async_trait]
impl EarningsProvider for FinanceService {
    async fn next_event(
        &self,
        symbol: &str,
        today: NaiveDate,
    ) -> Result<Option<ProviderEvent>, FinanceServiceError> {
        debug!("Requesting quote summary for {}", symbol);
        let data = self.quote_summary(symbol).await?;
        earnings::next_event_from_summary(symbol, &data, today)
    }
}

fn build_client(proxy: Option<String>) -> Result<YahooFinanceClient, FinanceServiceError> {
    let fetch = Arc::new(
        FetchClient::new(proxy.clone())
            .map_err(|e| FinanceServiceError::Session(format!("failed to build client: {e}")))?,
    );
    let auth = Arc::new(YahooAuthManager::new(proxy, fetch.cookie_jar().clone()));
    Ok(YahooFinanceClient::new(auth, fetch))
}

pub use FinanceServiceError as Error;
