use anyhow::{Context, Result};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use earnings_watch::config::EarningsConfig;
use earnings_watch::service::finance::FinanceService;
use earnings_watch::service::pipeline::{run, RunStamp};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = EarningsConfig::from_env()?;
    let stamp = RunStamp::now();
    info!(
        "Earnings run {} reading {}",
        stamp.as_str(),
        config.watchlist_path.display()
    );

    info!("Initializing FinanceService...");
    let finance = FinanceService::new(config.proxy.clone(), config.fetch.shared_session)?;
    if !finance.is_shared() {
        info!("Building a fresh Yahoo session per ticker");
    }

    let summary = run(&config, &finance, &stamp)
        .await
        .with_context(|| format!("earnings run {} failed", stamp.as_str()))?;

    info!(
        "Done: {} tickers, {} with events, {} empty, {} errors -> {}",
        summary.tickers,
        summary.with_event,
        summary.empty,
        summary.errors,
        config.output_path.display()
    );

    Ok(())
}
