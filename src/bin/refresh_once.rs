//! One-shot refresh
//!
//! Runs a single refresh cycle against the configured sources, writes the
//! snapshot file on success and prints the resulting metadata as JSON.
//! Handy for warming `CACHE_FILE` before the server starts.
//!
//! Usage:
//!   SANCTIONS_URLS=https://... cargo run --bin refresh_once

use anyhow::Context;
use darkscan::{Config, RefreshOrchestrator, RefreshOutcome};
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("loading configuration")?;
    info!(
        "🔄 Refreshing {} sources into {}",
        config.source_urls.len(),
        config.cache_file.display()
    );

    let orchestrator = RefreshOrchestrator::from_config(&config).context("building HTTP client")?;
    let report = orchestrator.refresh().await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.outcome != RefreshOutcome::Live {
        anyhow::bail!("no source could be fetched (outcome: {:?})", report.outcome);
    }
    Ok(())
}
