//! DarkScan server
//!
//! Boot sequence:
//! - load `.env` and environment configuration
//! - run one refresh cycle (live sources, else snapshot, else empty)
//! - optionally spawn the periodic refresh task
//! - serve the HTTP API until CTRL+C
//!
//! Usage:
//!   cargo run --release --bin darkscan
//!
//! Environment variables: see `Config::from_env`.

use anyhow::Context;
use darkscan::{
    api::{build_router, AppState},
    config::AllowedOrigins,
    refresh::refresh_scheduler_task,
    Config, RefreshOrchestrator,
};
use log::{error, info};
use std::{net::SocketAddr, sync::Arc, time::Duration};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::from_env().context("loading configuration")?;

    info!("🚀 Starting DarkScan...");
    info!("📊 Configuration:");
    info!("   ├─ Listen: {}:{}", config.bind_addr, config.port);
    info!("   ├─ Cache file: {}", config.cache_file.display());
    info!("   ├─ Sources: {}", config.source_urls.len());
    for url in &config.source_urls {
        info!("   │   └─ {}", url);
    }
    info!("   ├─ Fetch timeout: {}s", config.fetch_timeout_secs);
    let token_state = if config.admin_token.is_some() {
        "set"
    } else {
        "NOT SET (refresh endpoint open)"
    };
    info!("   ├─ Admin token: {}", token_state);
    match &config.allow_origins {
        AllowedOrigins::Any => info!("   ├─ CORS origins: *"),
        AllowedOrigins::List(list) => info!("   ├─ CORS origins: {}", list.join(", ")),
    }
    if config.refresh_interval_secs > 0 {
        info!("   └─ Auto refresh: every {}s", config.refresh_interval_secs);
    } else {
        info!("   └─ Auto refresh: disabled");
    }

    let orchestrator =
        Arc::new(RefreshOrchestrator::from_config(&config).context("building HTTP client")?);

    let report = orchestrator.refresh().await;
    info!(
        "✅ Bootstrap via {:?}: count={} sources={}",
        report.outcome,
        report.metadata.address_count,
        report.metadata.sources_used.len()
    );

    if config.refresh_interval_secs > 0 {
        let scheduled = Arc::clone(&orchestrator);
        let every = Duration::from_secs(config.refresh_interval_secs);
        tokio::spawn(async move {
            refresh_scheduler_task(scheduled, every).await;
        });
    }

    let state = AppState::new(Arc::clone(&orchestrator), config.admin_token.clone());
    let app = build_router(state, &config.allow_origins);

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("🌐 Server running on http://{}", addr);
    info!("🔄 Press CTRL+C to shutdown gracefully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("✅ DarkScan stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("⚠️  Received CTRL+C, shutting down..."),
        Err(err) => error!("❌ Failed to listen for CTRL+C: {}", err),
    }
}
