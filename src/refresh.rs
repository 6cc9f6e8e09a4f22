//! Refresh cycle: fetch every source, rebuild the index, publish, persist
//!
//! A cycle always starts from an empty index and ends in one of three ways:
//! - `Live` - at least one source parsed; publish it and write the snapshot
//! - `Cache` - nothing fetched; publish the snapshot's addresses under "cache"
//! - `Empty` - nothing fetched and no usable snapshot; publish an empty index
//!
//! The live index and its metadata are swapped together at the very end, so
//! readers never see a mix of two cycles. Cycles are serialized by a mutex.

use crate::{
    config::Config,
    error::FetchError,
    index::{AddressIndex, LiveIndex, RefreshMetadata, CACHE_SOURCE},
    persistence::SnapshotStore,
    sources::{Fetcher, HttpSourceClient},
};
use chrono::Utc;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{sync::Mutex, time::interval};

/// Where the published index came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    Live,
    Cache,
    Empty,
}

/// Result of one refresh cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub outcome: RefreshOutcome,
    pub metadata: RefreshMetadata,
}

/// Drives refresh cycles against a [`LiveIndex`]
pub struct RefreshOrchestrator {
    source_urls: Vec<String>,
    fetcher: Fetcher,
    store: SnapshotStore,
    live: Arc<LiveIndex>,
    cycle_guard: Mutex<()>,
}

impl RefreshOrchestrator {
    pub fn new(
        source_urls: Vec<String>,
        fetcher: Fetcher,
        store: SnapshotStore,
        live: Arc<LiveIndex>,
    ) -> Self {
        Self {
            source_urls,
            fetcher,
            store,
            live,
            cycle_guard: Mutex::new(()),
        }
    }

    /// Orchestrator over HTTP sources with an empty live index
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let client = HttpSourceClient::new(Duration::from_secs(config.fetch_timeout_secs))?;
        Ok(Self::new(
            config.source_urls.clone(),
            Fetcher::new(Arc::new(client)),
            SnapshotStore::new(&config.cache_file),
            Arc::new(LiveIndex::new()),
        ))
    }

    pub fn live(&self) -> &Arc<LiveIndex> {
        &self.live
    }

    pub fn source_urls(&self) -> &[String] {
        &self.source_urls
    }

    /// Run one cycle, waiting for any cycle already in progress
    pub async fn refresh(&self) -> RefreshReport {
        let _cycle = self.cycle_guard.lock().await;
        self.run_cycle().await
    }

    /// Run one cycle unless another is in progress
    ///
    /// Returns `None` without doing anything if a cycle is already running.
    pub async fn try_refresh(&self) -> Option<RefreshReport> {
        let _cycle = self.cycle_guard.try_lock().ok()?;
        Some(self.run_cycle().await)
    }

    async fn run_cycle(&self) -> RefreshReport {
        let started = std::time::Instant::now();
        let mut index = AddressIndex::new();

        let summary = self.fetcher.fetch_all(&self.source_urls, &mut index).await;

        let (outcome, sources_used) = if summary.success_count > 0 {
            (RefreshOutcome::Live, summary.used_sources)
        } else {
            match self.store.load() {
                Some(addresses) => {
                    for address in &addresses {
                        index.insert(address, CACHE_SOURCE);
                    }
                    (RefreshOutcome::Cache, vec![CACHE_SOURCE.to_string()])
                }
                None => (RefreshOutcome::Empty, Vec::new()),
            }
        };

        let metadata = RefreshMetadata {
            last_update: Some(Utc::now()),
            sources_used,
            address_count: index.len(),
        };

        if outcome == RefreshOutcome::Live {
            // Written before the index moves into the live slot
            if let Err(e) = self.store.persist(&index, &metadata) {
                log::warn!(
                    "⚠️  cache persist failed for {}: {}",
                    self.store.path().display(),
                    e
                );
            }
        }

        self.live.replace(index, metadata.clone()).await;

        match outcome {
            RefreshOutcome::Live => log::info!(
                "✅ Refresh complete: fetched={} sources, addrs={} ({:.1}s)",
                metadata.sources_used.len(),
                metadata.address_count,
                started.elapsed().as_secs_f64()
            ),
            RefreshOutcome::Cache => log::warn!(
                "⚠️  All sources failed, serving CACHE: addrs={}",
                metadata.address_count
            ),
            RefreshOutcome::Empty => {
                log::warn!("⚠️  All sources failed and no cache available, index is empty")
            }
        }

        RefreshReport { outcome, metadata }
    }
}

/// Periodic refresh task
///
/// Runs a cycle every `every`, skipping the immediate first tick since the
/// server bootstraps with its own cycle. Runs until cancelled.
pub async fn refresh_scheduler_task(orchestrator: Arc<RefreshOrchestrator>, every: Duration) {
    log::info!("⏰ Starting refresh scheduler (interval: {}s)", every.as_secs());

    let mut timer = interval(every);
    timer.tick().await;

    loop {
        timer.tick().await;
        let report = orchestrator.refresh().await;
        log::debug!("Scheduled refresh finished: {:?}", report.outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{FetchedPayload, SourceClient};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    /// Serves fixed payloads until switched off, then fails every request
    struct SwitchableClient {
        responses: HashMap<String, FetchedPayload>,
        online: AtomicBool,
    }

    #[async_trait]
    impl SourceClient for SwitchableClient {
        async fn get(&self, url: &str) -> Result<FetchedPayload, FetchError> {
            if !self.online.load(Ordering::SeqCst) {
                return Err(FetchError::Status(502));
            }
            self.responses.get(url).cloned().ok_or(FetchError::Status(404))
        }
    }

    fn setup(dir: &TempDir) -> (Arc<SwitchableClient>, RefreshOrchestrator) {
        let client = Arc::new(SwitchableClient {
            responses: HashMap::from([
                (
                    "https://a.example/list.json".to_string(),
                    FetchedPayload::ok(Some("application/json"), r#"["addr1","addr2"]"#),
                ),
                (
                    "https://b.example/list.csv".to_string(),
                    FetchedPayload::ok(
                        Some("text/csv"),
                        "wallet,label\naddr2,mixer\naddr3,exchange",
                    ),
                ),
            ]),
            online: AtomicBool::new(true),
        });
        let orchestrator = RefreshOrchestrator::new(
            vec![
                "https://a.example/list.json".to_string(),
                "https://b.example/list.csv".to_string(),
            ],
            Fetcher::new(client.clone()),
            SnapshotStore::new(dir.path().join("cache.json")),
            Arc::new(LiveIndex::new()),
        );
        (client, orchestrator)
    }

    #[tokio::test]
    async fn test_live_refresh_publishes_and_persists() {
        let dir = TempDir::new().unwrap();
        let (_client, orchestrator) = setup(&dir);

        let report = orchestrator.refresh().await;

        assert_eq!(report.outcome, RefreshOutcome::Live);
        assert_eq!(report.metadata.address_count, 3);
        assert_eq!(
            report.metadata.sources_used,
            vec!["https://a.example/list.json", "https://b.example/list.csv"]
        );
        assert!(report.metadata.last_update.is_some());

        let live = orchestrator.live();
        assert_eq!(
            live.lookup("addr2").await,
            vec!["https://a.example/list.json", "https://b.example/list.csv"]
        );
        assert_eq!(live.metadata().await, report.metadata);

        let on_disk = SnapshotStore::new(dir.path().join("cache.json")).load().unwrap();
        assert_eq!(on_disk, vec!["addr1", "addr2", "addr3"]);
    }

    #[tokio::test]
    async fn test_total_failure_falls_back_to_cache() {
        let dir = TempDir::new().unwrap();
        let (client, orchestrator) = setup(&dir);
        orchestrator.refresh().await;

        client.online.store(false, Ordering::SeqCst);
        let report = orchestrator.refresh().await;

        assert_eq!(report.outcome, RefreshOutcome::Cache);
        assert_eq!(report.metadata.sources_used, vec![CACHE_SOURCE]);
        assert_eq!(report.metadata.address_count, 3);
        // Attribution collapses to the cache marker
        assert_eq!(orchestrator.live().lookup("addr1").await, vec![CACHE_SOURCE]);
        assert_eq!(orchestrator.live().lookup("addr2").await, vec![CACHE_SOURCE]);
    }

    #[tokio::test]
    async fn test_total_failure_without_cache_is_empty() {
        let dir = TempDir::new().unwrap();
        let (client, orchestrator) = setup(&dir);
        client.online.store(false, Ordering::SeqCst);

        let report = orchestrator.refresh().await;

        assert_eq!(report.outcome, RefreshOutcome::Empty);
        assert!(report.metadata.sources_used.is_empty());
        assert!(report.metadata.last_update.is_some());
        assert_eq!(orchestrator.live().size().await, 0);
    }

    #[tokio::test]
    async fn test_cache_fallback_does_not_rewrite_snapshot() {
        let dir = TempDir::new().unwrap();
        let (client, orchestrator) = setup(&dir);
        orchestrator.refresh().await;
        let before = SnapshotStore::new(dir.path().join("cache.json")).read().unwrap();

        client.online.store(false, Ordering::SeqCst);
        orchestrator.refresh().await;

        let after = SnapshotStore::new(dir.path().join("cache.json")).read().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_try_refresh_rejects_while_running() {
        let dir = TempDir::new().unwrap();
        let (_client, orchestrator) = setup(&dir);

        let held = orchestrator.cycle_guard.lock().await;
        assert!(orchestrator.try_refresh().await.is_none());
        drop(held);

        assert!(orchestrator.try_refresh().await.is_some());
    }
}
