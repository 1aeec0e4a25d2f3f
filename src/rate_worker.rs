//! # Rate Worker
//!
//! Runs the price-feed cycle on a fixed interval:
//! discovery → CEX prices → batch plan → DEX pools → filter/resolve → publish.
//!
//! The worker owns the `WatermarkStore`; cycles never overlap, so it is
//! mutated without locks. Failures inside a cycle are logged where they happen
//! and degrade that cycle's output; nothing here ends the loop.

use crate::batch_planner::{plan_batches, BatchLimits};
use crate::cex_collector::CexCollector;
use crate::database::LogStore;
use crate::dex_collector::DexCollector;
use crate::discovery::AddressDiscovery;
use crate::feed_publisher::FeedPublisher;
use crate::metrics;
use crate::pool_filters::{PoolFilter, PoolFilterConfig};
use crate::rate_provider::{CexProvider, DexProvider};
use crate::redis_manager::CacheStore;
use crate::settings::Settings;
use crate::types::{Chain, PriceRecord};
use crate::utils::short_run_id;
use crate::watermark::WatermarkStore;
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Summary of one cycle, mostly for logs and tests.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub run_id: String,
    pub newly_tracked: usize,
    pub cex_records: usize,
    pub batches: usize,
    pub failed_batches: usize,
    pub pools: usize,
    pub dex_records: usize,
    pub published: bool,
}

pub struct RateWorker {
    chains: Vec<Chain>,
    watermarks: WatermarkStore,
    discovery: AddressDiscovery,
    cex: CexCollector,
    dex: DexCollector,
    filter: PoolFilter,
    publisher: FeedPublisher,
    limits: BatchLimits,
    interval: Duration,
}

impl RateWorker {
    pub fn new(
        settings: &Settings,
        log_store: Arc<dyn LogStore>,
        cex_provider: Arc<dyn CexProvider>,
        dex_provider: Arc<dyn DexProvider>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        let chains = settings.discovery.chains.clone();
        Self {
            watermarks: WatermarkStore::new(&chains),
            chains,
            discovery: AddressDiscovery::new(
                log_store,
                settings.discovery.max_block_range,
                settings.discovery.chunk_blocks,
            ),
            cex: CexCollector::new(cex_provider, &settings.cex),
            dex: DexCollector::new(
                dex_provider,
                Duration::from_millis(settings.dex.request_delay_ms),
            ),
            filter: PoolFilter::new(PoolFilterConfig::from_settings(settings)),
            publisher: FeedPublisher::new(cache, settings.rate_worker.feed_key.clone()),
            limits: BatchLimits::new(
                settings.dex.max_tokens_per_batch,
                settings.dex.max_weight_per_batch,
            ),
            interval: settings.rate_interval(),
        }
    }

    /// Starts from existing discovery state instead of an empty one.
    pub fn with_watermarks(mut self, watermarks: WatermarkStore) -> Self {
        self.watermarks = watermarks;
        self
    }

    pub fn watermarks(&self) -> &WatermarkStore {
        &self.watermarks
    }

    pub async fn run_cycle(&mut self) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport {
            run_id: short_run_id(),
            ..Default::default()
        };
        let id = report.run_id.clone();
        info!("🔄 [cycle {}] starting", id);

        for chain in &self.chains {
            let watermark = self.watermarks.chain_mut(*chain);
            let outcome = self.discovery.refresh_chain(*chain, watermark).await;
            report.newly_tracked += outcome.newly_tracked;
            if let Some((from, to)) = outcome.failed_range {
                warn!("[cycle {}] {} discovery stopped at [{}, {}]", id, chain, from, to);
            }
            metrics::set_tracked_tokens(chain.as_str(), watermark.len());
        }

        let cex = self.cex.collect_cex_prices().await;
        report.cex_records = cex.records.len();

        // CEX-priced tokens are never looked up on the DEX side.
        let tokens: Vec<_> = self
            .watermarks
            .token_entries()
            .into_iter()
            .filter(|t| !cex.is_priced(&t.address))
            .collect();
        let batches = plan_batches(tokens, self.limits);
        report.batches = batches.len();
        info!(
            "[cycle {}] {} tracked tokens, {} to price on DEX in {} batches",
            id,
            self.watermarks.tracked_count(),
            batches.iter().map(Vec::len).sum::<usize>(),
            batches.len()
        );

        let fetch = self.dex.fetch_batches(&batches).await;
        report.failed_batches = fetch.failed_batches;
        report.pools = fetch.pools.len();

        let resolution = self.filter.resolve(&fetch.pools);
        let updated = self.watermarks.apply_pool_counts(&resolution.pool_counts);
        info!(
            "[cycle {}] {} pools -> {} DEX prices, {} pool weights updated",
            id,
            fetch.pools.len(),
            resolution.records.len(),
            updated
        );

        let dex_records: Vec<PriceRecord> = resolution
            .records
            .into_iter()
            .filter(|r| !cex.is_priced(&r.address))
            .collect();
        report.dex_records = dex_records.len();

        report.published = self.publisher.publish(&cex.records, &dex_records).await.is_ok();

        let elapsed = started.elapsed();
        metrics::record_cycle(elapsed);
        info!(
            "✅ [cycle {}] done in {:?} ({} cex + {} dex records, published: {})",
            id, elapsed, report.cex_records, report.dex_records, report.published
        );
        report
    }

    /// Runs cycles back to back, sleeping `interval` after each one. Never returns.
    pub async fn run(mut self) {
        info!(
            "🚀 Rate worker started: interval {:?}, feed key {}",
            self.interval,
            self.publisher.key()
        );
        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.interval).await;
        }
    }
}
