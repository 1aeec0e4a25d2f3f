//! # DEX Collector
//!
//! Issues one pool request per planned batch, strictly one at a time, with a
//! fixed pause between consecutive requests.

use crate::batch_planner::Batch;
use crate::metrics;
use crate::rate_provider::DexProvider;
use crate::types::dex_data::RawPool;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;

/// Pools gathered over all batches of a cycle.
#[derive(Debug, Default)]
pub struct DexFetch {
    /// In batch order, provider order within a batch.
    pub pools: Vec<RawPool>,
    pub requests: usize,
    pub failed_batches: usize,
}

pub struct DexCollector {
    provider: Arc<dyn DexProvider>,
    request_delay: Duration,
}

impl DexCollector {
    pub fn new(provider: Arc<dyn DexProvider>, request_delay: Duration) -> Self {
        Self {
            provider,
            request_delay,
        }
    }

    pub async fn fetch_batches(&self, batches: &[Batch]) -> DexFetch {
        let mut fetch = DexFetch::default();

        for (idx, batch) in batches.iter().enumerate() {
            if batch.is_empty() {
                continue;
            }
            if fetch.requests > 0 {
                tokio::time::sleep(self.request_delay).await;
            }
            fetch.requests += 1;

            match self.provider.pools_for_tokens(batch).await {
                Ok(pools) => {
                    debug!("Batch {}/{}: {} pools", idx + 1, batches.len(), pools.len());
                    fetch.pools.extend(pools);
                }
                Err(e) => {
                    error!(
                        "❌ DEX request failed for batch {}/{} [{}]: {}",
                        idx + 1,
                        batches.len(),
                        batch.join(","),
                        e
                    );
                    metrics::increment_provider_failure("dex", "pools_for_tokens");
                    fetch.failed_batches += 1;
                }
            }
        }

        metrics::increment_dex_batches(fetch.requests as u64);
        info!(
            "✅ DEX: {} pools from {} requests ({} failed)",
            fetch.pools.len(),
            fetch.requests,
            fetch.failed_batches
        );
        fetch
    }
}
