//! # Address Discovery
//!
//! Finds token addresses that were traded or transferred on a chain since the
//! last scan and adds them to the pool-weight table at weight 0.
//!
//! The scan window is split into chunks scanned in ascending order. The
//! watermark only moves past chunks whose queries all succeeded; the first
//! failing chunk stops the pass and is scanned again next cycle.

pub mod range;

use crate::database::{AddressRole, LogStore};
use crate::metrics;
use crate::types::{address_key, Chain};
use crate::watermark::ChainWatermark;
use anyhow::Result;
use indexmap::IndexSet;
use log::{debug, error, info};
use std::sync::Arc;

pub use range::ScanWindow;

/// What one discovery pass over a chain did.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    /// Head of the log store, if it could be read.
    pub current_block: Option<i64>,
    pub window: Option<ScanWindow>,
    /// Last block of the last successfully scanned chunk.
    pub scanned_to: Option<i64>,
    /// Chunk that failed and stopped the pass.
    pub failed_range: Option<(i64, i64)>,
    /// Distinct addresses seen in the scanned chunks.
    pub addresses: IndexSet<String>,
    /// How many of them were not tracked before.
    pub newly_tracked: usize,
}

pub struct AddressDiscovery {
    store: Arc<dyn LogStore>,
    max_block_range: i64,
    chunk_blocks: i64,
}

impl AddressDiscovery {
    pub fn new(store: Arc<dyn LogStore>, max_block_range: i64, chunk_blocks: i64) -> Self {
        Self {
            store,
            max_block_range: max_block_range.max(1),
            chunk_blocks: chunk_blocks.max(1),
        }
    }

    /// Distinct token addresses in trade and transfer logs within
    /// `[from_block, to_block]`. Errors are logged and yield an empty set.
    pub async fn discover_new_addresses(
        &self,
        chain: Chain,
        from_block: i64,
        to_block: i64,
    ) -> IndexSet<String> {
        match self.try_discover(chain, from_block, to_block).await {
            Ok(addresses) => addresses,
            Err(e) => {
                error!(
                    "❌ Address discovery failed for {} [{}, {}]: {:#}",
                    chain, from_block, to_block, e
                );
                IndexSet::new()
            }
        }
    }

    async fn try_discover(
        &self,
        chain: Chain,
        from_block: i64,
        to_block: i64,
    ) -> Result<IndexSet<String>> {
        if from_block > to_block {
            return Ok(IndexSet::new());
        }
        let trades = self
            .store
            .unique_addresses(chain.trade_table(), from_block, to_block, AddressRole::TradeLegs)
            .await?;
        let transfers = self
            .store
            .unique_addresses(
                chain.transfer_table(),
                from_block,
                to_block,
                AddressRole::TransferSubject,
            )
            .await?;

        let mut addresses = IndexSet::with_capacity(trades.len() + transfers.len());
        for address in trades.into_iter().chain(transfers) {
            let key = address_key(&address);
            if !key.is_empty() {
                addresses.insert(key);
            }
        }
        Ok(addresses)
    }

    /// Scans everything past the chain's watermark, tracks new addresses and
    /// advances the watermark over the chunks that succeeded.
    pub async fn refresh_chain(&self, chain: Chain, watermark: &mut ChainWatermark) -> DiscoveryOutcome {
        let mut outcome = DiscoveryOutcome::default();

        let current_block = match self.store.latest_block(chain.trade_table()).await {
            Ok(block) => block,
            Err(e) => {
                error!("❌ Failed to read latest stored block for {}: {:#}", chain, e);
                metrics::increment_provider_failure("log_store", "latest_block");
                return outcome;
            }
        };
        outcome.current_block = Some(current_block);

        let window = match ScanWindow::compute(
            watermark.last_scanned_block(),
            current_block,
            self.max_block_range,
        ) {
            Some(window) => window,
            None => {
                debug!(
                    "No new blocks for {} (watermark {}, store head {})",
                    chain,
                    watermark.last_scanned_block(),
                    current_block
                );
                return outcome;
            }
        };
        outcome.window = Some(window);

        info!(
            "🔍 Scanning {} blocks [{}, {}] on {} (watermark {})",
            window.blocks(),
            window.from_block,
            window.to_block,
            chain,
            watermark.last_scanned_block()
        );

        for (from_block, to_block) in window.chunks(self.chunk_blocks) {
            match self.try_discover(chain, from_block, to_block).await {
                Ok(addresses) => {
                    for address in addresses {
                        if watermark.track(&address) {
                            outcome.newly_tracked += 1;
                        }
                        outcome.addresses.insert(address);
                    }
                    watermark.advance_to(to_block);
                    outcome.scanned_to = Some(to_block);
                }
                Err(e) => {
                    error!(
                        "❌ Address discovery failed for {} [{}, {}], retrying next cycle: {:#}",
                        chain, from_block, to_block, e
                    );
                    metrics::increment_provider_failure("log_store", "unique_addresses");
                    outcome.failed_range = Some((from_block, to_block));
                    break;
                }
            }
        }

        metrics::increment_discovered_addresses(chain.as_str(), outcome.newly_tracked as u64);
        info!(
            "✅ {}: {} addresses seen, {} new, watermark now {}",
            chain,
            outcome.addresses.len(),
            outcome.newly_tracked,
            watermark.last_scanned_block()
        );
        outcome
    }
}
